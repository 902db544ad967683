//! End-to-end bootstrap of the web client presets from a static-file tree

use module_bootstrap::config::presets::{WEBTILES_BASE_URL, WEBTILES_JQUERY_PATH};
use module_bootstrap::config::BootstrapConfig;
use module_bootstrap::module::{LoaderError, ModuleId};
use module_bootstrap::{BootstrapLoader, DigestEvaluator, FsFetcher, Preset};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Lay out `<root>/scripts/client.js` and `<root>/scripts/contrib/jquery`
fn static_tree(with_jquery: bool) -> TempDir {
    let dir = TempDir::new().unwrap();
    let scripts = dir.path().join("scripts");
    std::fs::create_dir_all(scripts.join("contrib")).unwrap();
    std::fs::write(scripts.join("client.js"), "define_client();").unwrap();
    if with_jquery {
        std::fs::write(scripts.join("contrib/jquery"), "window.jQuery = {};").unwrap();
    }
    dir
}

fn loader_for(root: &Path, preset: Preset) -> BootstrapLoader {
    let loader = BootstrapLoader::new(
        Arc::new(FsFetcher::new(root).with_mount("/crawl/static")),
        Arc::new(DigestEvaluator),
    );
    loader.configure(preset.config()).unwrap();
    loader
}

#[tokio::test]
async fn test_presets_bootstrap_client_from_disk() {
    for preset in Preset::ALL {
        let tree = static_tree(true);
        let loader = loader_for(tree.path(), preset);

        loader.start().await.unwrap();

        let timeline = loader.registry().timeline().await;
        assert_eq!(timeline, vec![ModuleId::from("jquery"), ModuleId::from("client")]);

        let jquery = loader.registry().get(&"jquery".into()).await.unwrap();
        assert_eq!(jquery["location"], WEBTILES_JQUERY_PATH);
        assert_eq!(jquery["bytes"], "window.jQuery = {};".len());

        let client = loader.registry().get(&"client".into()).await.unwrap();
        assert_eq!(client["location"], format!("{}/client.js", WEBTILES_BASE_URL));
        assert_eq!(client["imports"], serde_json::json!(["jquery"]));
    }
}

#[tokio::test]
async fn test_missing_vendored_library_blocks_client() {
    let tree = static_tree(false);
    let loader = loader_for(tree.path(), Preset::NoTimeout);

    let err = loader.start().await.unwrap_err();
    match err {
        LoaderError::Incomplete { failures, skipped } => {
            assert_eq!(failures.len(), 1);
            assert!(matches!(
                failures[0],
                LoaderError::UnresolvedDependency { ref module, .. } if module.as_str() == "jquery"
            ));
            assert_eq!(skipped, vec![ModuleId::from("client")]);
        }
        other => panic!("expected Incomplete, got {other}"),
    }
    assert!(loader.registry().is_empty().await);
}

#[test]
fn test_bootstrap_config_file_selects_preset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bootstrap.toml");
    std::fs::write(
        &path,
        r#"
        preset = "no-timeout"

        [logging]
        filter = "module_bootstrap=debug"
        "#,
    )
    .unwrap();

    let config = BootstrapConfig::from_file(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.preset, Some(Preset::NoTimeout));
    assert!(config.resolution().wait_seconds.is_disabled());
}

#[test]
fn test_bootstrap_config_file_with_explicit_loader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bootstrap.json");
    std::fs::write(
        &path,
        r#"{
            "loader": {
                "baseUrl": "/crawl/static/scripts",
                "shim": { "client": ["jquery"] },
                "paths": { "jquery": "/crawl/static/scripts/contrib/jquery" },
                "waitSeconds": 15,
                "deps": ["client"]
            }
        }"#,
    )
    .unwrap();

    let config = BootstrapConfig::from_file(&path).unwrap();
    let resolution = config.resolution();
    assert_eq!(resolution.wait_seconds.limit(), Some(std::time::Duration::from_secs(15)));

    let mut expected = Preset::Standard.config();
    expected.wait_seconds = resolution.wait_seconds;
    assert_eq!(resolution, expected);
}

#[test]
fn test_bootstrap_config_rejects_malformed_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bootstrap.json");
    std::fs::write(
        &path,
        r#"{ "loader": { "baseUrl": "/x", "paths": { "jquery": "/x/contrib/" } } }"#,
    )
    .unwrap();

    let config = BootstrapConfig::from_file(&path).unwrap();
    assert!(config.validate().is_err());
}
