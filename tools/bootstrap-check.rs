//! Check a module bootstrap against a static-file tree or a live origin
//!
//! Loads a bootstrap configuration (file, preset, or `BOOTSTRAP_PRESET`),
//! resolves the entry request, then either prints the load plan or performs
//! the whole bootstrap and reports what executed. Module code is not run; each
//! module is recorded by size and SHA-256.

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use module_bootstrap::config::{BootstrapConfig, Preset};
use module_bootstrap::module::{
    BootstrapLoader, DigestEvaluator, LoadPlan, LoaderError, ModuleId, ResourceFetcher,
};
use module_bootstrap::utils::{env_opt, init_logging_from_config};
use module_bootstrap::{FsFetcher, StaticFetcher};

// Memory allocator optimization using mimalloc (faster than default allocator)
#[cfg(not(target_os = "windows"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Environment variable naming the configuration file
const CONFIG_ENV_VAR: &str = "BOOTSTRAP_CONFIG";

#[derive(Parser, Debug)]
#[command(
    name = "bootstrap-check",
    version,
    about = "Resolve and load a module bootstrap, reporting what executed"
)]
struct Args {
    /// Bootstrap configuration file (.toml or .json); defaults to $BOOTSTRAP_CONFIG
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named preset, overriding the configuration file (standard, no-timeout)
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Serve resources from this directory
    #[arg(long, conflicts_with = "origin")]
    root: Option<PathBuf>,

    /// Location prefix that maps onto --root (e.g. /crawl/static)
    #[arg(long, default_value = "")]
    mount: String,

    /// Fetch resources from this HTTP(S) origin
    #[arg(long)]
    origin: Option<String>,

    /// Print the load plan without fetching anything
    #[arg(long)]
    plan: bool,

    /// Emit machine-readable JSON
    #[arg(long)]
    json: bool,

    /// Entry modules (default: the configuration's deps)
    entries: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    executed: Vec<ExecutedModule>,
    failures: Vec<String>,
    skipped: Vec<ModuleId>,
}

#[derive(Debug, Serialize)]
struct ExecutedModule {
    module: ModuleId,
    value: serde_json::Value,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let config_path = args
        .config
        .clone()
        .or_else(|| env_opt(CONFIG_ENV_VAR).map(PathBuf::from));
    let mut bootstrap = match config_path {
        Some(path) => BootstrapConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => BootstrapConfig::default(),
    };
    if let Some(preset) = args.preset {
        bootstrap.preset = Some(preset);
        bootstrap.loader = None;
    }

    init_logging_from_config(bootstrap.logging.as_ref());

    let resolution = bootstrap.validated_resolution()?;
    let entries: Vec<ModuleId> = if args.entries.is_empty() {
        resolution.deps.clone()
    } else {
        args.entries.iter().map(|e| ModuleId::from(e.as_str())).collect()
    };
    if entries.is_empty() {
        bail!("no entry modules given and the configuration declares no deps");
    }

    let fetcher = build_fetcher(&args)?;
    let loader = BootstrapLoader::new(fetcher, Arc::new(DigestEvaluator));
    loader.configure(resolution)?;

    let plan = loader.plan(&entries)?;
    if args.plan {
        print_plan(&plan, args.json)?;
        return Ok(true);
    }

    let outcome = loader.request(&entries).await;

    let mut executed = Vec::new();
    for module in loader.registry().timeline().await {
        if let Some(value) = loader.registry().get(&module).await {
            executed.push(ExecutedModule {
                module,
                value: (*value).clone(),
            });
        }
    }
    let (failures, skipped) = match &outcome {
        Ok(()) => (Vec::new(), Vec::new()),
        Err(LoaderError::Incomplete { failures, skipped }) => (
            failures.iter().map(ToString::to_string).collect(),
            skipped.clone(),
        ),
        Err(e) => (vec![e.to_string()], Vec::new()),
    };
    let report = Report {
        executed,
        failures,
        skipped,
    };
    print_report(&report, args.json)?;

    Ok(outcome.is_ok())
}

fn build_fetcher(args: &Args) -> anyhow::Result<Arc<dyn ResourceFetcher>> {
    if let Some(ref root) = args.root {
        if !root.is_dir() {
            bail!("--root {} is not a directory", root.display());
        }
        return Ok(Arc::new(FsFetcher::new(root).with_mount(args.mount.clone())));
    }

    if let Some(ref origin) = args.origin {
        #[cfg(feature = "http")]
        {
            return Ok(Arc::new(module_bootstrap::HttpFetcher::new(origin.clone())?));
        }
        #[cfg(not(feature = "http"))]
        {
            bail!("--origin {} requires the `http` feature", origin);
        }
    }

    if args.plan {
        // Planning never fetches
        return Ok(Arc::new(StaticFetcher::new()));
    }
    bail!("either --root or --origin is required to load modules");
}

fn print_plan(plan: &LoadPlan, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    println!("Load plan ({} module(s)):", plan.len());
    for (index, step) in plan.steps.iter().enumerate() {
        let after = if step.prerequisites.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = step.prerequisites.iter().map(ModuleId::as_str).collect();
            format!("  (after {})", names.join(", "))
        };
        println!("  {}. {} -> {}{}", index + 1, step.module, step.location, after);
    }
    Ok(())
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for executed in &report.executed {
        let sha = executed.value["sha256"].as_str().unwrap_or("");
        println!(
            "✓ {} {} ({} bytes, sha256 {})",
            executed.module,
            executed.value["location"].as_str().unwrap_or("?"),
            executed.value["bytes"],
            &sha[..sha.len().min(12)]
        );
    }
    for failure in &report.failures {
        println!("✗ {}", failure);
    }
    for module in &report.skipped {
        println!("- {} not executed", module);
    }
    Ok(())
}
