#![no_main]
use libfuzzer_sys::fuzz_target;
use module_bootstrap::module::registry::{ModuleResolver, ResolutionSource};
use module_bootstrap::module::ModuleId;
use module_bootstrap::ResolutionConfig;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let text = String::from_utf8_lossy(data);
    let (base, id) = text.split_once('\n').unwrap_or(("/crawl/static/scripts", &text));

    let config = ResolutionConfig::new(base);
    let resolver = ModuleResolver::new(&config);
    if let Ok(resolution) = resolver.resolve(&ModuleId::from(id)) {
        // Anything that resolves without an override lands under the base
        assert_eq!(resolution.source, ResolutionSource::BasePath);
        assert!(resolution.location.ends_with(".js"));
        assert!(resolution.location.starts_with(base.trim_end_matches('/')));
    }
});
