#![no_main]
use libfuzzer_sys::fuzz_target;
use module_bootstrap::module::registry::{ModuleResolver, ShimGraph};
use module_bootstrap::module::LoadPlan;
use module_bootstrap::ResolutionConfig;

fuzz_target!(|data: &[u8]| {
    // Arbitrary loader configuration: parse, validate, then plan the configured deps.
    // Nothing here may panic; malformed input must surface as an error.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let config = match ResolutionConfig::from_json_str(text) {
        Ok(config) => config,
        Err(_) => match ResolutionConfig::from_toml_str(text) {
            Ok(config) => config,
            Err(_) => return,
        },
    };

    if config.validate().is_err() {
        return;
    }

    // Validated configs have an acyclic shim graph
    let graph = ShimGraph::from_config(&config.shim);
    let resolver = ModuleResolver::new(&config);
    if let Ok(plan) = LoadPlan::build(&resolver, &graph, &config.deps) {
        for step in &plan.steps {
            for dep in &step.prerequisites {
                assert!(plan.get(dep).is_some());
            }
        }
    }
});
