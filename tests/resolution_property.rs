//! Property tests for identifier resolution and load ordering

use module_bootstrap::module::registry::{ModuleResolver, ResolutionSource, ShimGraph};
use module_bootstrap::module::ModuleId;
use module_bootstrap::ResolutionConfig;
use proptest::prelude::*;
use std::collections::HashMap;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,8}(/[a-z][a-z0-9_.-]{0,8}){0,2}"
}

fn base_url() -> impl Strategy<Value = String> {
    "(/[a-z]{1,8}){1,3}/?"
}

proptest! {
    #[test]
    fn absent_from_paths_resolves_against_base(base in base_url(), id in identifier()) {
        let config = ResolutionConfig::new(base.clone());
        let resolver = ModuleResolver::new(&config);
        let resolution = resolver.resolve(&ModuleId::from(id.as_str())).unwrap();

        prop_assert_eq!(resolution.source, ResolutionSource::BasePath);
        prop_assert_eq!(
            resolution.location,
            format!("{}/{}.js", base.trim_end_matches('/'), id)
        );
    }

    #[test]
    fn present_in_paths_resolves_verbatim(
        base in base_url(),
        id in identifier(),
        target in "(/[a-z0-9._-]{1,10}){1,4}",
    ) {
        let config = ResolutionConfig::new(base).with_path(id.as_str(), target.clone());
        let resolver = ModuleResolver::new(&config);
        let resolution = resolver.resolve(&ModuleId::from(id.as_str())).unwrap();

        prop_assert_eq!(resolution.source, ResolutionSource::Override);
        prop_assert_eq!(resolution.location, target);
    }

    /// Edges only point from higher to lower indices, so every generated graph is acyclic
    #[test]
    fn prerequisites_always_precede_dependents(
        edges in prop::collection::vec((1usize..12, 0usize..12), 0..30),
        entries in prop::collection::vec(0usize..12, 1..5),
    ) {
        let name = |i: usize| format!("m{}", i);
        let mut config = ResolutionConfig::new("/x");
        let mut deps: HashMap<usize, Vec<usize>> = HashMap::new();
        for (from, to) in edges {
            let to = to % from;
            let list = deps.entry(from).or_default();
            if !list.contains(&to) {
                list.push(to);
            }
        }
        for (from, list) in &deps {
            config = config.with_shim(name(*from), list.iter().map(|d| name(*d)));
        }
        config.validate().unwrap();

        let graph = ShimGraph::from_config(&config.shim);
        let entry_ids: Vec<ModuleId> = entries.iter().map(|e| ModuleId::from(name(*e))).collect();
        let order = graph.load_order(&entry_ids).unwrap();

        let position: HashMap<&ModuleId, usize> =
            order.iter().enumerate().map(|(i, m)| (m, i)).collect();
        prop_assert_eq!(position.len(), order.len());

        for entry in &entry_ids {
            prop_assert!(position.contains_key(entry));
        }
        for module in &order {
            for dep in graph.prerequisites(module) {
                prop_assert!(position[dep] < position[module]);
            }
        }
    }
}
