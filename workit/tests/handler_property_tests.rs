// Property-based tests for handler identity and decoration

use metrics_exporter_prometheus::PrometheusBuilder;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use workit::handler::{name, Proxy};
use workit::{Ensure, FnHandler, Registry, RegistryConfig, Unwrap};

fn handler(typ: &str) -> Arc<dyn Ensure> {
    let typ: &'static str = Box::leak(typ.to_string().into_boxed_str());
    FnHandler::arc(typ, Duration::ZERO, || async { Ok::<_, anyhow::Error>(()) })
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

// For any type path `p::q::T`, the identity is the module segment `q`
// directly enclosing the type, with generic arguments ignored.
mod identity_is_enclosing_module {
    use super::*;

    proptest! {
        #[test]
        fn test_identity_of_path(
            path in prop::collection::vec(segment(), 1..5),
            typ in "[A-Z][A-Za-z0-9]{0,11}",
            arg in prop::option::of(segment()),
        ) {
            let mut full = format!("{}::{}", path.join("::"), typ);
            if let Some(arg) = arg {
                full = format!("{full}<{arg}::{typ}>");
            }

            prop_assert_eq!(name(handler(&full).as_ref()), path[path.len() - 1].clone());
        }
    }
}

// For any chain of adapters around a leaf, unwrapping terminates at the leaf
// and the resolved identity equals the leaf identity.
mod unwrap_terminates_at_leaf {
    use super::*;

    proptest! {
        #[test]
        fn test_unwrap_chain(depth in 1usize..8, module in segment()) {
            let leaf = handler(&format!("app::{module}::Handler"));

            let mut han: Arc<dyn Ensure> = Arc::clone(&leaf);
            for _ in 0..depth {
                han = Arc::new(Proxy::new(han));
            }

            let unw = Proxy::new(han).unwrap();

            prop_assert!(Arc::ptr_eq(&unw, &leaf));
            prop_assert_eq!(name(unw.as_ref()), module);
        }

        #[test]
        fn test_registry_chain(depth in 0usize..4, module in segment()) {
            let reg = Registry::new(RegistryConfig {
                env: "testing".to_string(),
                meter: Some(Arc::new(PrometheusBuilder::new().build_recorder())),
                ..Default::default()
            });

            let leaf = handler(&format!("app::{module}::Handler"));

            let mut han: Arc<dyn Ensure> = Arc::clone(&leaf);
            for _ in 0..depth {
                han = Arc::new(Proxy::new(han));
            }

            let met = reg.decorate(han);

            prop_assert_eq!(met.name(), module.as_str());
            prop_assert!(Arc::ptr_eq(&met.unwrap(), &leaf));
        }
    }
}
