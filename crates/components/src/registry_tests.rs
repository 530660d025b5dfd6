use super::*;
use strata_core::{Criticality, RestartPolicy};

fn noop_def(name: &str, deps: Vec<&str>) -> ComponentDefinition {
    ComponentDefinition::new(
        name,
        ComponentKind::Persistent,
        Criticality::Degradable,
        RestartPolicy::Never,
        |_ctx| Box::pin(async { Ok(None) }),
    )
    .with_dependencies(deps.into_iter().map(ComponentName::new).collect())
}

#[test]
fn topological_order_respects_dependency_edges() {
    let mut registry = ComponentRegistry::new();
    registry.register(noop_def("c", vec!["b"]));
    registry.register(noop_def("b", vec!["a"]));
    registry.register(noop_def("a", vec![]));

    let order = registry.topological_order().unwrap();
    let pos = |n: &str| order.iter().position(|x| x.as_str() == n).unwrap();
    assert!(pos("a") < pos("b"));
    assert!(pos("b") < pos("c"));
}

#[test]
fn unregistered_dependency_is_a_graph_error() {
    let mut registry = ComponentRegistry::new();
    registry.register(noop_def("a", vec!["ghost"]));

    let err = registry.topological_order().unwrap_err();
    assert!(matches!(err, RuntimeError::Graph(msg) if msg.contains("ghost")));
}

#[test]
fn cycle_is_a_graph_error() {
    let mut registry = ComponentRegistry::new();
    registry.register(noop_def("a", vec!["b"]));
    registry.register(noop_def("b", vec!["a"]));

    let err = registry.topological_order().unwrap_err();
    assert!(matches!(err, RuntimeError::Graph(_)));
}

#[test]
fn register_overwrites_by_name() {
    let mut registry = ComponentRegistry::new();
    registry.register(noop_def("a", vec![]));
    registry.register(
        noop_def("a", vec![]).with_dependencies(vec![ComponentName::new("b")]),
    );
    registry.register(noop_def("b", vec![]));

    assert_eq!(registry.get(&ComponentName::new("a")).unwrap().dependencies.len(), 1);
}

#[test]
fn filter_by_kind_returns_only_matching_sorted_names() {
    let mut registry = ComponentRegistry::new();
    registry.register(noop_def("b", vec![]));
    registry.register(noop_def("a", vec![]));
    registry.register(
        ComponentDefinition::new(
            "job-one",
            ComponentKind::Job,
            Criticality::Degradable,
            RestartPolicy::Never,
            |_ctx| Box::pin(async { Ok(None) }),
        ),
    );

    let persistent = registry.filter_by_kind(ComponentKind::Persistent);
    assert_eq!(persistent, vec![ComponentName::new("a"), ComponentName::new("b")]);
}
