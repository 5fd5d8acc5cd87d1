use hier_core::{Anchor, CancellationToken};
use hier_resolve::{HierarchyConnector, Incomplete};
use hier_stubs::{ClassDecl, Unit};
use hier_symbols::ConnectStatus;
use pretty_assertions::assert_eq;

use super::fixture::{names, Fixture};

#[test]
fn compiled_classes_never_see_sources() {
    let mut fx = Fixture::new();
    fx.enter([
        Unit::bytecode("lib").with_class(ClassDecl::new(0, "Base")),
        Unit::bytecode("lib").with_class(ClassDecl::new(0, "Plugin").extends("app.Api")),
    ]);
    let compiled = fx.connect();
    assert_eq!(compiled.classes, 2);
    assert_eq!(compiled.incomplete, 1);

    fx.enter([
        Unit::source("app").with_class(ClassDecl::new(0, "Api")),
        Unit::source("app").with_class(ClassDecl::new(0, "Impl").extends("lib.Base")),
    ]);
    let sources = fx.connect();
    assert_eq!(sources.classes, 2);
    assert_eq!(sources.incomplete, 0);

    // The compiled class was connected before `app.Api` existed.
    assert_eq!(fx.supers("lib.Plugin"), None);
    assert_eq!(fx.supers("app.Impl"), names(&["lib.Base"]));
}

#[test]
fn every_pending_class_is_connected() {
    let mut fx = Fixture::new();
    fx.enter([Unit::source("a")
        .with_class(ClassDecl::new(0, "A"))
        .with_class(ClassDecl::new(1, "B").extends("Nope"))]);
    fx.connect();

    assert!(fx.table.anchors().all(|anchor| matches!(
        fx.table.status(anchor),
        ConnectStatus::Connected | ConnectStatus::Incomplete
    )));
    assert_eq!(fx.table.incomplete_count(), 1);
}

#[test]
fn resolve_supertypes_reports_incomplete_classes() {
    let mut fx = Fixture::new();
    fx.enter([Unit::source("a").with_class(ClassDecl::new(0, "B").extends("Nope"))]);

    let mut connector = HierarchyConnector::new(&mut fx.table);
    assert_eq!(connector.resolve_supertypes(Anchor::from_raw(0)), Err(Incomplete));
    // Already connected on demand; the pending pass only counts it.
    let stats = connector
        .connect_pending(&CancellationToken::new(), 1)
        .unwrap();
    assert_eq!(stats.incomplete, 1);
}
