use hier_config::{BuildConfig, HierarchyConfig};
use hier_core::{CancellationToken, FileId};
use hier_index::{BuildError, HierarchyBuilder, StaticUnits, UnitEntry};
use hier_stubs::{encode_unit, ClassDecl, Unit};
use pretty_assertions::assert_eq;

use super::fixture::{class, init_logging, jdk, units};

#[test]
fn encoded_units_are_decoded_at_ingest() {
    init_logging();
    let provider = StaticUnits {
        sources: vec![
            UnitEntry::encoded(
                FileId::from_raw(0),
                encode_unit(&Unit::source("a").with_class(ClassDecl::new(0, "A"))).unwrap(),
            ),
            UnitEntry::decoded(
                FileId::from_raw(1),
                Unit::source("a").with_class(ClassDecl::new(0, "B").extends("A")),
            ),
        ],
        ..StaticUnits::default()
    };
    let hierarchy = HierarchyBuilder::default()
        .build(&provider, &CancellationToken::new())
        .unwrap();

    let a = class(&hierarchy, "a.A");
    let b = class(&hierarchy, "a.B");
    assert_eq!(hierarchy.direct_subtypes(a), &[b]);
}

#[test]
fn bad_units_are_skipped_and_counted() {
    init_logging();
    let provider = StaticUnits {
        sources: vec![
            UnitEntry::encoded(FileId::from_raw(0), b"not a unit".to_vec()),
            UnitEntry::decoded(
                FileId::from_raw(1),
                Unit::source("bad..package").with_class(ClassDecl::new(0, "X")),
            ),
            UnitEntry::decoded(
                FileId::from_raw(2),
                Unit::source("a").with_class(ClassDecl::new(0, "Ok")),
            ),
        ],
        ..StaticUnits::default()
    };
    let (hierarchy, stats) = HierarchyBuilder::default()
        .build_with_stats(&provider, &CancellationToken::new())
        .unwrap();

    assert_eq!(stats.units, 3);
    assert_eq!(stats.skipped_undecodable, 1);
    assert_eq!(stats.skipped_malformed, 1);
    assert_eq!(stats.classes, 1);
    assert_eq!(hierarchy.class_count(), 1);
    assert!(hierarchy.file_classes(FileId::from_raw(1)).is_empty());
}

#[test]
fn payload_limit_comes_from_config() {
    init_logging();
    let mut config = HierarchyConfig::default();
    config.codec.max_payload_bytes = 4;
    let provider = StaticUnits {
        sources: vec![UnitEntry::encoded(
            FileId::from_raw(0),
            encode_unit(&Unit::source("a").with_class(ClassDecl::new(0, "A"))).unwrap(),
        )],
        ..StaticUnits::default()
    };
    let (hierarchy, stats) = HierarchyBuilder::new(&config)
        .build_with_stats(&provider, &CancellationToken::new())
        .unwrap();
    assert_eq!(stats.skipped_undecodable, 1);
    assert_eq!(hierarchy.class_count(), 0);
}

#[test]
fn cancelled_build_returns_no_hierarchy() {
    let provider = units(jdk(), vec![Unit::source("a").with_class(ClassDecl::new(0, "A"))]);
    let token = CancellationToken::new();
    token.cancel();

    let builder = HierarchyBuilder::default().with_build_config(BuildConfig {
        cancel_check_interval: 1,
        connect_compiled_first: true,
    });
    let err = builder.build(&provider, &token).unwrap_err();
    assert!(matches!(err, BuildError::Cancelled(_)));
}

#[test]
fn compiled_classes_resolve_only_against_compiled_classes() {
    let compiled = vec![Unit::bytecode("lib").with_class(ClassDecl::new(0, "Plugin").extends("app.Api"))];
    let sources = vec![Unit::source("app").with_class(ClassDecl::new(0, "Api"))];

    let phased = super::fixture::build(&units(compiled.clone(), sources.clone()));
    let plugin = class(&phased, "lib.Plugin");
    assert!(phased.is_incomplete(plugin));

    // Entering everything before connecting lets the compiled class see sources.
    let single_pass = HierarchyBuilder::default()
        .with_build_config(BuildConfig {
            connect_compiled_first: false,
            ..BuildConfig::default()
        })
        .build(&units(compiled, sources), &CancellationToken::new())
        .unwrap();
    let plugin = class(&single_pass, "lib.Plugin");
    let api = class(&single_pass, "app.Api");
    assert_eq!(single_pass.direct_supertypes(plugin), &[api]);
}
