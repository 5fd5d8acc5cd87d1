use hier_stubs::{ClassDecl, Import, MalformedUnit, MemberDecl, Unit, UnitKind};

#[test]
fn well_formed_unit_passes() {
    let unit = Unit::new(UnitKind::Other, "scripts")
        .with_import(Import::single("java.util.List").with_alias("L"))
        .with_import(Import::on_demand("groovy.transform"))
        .with_class(
            ClassDecl::new(0, "Script")
                .extends("groovy.lang.Script")
                .with_body(MemberDecl::new().with_body(
                    MemberDecl::new().with_class(ClassDecl::new(1, "Local").extends("L<String>")),
                )),
        );
    assert_eq!(unit.validate(), Ok(()));
    assert_eq!(unit.class_count(), 2);
}

#[test]
fn invalid_import_is_reported() {
    let unit = Unit::source("a").with_import(Import::on_demand("java..util"));
    assert_eq!(
        unit.validate(),
        Err(MalformedUnit::InvalidImport {
            import: "import java..util.*".to_string()
        })
    );
}

#[test]
fn top_level_classes_need_names() {
    let unit = Unit::source("a").with_class(ClassDecl::anonymous(7));
    assert_eq!(unit.validate(), Err(MalformedUnit::UnnamedClass { stub: 7 }));
}

#[test]
fn duplicate_stub_ids_are_found_in_nested_bodies() {
    let unit = Unit::source("a").with_class(
        ClassDecl::new(1, "A")
            .with_nested(ClassDecl::new(2, "B"))
            .with_body(MemberDecl::new().with_class(ClassDecl::anonymous(2))),
    );
    assert_eq!(unit.validate(), Err(MalformedUnit::DuplicateStubId { stub: 2 }));
}

#[test]
fn class_names_must_be_identifiers() {
    let unit = Unit::source("a").with_class(ClassDecl::new(1, "Not A Name"));
    assert!(matches!(
        unit.validate(),
        Err(MalformedUnit::InvalidClassName { stub: 1, .. })
    ));
}
