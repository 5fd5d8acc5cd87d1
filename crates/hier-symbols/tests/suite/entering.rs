use hier_core::{Anchor, FileId};
use hier_stubs::{ClassDecl, ClassFlags, Unit};
use hier_symbols::{ConnectStatus, Owner, SymbolTable, UnitLoader};
use pretty_assertions::assert_eq;

fn load(table: &mut SymbolTable, units: &[Unit]) {
    let mut loader = UnitLoader::new(table);
    for (file, unit) in units.iter().enumerate() {
        loader
            .enter_unit(unit, FileId::from_raw(file as u32))
            .expect("unit should be well formed");
    }
}

#[test]
fn same_qualified_name_from_two_files_keeps_both() {
    let mut table = SymbolTable::new();
    load(
        &mut table,
        &[
            Unit::bytecode("a").with_class(ClassDecl::new(0, "A")),
            Unit::source("a").with_class(ClassDecl::new(0, "A").extends("B")),
        ],
    );

    let qname = table.names().find_dotted("a.A").unwrap();
    let anchors = table.lookup_by_qualified_name(qname);
    assert_eq!(anchors, &[Anchor::from_raw(0), Anchor::from_raw(1)]);
    assert_eq!(table.file(anchors[1]), FileId::from_raw(1));

    let package = table.find_package(table.names().find_dotted("a").unwrap()).unwrap();
    let name = table.names().find_identifier("A").unwrap();
    assert_eq!(table.member_classes(Owner::Package(package), name), anchors);
}

#[test]
fn two_phase_checkpoints_split_compiled_and_source_anchors() {
    let mut table = SymbolTable::new();
    load(
        &mut table,
        &[Unit::bytecode("lib").with_class(ClassDecl::new(0, "Base"))],
    );
    assert_eq!(table.take_pending(), 0..1);

    load(
        &mut table,
        &[Unit::source("app")
            .with_class(ClassDecl::new(0, "Main").with_nested(ClassDecl::new(1, "Inner")))],
    );
    assert_eq!(table.take_pending(), 1..3);
    assert!(table
        .anchors()
        .all(|anchor| table.status(anchor) == ConnectStatus::Unconnected));
}

#[test]
fn default_package_classes_live_in_the_root_package() {
    let mut table = SymbolTable::new();
    load(
        &mut table,
        &[Unit::source("").with_class(ClassDecl::new(0, "Main"))],
    );
    let main = Anchor::from_raw(0);
    assert_eq!(table.package_of(main), hier_symbols::PackageId::ROOT);
    assert_eq!(table.display_name(main), "Main");
}

#[test]
fn universal_root_is_recognized_by_package_and_name() {
    let mut table = SymbolTable::new();
    load(
        &mut table,
        &[
            Unit::bytecode("java.lang").with_class(ClassDecl::new(0, "Object")),
            Unit::source("other").with_class(ClassDecl::new(0, "Object")),
            Unit::bytecode("java.lang")
                .with_class(ClassDecl::new(0, "Enum").with_flags(ClassFlags::ABSTRACT)),
        ],
    );
    assert!(table.is_universal_root(Anchor::from_raw(0)));
    assert!(!table.is_universal_root(Anchor::from_raw(1)));
    assert!(!table.is_universal_root(Anchor::from_raw(2)));
}

#[test]
fn finalize_seals_the_table() {
    let mut table = SymbolTable::new();
    load(
        &mut table,
        &[Unit::source("a").with_class(ClassDecl::new(0, "A"))],
    );
    let before = table.estimated_bytes();
    assert!(before > 0);

    let table = table.finalize();
    assert!(table.is_finalized());
    assert_eq!(table.len(), 1);
}
