use hier_stubs::{
    decode_unit, encode_unit, ClassDecl, ClassFlags, Decl, Import, MemberDecl, Unit, UnitKind,
};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 128;

fn arb_ident() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec!["a", "b", "util", "Foo", "Bar", "Entry", "$Proxy", "_x"])
            .prop_map(|s| s.to_string()),
        "[A-Za-z_][A-Za-z0-9_]{0,6}",
        // Non-ASCII identifiers must survive the round trip too.
        Just("Größe".to_string()),
    ]
}

fn arb_dotted() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_ident(), 1..4).prop_map(|parts| parts.join("."))
}

fn arb_kind() -> impl Strategy<Value = UnitKind> {
    prop_oneof![
        Just(UnitKind::Source),
        Just(UnitKind::Bytecode),
        Just(UnitKind::Other),
    ]
}

fn arb_flags() -> impl Strategy<Value = ClassFlags> {
    any::<u16>().prop_map(ClassFlags::from_bits)
}

fn arb_import() -> impl Strategy<Value = Import> {
    (
        arb_dotted(),
        prop::option::of(arb_ident()),
        any::<bool>(),
        prop::option::of(arb_ident()),
    )
        .prop_map(|(qualifier, name, is_static, alias)| Import {
            qualifier,
            name,
            is_static,
            alias,
        })
}

fn arb_leaf_class() -> impl Strategy<Value = ClassDecl> {
    (
        any::<u32>(),
        arb_flags(),
        prop_oneof![3 => arb_ident(), 1 => Just(String::new())],
        prop::collection::vec(arb_dotted(), 0..3),
    )
        .prop_map(|(local_stub_id, flags, name, super_names)| ClassDecl {
            local_stub_id,
            flags,
            name,
            super_names,
            members: Vec::new(),
        })
}

fn arb_decl() -> impl Strategy<Value = Decl> {
    let leaf = arb_leaf_class().prop_map(Decl::Class);
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (arb_leaf_class(), prop::collection::vec(inner.clone(), 0..4)).prop_map(
                |(mut class, members)| {
                    class.members = members;
                    Decl::Class(class)
                }
            ),
            prop::collection::vec(inner, 0..4)
                .prop_map(|members| Decl::Member(MemberDecl { members })),
        ]
    })
}

fn arb_class() -> impl Strategy<Value = ClassDecl> {
    (arb_leaf_class(), prop::collection::vec(arb_decl(), 0..4)).prop_map(|(mut class, members)| {
        class.members = members;
        class
    })
}

fn arb_unit() -> impl Strategy<Value = Unit> {
    (
        prop_oneof![Just(String::new()), arb_dotted()],
        arb_kind(),
        prop::collection::vec(arb_import(), 0..5),
        prop::collection::vec(arb_class(), 0..5),
    )
        .prop_map(|(package_name, kind, imports, classes)| Unit {
            package_name,
            kind,
            imports,
            classes,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    // The codec is structural: it must preserve units exactly, whether or not
    // they would pass validation.
    #[test]
    fn decode_inverts_encode(unit in arb_unit()) {
        let bytes = encode_unit(&unit).unwrap();
        let decoded = decode_unit(&bytes).unwrap();
        prop_assert_eq!(decoded, unit);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut framed = b"HSTB\x01\x00\x00\x00".to_vec();
        framed.extend_from_slice(&bytes);
        let _ = decode_unit(&framed);
        let _ = decode_unit(&bytes);
    }
}

#[test]
fn representative_units_round_trip() {
    let units = [
        Unit::source(""),
        Unit::bytecode("java.lang")
            .with_class(ClassDecl::new(0, "Enum").with_flags(ClassFlags::ABSTRACT)),
        Unit::source("a")
            .with_import(Import::single("b.Foo").with_alias("F"))
            .with_import(Import::static_on_demand("c.Outer"))
            .with_class(
                ClassDecl::new(1, "A")
                    .extends("F")
                    .with_nested(ClassDecl::new(2, "Inner").extends("Outer.Nested"))
                    .with_body(
                        MemberDecl::new().with_class(ClassDecl::anonymous(3).extends("Runnable")),
                    ),
            ),
    ];

    for unit in units {
        let decoded = decode_unit(&encode_unit(&unit).unwrap()).unwrap();
        pretty_assertions::assert_eq!(decoded, unit);
    }
}
