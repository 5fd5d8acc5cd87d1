use hier_core::{NameInterner, QNameId};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 256;

fn arb_segment() -> impl Strategy<Value = String> {
    // A small alphabet keeps collisions between generated paths likely, which is
    // exactly what the interner has to get right.
    prop::sample::select(vec!["a", "b", "c", "java", "lang", "Object", "Foo", "Map", "Entry"])
        .prop_map(|s| s.to_string())
}

fn arb_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_segment(), 1..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn dotted_round_trip(path in arb_path()) {
        let mut names = NameInterner::new();
        let dotted = path.join(".");
        let id = names.from_dotted_string(&dotted);

        let segments: Vec<String> = names
            .segments(id)
            .into_iter()
            .map(|s| names.resolve(s).to_string())
            .collect();
        prop_assert_eq!(segments, path);
        prop_assert_eq!(names.to_dotted(id), dotted.clone());
        prop_assert_eq!(names.find_dotted(&dotted), Some(id));
    }

    #[test]
    fn equal_paths_have_equal_ids(paths in prop::collection::vec(arb_path(), 1..16)) {
        let mut names = NameInterner::new();
        let ids: Vec<QNameId> = paths
            .iter()
            .map(|p| names.from_dotted_string(&p.join(".")))
            .collect();

        for (i, a) in paths.iter().enumerate() {
            for (j, b) in paths.iter().enumerate() {
                prop_assert_eq!(a == b, ids[i] == ids[j]);
            }
        }
    }

    #[test]
    fn incremental_qualify_matches_dotted(path in arb_path()) {
        let mut names = NameInterner::new();
        let mut id = QNameId::ROOT;
        for segment in &path {
            let short = names.identifier(segment);
            id = names.qualify(id, short);
        }
        prop_assert_eq!(names.from_dotted_string(&path.join(".")), id);

        let frozen = names.freeze();
        prop_assert_eq!(frozen.find_dotted(&path.join(".")), Some(id));
    }
}
