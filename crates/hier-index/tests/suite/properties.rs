use std::collections::HashSet;

use hier_core::Anchor;
use hier_index::SingleClassHierarchy;
use hier_stubs::{ClassDecl, Unit};
use proptest::prelude::*;

use super::fixture::{build, units};

/// Up to 12 classes `C0..Cn` in package `p`, each extending a random subset
/// (possibly including itself, or names that do not exist).
fn class_graphs() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..12).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0usize..n + 2, 0..3), n)
    })
}

fn units_for(graph: &[Vec<usize>]) -> Vec<Unit> {
    graph
        .iter()
        .enumerate()
        .map(|(index, supers)| {
            let mut decl = ClassDecl::new(0, format!("C{index}"));
            for sup in supers {
                decl = decl.extends(format!("C{sup}"));
            }
            Unit::source("p").with_class(decl)
        })
        .collect()
}

fn anchors(hierarchy: &SingleClassHierarchy) -> impl Iterator<Item = Anchor> {
    (0..hierarchy.class_count() as u32).map(Anchor::from_raw)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn subtype_rows_invert_supertype_rows(graph in class_graphs()) {
        let hierarchy = build(&units(Vec::new(), units_for(&graph)));

        let mut edges = 0;
        for anchor in anchors(&hierarchy) {
            for &sup in hierarchy.direct_supertypes(anchor) {
                prop_assert!(hierarchy.direct_subtypes(sup).contains(&anchor));
            }
            for &sub in hierarchy.direct_subtypes(anchor) {
                prop_assert!(hierarchy.direct_supertypes(sub).contains(&anchor));
            }
            edges += hierarchy.direct_subtypes(anchor).len();
            if hierarchy.is_incomplete(anchor) {
                prop_assert!(hierarchy.direct_supertypes(anchor).is_empty());
            }
        }
        prop_assert_eq!(edges, hierarchy.edge_count());
    }

    #[test]
    fn no_class_is_its_own_subtype(graph in class_graphs()) {
        let hierarchy = build(&units(Vec::new(), units_for(&graph)));
        for anchor in anchors(&hierarchy) {
            prop_assert!(!hierarchy.transitive_subtypes(anchor).contains(&anchor));

            // Walk supertypes too; the relation must be acyclic.
            let mut stack = hierarchy.direct_supertypes(anchor).to_vec();
            let mut seen = HashSet::new();
            while let Some(next) = stack.pop() {
                prop_assert_ne!(next, anchor);
                if seen.insert(next) {
                    stack.extend_from_slice(hierarchy.direct_supertypes(next));
                }
            }
        }
    }

    #[test]
    fn builds_are_deterministic(graph in class_graphs()) {
        let provider = units(Vec::new(), units_for(&graph));
        let first = build(&provider);
        let second = build(&provider);

        prop_assert_eq!(first.class_count(), second.class_count());
        for anchor in anchors(&first) {
            prop_assert_eq!(first.direct_subtypes(anchor), second.direct_subtypes(anchor));
            prop_assert_eq!(first.is_incomplete(anchor), second.is_incomplete(anchor));
            prop_assert_eq!(first.declaration(anchor), second.declaration(anchor));
        }
    }
}
