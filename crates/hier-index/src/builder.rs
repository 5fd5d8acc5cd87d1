use hier_core::{Anchor, QNameId};
use hier_symbols::SymbolTable;

use crate::hierarchy::SingleClassHierarchy;

/// Freeze a connected symbol table into a [`SingleClassHierarchy`].
///
/// Classes that were never connected contribute no edges.
pub fn build_hierarchy(table: SymbolTable) -> SingleClassHierarchy {
    let table = if table.is_finalized() {
        table
    } else {
        table.finalize()
    };
    let n = table.len();

    let mut super_starts = Vec::with_capacity(n + 1);
    let mut supertypes = Vec::new();
    let mut counts = vec![0u32; n];
    super_starts.push(0u32);
    for anchor in table.anchors() {
        for &sup in table.supertypes(anchor) {
            debug_assert_ne!(sup, anchor, "class {anchor} is its own supertype");
            counts[sup.index()] += 1;
            supertypes.push(sup);
        }
        super_starts.push(supertypes.len() as u32);
    }

    // Prefix sums give each supertype's run in the subtype array.
    let mut sub_starts = Vec::with_capacity(n + 1);
    sub_starts.push(0u32);
    for count in &counts {
        let last = sub_starts[sub_starts.len() - 1];
        sub_starts.push(last + count);
    }

    let mut fill = vec![0u32; n];
    let mut subtypes = vec![Anchor::from_raw(0); supertypes.len()];
    for anchor in table.anchors() {
        for &sup in table.supertypes(anchor) {
            let slot = sub_starts[sup.index()] + fill[sup.index()];
            subtypes[slot as usize] = anchor;
            fill[sup.index()] += 1;
        }
    }

    let files: Box<[_]> = table.anchors().map(|anchor| table.file(anchor)).collect();
    let stubs: Box<[_]> = table.anchors().map(|anchor| table.stub(anchor)).collect();
    let incomplete: Box<[_]> = table
        .anchors()
        .map(|anchor| table.is_incomplete(anchor))
        .collect();
    let qnames: Box<[QNameId]> = table.anchors().map(|anchor| table.class(anchor).qname).collect();

    let mut by_file: Vec<Anchor> = table.anchors().collect();
    by_file.sort_by_key(|&anchor| (files[anchor.index()], stubs[anchor.index()], anchor));

    let mut by_qname: Vec<(QNameId, Anchor)> = table
        .anchors()
        .filter(|&anchor| !qnames[anchor.index()].is_root())
        .map(|anchor| (qnames[anchor.index()], anchor))
        .collect();
    by_qname.sort_unstable();
    let (qname_keys, qname_anchors): (Vec<_>, Vec<_>) = by_qname.into_iter().unzip();

    let edges = supertypes.len();
    let incomplete_count = incomplete.iter().filter(|&&flag| flag).count();
    let names = table.into_names().freeze();

    tracing::debug!(
        target = "hier.index",
        classes = n,
        edges,
        incomplete = incomplete_count,
        "built subtype index"
    );

    SingleClassHierarchy {
        files,
        stubs,
        by_file: by_file.into_boxed_slice(),
        sub_starts: sub_starts.into_boxed_slice(),
        subtypes: subtypes.into_boxed_slice(),
        super_starts: super_starts.into_boxed_slice(),
        supertypes: supertypes.into_boxed_slice(),
        incomplete,
        qnames,
        qname_keys: qname_keys.into_boxed_slice(),
        qname_anchors: qname_anchors.into_boxed_slice(),
        names,
    }
}
