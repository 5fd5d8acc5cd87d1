use std::collections::{BTreeSet, VecDeque};

use hier_core::{Anchor, FileId, FrozenNames, QNameId, StubId};

/// Immutable subtype index over every class of one build.
///
/// Edges are stored twice in compressed sparse row form: `subtypes` is the
/// inverse of the resolved supertype relation, `supertypes` the relation
/// itself. Both runs are sorted by anchor.
#[derive(Debug)]
pub struct SingleClassHierarchy {
    pub(crate) files: Box<[FileId]>,
    pub(crate) stubs: Box<[StubId]>,
    /// All anchors sorted by `(file, stub)`.
    pub(crate) by_file: Box<[Anchor]>,

    pub(crate) sub_starts: Box<[u32]>,
    pub(crate) subtypes: Box<[Anchor]>,
    pub(crate) super_starts: Box<[u32]>,
    pub(crate) supertypes: Box<[Anchor]>,

    pub(crate) incomplete: Box<[bool]>,

    pub(crate) qnames: Box<[QNameId]>,
    /// Parallel columns sorted by `(qname, anchor)`. Classes without a
    /// qualified name are absent.
    pub(crate) qname_keys: Box<[QNameId]>,
    pub(crate) qname_anchors: Box<[Anchor]>,
    pub(crate) names: FrozenNames,
}

impl SingleClassHierarchy {
    pub fn class_count(&self) -> usize {
        self.files.len()
    }

    pub fn edge_count(&self) -> usize {
        self.supertypes.len()
    }

    /// Classes that directly extend or implement `anchor`.
    ///
    /// # Panics
    ///
    /// Panics if `anchor` does not belong to this hierarchy.
    pub fn direct_subtypes(&self, anchor: Anchor) -> &[Anchor] {
        csr_run(&self.sub_starts, &self.subtypes, anchor)
    }

    /// The resolved supertypes of `anchor`; empty for incomplete classes.
    ///
    /// # Panics
    ///
    /// Panics if `anchor` does not belong to this hierarchy.
    pub fn direct_supertypes(&self, anchor: Anchor) -> &[Anchor] {
        csr_run(&self.super_starts, &self.supertypes, anchor)
    }

    /// Every class reachable through subtype edges, excluding `anchor` itself.
    pub fn transitive_subtypes(&self, anchor: Anchor) -> BTreeSet<Anchor> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([anchor]);
        while let Some(next) = queue.pop_front() {
            for &sub in self.direct_subtypes(next) {
                if sub != anchor && seen.insert(sub) {
                    queue.push_back(sub);
                }
            }
        }
        seen
    }

    pub fn is_incomplete(&self, anchor: Anchor) -> bool {
        self.incomplete[anchor.index()]
    }

    pub fn incomplete_count(&self) -> usize {
        self.incomplete.iter().filter(|&&flag| flag).count()
    }

    /// The stub a class was entered from.
    pub fn declaration(&self, anchor: Anchor) -> (FileId, StubId) {
        (self.files[anchor.index()], self.stubs[anchor.index()])
    }

    /// All classes declared in `file`, ordered by stub id.
    pub fn file_classes(&self, file: FileId) -> &[Anchor] {
        let start = self
            .by_file
            .partition_point(|&anchor| self.files[anchor.index()] < file);
        let len = self.by_file[start..]
            .partition_point(|&anchor| self.files[anchor.index()] == file);
        &self.by_file[start..start + len]
    }

    pub fn anchor_for(&self, file: FileId, stub: StubId) -> Option<Anchor> {
        self.anchor_for_declaration(file, |anchor| self.stubs[anchor.index()] == stub)
    }

    /// The first class of `file` accepted by `matches`.
    pub fn anchor_for_declaration(
        &self,
        file: FileId,
        mut matches: impl FnMut(Anchor) -> bool,
    ) -> Option<Anchor> {
        self.file_classes(file)
            .iter()
            .copied()
            .find(|&anchor| matches(anchor))
    }

    /// Classes registered under the dotted name, e.g. `java.util.Map.Entry`.
    ///
    /// Several classes may share a name (for instance a source file and a
    /// stale class file).
    pub fn find_class(&self, dotted: &str) -> &[Anchor] {
        let Some(qname) = self.names.find_dotted(dotted) else {
            return &[];
        };
        let start = self.qname_keys.partition_point(|&q| q < qname);
        let len = self.qname_keys[start..].partition_point(|&q| q == qname);
        &self.qname_anchors[start..start + len]
    }

    /// Dotted qualified name of a class, or `None` for anonymous and local
    /// classes.
    pub fn qualified_name(&self, anchor: Anchor) -> Option<String> {
        let qname = self.qnames[anchor.index()];
        (!qname.is_root()).then(|| self.names.to_dotted(qname))
    }

    /// Approximate heap memory usage of the index in bytes.
    #[must_use]
    pub fn estimated_bytes(&self) -> u64 {
        use std::mem::size_of;

        let n = self.files.len() as u64;
        let mut bytes = 0u64;
        bytes = bytes.saturating_add(n.saturating_mul(
            (size_of::<FileId>()
                + size_of::<StubId>()
                + size_of::<Anchor>()
                + size_of::<bool>()
                + size_of::<QNameId>()) as u64,
        ));
        bytes = bytes.saturating_add(
            ((self.sub_starts.len() + self.super_starts.len()) as u64)
                .saturating_mul(size_of::<u32>() as u64),
        );
        bytes = bytes.saturating_add(
            ((self.subtypes.len() + self.supertypes.len()) as u64)
                .saturating_mul(size_of::<Anchor>() as u64),
        );
        bytes = bytes.saturating_add(
            (self.qname_keys.len() as u64)
                .saturating_mul((size_of::<QNameId>() + size_of::<Anchor>()) as u64),
        );
        bytes.saturating_add(self.names.estimated_bytes())
    }
}

fn csr_run<'a>(starts: &[u32], values: &'a [Anchor], anchor: Anchor) -> &'a [Anchor] {
    let index = anchor.index();
    let start = starts[index] as usize;
    let end = starts[index + 1] as usize;
    &values[start..end]
}
