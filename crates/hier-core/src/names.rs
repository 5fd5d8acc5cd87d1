//! Identifier and qualified-name interning.
//!
//! Qualified names are stored as a trie encoded in a hash map: every node is a
//! `(prefix, suffix)` pair packed into a single `u64` key. Memory is therefore
//! proportional to the number of distinct dotted paths observed, not to their
//! string lengths.

use std::collections::HashMap;
use std::fmt;

use lasso::{Key, Rodeo, RodeoReader, Spur};

/// A single interned identifier segment.
///
/// `ShortName::EMPTY` (id 0) stands for "no name": anonymous classes, on-demand
/// imports and absent aliases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShortName(u32);

impl ShortName {
    pub const EMPTY: ShortName = ShortName(0);

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn from_spur(spur: Spur) -> Self {
        // `Spur` is zero-based; shift by one to keep 0 reserved.
        ShortName(spur.into_usize() as u32 + 1)
    }

    fn to_spur(self) -> Option<Spur> {
        if self.is_empty() {
            return None;
        }
        Spur::try_from_usize(self.0 as usize - 1)
    }
}

/// An interned fully-qualified dotted path.
///
/// `QNameId::ROOT` (id 0) is the empty path, which doubles as the root package.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QNameId(u32);

impl QNameId {
    pub const ROOT: QNameId = QNameId(0);

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QNameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

#[inline]
fn pack(prefix: QNameId, suffix: ShortName) -> u64 {
    (u64::from(prefix.0) << 32) | u64::from(suffix.0)
}

/// Interns identifiers and qualified names for a single hierarchy build.
#[derive(Debug)]
pub struct NameInterner {
    identifiers: Rodeo<Spur>,
    qualified: HashMap<u64, QNameId>,
    // Indexed by `QNameId`; slot 0 is the root.
    nodes: Vec<(QNameId, ShortName)>,
}

impl Default for NameInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl NameInterner {
    pub fn new() -> Self {
        Self {
            identifiers: Rodeo::default(),
            qualified: HashMap::new(),
            nodes: vec![(QNameId::ROOT, ShortName::EMPTY)],
        }
    }

    /// Intern a single identifier. The empty string maps to [`ShortName::EMPTY`].
    pub fn identifier(&mut self, text: &str) -> ShortName {
        if text.is_empty() {
            return ShortName::EMPTY;
        }
        ShortName::from_spur(self.identifiers.get_or_intern(text))
    }

    /// Look up an identifier without interning it.
    pub fn find_identifier(&self, text: &str) -> Option<ShortName> {
        if text.is_empty() {
            return Some(ShortName::EMPTY);
        }
        self.identifiers.get(text).map(ShortName::from_spur)
    }

    /// Text of an interned identifier.
    ///
    /// # Panics
    ///
    /// Panics if `name` was not produced by this interner.
    pub fn resolve(&self, name: ShortName) -> &str {
        match name.to_spur() {
            Some(spur) => self.identifiers.resolve(&spur),
            None => "",
        }
    }

    /// Returns the id of `prefix.suffix`, allocating it on first use.
    ///
    /// Qualifying with [`ShortName::EMPTY`] is the identity.
    pub fn qualify(&mut self, prefix: QNameId, suffix: ShortName) -> QNameId {
        if suffix.is_empty() {
            return prefix;
        }
        let key = pack(prefix, suffix);
        if let Some(&id) = self.qualified.get(&key) {
            return id;
        }
        let id = QNameId(self.nodes.len() as u32);
        self.nodes.push((prefix, suffix));
        self.qualified.insert(key, id);
        id
    }

    /// Non-allocating variant of [`NameInterner::qualify`].
    pub fn find_existing(&self, prefix: QNameId, suffix: ShortName) -> Option<QNameId> {
        if suffix.is_empty() {
            return Some(prefix);
        }
        self.qualified.get(&pack(prefix, suffix)).copied()
    }

    /// Intern a dotted path such as `java.util.Map.Entry`.
    ///
    /// Empty segments (`a..b`, leading or trailing dots) are skipped.
    pub fn from_dotted_string(&mut self, dotted: &str) -> QNameId {
        let mut id = QNameId::ROOT;
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            let short = self.identifier(segment);
            id = self.qualify(id, short);
        }
        id
    }

    /// Look up a dotted path without allocating any ids.
    pub fn find_dotted(&self, dotted: &str) -> Option<QNameId> {
        let mut id = QNameId::ROOT;
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            let short = self.find_identifier(segment)?;
            id = self.find_existing(id, short)?;
        }
        Some(id)
    }

    /// Intern a path already split into identifiers.
    pub fn qualify_all(&mut self, prefix: QNameId, segments: &[ShortName]) -> QNameId {
        segments
            .iter()
            .fold(prefix, |acc, &segment| self.qualify(acc, segment))
    }

    /// The id of everything but the last segment. The root is its own prefix.
    pub fn prefix(&self, id: QNameId) -> QNameId {
        self.nodes[id.index()].0
    }

    /// The last segment of `id`, or [`ShortName::EMPTY`] for the root.
    pub fn last_segment(&self, id: QNameId) -> ShortName {
        self.nodes[id.index()].1
    }

    /// All segments of `id` from the outermost inwards.
    pub fn segments(&self, id: QNameId) -> Vec<ShortName> {
        segments(&self.nodes, id)
    }

    pub fn to_dotted(&self, id: QNameId) -> String {
        to_dotted(&self.nodes, id, |s| self.resolve(s))
    }

    /// Number of qualified names allocated so far, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Approximate heap memory usage of this interner in bytes.
    #[must_use]
    pub fn estimated_bytes(&self) -> u64 {
        use std::mem::size_of;

        let mut bytes = 0u64;
        bytes = bytes.saturating_add(
            (self.nodes.capacity() as u64).saturating_mul(size_of::<(QNameId, ShortName)>() as u64),
        );
        bytes = bytes.saturating_add(
            (self.qualified.capacity() as u64)
                .saturating_mul((size_of::<u64>() + size_of::<QNameId>()) as u64),
        );
        for text in self.identifiers.strings() {
            bytes = bytes.saturating_add(text.len() as u64);
        }
        bytes
    }

    /// Convert into a read-only name table, dropping the allocation maps that
    /// only matter while names are still being interned.
    pub fn freeze(self) -> FrozenNames {
        FrozenNames {
            identifiers: self.identifiers.into_reader(),
            qualified: self.qualified,
            nodes: self.nodes.into_boxed_slice(),
        }
    }
}

/// Immutable, thread-safe view of a finished [`NameInterner`].
#[derive(Debug)]
pub struct FrozenNames {
    identifiers: RodeoReader<Spur>,
    qualified: HashMap<u64, QNameId>,
    nodes: Box<[(QNameId, ShortName)]>,
}

impl FrozenNames {
    pub fn resolve(&self, name: ShortName) -> &str {
        match name.to_spur() {
            Some(spur) => self.identifiers.resolve(&spur),
            None => "",
        }
    }

    pub fn find_dotted(&self, dotted: &str) -> Option<QNameId> {
        let mut id = QNameId::ROOT;
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            let short = ShortName::from_spur(self.identifiers.get(segment)?);
            id = *self.qualified.get(&pack(id, short))?;
        }
        Some(id)
    }

    pub fn prefix(&self, id: QNameId) -> QNameId {
        self.nodes[id.index()].0
    }

    pub fn last_segment(&self, id: QNameId) -> ShortName {
        self.nodes[id.index()].1
    }

    pub fn segments(&self, id: QNameId) -> Vec<ShortName> {
        segments(&self.nodes, id)
    }

    pub fn to_dotted(&self, id: QNameId) -> String {
        to_dotted(&self.nodes, id, |s| self.resolve(s))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Approximate heap memory usage in bytes.
    #[must_use]
    pub fn estimated_bytes(&self) -> u64 {
        use std::mem::size_of;

        let mut bytes = (self.nodes.len() as u64)
            .saturating_mul(size_of::<(QNameId, ShortName)>() as u64);
        bytes = bytes.saturating_add(
            (self.qualified.capacity() as u64)
                .saturating_mul((size_of::<u64>() + size_of::<QNameId>()) as u64),
        );
        for text in self.identifiers.strings() {
            bytes = bytes.saturating_add(text.len() as u64);
        }
        bytes
    }
}

fn segments(nodes: &[(QNameId, ShortName)], mut id: QNameId) -> Vec<ShortName> {
    let mut out = Vec::new();
    while !id.is_root() {
        let (prefix, last) = nodes[id.index()];
        out.push(last);
        id = prefix;
    }
    out.reverse();
    out
}

fn to_dotted<'a>(
    nodes: &[(QNameId, ShortName)],
    id: QNameId,
    resolve: impl Fn(ShortName) -> &'a str,
) -> String {
    let mut out = String::new();
    for (idx, segment) in segments(nodes, id).into_iter().enumerate() {
        if idx > 0 {
            out.push('.');
        }
        out.push_str(resolve(segment));
    }
    out
}
