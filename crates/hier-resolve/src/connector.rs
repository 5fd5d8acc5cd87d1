use std::collections::HashMap;
use std::ops::Range;

use hier_core::{Anchor, CancelCheck, CancellationToken, Cancelled, ShortName};
use hier_symbols::{Compact, ConnectStatus, RawName, SymbolTable};

use crate::scope::Scope;

/// Name resolutions nested deeper than this stop resolving further classes
/// for member lookups; those classes offer only their declared members.
pub(crate) const MAX_RESOLVE_DEPTH: usize = 256;

/// A class whose supertypes could not all be resolved, or that inherits from
/// itself. Such a class has no supertypes in the finished hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("incomplete class hierarchy")]
pub struct Incomplete;

/// Counters for one [`HierarchyConnector::connect_pending`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectStats {
    /// Classes in the pending range.
    pub classes: usize,
    /// Classes that ended up incomplete, including cyclic ones.
    pub incomplete: usize,
    /// Classes found on a supertype cycle.
    pub cyclic: usize,
}

/// Tarjan bookkeeping for one class during [`HierarchyConnector::settle`].
#[derive(Clone, Copy, Debug)]
struct Mark {
    index: u32,
    low: u32,
    on_stack: bool,
}

/// Connects classes of a [`SymbolTable`] to their supertypes.
///
/// Connecting a class happens in two steps. Its names are resolved first,
/// which may resolve other classes whose inherited members the lookup needs.
/// Then everything reachable through resolved supertypes is walked and each
/// strongly connected component is settled: components with a cycle become
/// incomplete, all others connected.
pub struct HierarchyConnector<'a> {
    pub(crate) table: &'a mut SymbolTable,
    /// Classes whose names are being resolved, innermost last.
    resolving: Vec<Anchor>,
    root_segments: Box<[ShortName]>,
    cyclic: usize,
}

impl<'a> HierarchyConnector<'a> {
    pub fn new(table: &'a mut SymbolTable) -> Self {
        let root = table.well_known().object;
        let root_segments = table.names().segments(root).into_boxed_slice();
        Self {
            table,
            resolving: Vec::new(),
            root_segments,
            cyclic: 0,
        }
    }

    pub fn table(&self) -> &SymbolTable {
        self.table
    }

    /// The resolved supertypes of `anchor`, connecting it first if needed.
    ///
    /// Repeated calls return the memoized outcome.
    pub fn resolve_supertypes(&mut self, anchor: Anchor) -> Result<&[Anchor], Incomplete> {
        match self.connect(anchor) {
            ConnectStatus::Connected => Ok(self.table.supertypes(anchor)),
            _ => Err(Incomplete),
        }
    }

    /// Connect every class entered since the previous call.
    ///
    /// A cancelled call may leave classes connected; the caller is expected to
    /// discard the table.
    pub fn connect_pending(
        &mut self,
        token: &CancellationToken,
        check_interval: u32,
    ) -> Result<ConnectStats, Cancelled> {
        let pending = self.table.take_pending();
        let mut check = CancelCheck::new(token, check_interval);
        self.connect_range(pending, &mut check)
    }

    fn connect_range(
        &mut self,
        range: Range<u32>,
        check: &mut CancelCheck<'_>,
    ) -> Result<ConnectStats, Cancelled> {
        let cyclic_before = self.cyclic;
        let mut stats = ConnectStats {
            classes: range.len(),
            ..ConnectStats::default()
        };

        for raw in range.clone() {
            check.tick()?;
            self.connect(Anchor::from_raw(raw));
        }
        check.check()?;

        stats.incomplete = range
            .map(Anchor::from_raw)
            .filter(|&anchor| self.table.is_incomplete(anchor))
            .count();
        stats.cyclic = self.cyclic - cyclic_before;

        tracing::debug!(
            target = "hier.resolve",
            classes = stats.classes,
            incomplete = stats.incomplete,
            cyclic = stats.cyclic,
            "connected pending classes"
        );
        Ok(stats)
    }

    /// Resolve `anchor` and settle it together with everything it inherits from.
    fn connect(&mut self, anchor: Anchor) -> ConnectStatus {
        debug_assert!(self.resolving.is_empty());
        if self.resolve(anchor) == ConnectStatus::Resolved {
            self.settle(anchor);
        }
        self.table.status(anchor)
    }

    /// Resolve the supertype names of `anchor` without following them.
    ///
    /// Returns `Connecting` for classes whose names are already being resolved
    /// further up.
    pub(crate) fn resolve(&mut self, anchor: Anchor) -> ConnectStatus {
        let Some(raw) = self.table.start_connect(anchor) else {
            return self.table.status(anchor);
        };
        self.resolving.push(anchor);
        let scope = Scope::of(self.table, anchor);
        let supers = self.resolve_all(&scope, &raw);
        self.resolving.pop();

        match supers {
            Ok(supers) => {
                self.table.finish_resolve(anchor, Some(Compact::from(supers)));
                ConnectStatus::Resolved
            }
            Err(Incomplete) => {
                tracing::trace!(
                    target = "hier.resolve",
                    class = %self.table.display_name(anchor),
                    "supertype name did not resolve"
                );
                self.table.finish_resolve(anchor, None);
                ConnectStatus::Incomplete
            }
        }
    }

    /// How many name resolutions are currently nested.
    pub(crate) fn resolve_depth(&self) -> usize {
        self.resolving.len()
    }

    /// Walk the resolved supertypes from `root` without recursion and settle
    /// every strongly connected component on the way.
    fn settle(&mut self, root: Anchor) {
        let mut marks: HashMap<Anchor, Mark> = HashMap::new();
        let mut component: Vec<Anchor> = Vec::new();
        let mut walk: Vec<(Anchor, usize)> = Vec::new();
        let mut next_index = 0u32;

        let mut open = |anchor: Anchor,
                        marks: &mut HashMap<Anchor, Mark>,
                        component: &mut Vec<Anchor>,
                        walk: &mut Vec<(Anchor, usize)>| {
            marks.insert(
                anchor,
                Mark {
                    index: next_index,
                    low: next_index,
                    on_stack: true,
                },
            );
            next_index += 1;
            component.push(anchor);
            walk.push((anchor, 0));
        };
        open(root, &mut marks, &mut component, &mut walk);

        while let Some(&(node, next)) = walk.last() {
            if let Some(&sup) = self.table.resolved_supertypes(node).get(next) {
                if let Some(top) = walk.last_mut() {
                    top.1 += 1;
                }
                // Settled classes are never part of an open component.
                if self.resolve(sup) != ConnectStatus::Resolved {
                    continue;
                }
                match marks.get(&sup).copied() {
                    None => open(sup, &mut marks, &mut component, &mut walk),
                    Some(mark) if mark.on_stack => {
                        if let Some(current) = marks.get_mut(&node) {
                            current.low = current.low.min(mark.index);
                        }
                    }
                    Some(_) => {}
                }
                continue;
            }

            walk.pop();
            let Some(mark) = marks.get(&node).copied() else {
                continue;
            };
            if let Some(&(parent, _)) = walk.last() {
                if let Some(parent) = marks.get_mut(&parent) {
                    parent.low = parent.low.min(mark.low);
                }
            }
            if mark.low != mark.index {
                continue;
            }

            let start = component
                .iter()
                .rposition(|&anchor| anchor == node)
                .unwrap_or(0);
            let members: Vec<Anchor> = component.drain(start..).collect();
            let on_cycle =
                members.len() > 1 || self.table.resolved_supertypes(node).contains(&node);
            if on_cycle {
                self.cyclic += members.len();
                tracing::trace!(
                    target = "hier.resolve",
                    class = %self.table.display_name(node),
                    classes = members.len(),
                    "supertype cycle"
                );
            }
            for member in members {
                if let Some(mark) = marks.get_mut(&member) {
                    mark.on_stack = false;
                }
                self.table.settle(member, on_cycle);
            }
        }
    }

    /// Resolve each raw reference; the first failure fails the whole class.
    fn resolve_all(
        &mut self,
        scope: &Scope,
        raw: &Compact<RawName>,
    ) -> Result<Vec<Anchor>, Incomplete> {
        let mut supers = Vec::with_capacity(raw.len());
        for name in raw {
            for candidate in self.resolve_raw(scope, name)? {
                if !self.table.is_universal_root(candidate) && !supers.contains(&candidate) {
                    supers.push(candidate);
                }
            }
        }
        Ok(supers)
    }

    fn resolve_raw(&mut self, scope: &Scope, name: &RawName) -> Result<Vec<Anchor>, Incomplete> {
        match name {
            RawName::Interned(qname) => {
                if *qname == self.table.well_known().object {
                    return Ok(Vec::new());
                }
                non_empty(self.table.lookup_by_qualified_name(*qname).to_vec())
            }
            RawName::Single(name) => {
                let found = self.lookup_simple(scope, *name);
                if found.is_empty()
                    && *name == self.table.well_known().object_name
                    && self.table.well_known().imports_java_lang(scope.kind)
                {
                    return Ok(Vec::new());
                }
                non_empty(found)
            }
            RawName::Path(segments) => {
                if *segments == self.root_segments {
                    return Ok(Vec::new());
                }
                self.resolve_path(scope, segments)
            }
        }
    }
}

pub(crate) fn non_empty(candidates: Vec<Anchor>) -> Result<Vec<Anchor>, Incomplete> {
    if candidates.is_empty() {
        Err(Incomplete)
    } else {
        Ok(candidates)
    }
}
