use std::collections::HashSet;

use hier_core::{Anchor, QNameId, ShortName};
use hier_stubs::UnitKind;
use hier_symbols::{ConnectStatus, ImportInfo, Owner, PackageId, SymbolTable, UnitInfoId};

use crate::connector::{non_empty, HierarchyConnector, Incomplete, MAX_RESOLVE_DEPTH};

/// Where a class's supertype names are looked up.
pub(crate) struct Scope {
    /// Lookup starts at the declaring owner, not at the class itself.
    start: Owner,
    package: PackageId,
    pub(crate) kind: UnitKind,
    unit: UnitInfoId,
}

impl Scope {
    pub(crate) fn of(table: &SymbolTable, anchor: Anchor) -> Self {
        let class = table.class(anchor);
        Self {
            start: class.owner,
            package: table.package_of(anchor),
            kind: table.unit_info(class.unit).kind,
            unit: class.unit,
        }
    }

    /// The unit's own imports followed by the default imports of its kind.
    fn import(&self, table: &SymbolTable, index: usize) -> Option<ImportInfo> {
        let own = &table.unit_info(self.unit).imports;
        match own.get(index) {
            Some(import) => Some(*import),
            None => table
                .well_known()
                .default_imports(self.kind)
                .get(index - own.len())
                .copied(),
        }
    }
}

/// Result of resolving the qualifier of a dotted name.
enum Prefix {
    Classes(Vec<Anchor>),
    Package(QNameId),
}

impl HierarchyConnector<'_> {
    /// Look up a simple class name. The innermost scope with any match wins;
    /// all matches within that scope are kept.
    pub(crate) fn lookup_simple(&mut self, scope: &Scope, name: ShortName) -> Vec<Anchor> {
        let mut owner = scope.start;
        loop {
            owner = match owner {
                Owner::Package(_) => break,
                Owner::Member(member) => {
                    let found = self.table.member_classes(Owner::Member(member), name);
                    if !found.is_empty() {
                        return found.to_vec();
                    }
                    self.table.member(member).owner
                }
                Owner::Class(class) => {
                    let found = self.member_classes(class, name);
                    if !found.is_empty() {
                        return found;
                    }
                    self.table.class(class).owner
                }
            };
        }

        let explicit = self.single_imports(scope, name);
        if !explicit.is_empty() {
            return explicit;
        }

        let same_package = self.table.member_classes(Owner::Package(scope.package), name);
        if !same_package.is_empty() {
            return same_package.to_vec();
        }

        self.on_demand_imports(scope, name)
    }

    fn single_imports(&mut self, scope: &Scope, name: ShortName) -> Vec<Anchor> {
        let mut found = Vec::new();
        let mut index = 0;
        while let Some(import) = scope.import(self.table, index) {
            index += 1;
            if import.visible_name() != Some(name) {
                continue;
            }
            // Static imports name a member of a class; plain imports may too.
            let direct = if import.is_static {
                &[][..]
            } else {
                match self.table.names().find_existing(import.qualifier, import.name) {
                    Some(qname) => self.table.lookup_by_qualified_name(qname),
                    None => &[],
                }
            };
            if !direct.is_empty() {
                extend_unique(&mut found, direct.to_vec());
                continue;
            }
            let owners = self.table.lookup_by_qualified_name(import.qualifier).to_vec();
            for owner in owners {
                let members = self.member_classes(owner, import.name);
                extend_unique(&mut found, members);
            }
        }
        found
    }

    fn on_demand_imports(&mut self, scope: &Scope, name: ShortName) -> Vec<Anchor> {
        let mut found = Vec::new();
        let mut index = 0;
        while let Some(import) = scope.import(self.table, index) {
            index += 1;
            if !import.is_on_demand() {
                continue;
            }
            if !import.is_static {
                if let Some(package) = self.table.find_package(import.qualifier) {
                    let classes = self.table.member_classes(Owner::Package(package), name);
                    extend_unique(&mut found, classes.to_vec());
                }
            }
            let owners = self.table.lookup_by_qualified_name(import.qualifier).to_vec();
            for owner in owners {
                let members = self.member_classes(owner, name);
                extend_unique(&mut found, members);
            }
        }
        found
    }

    /// Member classes named `name` declared in `class` or inherited from its
    /// supertypes. A declared member hides inherited ones.
    pub(crate) fn member_classes(&mut self, class: Anchor, name: ShortName) -> Vec<Anchor> {
        let mut visited = HashSet::new();
        let mut found = Vec::new();
        let mut pending = vec![class];
        while let Some(next) = pending.pop() {
            if !visited.insert(next) {
                continue;
            }
            let declared = self.table.member_classes(Owner::Class(next), name);
            if !declared.is_empty() {
                extend_unique(&mut found, declared.to_vec());
                continue;
            }
            if self.resolve_for_lookup(next) {
                let supers = self.table.resolved_supertypes(next);
                pending.extend(supers.iter().rev().copied());
            }
        }
        found
    }

    /// Whether the supertypes of `class` can be searched for inherited
    /// members. A class still being resolved only offers what it declares.
    fn resolve_for_lookup(&mut self, class: Anchor) -> bool {
        if self.table.status(class) == ConnectStatus::Unconnected
            && self.resolve_depth() >= MAX_RESOLVE_DEPTH
        {
            tracing::trace!(
                target = "hier.resolve",
                class = %self.table.display_name(class),
                "member lookup nested too deeply"
            );
            return false;
        }
        !matches!(
            self.resolve(class),
            ConnectStatus::Unconnected | ConnectStatus::Connecting
        )
    }

    /// Resolve `Outer.Inner` or `pkg.Class` shaped references.
    pub(crate) fn resolve_path(
        &mut self,
        scope: &Scope,
        segments: &[ShortName],
    ) -> Result<Vec<Anchor>, Incomplete> {
        let Some((&last, prefix)) = segments.split_last() else {
            return Err(Incomplete);
        };
        if prefix.is_empty() {
            return non_empty(self.lookup_simple(scope, last));
        }
        match self.resolve_prefix(scope, prefix)? {
            Prefix::Classes(owners) => non_empty(self.select_members(&owners, last)),
            Prefix::Package(package) => non_empty(self.top_level_class(package, last)),
        }
    }

    fn resolve_prefix(&mut self, scope: &Scope, segments: &[ShortName]) -> Result<Prefix, Incomplete> {
        let Some((&last, prefix)) = segments.split_last() else {
            return Err(Incomplete);
        };
        if prefix.is_empty() {
            let classes = self.lookup_simple(scope, last);
            if !classes.is_empty() {
                return Ok(Prefix::Classes(classes));
            }
            return self.subpackage(QNameId::ROOT, last);
        }

        match self.resolve_prefix(scope, prefix)? {
            Prefix::Classes(owners) => {
                let members = self.select_members(&owners, last);
                non_empty(members).map(Prefix::Classes)
            }
            Prefix::Package(package) => {
                let classes = self.top_level_class(package, last);
                if !classes.is_empty() {
                    return Ok(Prefix::Classes(classes));
                }
                self.subpackage(package, last)
            }
        }
    }

    fn subpackage(&self, parent: QNameId, name: ShortName) -> Result<Prefix, Incomplete> {
        self.table
            .names()
            .find_existing(parent, name)
            .filter(|&qname| self.table.find_package(qname).is_some())
            .map(Prefix::Package)
            .ok_or(Incomplete)
    }

    fn top_level_class(&self, package: QNameId, name: ShortName) -> Vec<Anchor> {
        match self.table.find_package(package) {
            Some(package) => self
                .table
                .member_classes(Owner::Package(package), name)
                .to_vec(),
            None => Vec::new(),
        }
    }

    fn select_members(&mut self, owners: &[Anchor], name: ShortName) -> Vec<Anchor> {
        let mut found = Vec::new();
        for &owner in owners {
            let members = self.member_classes(owner, name);
            extend_unique(&mut found, members);
        }
        found
    }
}

fn extend_unique(found: &mut Vec<Anchor>, candidates: Vec<Anchor>) {
    for candidate in candidates {
        if !found.contains(&candidate) {
            found.push(candidate);
        }
    }
}
