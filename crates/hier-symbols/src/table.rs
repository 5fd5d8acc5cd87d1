use std::collections::HashMap;
use std::ops::Range;

use hier_core::{Anchor, FileId, NameInterner, QNameId, ShortName, StubId};
use hier_stubs::ClassFlags;

use crate::compact::Compact;
use crate::symbol::{
    ClassSymbol, ConnectState, ConnectStatus, MemberId, MemberSymbol, Owner, PackageId,
    PackageSymbol, RawName, UnitInfo, UnitInfoId,
};
use crate::well_known::WellKnown;

/// Owns every symbol of one hierarchy build.
///
/// Classes live in a single arena indexed by [`Anchor`]; ownership and
/// supertype edges are anchors into the same arena. The originating
/// declaration of each class is kept in the parallel `files`/`stubs` arrays.
#[derive(Debug)]
pub struct SymbolTable {
    names: NameInterner,
    well_known: WellKnown,

    packages: Vec<PackageSymbol>,
    package_by_name: HashMap<QNameId, PackageId>,

    classes: Vec<ClassSymbol>,
    files: Vec<FileId>,
    stubs: Vec<StubId>,
    by_qname: HashMap<QNameId, Compact<Anchor>>,

    members: Vec<MemberSymbol>,

    unit_infos: Vec<UnitInfo>,
    unit_info_ids: HashMap<UnitInfo, UnitInfoId>,

    // Anchors below this index were handed out by `take_pending`.
    checkpoint: u32,
    finalized: bool,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_interner(NameInterner::new())
    }

    /// Build on top of an interner that already holds names, e.g. one that was
    /// pre-seeded by the caller. The interner belongs to this table from now on.
    pub fn with_interner(mut names: NameInterner) -> Self {
        let well_known = WellKnown::new(&mut names);
        let mut package_by_name = HashMap::new();
        package_by_name.insert(QNameId::ROOT, PackageId::ROOT);

        Self {
            names,
            well_known,
            packages: vec![PackageSymbol {
                qname: QNameId::ROOT,
                parent: None,
            }],
            package_by_name,
            classes: Vec::new(),
            files: Vec::new(),
            stubs: Vec::new(),
            by_qname: HashMap::new(),
            members: Vec::new(),
            unit_infos: Vec::new(),
            unit_info_ids: HashMap::new(),
            checkpoint: 0,
            finalized: false,
        }
    }

    pub fn names(&self) -> &NameInterner {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut NameInterner {
        &mut self.names
    }

    pub fn well_known(&self) -> &WellKnown {
        &self.well_known
    }

    /// Get or create the package named `qname`, creating its parents as needed.
    pub fn package_symbol(&mut self, qname: QNameId) -> PackageId {
        if let Some(&id) = self.package_by_name.get(&qname) {
            return id;
        }
        let parent = self.package_symbol(self.names.prefix(qname));
        let id = PackageId::new(self.packages.len());
        self.packages.push(PackageSymbol {
            qname,
            parent: Some(parent),
        });
        self.package_by_name.insert(qname, id);
        id
    }

    pub fn find_package(&self, qname: QNameId) -> Option<PackageId> {
        self.package_by_name.get(&qname).copied()
    }

    pub fn package(&self, id: PackageId) -> &PackageSymbol {
        &self.packages[id.index()]
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Share identical unit infos (most units have no imports at all).
    pub fn intern_unit_info(&mut self, info: UnitInfo) -> UnitInfoId {
        if let Some(&id) = self.unit_info_ids.get(&info) {
            return id;
        }
        let id = UnitInfoId::new(self.unit_infos.len());
        self.unit_infos.push(info.clone());
        self.unit_info_ids.insert(info, id);
        id
    }

    pub fn unit_info(&self, id: UnitInfoId) -> &UnitInfo {
        &self.unit_infos[id.index()]
    }

    pub fn unit_info_count(&self) -> usize {
        self.unit_infos.len()
    }

    /// Create a nameless container for classes declared inside a body.
    ///
    /// # Panics
    ///
    /// Panics if `owner` is a package: bodies only exist inside classes.
    pub fn add_member_container(&mut self, owner: Owner) -> MemberId {
        assert!(
            !matches!(owner, Owner::Package(_)),
            "member containers cannot be owned by packages"
        );
        let id = MemberId::new(self.members.len());
        self.members.push(MemberSymbol {
            owner,
            classes: Compact::Empty,
        });
        id
    }

    pub fn member(&self, id: MemberId) -> &MemberSymbol {
        &self.members[id.index()]
    }

    /// Allocate a new class symbol.
    ///
    /// The class is linked into its owner's member list and, when `qname` is
    /// not the root, registered under its qualified name. Several classes may
    /// share one qualified name; none of them is overwritten.
    #[allow(clippy::too_many_arguments)]
    pub fn enter_class(
        &mut self,
        file: FileId,
        stub: StubId,
        flags: ClassFlags,
        name: ShortName,
        owner: Owner,
        supers_raw: Compact<RawName>,
        qname: QNameId,
        unit: UnitInfoId,
    ) -> Anchor {
        let anchor = Anchor::from_raw(self.classes.len() as u32);
        self.classes.push(ClassSymbol {
            owner,
            name,
            qname,
            flags,
            unit,
            members: Compact::Empty,
            state: ConnectState::Unconnected(supers_raw),
            supers: Compact::Empty,
        });
        self.files.push(file);
        self.stubs.push(stub);

        match owner {
            Owner::Package(_) => {}
            Owner::Class(outer) => {
                let mut members = std::mem::take(&mut self.classes[outer.index()].members);
                let classes = &self.classes;
                members.insert_sorted_by_key(anchor, |a| classes[a.index()].name);
                self.classes[outer.index()].members = members;
            }
            Owner::Member(member) => {
                let classes = &self.classes;
                self.members[member.index()]
                    .classes
                    .insert_sorted_by_key(anchor, |a| classes[a.index()].name);
            }
        }

        if !qname.is_root() {
            self.by_qname.entry(qname).or_default().push(anchor);
        }
        anchor
    }

    /// All classes registered under exactly `qname`. Never resolves anything.
    pub fn lookup_by_qualified_name(&self, qname: QNameId) -> &[Anchor] {
        self.by_qname
            .get(&qname)
            .map(Compact::as_slice)
            .unwrap_or(&[])
    }

    /// Classes named `name` declared directly in `owner`.
    ///
    /// For packages this is a global lookup of `package.name` that never
    /// allocates a qualified name id.
    pub fn member_classes(&self, owner: Owner, name: ShortName) -> &[Anchor] {
        if name.is_empty() {
            return &[];
        }
        let by_name = |a: &Anchor| self.classes[a.index()].name;
        match owner {
            Owner::Package(pkg) => {
                let pkg = self.packages[pkg.index()].qname;
                match self.names.find_existing(pkg, name) {
                    Some(qname) => self.lookup_by_qualified_name(qname),
                    None => &[],
                }
            }
            Owner::Class(class) => self.classes[class.index()]
                .members
                .equal_range_by_key(&name, by_name),
            Owner::Member(member) => self.members[member.index()]
                .classes
                .equal_range_by_key(&name, by_name),
        }
    }

    pub fn class(&self, anchor: Anchor) -> &ClassSymbol {
        &self.classes[anchor.index()]
    }

    pub fn file(&self, anchor: Anchor) -> FileId {
        self.files[anchor.index()]
    }

    pub fn stub(&self, anchor: Anchor) -> StubId {
        self.stubs[anchor.index()]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn anchors(&self) -> impl ExactSizeIterator<Item = Anchor> {
        (0..self.classes.len() as u32).map(Anchor::from_raw)
    }

    /// The package a class ultimately belongs to.
    pub fn package_of(&self, anchor: Anchor) -> PackageId {
        let mut owner = self.classes[anchor.index()].owner;
        loop {
            owner = match owner {
                Owner::Package(pkg) => return pkg,
                Owner::Class(class) => self.classes[class.index()].owner,
                Owner::Member(member) => self.members[member.index()].owner,
            };
        }
    }

    /// Whether `anchor` is the universal root class: named like it and
    /// declared directly in its well-known package.
    pub fn is_universal_root(&self, anchor: Anchor) -> bool {
        let class = &self.classes[anchor.index()];
        class.name == self.well_known.object_name
            && matches!(class.owner, Owner::Package(pkg)
                if self.packages[pkg.index()].qname == self.well_known.java_lang)
    }

    /// Anchors entered since the previous call.
    pub fn take_pending(&mut self) -> Range<u32> {
        let start = self.checkpoint;
        self.checkpoint = self.classes.len() as u32;
        start..self.checkpoint
    }

    pub fn status(&self, anchor: Anchor) -> ConnectStatus {
        self.classes[anchor.index()].status()
    }

    /// Move an unconnected class into `Connecting`, handing out its raw
    /// supertype references. Returns `None` for any other state.
    pub fn start_connect(&mut self, anchor: Anchor) -> Option<Compact<RawName>> {
        let state = &mut self.classes[anchor.index()].state;
        match state {
            ConnectState::Unconnected(_) => {
                match std::mem::replace(state, ConnectState::Connecting) {
                    ConnectState::Unconnected(raw) => Some(raw),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Record the resolved supertypes of a `Connecting` class. `None` means a
    /// name did not resolve and marks the class incomplete right away.
    ///
    /// # Panics
    ///
    /// Panics if the class is not `Connecting`: every class is resolved at
    /// most once.
    pub fn finish_resolve(&mut self, anchor: Anchor, supers: Option<Compact<Anchor>>) {
        let class = &mut self.classes[anchor.index()];
        assert_eq!(
            class.status(),
            ConnectStatus::Connecting,
            "class {anchor} resolved twice"
        );
        match supers {
            Some(supers) => {
                class.supers = supers;
                class.state = ConnectState::Resolved;
            }
            None => {
                class.supers = Compact::Empty;
                class.state = ConnectState::Incomplete;
            }
        }
    }

    /// Finish a `Resolved` class once it is known whether it lies on a
    /// supertype cycle.
    ///
    /// # Panics
    ///
    /// Panics if the class is not `Resolved`.
    pub fn settle(&mut self, anchor: Anchor, on_cycle: bool) {
        let class = &mut self.classes[anchor.index()];
        assert_eq!(
            class.status(),
            ConnectStatus::Resolved,
            "class {anchor} settled before it was resolved"
        );
        class.state = if on_cycle {
            ConnectState::Incomplete
        } else {
            ConnectState::Connected
        };
    }

    /// Supertype edges of a connected class; empty in every other state.
    pub fn supertypes(&self, anchor: Anchor) -> &[Anchor] {
        let class = &self.classes[anchor.index()];
        match class.state {
            ConnectState::Connected => class.supers.as_slice(),
            _ => &[],
        }
    }

    /// Every supertype the class's names resolved to, cycles included.
    pub fn resolved_supertypes(&self, anchor: Anchor) -> &[Anchor] {
        self.classes[anchor.index()].supers.as_slice()
    }

    pub fn is_incomplete(&self, anchor: Anchor) -> bool {
        self.classes[anchor.index()].is_incomplete()
    }

    pub fn incomplete_count(&self) -> usize {
        self.classes.iter().filter(|c| c.is_incomplete()).count()
    }

    /// Dotted name of a class for diagnostics; anonymous and local classes are
    /// described by their enclosing class.
    pub fn display_name(&self, anchor: Anchor) -> String {
        let class = &self.classes[anchor.index()];
        if !class.qname.is_root() {
            return self.names.to_dotted(class.qname);
        }
        let mut owner = class.owner;
        let enclosing = loop {
            owner = match owner {
                Owner::Package(_) => break None,
                Owner::Class(outer) => break Some(outer),
                Owner::Member(member) => self.members[member.index()].owner,
            };
        };
        let local = if class.is_anonymous() {
            format!("<anonymous {anchor}>")
        } else {
            self.names.resolve(class.name).to_string()
        };
        match enclosing {
            Some(outer) => format!("{}${local}", self.display_name(outer)),
            None => local,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Seal the table once every unit is entered and connected.
    pub fn finalize(mut self) -> SymbolTable {
        let unconnected = self
            .classes
            .iter()
            .filter(|c| !matches!(c.state, ConnectState::Connected | ConnectState::Incomplete))
            .count();
        if unconnected > 0 {
            tracing::debug!(
                target = "hier.symbols",
                unconnected,
                "finalizing symbol table with unconnected classes"
            );
        }

        for class in &mut self.classes {
            if class.is_incomplete() {
                class.supers = Compact::Empty;
            }
        }
        self.classes.shrink_to_fit();
        self.files.shrink_to_fit();
        self.stubs.shrink_to_fit();
        self.members.shrink_to_fit();
        self.packages.shrink_to_fit();
        self.unit_info_ids = HashMap::new();
        self.checkpoint = self.classes.len() as u32;
        self.finalized = true;
        self
    }

    /// Consume the table, returning the interner so its names can be frozen.
    pub fn into_names(self) -> NameInterner {
        self.names
    }

    /// Approximate heap memory usage of the table in bytes.
    #[must_use]
    pub fn estimated_bytes(&self) -> u64 {
        use std::mem::size_of;

        let mut bytes = self.names.estimated_bytes();
        bytes = bytes.saturating_add(
            (self.classes.capacity() as u64).saturating_mul(size_of::<ClassSymbol>() as u64),
        );
        bytes = bytes.saturating_add(
            (self.files.capacity() as u64).saturating_mul(size_of::<FileId>() as u64),
        );
        bytes = bytes.saturating_add(
            (self.stubs.capacity() as u64).saturating_mul(size_of::<StubId>() as u64),
        );
        for class in &self.classes {
            if let Compact::Many(members) = &class.members {
                bytes = bytes.saturating_add((members.len() * size_of::<Anchor>()) as u64);
            }
            if let Compact::Many(supers) = &class.supers {
                bytes = bytes.saturating_add((supers.len() * size_of::<Anchor>()) as u64);
            }
        }
        bytes = bytes.saturating_add(
            (self.by_qname.capacity() as u64)
                .saturating_mul((size_of::<QNameId>() + size_of::<Compact<Anchor>>()) as u64),
        );
        bytes = bytes.saturating_add(
            (self.members.capacity() as u64).saturating_mul(size_of::<MemberSymbol>() as u64),
        );
        bytes = bytes.saturating_add(
            (self.packages.capacity() as u64).saturating_mul(size_of::<PackageSymbol>() as u64),
        );
        for info in &self.unit_infos {
            bytes = bytes.saturating_add(
                (info.imports.len() * size_of::<crate::symbol::ImportInfo>()) as u64,
            );
        }
        bytes
    }
}
