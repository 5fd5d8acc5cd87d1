use hier_core::{Anchor, QNameId, ShortName};
use hier_stubs::{ClassFlags, UnitKind};

use crate::compact::Compact;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageId(u32);

impl PackageId {
    pub const ROOT: PackageId = PackageId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(u32);

impl MemberId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitInfoId(u32);

impl UnitInfoId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The symbol that declares a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Package(PackageId),
    Class(Anchor),
    Member(MemberId),
}

/// A supertype reference exactly as it appeared in the stub.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawName {
    /// Fully qualified and already interned (compiled classes, synthetic supertypes).
    Interned(QNameId),
    /// A simple name, resolved through the enclosing scopes and imports.
    Single(ShortName),
    /// A dotted name whose prefix must be resolved in context (`Outer.Inner`).
    Path(Box<[ShortName]>),
}

/// Per-class connection progress.
///
/// `Unconnected -> Connecting -> Resolved -> Connected | Incomplete`, where a
/// class whose names fail to resolve goes from `Connecting` straight to
/// `Incomplete`. `Resolved` classes have their supertypes but have not been
/// checked for cycles yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectState {
    Unconnected(Compact<RawName>),
    Connecting,
    Resolved,
    Connected,
    Incomplete,
}

/// Payload-free view of [`ConnectState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectStatus {
    Unconnected,
    Connecting,
    Resolved,
    Connected,
    Incomplete,
}

impl ConnectState {
    pub fn status(&self) -> ConnectStatus {
        match self {
            ConnectState::Unconnected(_) => ConnectStatus::Unconnected,
            ConnectState::Connecting => ConnectStatus::Connecting,
            ConnectState::Resolved => ConnectStatus::Resolved,
            ConnectState::Connected => ConnectStatus::Connected,
            ConnectState::Incomplete => ConnectStatus::Incomplete,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageSymbol {
    pub qname: QNameId,
    pub parent: Option<PackageId>,
}

/// A method, field or initializer body holding local and anonymous classes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSymbol {
    pub owner: Owner,
    /// Sorted by short name; anonymous classes (empty name) sort first.
    pub classes: Compact<Anchor>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSymbol {
    pub owner: Owner,
    pub name: ShortName,
    /// `QNameId::ROOT` for classes that cannot be referenced by a qualified name.
    pub qname: QNameId,
    pub flags: ClassFlags,
    pub unit: UnitInfoId,
    /// Named member classes, sorted by short name.
    pub members: Compact<Anchor>,
    pub state: ConnectState,
    /// Resolved supertypes. Classes on a supertype cycle keep theirs for
    /// member lookup, but only `Connected` classes report them as edges.
    pub supers: Compact<Anchor>,
}

impl ClassSymbol {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn status(&self) -> ConnectStatus {
        self.state.status()
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self.state, ConnectState::Incomplete)
    }
}

/// An import after interning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImportInfo {
    pub qualifier: QNameId,
    /// `ShortName::EMPTY` for on-demand (`*`) imports.
    pub name: ShortName,
    pub is_static: bool,
    /// `ShortName::EMPTY` when the import has no alias.
    pub alias: ShortName,
}

impl ImportInfo {
    pub fn on_demand(qualifier: QNameId) -> Self {
        Self {
            qualifier,
            name: ShortName::EMPTY,
            is_static: false,
            alias: ShortName::EMPTY,
        }
    }

    pub fn single(qualifier: QNameId, name: ShortName) -> Self {
        Self {
            name,
            ..Self::on_demand(qualifier)
        }
    }

    #[inline]
    pub fn is_on_demand(&self) -> bool {
        self.name.is_empty()
    }

    /// The simple name this import makes visible, if it is a single-name import.
    pub fn visible_name(&self) -> Option<ShortName> {
        if self.is_on_demand() {
            None
        } else if self.alias.is_empty() {
            Some(self.name)
        } else {
            Some(self.alias)
        }
    }
}

/// Per-unit resolution context shared by every class declared in the unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnitInfo {
    pub kind: UnitKind,
    pub imports: Box<[ImportInfo]>,
}

impl UnitInfo {
    pub fn new(kind: UnitKind, imports: Vec<ImportInfo>) -> Self {
        Self {
            kind,
            imports: imports.into_boxed_slice(),
        }
    }
}
