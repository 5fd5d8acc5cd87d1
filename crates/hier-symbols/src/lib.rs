//! Symbol arena for the class hierarchy index.
//!
//! [`UnitLoader`] turns stub units into class symbols with unresolved supertype
//! references; resolution happens later, on demand, in `hier-resolve`.

mod compact;
mod enter;
mod symbol;
mod table;
mod well_known;

pub use compact::Compact;
pub use enter::{EnterSummary, UnitLoader};
pub use symbol::{
    ClassSymbol, ConnectState, ConnectStatus, ImportInfo, MemberId, MemberSymbol, Owner,
    PackageId, PackageSymbol, RawName, UnitInfo, UnitInfoId,
};
pub use table::SymbolTable;
pub use well_known::WellKnown;
