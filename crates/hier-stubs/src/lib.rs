//! Abstract stub model consumed by the hierarchy builder.
//!
//! Stub builders (source parsers, class file readers) produce one [`Unit`] per
//! file. Units may be persisted in the compact form implemented by [`codec`].

pub mod codec;
mod error;
mod flags;
mod unit;

pub use codec::{decode_unit, encode_unit, UnitCodec};
pub use error::{MalformedUnit, StubError};
pub use flags::ClassFlags;
pub use unit::{
    erase_type_arguments, is_dotted_path, is_identifier, ClassDecl, Decl, Import, MemberDecl,
    Unit, UnitKind,
};
