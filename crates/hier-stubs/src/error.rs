/// Errors produced while decoding a persisted unit blob.
#[derive(Debug, thiserror::Error)]
pub enum StubError {
    #[error("unit blob is truncated: expected at least {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("unit blob has invalid magic {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("incompatible unit schema version: expected {expected}, found {found}")]
    IncompatibleSchemaVersion { expected: u16, found: u16 },

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// A unit that violates the structural invariants the symbol loader relies on.
///
/// Malformed units are skipped at ingest; they never abort a hierarchy build.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedUnit {
    #[error("invalid package name `{package}`")]
    InvalidPackage { package: String },

    #[error("invalid import `{import}`")]
    InvalidImport { import: String },

    #[error("class stub {stub} has no name")]
    UnnamedClass { stub: u32 },

    #[error("class stub {stub} has invalid name `{name}`")]
    InvalidClassName { stub: u32, name: String },

    #[error("class stub {stub} has invalid super name `{name}`")]
    InvalidSuperName { stub: u32, name: String },

    #[error("stub id {stub} is used by more than one class")]
    DuplicateStubId { stub: u32 },
}
