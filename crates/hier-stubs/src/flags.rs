use std::fmt;

use serde::{Deserialize, Serialize};

/// Declaration flags of a class stub.
///
/// Bit positions follow the JVM class access flags so bytecode stub builders can
/// pass `access_flags` through unchanged. `RECORD` uses a bit the JVM leaves
/// unused for classes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassFlags(u16);

impl ClassFlags {
    pub const NONE: ClassFlags = ClassFlags(0);
    pub const PUBLIC: ClassFlags = ClassFlags(0x0001);
    pub const FINAL: ClassFlags = ClassFlags(0x0010);
    pub const RECORD: ClassFlags = ClassFlags(0x0100);
    pub const INTERFACE: ClassFlags = ClassFlags(0x0200);
    pub const ABSTRACT: ClassFlags = ClassFlags(0x0400);
    pub const ANNOTATION: ClassFlags = ClassFlags(0x2000);
    pub const ENUM: ClassFlags = ClassFlags(0x4000);

    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: ClassFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: ClassFlags) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    /// Annotation types carry both `ANNOTATION` and `INTERFACE` in bytecode; a
    /// source stub builder may set only `ANNOTATION`.
    pub fn is_annotation(self) -> bool {
        self.contains(Self::ANNOTATION)
    }

    pub fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }

    pub fn is_record(self) -> bool {
        self.contains(Self::RECORD)
    }
}

impl std::ops::BitOr for ClassFlags {
    type Output = ClassFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Debug for ClassFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ClassFlags, &str); 7] = [
            (ClassFlags::PUBLIC, "PUBLIC"),
            (ClassFlags::FINAL, "FINAL"),
            (ClassFlags::RECORD, "RECORD"),
            (ClassFlags::INTERFACE, "INTERFACE"),
            (ClassFlags::ABSTRACT, "ABSTRACT"),
            (ClassFlags::ANNOTATION, "ANNOTATION"),
            (ClassFlags::ENUM, "ENUM"),
        ];

        let mut first = true;
        f.write_str("ClassFlags(")?;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        let known = NAMES.iter().fold(0u16, |acc, (flag, _)| acc | flag.0);
        let unknown = self.0 & !known;
        if unknown != 0 {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "{unknown:#06x}")?;
        }
        f.write_str(")")
    }
}
