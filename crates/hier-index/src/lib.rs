//! Subtype index over a project's classes.
//!
//! A build enters stub units, connects every class to its supertypes and
//! freezes the result into a [`SingleClassHierarchy`], an immutable CSR index
//! answering direct and transitive subtype queries.
//!
//! ```
//! use hier_core::{CancellationToken, FileId};
//! use hier_index::{HierarchyBuilder, StaticUnits, UnitEntry};
//! use hier_stubs::{ClassDecl, Unit};
//!
//! let units = StaticUnits {
//!     sources: vec![UnitEntry::decoded(
//!         FileId::from_raw(0),
//!         Unit::source("a")
//!             .with_class(ClassDecl::new(0, "A"))
//!             .with_class(ClassDecl::new(1, "B").extends("A")),
//!     )],
//!     ..StaticUnits::default()
//! };
//! let hierarchy = HierarchyBuilder::default()
//!     .build(&units, &CancellationToken::new())
//!     .unwrap();
//! let a = hierarchy.find_class("a.A")[0];
//! let b = hierarchy.find_class("a.B")[0];
//! assert_eq!(hierarchy.direct_subtypes(a), &[b]);
//! ```

mod builder;
mod hierarchy;
mod pipeline;
mod service;

pub use builder::build_hierarchy;
pub use hierarchy::SingleClassHierarchy;
pub use pipeline::{
    BuildError, BuildStats, HierarchyBuilder, IngestPhase, StaticUnits, UnitEntry, UnitPayload,
    UnitProvider,
};
pub use service::HierarchyService;
