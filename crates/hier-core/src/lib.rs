//! Core shared types for the class hierarchy index.
//!
//! This crate is intentionally small: name interning, the dense ids used across
//! the workspace, and cooperative cancellation.

mod cancel;
mod ids;
mod names;

pub use cancel::{CancelCheck, Cancelled, CancellationToken};
pub use ids::{Anchor, FileId, StubId};
pub use names::{FrozenNames, NameInterner, QNameId, ShortName};
