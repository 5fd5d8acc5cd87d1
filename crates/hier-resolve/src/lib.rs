//! Lazy supertype resolution.
//!
//! Classes are connected on demand: resolving one class may resolve the
//! supertypes of the classes enclosing it (to see inherited member classes) and
//! of its own supertypes (to detect cycles). Every class is connected at most
//! once.

mod connector;
mod scope;

pub use connector::{ConnectStats, HierarchyConnector, Incomplete};
