//! # Workflows Module
//!
//! High-level entry points that tie the loading [`engine`](crate::engine) and the
//! [`core`](crate::core) model together.
//!
//! - **Load Workflow** ([`load`]) - Resolve a name, load it with progress reporting and
//!   optional cancellation, and return the finished structure.
//! - **Symmetry Workflow** ([`symmetry`]) - Place crystallographic, biological-unit or
//!   non-crystallographic copies of a structure's coordinates in space.

pub mod load;
pub mod symmetry;
