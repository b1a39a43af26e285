//! # Core Models Module
//!
//! The typed molecular model produced by a structure load.
//!
//! ## Key Components
//!
//! - [`atom`] - One ATOM/HETATM record: identity, coordinates, occupancy and B-factor
//! - [`chain`] - Tagged chain grouping keys and the chain buckets built from them
//! - [`topology`] - Bonds between atoms and their orders
//! - [`structure`] - The immutable `Structure` container and the builder that assembles it
//! - [`filter`] - Component filters for iterating selected parts of a structure
//! - [`ids`] - Stable identifiers for atoms
//!
//! A `Structure` is assembled exactly once by a `StructureBuilder` and is read-only
//! afterwards; rendering and analysis code consume it through component counts,
//! indexed lookup by [`structure::ComponentType`], and the entity name map.

pub mod atom;
pub mod chain;
pub mod filter;
pub mod ids;
pub mod structure;
pub mod topology;
