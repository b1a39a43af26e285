//! # Core Module
//!
//! The fundamental building blocks of pdbkit: the molecular model produced by a load,
//! the geometry needed to transform it, and the pure decoding routines that turn PDB
//! text records into typed values.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, chains and the `Structure` container
//! - **Geometry** ([`geometry`]) - 4x4 transformation matrices, symmetry operations and unit cells
//! - **Record Decoding** ([`io`]) - Fixed-column decoding of individual PDB records
//! - **Rendering Attributes** ([`attributes`]) - Bond form strategies and bond radius rules
//! - **Utilities** ([`utils`]) - The periodic table

pub mod attributes;
pub mod geometry;
pub mod io;
pub mod models;
pub mod utils;
