//! Decoding of PDB text records.
//!
//! Everything here is stateless: each function turns one line into a typed value or
//! a [`pdb::ParseErrorKind`]. Sequencing the records and assembling a structure is the
//! job of the loader in [`crate::engine::loader`].

pub mod pdb;
