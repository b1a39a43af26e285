//! # pdbkit Core Library
//!
//! A streaming loader for PDB-format structure files and the typed molecular model it
//! produces, together with the 4x4 transformation matrix engine used to place
//! crystallographic and biological symmetry copies of a structure in space.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture with a clear separation of concerns.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `Atom`, `Bond`),
//!   the matrix engine and unit cell (`geometry`), the periodic table, fixed-column PDB
//!   record decoding, and rendering attribute strategies.
//!
//! - **[`engine`]: The Loading Machinery.** The stateful parts of a load: loader
//!   configuration, source resolution (local files, gzip, network), progress reporting
//!   and cancellation, and the line-oriented PDB loader itself.
//!
//! - **[`workflows`]: The Public API.** One-call entry points that tie the `engine` and
//!   `core` together, such as loading a structure from a name or generating symmetry
//!   copies of its coordinates.

pub mod core;
pub mod engine;
pub mod workflows;
