//! Geometry used to place copies of a structure in space.
//!
//! - [`matrix`] - 4x4 homogeneous transformation matrices with LU-based inversion
//! - [`symmetry`] - Parsing of crystallographic symmetry operation strings ("x,y,1/2-z")
//! - [`cell`] - Crystallographic unit cells and their fractional/Cartesian conversions

pub mod cell;
pub mod matrix;
pub mod symmetry;
