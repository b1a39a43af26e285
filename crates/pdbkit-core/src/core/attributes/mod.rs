//! Rendering attributes derived from a loaded structure.
//!
//! These are the strategy objects display code consults when turning bonds into
//! geometry: how a bond is drawn ([`bond_form`]) and how thick it is ([`bond_radius`]).

pub mod bond_form;
pub mod bond_radius;
