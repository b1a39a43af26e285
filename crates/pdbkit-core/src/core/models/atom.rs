use super::chain::ChainKey;
use crate::core::utils::periodic::Element;
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The PDB record an atom was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    /// A standard polymer atom (ATOM record).
    #[default]
    Atom,
    /// A hetero atom (HETATM record): ligands, ions, waters, modified residues.
    Hetatm,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid record kind: '{0}'")]
pub struct ParseRecordKindError(pub String);

impl FromStr for RecordKind {
    type Err = ParseRecordKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATOM" => Ok(RecordKind::Atom),
            "HETATM" => Ok(RecordKind::Hetatm),
            _ => Err(ParseRecordKindError(s.to_string())),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        })
    }
}

/// An atom as read from one ATOM or HETATM record.
///
/// Atoms are created once per record during a load and are owned by the
/// [`Structure`](super::structure::Structure) afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The serial number from columns 7-11, unique within a load.
    pub serial: usize,
    /// The atom name, with `*` mapped to `'` (e.g. "C1'").
    pub name: String,
    /// Alternate location indicator.
    pub alt_loc: Option<char>,
    pub element: Element,
    /// The compound (residue) name, e.g. "ALA" or "HOH".
    pub residue_name: String,
    /// The chain bucket this atom was grouped into.
    pub chain: ChainKey,
    /// The chain identifier exactly as written by the author.
    pub author_chain_id: String,
    pub residue_number: isize,
    pub insertion_code: Option<char>,
    pub entity_id: u32,
    /// The MODEL number the atom was read under (0 when the file has no MODEL records).
    pub model: u32,
    pub record: RecordKind,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    pub occupancy: f32,
    /// Temperature factor.
    pub b_factor: f32,
}

impl Atom {
    /// Creates an atom with default identity fields, to be filled in by the caller.
    pub fn new(serial: usize, name: &str, element: Element, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.to_string(),
            alt_loc: None,
            element,
            residue_name: String::new(),
            chain: ChainKey::default(),
            author_chain_id: String::new(),
            residue_number: 0,
            insertion_code: None,
            entity_id: 1,
            model: 0,
            record: RecordKind::Atom,
            position,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }

    /// The display chain identifier derived from the chain bucket.
    pub fn chain_id(&self) -> String {
        self.chain.label()
    }

    pub fn is_hetero(&self) -> bool {
        self.record == RecordKind::Hetatm
    }
}
