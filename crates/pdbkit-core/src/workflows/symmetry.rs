use crate::core::geometry::matrix::TransformationMatrix;
use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Which of a structure's operator lists to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorSet {
    /// REMARK 290 crystallographic symmetry operators.
    Crystallographic,
    /// REMARK 350 matrices of the first biological assembly.
    BiologicalUnit,
    /// MTRIX operators not already present in the coordinates.
    NonCrystallographic,
}

#[derive(Debug, Error)]
#[error("Invalid operator set string")]
pub struct ParseOperatorSetError;

impl FromStr for OperatorSet {
    type Err = ParseOperatorSetError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crystal" | "crystallographic" | "symmetry" => Ok(Self::Crystallographic),
            "biological" | "biological-unit" | "assembly" => Ok(Self::BiologicalUnit),
            "ncs" | "non-crystallographic" => Ok(Self::NonCrystallographic),
            _ => Err(ParseOperatorSetError),
        }
    }
}

impl fmt::Display for OperatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Crystallographic => "crystallographic",
                Self::BiologicalUnit => "biological-unit",
                Self::NonCrystallographic => "non-crystallographic",
            }
        )
    }
}

impl OperatorSet {
    pub fn operators(self, structure: &Structure) -> &[TransformationMatrix] {
        match self {
            Self::Crystallographic => structure.symmetry_operations(),
            Self::BiologicalUnit => structure.biological_unit(),
            Self::NonCrystallographic => structure.ncs_operations(),
        }
    }
}

/// The atoms one operator applies to and where it puts them.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryCopy {
    pub operator: TransformationMatrix,
    pub atoms: Vec<AtomId>,
    pub positions: Vec<Point3<f64>>,
}

/// Applies each operator to the atoms it covers.
///
/// An operator whose `chain_id` lists author chains (comma-separated) only moves atoms
/// of those chains; otherwise every atom is moved. Atom coordinates in `structure`
/// are left untouched.
pub fn generate_copies(structure: &Structure, operators: &[TransformationMatrix]) -> Vec<SymmetryCopy> {
    operators
        .iter()
        .map(|operator| {
            let chains: Option<Vec<&str>> = operator
                .chain_id
                .as_deref()
                .map(|ids| ids.split(',').map(str::trim).collect());
            let (atoms, positions): (Vec<AtomId>, Vec<Point3<f64>>) = structure
                .atoms()
                .filter(|(_, atom)| {
                    chains
                        .as_ref()
                        .is_none_or(|ids| ids.contains(&atom.author_chain_id.as_str()))
                })
                .map(|(id, atom)| (id, operator.transform_point(&atom.position)))
                .unzip();
            SymmetryCopy {
                operator: operator.clone(),
                atoms,
                positions,
            }
        })
        .collect()
}

/// Generates the copies for one of the structure's operator lists.
#[instrument(skip_all, name = "symmetry_workflow", fields(set = %set))]
pub fn run(structure: &Structure, set: OperatorSet, reporter: &ProgressReporter) -> Vec<SymmetryCopy> {
    let operators = set.operators(structure);
    if operators.is_empty() {
        warn!("Structure has no {set} operators");
        return Vec::new();
    }
    reporter.report(Progress::Message(format!(
        "Applying {} {set} operators",
        operators.len()
    )));
    let copies = generate_copies(structure, operators);
    debug!(
        copies = copies.len(),
        positions = copies.iter().map(|c| c.positions.len()).sum::<usize>(),
        "Generated symmetry copies"
    );
    copies
}
