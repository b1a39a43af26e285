use super::atom::RecordKind;
use super::ids::AtomId;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const WATER_RESIDUE_NAME: &str = "HOH";

const MODEL_MARKER: char = '#';
const HETERO_MARKER: char = '\'';
const WATER_MARKER: char = '~';

/// What kind of material a chain bucket holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainCategory {
    /// Polymer atoms from ATOM records.
    #[default]
    Polymer,
    /// Hetero atoms other than water.
    Ligand,
    /// Water molecules.
    Water,
}

#[derive(Debug, Error)]
#[error("Invalid chain category string")]
pub struct ParseChainCategoryError;

impl FromStr for ChainCategory {
    type Err = ParseChainCategoryError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "polymer" => Ok(ChainCategory::Polymer),
            "ligand" => Ok(ChainCategory::Ligand),
            "water" => Ok(ChainCategory::Water),
            _ => Err(ParseChainCategoryError),
        }
    }
}

impl fmt::Display for ChainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ChainCategory::Polymer => "Polymer",
                ChainCategory::Ligand => "Ligand",
                ChainCategory::Water => "Water",
            }
        )
    }
}

/// The grouping key that decides which chain bucket an atom lands in.
///
/// Ligands and waters never share a bucket with the polymer chain they are
/// attributed to, and in treat-models-as-subunits mode every model forms its own
/// set of chains. Grouping compares keys; the string label exists only for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChainKey {
    pub author_chain_id: String,
    pub category: ChainCategory,
    pub model: Option<u32>,
}

impl ChainKey {
    pub fn new(author_chain_id: &str, category: ChainCategory, model: Option<u32>) -> Self {
        Self {
            author_chain_id: author_chain_id.to_string(),
            category,
            model,
        }
    }

    /// Derives the key for an atom record.
    ///
    /// Residues named `HOH` are waters regardless of record type; any other HETATM
    /// record is a ligand.
    pub fn classify(
        author_chain_id: &str,
        record: RecordKind,
        residue_name: &str,
        model: Option<u32>,
    ) -> Self {
        let category = if residue_name == WATER_RESIDUE_NAME {
            ChainCategory::Water
        } else if record == RecordKind::Hetatm {
            ChainCategory::Ligand
        } else {
            ChainCategory::Polymer
        };
        Self::new(author_chain_id, category, model)
    }

    pub fn is_hetero(&self) -> bool {
        self.category != ChainCategory::Polymer
    }

    /// The display label: the author chain id, then `#n` for the model in
    /// subunit mode, then `'` for hetero chains and an extra `~` for waters.
    pub fn label(&self) -> String {
        let mut label = self.author_chain_id.clone();
        if let Some(model) = self.model {
            label.push(MODEL_MARKER);
            label.push_str(&model.to_string());
        }
        match self.category {
            ChainCategory::Polymer => {}
            ChainCategory::Ligand => label.push(HETERO_MARKER),
            ChainCategory::Water => {
                label.push(HETERO_MARKER);
                label.push(WATER_MARKER);
            }
        }
        label
    }
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub key: ChainKey,
    pub entity_id: u32,
    pub(crate) atoms: Vec<AtomId>, // Atoms in load order
}

impl Chain {
    pub(crate) fn new(key: ChainKey, entity_id: u32) -> Self {
        Self {
            key,
            entity_id,
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn label(&self) -> String {
        self.key.label()
    }
}
