use super::atom::Atom;
use super::chain::{Chain, ChainCategory, ChainKey};
use super::filter::ComponentFilter;
use super::ids::AtomId;
use super::topology::{Bond, BondOrder};
use crate::core::geometry::cell::UnitCell;
use crate::core::geometry::matrix::TransformationMatrix;
use serde::Serialize;
use slotmap::SlotMap;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_ENTITY_ID: u32 = 1;

/// The categories of components a [`Structure`] exposes through its read interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentType {
    Atom,
    Bond,
    Chain,
}

impl ComponentType {
    pub const ALL: [ComponentType; 3] = [ComponentType::Atom, ComponentType::Bond, ComponentType::Chain];
}

#[derive(Debug, Error)]
#[error("Invalid component type string")]
pub struct ParseComponentTypeError;

impl FromStr for ComponentType {
    type Err = ParseComponentTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "atom" | "atoms" => Ok(ComponentType::Atom),
            "bond" | "bonds" => Ok(ComponentType::Bond),
            "chain" | "chains" => Ok(ComponentType::Chain),
            _ => Err(ParseComponentTypeError),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ComponentType::Atom => "ATOM",
                ComponentType::Bond => "BOND",
                ComponentType::Chain => "CHAIN",
            }
        )
    }
}

/// A borrowed view of one component of a structure.
#[derive(Debug, Clone, Copy)]
pub enum Component<'a> {
    Atom(AtomId, &'a Atom),
    Bond(&'a Bond),
    Chain(&'a Chain),
}

impl Component<'_> {
    pub fn kind(&self) -> ComponentType {
        match self {
            Component::Atom(..) => ComponentType::Atom,
            Component::Bond(_) => ComponentType::Bond,
            Component::Chain(_) => ComponentType::Chain,
        }
    }
}

/// One fully loaded molecular structure.
///
/// A `Structure` owns every atom, bond and chain read from a source, keeps each
/// category in load order, and carries the crystallographic metadata found in the
/// header. It is produced once by [`StructureBuilder::build`] and never mutated
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    source: String,
    atoms: SlotMap<AtomId, Atom>,
    atom_order: Vec<AtomId>,
    bonds: Vec<Bond>,
    chains: Vec<Chain>,
    entity_names: BTreeMap<u32, String>,
    unit_cell: Option<UnitCell>,
    symmetry_operations: Vec<TransformationMatrix>,
    biological_unit: Vec<TransformationMatrix>,
    ncs_operations: Vec<TransformationMatrix>,
}

impl Structure {
    /// The resolved source identifier (path or URL) the structure was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of components of the given category.
    pub fn component_count(&self, kind: ComponentType) -> usize {
        match kind {
            ComponentType::Atom => self.atom_order.len(),
            ComponentType::Bond => self.bonds.len(),
            ComponentType::Chain => self.chains.len(),
        }
    }

    /// The component at `index` within its category, in load order.
    pub fn component(&self, kind: ComponentType, index: usize) -> Option<Component<'_>> {
        match kind {
            ComponentType::Atom => {
                let id = *self.atom_order.get(index)?;
                self.atoms.get(id).map(|atom| Component::Atom(id, atom))
            }
            ComponentType::Bond => self.bonds.get(index).map(Component::Bond),
            ComponentType::Chain => self.chains.get(index).map(Component::Chain),
        }
    }

    /// Iterates every component of a category in load order.
    pub fn components(&self, kind: ComponentType) -> impl Iterator<Item = Component<'_>> + '_ {
        (0..self.component_count(kind)).filter_map(move |index| self.component(kind, index))
    }

    /// Iterates the components accepted by `filter`.
    pub fn filter<'a, F>(&'a self, filter: &'a F) -> impl Iterator<Item = Component<'a>> + 'a
    where
        F: ComponentFilter + ?Sized,
    {
        self.components(filter.kind())
            .filter(move |component| filter.accept(self, component))
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_at(&self, index: usize) -> Option<&Atom> {
        self.atom_order.get(index).and_then(|&id| self.atoms.get(id))
    }

    /// Iterates atoms in load order.
    pub fn atoms(&self) -> impl Iterator<Item = (AtomId, &Atom)> + '_ {
        self.atom_order
            .iter()
            .filter_map(move |&id| self.atoms.get(id).map(|atom| (id, atom)))
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Iterates the bonds with `atom_id` as an endpoint.
    pub fn bonds_of(&self, atom_id: AtomId) -> impl Iterator<Item = &Bond> + '_ {
        self.bonds.iter().filter(move |bond| bond.contains(atom_id))
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, key: &ChainKey) -> Option<&Chain> {
        self.chains.iter().find(|chain| &chain.key == key)
    }

    /// The lowercase display name of an entity; empty when the file named none.
    pub fn entity_name(&self, entity_id: u32) -> Option<&str> {
        self.entity_names.get(&entity_id).map(String::as_str)
    }

    pub fn entity_names(&self) -> &BTreeMap<u32, String> {
        &self.entity_names
    }

    pub fn unit_cell(&self) -> Option<&UnitCell> {
        self.unit_cell.as_ref()
    }

    /// Crystallographic symmetry operators, in Cartesian space when a unit cell is known.
    pub fn symmetry_operations(&self) -> &[TransformationMatrix] {
        &self.symmetry_operations
    }

    /// Matrices generating the first biological assembly.
    pub fn biological_unit(&self) -> &[TransformationMatrix] {
        &self.biological_unit
    }

    /// Non-crystallographic symmetry operations not already applied to the coordinates.
    pub fn ncs_operations(&self) -> &[TransformationMatrix] {
        &self.ncs_operations
    }

    pub fn summary(&self) -> StructureSummary {
        let mut entity_atoms: BTreeMap<u32, usize> = BTreeMap::new();
        for (_, atom) in self.atoms() {
            *entity_atoms.entry(atom.entity_id).or_default() += 1;
        }

        let mut entity_ids: Vec<u32> = self.entity_names.keys().copied().collect();
        entity_ids.extend(
            entity_atoms
                .keys()
                .filter(|id| !self.entity_names.contains_key(*id)),
        );
        entity_ids.sort_unstable();

        let entities = entity_ids
            .into_iter()
            .map(|id| EntitySummary {
                id,
                name: self.entity_name(id).unwrap_or_default().to_string(),
                atom_count: entity_atoms.get(&id).copied().unwrap_or(0),
            })
            .collect();

        let chains = self
            .chains
            .iter()
            .map(|chain| ChainSummary {
                label: chain.label(),
                author_chain_id: chain.key.author_chain_id.clone(),
                category: chain.key.category,
                entity_id: chain.entity_id,
                atom_count: chain.atoms.len(),
            })
            .collect();

        StructureSummary {
            source: self.source.clone(),
            atom_count: self.atom_order.len(),
            hetero_atom_count: self.atoms().filter(|(_, atom)| atom.is_hetero()).count(),
            water_atom_count: self
                .atoms()
                .filter(|(_, atom)| atom.chain.category == ChainCategory::Water)
                .count(),
            bond_count: self.bonds.len(),
            chain_count: self.chains.len(),
            symmetry_operation_count: self.symmetry_operations.len(),
            biological_unit_matrix_count: self.biological_unit.len(),
            ncs_operation_count: self.ncs_operations.len(),
            unit_cell: self.unit_cell.clone(),
            entities,
            chains,
        }
    }
}

/// A serializable overview of a loaded structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureSummary {
    pub source: String,
    pub atom_count: usize,
    pub hetero_atom_count: usize,
    pub water_atom_count: usize,
    pub bond_count: usize,
    pub chain_count: usize,
    pub symmetry_operation_count: usize,
    pub biological_unit_matrix_count: usize,
    pub ncs_operation_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cell: Option<UnitCell>,
    pub entities: Vec<EntitySummary>,
    pub chains: Vec<ChainSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: u32,
    pub name: String,
    pub atom_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSummary {
    pub label: String,
    pub author_chain_id: String,
    pub category: ChainCategory,
    pub entity_id: u32,
    pub atom_count: usize,
}

/// Accumulates the components of one load and assembles them into a [`Structure`].
#[derive(Debug, Default)]
pub struct StructureBuilder {
    structure: Structure,

    // --- Builder-specific state, dropped by `build` ---
    chain_index: HashMap<ChainKey, usize>,
    bonded_pairs: HashSet<(AtomId, AtomId)>,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an atom, placing it in the chain bucket named by its key.
    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let key = atom.chain.clone();
        let entity_id = atom.entity_id;
        let id = self.structure.atoms.insert(atom);
        self.structure.atom_order.push(id);

        let chains = &mut self.structure.chains;
        let index = *self.chain_index.entry(key).or_insert_with_key(|key| {
            chains.push(Chain::new(key.clone(), entity_id));
            chains.len() - 1
        });
        chains[index].atoms.push(id);
        id
    }

    /// Adds a bond between two previously added atoms.
    ///
    /// Returns `false` without adding anything when either endpoint is unknown,
    /// both endpoints are the same atom, or the pair is already bonded.
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> bool {
        if atom1_id == atom2_id
            || !self.structure.atoms.contains_key(atom1_id)
            || !self.structure.atoms.contains_key(atom2_id)
        {
            return false;
        }
        let pair = if atom1_id < atom2_id {
            (atom1_id, atom2_id)
        } else {
            (atom2_id, atom1_id)
        };
        if !self.bonded_pairs.insert(pair) {
            return false;
        }
        self.structure.bonds.push(Bond::new(atom1_id, atom2_id, order));
        true
    }

    pub fn set_entity_name(&mut self, entity_id: u32, name: &str) -> &mut Self {
        self.structure.entity_names.insert(entity_id, name.to_string());
        self
    }

    pub fn set_unit_cell(&mut self, cell: UnitCell) -> &mut Self {
        self.structure.unit_cell = Some(cell);
        self
    }

    pub fn add_symmetry_operation(&mut self, matrix: TransformationMatrix) -> &mut Self {
        self.structure.symmetry_operations.push(matrix);
        self
    }

    pub fn add_biological_unit_matrix(&mut self, matrix: TransformationMatrix) -> &mut Self {
        self.structure.biological_unit.push(matrix);
        self
    }

    pub fn add_ncs_operation(&mut self, matrix: TransformationMatrix) -> &mut Self {
        self.structure.ncs_operations.push(matrix);
        self
    }

    /// Finishes the structure and stamps it with its source identifier.
    ///
    /// A structure without any named entity gets entity 1 with an empty name.
    pub fn build(self, source: &str) -> Structure {
        let mut structure = self.structure;
        if structure.entity_names.is_empty() {
            structure
                .entity_names
                .insert(DEFAULT_ENTITY_ID, String::new());
        }
        structure.source = source.to_string();
        structure
    }
}
