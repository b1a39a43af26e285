use super::ids::AtomId;
use super::structure::{Component, ComponentType, Structure};

/// Selects components of one category from a [`Structure`].
pub trait ComponentFilter {
    /// The component category this filter inspects.
    fn kind(&self) -> ComponentType;

    fn accept(&self, structure: &Structure, component: &Component<'_>) -> bool;
}

/// Accepts atoms, bonds and chains belonging to one author chain.
///
/// Bonds are accepted when either endpoint lies in the chain. The hetero and water
/// buckets of a chain match along with its polymer bucket.
#[derive(Debug, Clone)]
pub struct ChainFilter {
    kind: ComponentType,
    author_chain_id: String,
}

impl ChainFilter {
    pub fn new(kind: ComponentType, author_chain_id: &str) -> Self {
        Self {
            kind,
            author_chain_id: author_chain_id.to_string(),
        }
    }

    fn atom_matches(&self, structure: &Structure, id: AtomId) -> bool {
        structure
            .atom(id)
            .is_some_and(|atom| atom.author_chain_id == self.author_chain_id)
    }
}

impl ComponentFilter for ChainFilter {
    fn kind(&self) -> ComponentType {
        self.kind
    }

    fn accept(&self, structure: &Structure, component: &Component<'_>) -> bool {
        match component {
            Component::Atom(_, atom) => atom.author_chain_id == self.author_chain_id,
            Component::Bond(bond) => {
                self.atom_matches(structure, bond.atom1_id) || self.atom_matches(structure, bond.atom2_id)
            }
            Component::Chain(chain) => chain.key.author_chain_id == self.author_chain_id,
        }
    }
}

/// Accepts atoms and chains tagged with one entity id.
#[derive(Debug, Clone, Copy)]
pub struct EntityFilter {
    kind: ComponentType,
    entity_id: u32,
}

impl EntityFilter {
    pub fn new(kind: ComponentType, entity_id: u32) -> Self {
        Self { kind, entity_id }
    }
}

impl ComponentFilter for EntityFilter {
    fn kind(&self) -> ComponentType {
        self.kind
    }

    fn accept(&self, structure: &Structure, component: &Component<'_>) -> bool {
        match component {
            Component::Atom(_, atom) => atom.entity_id == self.entity_id,
            Component::Bond(bond) => [bond.atom1_id, bond.atom2_id]
                .into_iter()
                .filter_map(|id| structure.atom(id))
                .all(|atom| atom.entity_id == self.entity_id),
            Component::Chain(chain) => chain.entity_id == self.entity_id,
        }
    }
}

/// How a candidate component must relate to the subject atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Bonds with the subject as an endpoint.
    BondsOf,
    /// Atoms sharing a bond with the subject.
    BondedTo,
    /// Atoms in the same chain bucket as the subject, the subject included.
    SameChain,
}

/// Accepts components standing in a given [`Relation`] to a subject atom.
#[derive(Debug, Clone, Copy)]
pub struct RelationFilter {
    relation: Relation,
    subject: AtomId,
}

impl RelationFilter {
    pub fn new(relation: Relation, subject: AtomId) -> Self {
        Self { relation, subject }
    }
}

impl ComponentFilter for RelationFilter {
    fn kind(&self) -> ComponentType {
        match self.relation {
            Relation::BondsOf => ComponentType::Bond,
            Relation::BondedTo | Relation::SameChain => ComponentType::Atom,
        }
    }

    fn accept(&self, structure: &Structure, component: &Component<'_>) -> bool {
        match (self.relation, component) {
            (Relation::BondsOf, Component::Bond(bond)) => bond.contains(self.subject),
            (Relation::BondedTo, Component::Atom(id, _)) => structure
                .bonds_of(self.subject)
                .any(|bond| bond.partner(self.subject) == Some(*id)),
            (Relation::SameChain, Component::Atom(_, atom)) => structure
                .atom(self.subject)
                .is_some_and(|subject| subject.chain == atom.chain),
            _ => false,
        }
    }
}
