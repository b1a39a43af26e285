use crate::core::models::atom::Atom;
use crate::core::models::structure::Structure;
use crate::core::models::topology::Bond;
use crate::core::utils::periodic::Element;

/// Largest fraction of an element's radius a bond may take.
const MAX_RADIUS_SCALE: f32 = 0.2;
/// Radius of a typical atom in Angstroms.
const TYPICAL_ATOM_RADIUS: f32 = 1.7;

/// Bond radius following the radius an atom is drawn with, so bonds stay thinner
/// than the spheres they connect.
///
/// The drawn radius is divided by the element's own radius, capped at 0.2 and scaled
/// by a typical atom radius of 1.7 Å.
pub fn bond_radius_for(element: Element, drawn_atom_radius: f32) -> f32 {
    let scale = (drawn_atom_radius / element.radius()).min(MAX_RADIUS_SCALE);
    scale * TYPICAL_ATOM_RADIUS
}

/// Derives bond radii from the radii atoms are drawn with.
pub struct BondRadiusByAtomRadius<F>
where
    F: Fn(&Atom) -> f32,
{
    drawn_radius: F,
}

impl<F> BondRadiusByAtomRadius<F>
where
    F: Fn(&Atom) -> f32,
{
    pub fn new(drawn_radius: F) -> Self {
        Self { drawn_radius }
    }

    /// Radius of a whole bond, taken from its first atom.
    pub fn bond_radius(&self, structure: &Structure, bond: &Bond) -> Option<f32> {
        self.radius_of(structure.atom(bond.atom1_id)?)
    }

    /// Radius of the second half of a split bond, taken from its second atom.
    pub fn split_bond_radius(&self, structure: &Structure, bond: &Bond) -> Option<f32> {
        self.radius_of(structure.atom(bond.atom2_id)?)
    }

    fn radius_of(&self, atom: &Atom) -> Option<f32> {
        Some(bond_radius_for(atom.element, (self.drawn_radius)(atom)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::StructureBuilder;
    use crate::core::models::topology::BondOrder;
    use nalgebra::Point3;

    #[test]
    fn scale_is_capped() {
        let large = bond_radius_for(Element::CARBON, Element::CARBON.radius() * 10.0);
        assert!((large - MAX_RADIUS_SCALE * TYPICAL_ATOM_RADIUS).abs() < 1e-6);
    }

    #[test]
    fn small_drawn_radius_scales_linearly() {
        let drawn = Element::CARBON.radius() * 0.1;
        let radius = bond_radius_for(Element::CARBON, drawn);
        assert!((radius - 0.1 * TYPICAL_ATOM_RADIUS).abs() < 1e-6);
    }

    #[test]
    fn bond_and_split_radii_follow_their_atoms() {
        let mut builder = StructureBuilder::new();
        let c = builder.add_atom(Atom::new(1, "C", Element::CARBON, Point3::origin()));
        let o = builder.add_atom(Atom::new(2, "O", Element::OXYGEN, Point3::new(1.2, 0.0, 0.0)));
        builder.add_bond(c, o, BondOrder::Double);
        let structure = builder.build("test");
        let bond = structure.bonds()[0];

        let rule = BondRadiusByAtomRadius::new(|atom: &Atom| atom.element.radius() * 0.05);
        let whole = rule.bond_radius(&structure, &bond).unwrap();
        let split = rule.split_bond_radius(&structure, &bond).unwrap();
        assert!((whole - 0.05 * TYPICAL_ATOM_RADIUS).abs() < 1e-6);
        assert!((split - whole).abs() < 1e-6);
    }
}
