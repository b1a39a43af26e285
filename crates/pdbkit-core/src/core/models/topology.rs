use super::ids::AtomId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}

impl BondOrder {
    /// The order implied by listing the same partner `count` times in one atom's
    /// CONECT records. Counts above three are capped at triple.
    pub fn from_multiplicity(count: usize) -> Self {
        match count {
            0 | 1 => Self::Single,
            2 => Self::Double,
            _ => Self::Triple,
        }
    }

    /// Number of lines used to draw the bond; aromatic bonds are drawn as two.
    pub fn line_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Double | Self::Aromatic => 2,
            Self::Triple => 3,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// A bond between two atoms of the same structure, referenced by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> Self {
        Self {
            atom1_id,
            atom2_id,
            order,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// The atom at the other end of the bond from `atom_id`, if it is an endpoint.
    pub fn partner(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn bond_order_from_str_parses_valid_strings() {
        assert_eq!("1".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("D".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("triple".parse::<BondOrder>().unwrap(), BondOrder::Triple);
        assert_eq!("ar".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert!("quadruple".parse::<BondOrder>().is_err());
    }

    #[test]
    fn bond_order_from_multiplicity_caps_at_triple() {
        assert_eq!(BondOrder::from_multiplicity(1), BondOrder::Single);
        assert_eq!(BondOrder::from_multiplicity(2), BondOrder::Double);
        assert_eq!(BondOrder::from_multiplicity(3), BondOrder::Triple);
        assert_eq!(BondOrder::from_multiplicity(5), BondOrder::Triple);
    }

    #[test]
    fn bond_order_display_and_line_count() {
        assert_eq!(BondOrder::Aromatic.to_string(), "Aromatic");
        assert_eq!(BondOrder::Single.line_count(), 1);
        assert_eq!(BondOrder::Triple.line_count(), 3);
    }

    #[test]
    fn bond_contains_and_partner() {
        let a1 = dummy_atom_id(1);
        let a2 = dummy_atom_id(2);
        let unrelated = dummy_atom_id(3);
        let bond = Bond::new(a1, a2, BondOrder::Double);
        assert!(bond.contains(a1));
        assert!(bond.contains(a2));
        assert!(!bond.contains(unrelated));
        assert_eq!(bond.partner(a1), Some(a2));
        assert_eq!(bond.partner(a2), Some(a1));
        assert_eq!(bond.partner(unrelated), None);
    }
}
