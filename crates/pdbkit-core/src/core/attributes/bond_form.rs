use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use crate::core::models::topology::Bond;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Distance between the parallel lines of a multiple bond, in Angstroms.
const ORDER_LINE_SPACING: f64 = 0.15;

/// The closed set of bond drawing styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondFormKind {
    /// One line from atom to atom.
    Simple,
    /// Two half-bonds meeting at the midpoint, each owned by its nearer atom.
    Split,
    /// One line per unit of bond order, offset side by side.
    Order,
}

impl BondFormKind {
    pub const ALL: [BondFormKind; 3] = [BondFormKind::Simple, BondFormKind::Split, BondFormKind::Order];
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown bond form '{0}' (expected simple, split or order)")]
pub struct ParseBondFormError(pub String);

impl FromStr for BondFormKind {
    type Err = ParseBondFormError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "split" => Ok(Self::Split),
            "order" | "bond order" => Ok(Self::Order),
            _ => Err(ParseBondFormError(s.to_string())),
        }
    }
}

impl fmt::Display for BondFormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Simple => "Simple",
                Self::Split => "Split",
                Self::Order => "Order",
            }
        )
    }
}

/// One straight piece of a drawn bond, colored after its owning atom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondSegment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub owner: AtomId,
}

/// A strategy turning a bond into drawable segments.
pub trait BondForm: Send + Sync {
    fn kind(&self) -> BondFormKind;

    /// Segments for `bond`, or an empty list when an endpoint is not in `structure`.
    fn segments(&self, structure: &Structure, bond: &Bond) -> Vec<BondSegment>;
}

fn endpoints(structure: &Structure, bond: &Bond) -> Option<(Point3<f64>, Point3<f64>)> {
    let a = structure.atom(bond.atom1_id)?;
    let b = structure.atom(bond.atom2_id)?;
    Some((a.position, b.position))
}

#[derive(Debug, Default)]
pub struct SimpleBondForm;

impl BondForm for SimpleBondForm {
    fn kind(&self) -> BondFormKind {
        BondFormKind::Simple
    }

    fn segments(&self, structure: &Structure, bond: &Bond) -> Vec<BondSegment> {
        let Some((start, end)) = endpoints(structure, bond) else {
            return Vec::new();
        };
        vec![BondSegment {
            start,
            end,
            owner: bond.atom1_id,
        }]
    }
}

#[derive(Debug, Default)]
pub struct SplitBondForm;

impl BondForm for SplitBondForm {
    fn kind(&self) -> BondFormKind {
        BondFormKind::Split
    }

    fn segments(&self, structure: &Structure, bond: &Bond) -> Vec<BondSegment> {
        let Some((start, end)) = endpoints(structure, bond) else {
            return Vec::new();
        };
        let middle = nalgebra::center(&start, &end);
        vec![
            BondSegment {
                start,
                end: middle,
                owner: bond.atom1_id,
            },
            BondSegment {
                start: middle,
                end,
                owner: bond.atom2_id,
            },
        ]
    }
}

#[derive(Debug, Default)]
pub struct OrderBondForm;

impl OrderBondForm {
    fn perpendicular(axis: &Vector3<f64>) -> Vector3<f64> {
        let reference = if axis.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        axis.cross(&reference)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

impl BondForm for OrderBondForm {
    fn kind(&self) -> BondFormKind {
        BondFormKind::Order
    }

    fn segments(&self, structure: &Structure, bond: &Bond) -> Vec<BondSegment> {
        let Some((start, end)) = endpoints(structure, bond) else {
            return Vec::new();
        };
        let lines = bond.order.line_count();
        let offset_dir = Self::perpendicular(&(end - start));
        let first = -(lines as f64 - 1.0) / 2.0;
        (0..lines)
            .map(|i| {
                let offset = offset_dir * ((first + i as f64) * ORDER_LINE_SPACING);
                BondSegment {
                    start: start + offset,
                    end: end + offset,
                    owner: bond.atom1_id,
                }
            })
            .collect()
    }
}

/// Bond form strategies keyed by [`BondFormKind`], with a default.
pub struct BondFormRegistry {
    forms: HashMap<BondFormKind, Box<dyn BondForm>>,
    default_kind: BondFormKind,
}

impl Default for BondFormRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BondFormRegistry {
    /// A registry holding every built-in form, defaulting to [`BondFormKind::Simple`].
    pub fn with_defaults() -> Self {
        let mut forms: HashMap<BondFormKind, Box<dyn BondForm>> = HashMap::new();
        forms.insert(BondFormKind::Simple, Box::new(SimpleBondForm));
        forms.insert(BondFormKind::Split, Box::new(SplitBondForm));
        forms.insert(BondFormKind::Order, Box::new(OrderBondForm));
        Self {
            forms,
            default_kind: BondFormKind::Simple,
        }
    }

    pub fn get(&self, kind: BondFormKind) -> Option<&dyn BondForm> {
        self.forms.get(&kind).map(|form| form.as_ref())
    }

    pub fn get_by_name(&self, name: &str) -> Result<&dyn BondForm, ParseBondFormError> {
        let kind: BondFormKind = name.parse()?;
        self.get(kind).ok_or_else(|| ParseBondFormError(name.to_string()))
    }

    pub fn default_kind(&self) -> BondFormKind {
        self.default_kind
    }

    /// Changes the default; returns `false` if no form is registered for `kind`.
    pub fn set_default_kind(&mut self, kind: BondFormKind) -> bool {
        if self.forms.contains_key(&kind) {
            self.default_kind = kind;
            true
        } else {
            false
        }
    }

    pub fn default_form(&self) -> Option<&dyn BondForm> {
        self.get(self.default_kind)
    }

    /// Registered kinds in declaration order.
    pub fn kinds(&self) -> Vec<BondFormKind> {
        let mut kinds: Vec<BondFormKind> = self.forms.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl fmt::Debug for BondFormRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BondFormRegistry")
            .field("kinds", &self.kinds())
            .field("default_kind", &self.default_kind)
            .finish()
    }
}
