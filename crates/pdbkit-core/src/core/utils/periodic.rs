//! The periodic table.
//!
//! Element symbols from PDB files arrive in assorted cases ("FE", "Fe") and sometimes
//! as isotope letters; [`Element::from_symbol`] normalizes all of them to a single
//! [`Element`] value backed by a static table indexed by atomic number.

use phf::{Map, phf_map};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

struct ElementData {
    symbol: &'static str,
    name: &'static str,
    covalent_radius: f32,
}

static ELEMENTS: [ElementData; 118] = [
    ElementData { symbol: "H", name: "Hydrogen", covalent_radius: 0.31 },
    ElementData { symbol: "He", name: "Helium", covalent_radius: 0.28 },
    ElementData { symbol: "Li", name: "Lithium", covalent_radius: 1.28 },
    ElementData { symbol: "Be", name: "Beryllium", covalent_radius: 0.96 },
    ElementData { symbol: "B", name: "Boron", covalent_radius: 0.84 },
    ElementData { symbol: "C", name: "Carbon", covalent_radius: 0.76 },
    ElementData { symbol: "N", name: "Nitrogen", covalent_radius: 0.71 },
    ElementData { symbol: "O", name: "Oxygen", covalent_radius: 0.66 },
    ElementData { symbol: "F", name: "Fluorine", covalent_radius: 0.57 },
    ElementData { symbol: "Ne", name: "Neon", covalent_radius: 0.58 },
    ElementData { symbol: "Na", name: "Sodium", covalent_radius: 1.66 },
    ElementData { symbol: "Mg", name: "Magnesium", covalent_radius: 1.41 },
    ElementData { symbol: "Al", name: "Aluminum", covalent_radius: 1.21 },
    ElementData { symbol: "Si", name: "Silicon", covalent_radius: 1.11 },
    ElementData { symbol: "P", name: "Phosphorus", covalent_radius: 1.07 },
    ElementData { symbol: "S", name: "Sulfur", covalent_radius: 1.05 },
    ElementData { symbol: "Cl", name: "Chlorine", covalent_radius: 1.02 },
    ElementData { symbol: "Ar", name: "Argon", covalent_radius: 1.06 },
    ElementData { symbol: "K", name: "Potassium", covalent_radius: 2.03 },
    ElementData { symbol: "Ca", name: "Calcium", covalent_radius: 1.76 },
    ElementData { symbol: "Sc", name: "Scandium", covalent_radius: 1.70 },
    ElementData { symbol: "Ti", name: "Titanium", covalent_radius: 1.60 },
    ElementData { symbol: "V", name: "Vanadium", covalent_radius: 1.53 },
    ElementData { symbol: "Cr", name: "Chromium", covalent_radius: 1.39 },
    ElementData { symbol: "Mn", name: "Manganese", covalent_radius: 1.39 },
    ElementData { symbol: "Fe", name: "Iron", covalent_radius: 1.32 },
    ElementData { symbol: "Co", name: "Cobalt", covalent_radius: 1.26 },
    ElementData { symbol: "Ni", name: "Nickel", covalent_radius: 1.24 },
    ElementData { symbol: "Cu", name: "Copper", covalent_radius: 1.32 },
    ElementData { symbol: "Zn", name: "Zinc", covalent_radius: 1.22 },
    ElementData { symbol: "Ga", name: "Gallium", covalent_radius: 1.22 },
    ElementData { symbol: "Ge", name: "Germanium", covalent_radius: 1.20 },
    ElementData { symbol: "As", name: "Arsenic", covalent_radius: 1.19 },
    ElementData { symbol: "Se", name: "Selenium", covalent_radius: 1.20 },
    ElementData { symbol: "Br", name: "Bromine", covalent_radius: 1.20 },
    ElementData { symbol: "Kr", name: "Krypton", covalent_radius: 1.16 },
    ElementData { symbol: "Rb", name: "Rubidium", covalent_radius: 2.20 },
    ElementData { symbol: "Sr", name: "Strontium", covalent_radius: 1.95 },
    ElementData { symbol: "Y", name: "Yttrium", covalent_radius: 1.90 },
    ElementData { symbol: "Zr", name: "Zirconium", covalent_radius: 1.75 },
    ElementData { symbol: "Nb", name: "Niobium", covalent_radius: 1.64 },
    ElementData { symbol: "Mo", name: "Molybdenum", covalent_radius: 1.54 },
    ElementData { symbol: "Tc", name: "Technetium", covalent_radius: 1.47 },
    ElementData { symbol: "Ru", name: "Ruthenium", covalent_radius: 1.46 },
    ElementData { symbol: "Rh", name: "Rhodium", covalent_radius: 1.42 },
    ElementData { symbol: "Pd", name: "Palladium", covalent_radius: 1.39 },
    ElementData { symbol: "Ag", name: "Silver", covalent_radius: 1.45 },
    ElementData { symbol: "Cd", name: "Cadmium", covalent_radius: 1.44 },
    ElementData { symbol: "In", name: "Indium", covalent_radius: 1.42 },
    ElementData { symbol: "Sn", name: "Tin", covalent_radius: 1.39 },
    ElementData { symbol: "Sb", name: "Antimony", covalent_radius: 1.39 },
    ElementData { symbol: "Te", name: "Tellurium", covalent_radius: 1.38 },
    ElementData { symbol: "I", name: "Iodine", covalent_radius: 1.39 },
    ElementData { symbol: "Xe", name: "Xenon", covalent_radius: 1.40 },
    ElementData { symbol: "Cs", name: "Cesium", covalent_radius: 2.44 },
    ElementData { symbol: "Ba", name: "Barium", covalent_radius: 2.15 },
    ElementData { symbol: "La", name: "Lanthanum", covalent_radius: 2.07 },
    ElementData { symbol: "Ce", name: "Cerium", covalent_radius: 2.04 },
    ElementData { symbol: "Pr", name: "Praseodymium", covalent_radius: 2.03 },
    ElementData { symbol: "Nd", name: "Neodymium", covalent_radius: 2.01 },
    ElementData { symbol: "Pm", name: "Promethium", covalent_radius: 1.99 },
    ElementData { symbol: "Sm", name: "Samarium", covalent_radius: 1.98 },
    ElementData { symbol: "Eu", name: "Europium", covalent_radius: 1.98 },
    ElementData { symbol: "Gd", name: "Gadolinium", covalent_radius: 1.96 },
    ElementData { symbol: "Tb", name: "Terbium", covalent_radius: 1.94 },
    ElementData { symbol: "Dy", name: "Dysprosium", covalent_radius: 1.92 },
    ElementData { symbol: "Ho", name: "Holmium", covalent_radius: 1.92 },
    ElementData { symbol: "Er", name: "Erbium", covalent_radius: 1.89 },
    ElementData { symbol: "Tm", name: "Thulium", covalent_radius: 1.90 },
    ElementData { symbol: "Yb", name: "Ytterbium", covalent_radius: 1.87 },
    ElementData { symbol: "Lu", name: "Lutetium", covalent_radius: 1.87 },
    ElementData { symbol: "Hf", name: "Hafnium", covalent_radius: 1.75 },
    ElementData { symbol: "Ta", name: "Tantalum", covalent_radius: 1.70 },
    ElementData { symbol: "W", name: "Tungsten", covalent_radius: 1.62 },
    ElementData { symbol: "Re", name: "Rhenium", covalent_radius: 1.51 },
    ElementData { symbol: "Os", name: "Osmium", covalent_radius: 1.44 },
    ElementData { symbol: "Ir", name: "Iridium", covalent_radius: 1.41 },
    ElementData { symbol: "Pt", name: "Platinum", covalent_radius: 1.36 },
    ElementData { symbol: "Au", name: "Gold", covalent_radius: 1.36 },
    ElementData { symbol: "Hg", name: "Mercury", covalent_radius: 1.32 },
    ElementData { symbol: "Tl", name: "Thallium", covalent_radius: 1.45 },
    ElementData { symbol: "Pb", name: "Lead", covalent_radius: 1.46 },
    ElementData { symbol: "Bi", name: "Bismuth", covalent_radius: 1.48 },
    ElementData { symbol: "Po", name: "Polonium", covalent_radius: 1.40 },
    ElementData { symbol: "At", name: "Astatine", covalent_radius: 1.50 },
    ElementData { symbol: "Rn", name: "Radon", covalent_radius: 1.50 },
    ElementData { symbol: "Fr", name: "Francium", covalent_radius: 2.60 },
    ElementData { symbol: "Ra", name: "Radium", covalent_radius: 2.21 },
    ElementData { symbol: "Ac", name: "Actinium", covalent_radius: 2.15 },
    ElementData { symbol: "Th", name: "Thorium", covalent_radius: 2.06 },
    ElementData { symbol: "Pa", name: "Protactinium", covalent_radius: 2.00 },
    ElementData { symbol: "U", name: "Uranium", covalent_radius: 1.96 },
    ElementData { symbol: "Np", name: "Neptunium", covalent_radius: 1.90 },
    ElementData { symbol: "Pu", name: "Plutonium", covalent_radius: 1.87 },
    ElementData { symbol: "Am", name: "Americium", covalent_radius: 1.80 },
    ElementData { symbol: "Cm", name: "Curium", covalent_radius: 1.69 },
    ElementData { symbol: "Bk", name: "Berkelium", covalent_radius: 1.50 },
    ElementData { symbol: "Cf", name: "Californium", covalent_radius: 1.50 },
    ElementData { symbol: "Es", name: "Einsteinium", covalent_radius: 1.50 },
    ElementData { symbol: "Fm", name: "Fermium", covalent_radius: 1.50 },
    ElementData { symbol: "Md", name: "Mendelevium", covalent_radius: 1.50 },
    ElementData { symbol: "No", name: "Nobelium", covalent_radius: 1.50 },
    ElementData { symbol: "Lr", name: "Lawrencium", covalent_radius: 1.50 },
    ElementData { symbol: "Rf", name: "Rutherfordium", covalent_radius: 1.50 },
    ElementData { symbol: "Db", name: "Dubnium", covalent_radius: 1.50 },
    ElementData { symbol: "Sg", name: "Seaborgium", covalent_radius: 1.50 },
    ElementData { symbol: "Bh", name: "Bohrium", covalent_radius: 1.50 },
    ElementData { symbol: "Hs", name: "Hassium", covalent_radius: 1.50 },
    ElementData { symbol: "Mt", name: "Meitnerium", covalent_radius: 1.50 },
    ElementData { symbol: "Ds", name: "Darmstadtium", covalent_radius: 1.50 },
    ElementData { symbol: "Rg", name: "Roentgenium", covalent_radius: 1.50 },
    ElementData { symbol: "Cn", name: "Copernicium", covalent_radius: 1.50 },
    ElementData { symbol: "Nh", name: "Nihonium", covalent_radius: 1.50 },
    ElementData { symbol: "Fl", name: "Flerovium", covalent_radius: 1.50 },
    ElementData { symbol: "Mc", name: "Moscovium", covalent_radius: 1.50 },
    ElementData { symbol: "Lv", name: "Livermorium", covalent_radius: 1.50 },
    ElementData { symbol: "Ts", name: "Tennessine", covalent_radius: 1.50 },
    ElementData { symbol: "Og", name: "Oganesson", covalent_radius: 1.50 },
];

static SYMBOL_TO_NUMBER: Map<&'static str, u8> = phf_map! {
    "H" => 1, "HE" => 2, "LI" => 3, "BE" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "NE" => 10, "NA" => 11, "MG" => 12, "AL" => 13, "SI" => 14, "P" => 15, "S" => 16,
    "CL" => 17, "AR" => 18, "K" => 19, "CA" => 20, "SC" => 21, "TI" => 22, "V" => 23, "CR" => 24,
    "MN" => 25, "FE" => 26, "CO" => 27, "NI" => 28, "CU" => 29, "ZN" => 30, "GA" => 31, "GE" => 32,
    "AS" => 33, "SE" => 34, "BR" => 35, "KR" => 36, "RB" => 37, "SR" => 38, "Y" => 39, "ZR" => 40,
    "NB" => 41, "MO" => 42, "TC" => 43, "RU" => 44, "RH" => 45, "PD" => 46, "AG" => 47, "CD" => 48,
    "IN" => 49, "SN" => 50, "SB" => 51, "TE" => 52, "I" => 53, "XE" => 54, "CS" => 55, "BA" => 56,
    "LA" => 57, "CE" => 58, "PR" => 59, "ND" => 60, "PM" => 61, "SM" => 62, "EU" => 63, "GD" => 64,
    "TB" => 65, "DY" => 66, "HO" => 67, "ER" => 68, "TM" => 69, "YB" => 70, "LU" => 71, "HF" => 72,
    "TA" => 73, "W" => 74, "RE" => 75, "OS" => 76, "IR" => 77, "PT" => 78, "AU" => 79, "HG" => 80,
    "TL" => 81, "PB" => 82, "BI" => 83, "PO" => 84, "AT" => 85, "RN" => 86, "FR" => 87, "RA" => 88,
    "AC" => 89, "TH" => 90, "PA" => 91, "U" => 92, "NP" => 93, "PU" => 94, "AM" => 95, "CM" => 96,
    "BK" => 97, "CF" => 98, "ES" => 99, "FM" => 100, "MD" => 101, "NO" => 102, "LR" => 103, "RF" => 104,
    "DB" => 105, "SG" => 106, "BH" => 107, "HS" => 108, "MT" => 109, "DS" => 110, "RG" => 111, "CN" => 112,
    "NH" => 113, "FL" => 114, "MC" => 115, "LV" => 116, "TS" => 117, "OG" => 118,
    "D" => 1, "T" => 1,
};

/// A chemical element, identified by its atomic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub struct Element(u8);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol: '{0}'")]
pub struct UnknownElementError(pub String);

impl Element {
    pub const HYDROGEN: Element = Element(1);
    pub const CARBON: Element = Element(6);
    pub const NITROGEN: Element = Element(7);
    pub const OXYGEN: Element = Element(8);
    pub const SULFUR: Element = Element(16);

    /// Looks up an element by symbol, ignoring case and surrounding whitespace.
    ///
    /// The isotope symbols `D` and `T` resolve to hydrogen.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() || symbol.len() > 2 {
            return None;
        }
        SYMBOL_TO_NUMBER
            .get(symbol.to_ascii_uppercase().as_str())
            .map(|&number| Element(number))
    }

    /// Looks up an element by atomic number (1..=118).
    pub fn from_atomic_number(number: u8) -> Option<Self> {
        (1..=ELEMENTS.len() as u8)
            .contains(&number)
            .then_some(Element(number))
    }

    pub fn atomic_number(self) -> u8 {
        self.0
    }

    /// The canonical symbol, e.g. "Fe".
    pub fn symbol(self) -> &'static str {
        self.data().symbol
    }

    pub fn name(self) -> &'static str {
        self.data().name
    }

    /// Single-bond covalent radius in Angstroms.
    pub fn radius(self) -> f32 {
        self.data().covalent_radius
    }

    fn data(self) -> &'static ElementData {
        &ELEMENTS[self.0 as usize - 1]
    }
}

impl FromStr for Element {
    type Err = UnknownElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::from_symbol(s).ok_or_else(|| UnknownElementError(s.trim().to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl From<Element> for &'static str {
    fn from(element: Element) -> Self {
        element.symbol()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol_is_case_insensitive() {
        assert_eq!(Element::from_symbol("FE").map(Element::atomic_number), Some(26));
        assert_eq!(Element::from_symbol("Fe").map(Element::atomic_number), Some(26));
        assert_eq!(Element::from_symbol("fe").map(Element::atomic_number), Some(26));
        assert_eq!(Element::from_symbol(" C ").map(Element::atomic_number), Some(6));
    }

    #[test]
    fn from_symbol_rejects_unknown_symbols() {
        assert!(Element::from_symbol("").is_none());
        assert!(Element::from_symbol("X").is_none());
        assert!(Element::from_symbol("Qq").is_none());
        assert!(Element::from_symbol("CAL").is_none());
        assert!(Element::from_symbol("1").is_none());
    }

    #[test]
    fn isotope_symbols_resolve_to_hydrogen() {
        assert_eq!(Element::from_symbol("D"), Some(Element::HYDROGEN));
        assert_eq!(Element::from_symbol("T"), Some(Element::HYDROGEN));
    }

    #[test]
    fn table_is_indexed_by_atomic_number() {
        for number in 1..=118u8 {
            let element = Element::from_atomic_number(number).unwrap();
            assert_eq!(Element::from_symbol(element.symbol()), Some(element));
        }
        assert!(Element::from_atomic_number(0).is_none());
        assert!(Element::from_atomic_number(119).is_none());
    }

    #[test]
    fn accessors_return_expected_values() {
        let carbon = Element::CARBON;
        assert_eq!(carbon.symbol(), "C");
        assert_eq!(carbon.name(), "Carbon");
        assert!((carbon.radius() - 0.76).abs() < 1e-6);
        assert_eq!(carbon.to_string(), "C");
        assert_eq!("ZN".parse::<Element>().unwrap().name(), "Zinc");
        assert_eq!(
            "Xx".parse::<Element>(),
            Err(UnknownElementError("Xx".to_string()))
        );
    }
}
