use crate::core::geometry::cell::UnitCell;
use crate::core::geometry::matrix::TransformationMatrix;
use crate::core::geometry::symmetry::{SymmetryParseError, from_symmetry_operation};
use crate::core::models::atom::RecordKind;
use crate::core::utils::periodic::Element;
use nalgebra::{Matrix3, Point3, Vector3};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("No element symbol could be derived (element column '{element}', atom name '{name}')")]
    UnknownElement { element: String, name: String },
    #[error("Invalid {field} value '{value}'")]
    InvalidValue { field: &'static str, value: String },
    #[error("Non-ASCII character in fixed-column field at column {column}")]
    NonAsciiColumn { column: usize },
    #[error("Invalid symmetry operation '{operation}': {source}")]
    InvalidSymmetryOperation {
        operation: String,
        source: SymmetryParseError,
    },
}

/// The record types the loader acts on; everything else is [`RecordType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Atom,
    Hetatm,
    Model,
    Compound,
    Conect,
    Cryst1,
    /// REMARK 290: crystallographic symmetry.
    SymmetryRemark,
    /// REMARK 350: biological assemblies.
    AssemblyRemark,
    /// MTRIX1..3, carrying the row number.
    Mtrix(usize),
    Other,
}

impl RecordType {
    pub fn of(line: &str) -> Self {
        if line.starts_with("ATOM") {
            Self::Atom
        } else if line.starts_with("HETATM") {
            Self::Hetatm
        } else if line.starts_with("MODEL") {
            Self::Model
        } else if line.starts_with("COMPND") {
            Self::Compound
        } else if line.starts_with("CONECT") {
            Self::Conect
        } else if line.starts_with("CRYST1") {
            Self::Cryst1
        } else if line.starts_with("REMARK 290") {
            Self::SymmetryRemark
        } else if line.starts_with("REMARK 350") {
            Self::AssemblyRemark
        } else if let Some(row) = line.strip_prefix("MTRIX") {
            match row.chars().next() {
                Some('1') => Self::Mtrix(0),
                Some('2') => Self::Mtrix(1),
                Some('3') => Self::Mtrix(2),
                _ => Self::Other,
            }
        } else {
            Self::Other
        }
    }
}

/// The 0-based, end-exclusive column range `start..end`, clamped to the line and trimmed.
pub fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("").trim()
}

/// Width of the fixed-column layout; characters past it do not move any field.
const RECORD_WIDTH: usize = 80;

/// Fails on the first non-ASCII character inside the fixed columns, since a
/// multi-byte character there would shift every later field.
pub fn ensure_ascii_columns(line: &str) -> Result<(), ParseErrorKind> {
    match line
        .char_indices()
        .take_while(|&(index, _)| index < RECORD_WIDTH)
        .find(|(_, c)| !c.is_ascii())
    {
        Some((index, _)) => Err(ParseErrorKind::NonAsciiColumn { column: index + 1 }),
        None => Ok(()),
    }
}

fn columns(start: usize, end: usize) -> String {
    format!("{}-{}", start + 1, end)
}

fn required_int<T: FromStr>(line: &str, start: usize, end: usize) -> Result<T, ParseErrorKind> {
    let value = slice_and_trim(line, start, end);
    if value.is_empty() {
        return Err(ParseErrorKind::MissingRequiredField {
            columns: columns(start, end),
        });
    }
    value.parse().map_err(|_| ParseErrorKind::InvalidInt {
        columns: columns(start, end),
        value: value.into(),
    })
}

fn optional_int<T: FromStr>(line: &str, start: usize, end: usize) -> Result<Option<T>, ParseErrorKind> {
    if slice_and_trim(line, start, end).is_empty() {
        Ok(None)
    } else {
        required_int(line, start, end).map(Some)
    }
}

fn required_float(line: &str, start: usize, end: usize) -> Result<f64, ParseErrorKind> {
    let value = slice_and_trim(line, start, end);
    if value.is_empty() {
        return Err(ParseErrorKind::MissingRequiredField {
            columns: columns(start, end),
        });
    }
    value.parse().map_err(|_| ParseErrorKind::InvalidFloat {
        columns: columns(start, end),
        value: value.into(),
    })
}

fn float_or(line: &str, start: usize, end: usize, default: f32) -> Result<f32, ParseErrorKind> {
    let value = slice_and_trim(line, start, end);
    if value.is_empty() {
        return Ok(default);
    }
    value.parse().map_err(|_| ParseErrorKind::InvalidFloat {
        columns: columns(start, end),
        value: value.into(),
    })
}

fn parse_token<T: FromStr>(token: &str, field: &'static str) -> Result<T, ParseErrorKind> {
    token.parse().map_err(|_| ParseErrorKind::InvalidValue {
        field,
        value: token.to_string(),
    })
}

fn single_char(line: &str, column: usize) -> Option<char> {
    slice_and_trim(line, column, column + 1).chars().next()
}

/// The fields of one ATOM or HETATM record.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub record: RecordKind,
    pub serial: usize,
    pub name: String,
    pub alt_loc: Option<char>,
    pub residue_name: String,
    pub chain_id: String,
    pub residue_number: isize,
    pub insertion_code: Option<char>,
    pub position: Point3<f64>,
    pub occupancy: f32,
    pub b_factor: f32,
    pub element: Element,
}

/// Decodes an ATOM or HETATM line.
///
/// Serial number, residue number and coordinates are required. Occupancy defaults to
/// 1.0 and the temperature factor to 0.0 when blank. The element comes from columns
/// 77-78 with digits removed; when that is blank or not an element, the first
/// character of the atom name is used instead.
pub fn parse_atom_record(line: &str) -> Result<AtomRecord, ParseErrorKind> {
    ensure_ascii_columns(line)?;
    let record = if line.starts_with("HETATM") {
        RecordKind::Hetatm
    } else {
        RecordKind::Atom
    };

    let serial = required_int(line, 6, 11)?;
    let name = slice_and_trim(line, 12, 16).replace('*', "'");
    let element = resolve_element(slice_and_trim(line, 76, 78), &name)?;
    let alt_loc = single_char(line, 16);
    let residue_name = slice_and_trim(line, 17, 20).to_string();
    let chain_id = slice_and_trim(line, 21, 22).to_string();
    let residue_number = required_int(line, 22, 26)?;
    let insertion_code = single_char(line, 26);

    let x = required_float(line, 30, 38)?;
    let y = required_float(line, 38, 46)?;
    let z = required_float(line, 46, 54)?;
    let occupancy = float_or(line, 54, 60, 1.0)?;
    let b_factor = float_or(line, 60, 66, 0.0)?;

    Ok(AtomRecord {
        record,
        serial,
        name,
        alt_loc,
        residue_name,
        chain_id,
        residue_number,
        insertion_code,
        position: Point3::new(x, y, z),
        occupancy,
        b_factor,
        element,
    })
}

fn resolve_element(column: &str, name: &str) -> Result<Element, ParseErrorKind> {
    let symbol: String = column.chars().filter(|c| !c.is_ascii_digit()).collect();
    if let Some(element) = Element::from_symbol(&symbol) {
        return Ok(element);
    }
    name.chars()
        .next()
        .and_then(|first| Element::from_symbol(&first.to_string()))
        .ok_or_else(|| ParseErrorKind::UnknownElement {
            element: column.to_string(),
            name: name.to_string(),
        })
}

/// One sub-field of a COMPND record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompoundField {
    MoleculeId(u32),
    Chains(Vec<String>),
    Molecule(String),
}

/// Decodes the sub-field of a COMPND line, if it carries one the loader uses.
///
/// Keys are searched in the order `MOL_ID:`, `CHAIN:`, `MOLECULE:` and the first one
/// found decides how the line is read. Molecule names are lowercased.
pub fn parse_compound(line: &str) -> Result<Option<CompoundField>, ParseErrorKind> {
    if let Some(value) = value_after(line, "MOL_ID:") {
        return parse_token(&value, "MOL_ID").map(|id| Some(CompoundField::MoleculeId(id)));
    }
    if let Some(value) = value_after(line, "CHAIN:") {
        let chains = value
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        return Ok(Some(CompoundField::Chains(chains)));
    }
    if let Some(value) = value_after(line, "MOLECULE:") {
        return Ok(Some(CompoundField::Molecule(value.to_lowercase())));
    }
    Ok(None)
}

fn value_after(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)? + key.len();
    Some(line[start..].replace(';', "").trim().to_string())
}

/// A CONECT record: one atom and the serials of the atoms it is bonded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConectRecord {
    pub serial: usize,
    pub partners: Vec<usize>,
}

const CONECT_PARTNER_COLUMNS: [(usize, usize); 4] = [(11, 16), (16, 21), (21, 26), (26, 31)];

pub fn parse_conect(line: &str) -> Result<ConectRecord, ParseErrorKind> {
    ensure_ascii_columns(line)?;
    let serial = required_int(line, 6, 11)?;
    let mut partners = Vec::with_capacity(CONECT_PARTNER_COLUMNS.len());
    for (start, end) in CONECT_PARTNER_COLUMNS {
        if let Some(partner) = optional_int(line, start, end)? {
            partners.push(partner);
        }
    }
    Ok(ConectRecord { serial, partners })
}

/// Decodes a CRYST1 record into a unit cell.
pub fn parse_cryst1(line: &str) -> Result<UnitCell, ParseErrorKind> {
    ensure_ascii_columns(line)?;
    let mut cell = UnitCell::new(
        required_float(line, 6, 15)?,
        required_float(line, 15, 24)?,
        required_float(line, 24, 33)?,
        required_float(line, 33, 40)?,
        required_float(line, 40, 47)?,
        required_float(line, 47, 54)?,
    );
    cell.space_group = slice_and_trim(line, 55, 66).to_string();
    cell.z = optional_int(line, 66, 70)?;
    Ok(cell)
}

/// Decodes a row of the REMARK 290 operator table (`NNNMMM   OPERATOR`).
///
/// Returns `Ok(None)` for every other REMARK 290 line, including the SMTRY rows and
/// the table header. The matrix carries the shorthand written as `N_MMM`.
pub fn parse_symmetry_operator(line: &str) -> Result<Option<TransformationMatrix>, ParseErrorKind> {
    let mut tokens = line.get(10..).unwrap_or("").split_whitespace();
    let (Some(code), Some(operation)) = (tokens.next(), tokens.next()) else {
        return Ok(None);
    };
    if code.len() < 4 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None);
    }

    let mut matrix =
        from_symmetry_operation(operation).map_err(|source| ParseErrorKind::InvalidSymmetryOperation {
            operation: operation.to_string(),
            source,
        })?;
    let (number, translation) = code.split_at(code.len() - 3);
    matrix.symmetry_shorthand = Some(format!("{number}_{translation}"));
    matrix.id = Some(number.to_string());
    Ok(Some(matrix))
}

/// A row of a BIOMT or MTRIX operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixRow {
    /// 0-based row index.
    pub row: usize,
    pub serial: u32,
    pub values: [f64; 3],
    pub translation: f64,
}

/// The lines of REMARK 350 the loader uses.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyLine {
    Biomolecule(u32),
    /// "APPLY THE FOLLOWING TO CHAINS:" starts a new chain list.
    Chains(Vec<String>),
    /// "AND CHAINS:" continues the current chain list.
    MoreChains(Vec<String>),
    Operator(MatrixRow),
}

pub fn parse_assembly_remark(line: &str) -> Result<Option<AssemblyLine>, ParseErrorKind> {
    let body = line.get(10..).unwrap_or("").trim();
    if let Some(id) = body.strip_prefix("BIOMOLECULE:") {
        return parse_token(id.trim(), "BIOMOLECULE").map(|id| Some(AssemblyLine::Biomolecule(id)));
    }
    if let Some(value) = value_after(body, "APPLY THE FOLLOWING TO CHAINS:") {
        return Ok(Some(AssemblyLine::Chains(split_chain_list(&value))));
    }
    if let Some(value) = value_after(body, "AND CHAINS:") {
        return Ok(Some(AssemblyLine::MoreChains(split_chain_list(&value))));
    }
    if body.starts_with("BIOMT") {
        let tokens: Vec<&str> = body.split_whitespace().collect();
        let [label, serial, m1, m2, m3, translation, ..] = tokens.as_slice() else {
            return Err(ParseErrorKind::InvalidValue {
                field: "BIOMT",
                value: body.to_string(),
            });
        };
        let row = match label.strip_prefix("BIOMT") {
            Some("1") => 0,
            Some("2") => 1,
            Some("3") => 2,
            _ => {
                return Err(ParseErrorKind::InvalidValue {
                    field: "BIOMT",
                    value: label.to_string(),
                });
            }
        };
        return Ok(Some(AssemblyLine::Operator(MatrixRow {
            row,
            serial: parse_token(serial, "BIOMT serial")?,
            values: [
                parse_token(m1, "BIOMT")?,
                parse_token(m2, "BIOMT")?,
                parse_token(m3, "BIOMT")?,
            ],
            translation: parse_token(translation, "BIOMT")?,
        })));
    }
    Ok(None)
}

fn split_chain_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// An MTRIXn record. `given` is true when the copy is already in the coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MtrixRecord {
    pub row: MatrixRow,
    pub given: bool,
}

pub fn parse_mtrix(line: &str, row: usize) -> Result<MtrixRecord, ParseErrorKind> {
    ensure_ascii_columns(line)?;
    Ok(MtrixRecord {
        row: MatrixRow {
            row,
            serial: required_int(line, 7, 10)?,
            values: [
                required_float(line, 10, 20)?,
                required_float(line, 20, 30)?,
                required_float(line, 30, 40)?,
            ],
            translation: required_float(line, 45, 55)?,
        },
        given: slice_and_trim(line, 59, 60) == "1",
    })
}

/// Collects operator rows by serial number and yields each matrix once its third row
/// has arrived.
#[derive(Debug, Default)]
pub struct MatrixRowAssembler {
    pending: BTreeMap<u32, [Option<MatrixRow>; 3]>,
}

impl MatrixRowAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: MatrixRow) -> Option<TransformationMatrix> {
        let slots = self.pending.entry(row.serial).or_default();
        slots[row.row.min(2)] = Some(row);
        let [Some(r1), Some(r2), Some(r3)] = *slots else {
            return None;
        };
        self.pending.remove(&row.serial);

        let rotation = Matrix3::new(
            r1.values[0], r1.values[1], r1.values[2],
            r2.values[0], r2.values[1], r2.values[2],
            r3.values[0], r3.values[1], r3.values[2],
        );
        let translation = Vector3::new(r1.translation, r2.translation, r3.translation);
        let mut matrix = TransformationMatrix::from_rotation_translation(&rotation, &translation);
        matrix.id = Some(row.serial.to_string());
        Some(matrix)
    }

    /// True when rows of an operator were seen without all three arriving.
    pub fn has_incomplete(&self) -> bool {
        !self.pending.is_empty()
    }
}
