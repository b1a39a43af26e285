//! Crystallographic symmetry operations written in shorthand, e.g. `"-x,y+1/2,-z"`.
//!
//! Each of the three comma-separated terms names exactly one axis, optionally signed,
//! and an optional constant translation written either before (`1/2-x`) or after
//! (`-x+1/2`) the axis. The whole string is validated before a matrix is produced.

use super::matrix::TransformationMatrix;
use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymmetryParseError {
    #[error("Expected 3 comma-separated terms, found {0}")]
    TermCount(usize),
    #[error("Term '{0}' names no axis (x, y or z)")]
    MissingAxis(String),
    #[error("Term '{0}' names more than one axis")]
    MultipleAxes(String),
    #[error("Term '{0}' is malformed")]
    MalformedTerm(String),
    #[error("Invalid constant '{constant}' in term '{term}'")]
    InvalidConstant { term: String, constant: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisTerm {
    axis: usize,
    sign: f64,
    translation: f64,
}

/// Builds the fractional-space matrix for a symmetry operation string.
///
/// Whitespace is ignored and axis letters may be upper or lower case. The returned
/// matrix has a signed permutation as its rotation block, the constants as its
/// translation column, and `operation` set to the input string.
///
/// # Errors
///
/// Returns a [`SymmetryParseError`] if the string does not consist of exactly three
/// well-formed terms. No partially built matrix is ever returned.
pub fn from_symmetry_operation(operation: &str) -> Result<TransformationMatrix, SymmetryParseError> {
    let normalized: String = operation
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let raw_terms: Vec<&str> = normalized.split(',').collect();
    if raw_terms.len() != 3 {
        return Err(SymmetryParseError::TermCount(raw_terms.len()));
    }
    let terms = raw_terms
        .iter()
        .map(|term| parse_term(term))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rotation = Matrix3::zeros();
    let mut translation = Vector3::zeros();
    for (row, term) in terms.iter().enumerate() {
        rotation[(row, term.axis)] = term.sign;
        translation[row] = term.translation;
    }

    let mut matrix = TransformationMatrix::from_rotation_translation(&rotation, &translation);
    matrix.operation = Some(operation.trim().to_string());
    Ok(matrix)
}

fn parse_term(term: &str) -> Result<AxisTerm, SymmetryParseError> {
    let mut axes = term
        .char_indices()
        .filter_map(|(i, c)| axis_index(c).map(|axis| (i, axis)));
    let (position, axis) = axes
        .next()
        .ok_or_else(|| SymmetryParseError::MissingAxis(term.to_string()))?;
    if axes.next().is_some() {
        return Err(SymmetryParseError::MultipleAxes(term.to_string()));
    }

    let before = &term[..position];
    let after = &term[position + 1..];

    let (leading, sign) = match before.chars().last() {
        None => ("", 1.0),
        Some('-') => (&before[..before.len() - 1], -1.0),
        Some('+') => (&before[..before.len() - 1], 1.0),
        Some(_) => return Err(SymmetryParseError::MalformedTerm(term.to_string())),
    };

    let constant = match (leading.is_empty(), after.is_empty()) {
        (true, true) => None,
        (false, true) => Some(leading),
        (true, false) if after.starts_with(['+', '-']) => Some(after),
        _ => return Err(SymmetryParseError::MalformedTerm(term.to_string())),
    };

    let translation = match constant {
        None => 0.0,
        Some(text) => parse_constant(text).ok_or_else(|| SymmetryParseError::InvalidConstant {
            term: term.to_string(),
            constant: text.to_string(),
        })?,
    };

    Ok(AxisTerm {
        axis,
        sign,
        translation,
    })
}

fn axis_index(c: char) -> Option<usize> {
    match c {
        'x' => Some(0),
        'y' => Some(1),
        'z' => Some(2),
        _ => None,
    }
}

// Parses "[+-]n", "[+-]n/d" or "[+-]0.5".
fn parse_constant(text: &str) -> Option<f64> {
    let (negated, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let parse_part = |part: &str| -> Option<f64> {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        part.parse::<f64>().ok()
    };

    let mut parts = unsigned.split('/');
    let numerator = parse_part(parts.next()?)?;
    let value = match (parts.next(), parts.next()) {
        (None, _) => numerator,
        (Some(denominator), None) => {
            let denominator = parse_part(denominator)?;
            if denominator == 0.0 {
                return None;
            }
            numerator / denominator
        }
        (Some(_), Some(_)) => return None,
    };

    Some(if negated { -value } else { value })
}
