use pdbkit::core::geometry::cell::UnitCellError;
use pdbkit::core::geometry::matrix::MatrixError;
use pdbkit::core::geometry::symmetry::SymmetryParseError;
use pdbkit::engine::error::LoadError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid symmetry operation: {0}")]
    Symmetry(#[from] SymmetryParseError),

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    #[error("Unit cell error: {0}")]
    UnitCell(#[from] UnitCellError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
