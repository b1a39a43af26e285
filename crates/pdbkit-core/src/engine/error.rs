use crate::core::io::pdb::ParseErrorKind;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported source '{0}': expected a .pdb or .ent name with a file:, http:, https: or ftp: scheme")]
    Unsupported(String),

    #[error("Scheme '{scheme}' is recognized but cannot be fetched: {source_name}")]
    UnsupportedScheme { scheme: String, source_name: String },

    #[error("I/O error for '{source_name}': {source}")]
    Io {
        source_name: String,
        source: io::Error,
    },

    #[error("Source '{0}' is empty")]
    EmptySource(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },

    #[error("Loading '{0}' was cancelled")]
    Cancelled(String),
}

impl LoadError {
    pub(crate) fn io(source_name: &str, source: io::Error) -> Self {
        Self::Io {
            source_name: source_name.to_string(),
            source,
        }
    }
}
