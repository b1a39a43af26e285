use super::config::LoaderConfig;
use super::error::LoadError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

const LOADABLE_EXTENSIONS: [&str; 2] = [".pdb", ".ent"];
const LOADABLE_SCHEMES: [&str; 4] = ["file:", "http:", "https:", "ftp:"];
const GZIP_SUFFIX: &str = ".gz";

/// Where a source name points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    File(PathBuf),
    Url(String),
}

impl SourceLocation {
    /// Classifies a name: `http:`, `https:` and `ftp:` names are URLs, `file:` URLs and
    /// everything else are local paths.
    pub fn classify(name: &str) -> Self {
        if let Some(path) = name.strip_prefix("file:") {
            let path = path.strip_prefix("//").unwrap_or(path);
            return Self::File(PathBuf::from(path));
        }
        if url_scheme(name).is_some() {
            Self::Url(name.to_string())
        } else {
            Self::File(PathBuf::from(name))
        }
    }
}

pub(crate) fn url_scheme(name: &str) -> Option<&'static str> {
    ["http:", "https:", "ftp:"]
        .into_iter()
        .find(|scheme| name.starts_with(scheme))
}

/// True when `name` looks like a PDB file behind a scheme the loader understands.
pub fn is_loadable_name(name: &str) -> bool {
    LOADABLE_EXTENSIONS.iter().any(|ext| name.contains(ext))
        && LOADABLE_SCHEMES.iter().any(|scheme| name.starts_with(scheme))
}

/// The `file:` URL form of a path, made absolute without touching the filesystem.
pub fn file_url(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file:{}", absolute.display())
}

pub fn is_gzip(name: &str) -> bool {
    name.ends_with(GZIP_SUFFIX)
}

/// An open source, ready to be read line by line.
pub struct OpenedSource {
    /// The resolved identifier the structure is stamped with.
    pub name: String,
    pub reader: Box<dyn BufRead + Send>,
    /// Estimated decompressed size, if known.
    pub expected_bytes: Option<u64>,
}

fn wrap_reader<R: Read + Send + 'static>(inner: R, gzip: bool) -> Box<dyn BufRead + Send> {
    if gzip {
        Box::new(BufReader::new(GzDecoder::new(inner)))
    } else {
        Box::new(BufReader::new(inner))
    }
}

fn scale_expected(length: u64, gzip: bool, config: &LoaderConfig) -> u64 {
    if gzip {
        length.saturating_mul(config.gzip_size_factor)
    } else {
        length
    }
}

/// Opens a local file. Missing, unreadable and zero-length files are errors.
pub fn open_path(path: &Path, config: &LoaderConfig) -> Result<OpenedSource, LoadError> {
    let name = file_url(path);
    let metadata = std::fs::metadata(path).map_err(|e| LoadError::io(&name, e))?;
    if metadata.len() == 0 {
        return Err(LoadError::EmptySource(name));
    }
    let file = File::open(path).map_err(|e| LoadError::io(&name, e))?;
    let gzip = is_gzip(&name);
    debug!(source = %name, bytes = metadata.len(), gzip, "Opened local source");

    Ok(OpenedSource {
        reader: wrap_reader(file, gzip),
        expected_bytes: Some(scale_expected(metadata.len(), gzip, config)),
        name,
    })
}

/// Fetches a URL with the configured User-Agent and timeout.
pub fn open_url(url: &str, config: &LoaderConfig) -> Result<OpenedSource, LoadError> {
    if let Some(scheme @ "ftp:") = url_scheme(url) {
        return Err(LoadError::UnsupportedScheme {
            scheme: scheme.trim_end_matches(':').to_string(),
            source_name: url.to_string(),
        });
    }

    let client = reqwest::blocking::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.network_timeout)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    let length = response.content_length();
    if length == Some(0) {
        return Err(LoadError::EmptySource(url.to_string()));
    }
    let gzip = is_gzip(url);
    debug!(source = %url, bytes = ?length, gzip, "Opened network source");

    Ok(OpenedSource {
        name: url.to_string(),
        reader: wrap_reader(response, gzip),
        expected_bytes: length.map(|len| scale_expected(len, gzip, config)),
    })
}
