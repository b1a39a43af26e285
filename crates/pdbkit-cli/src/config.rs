use crate::cli::LoaderArgs;
use crate::error::{CliError, Result};
use directories::ProjectDirs;
use pdbkit::engine::config::{LoaderConfig, LoaderConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialLoaderSection {
    treat_models_as_subunits: Option<bool>,
    read_connectivity: Option<bool>,
    gzip_size_factor: Option<u64>,
    user_agent: Option<String>,
    network_timeout_secs: Option<u64>,
}

/// Loader settings read from a TOML file, before command line overrides are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialLoaderConfig {
    loader: Option<PartialLoaderSection>,
}

impl PartialLoaderConfig {
    /// The per-user configuration file location, e.g. `~/.config/pdbkit/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "pdbkit", "pdbkit").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Reads `explicit` if given, otherwise the default file if it exists, otherwise
    /// starts from an empty configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No configuration file found, using built-in defaults.");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &LoaderArgs) -> Result<LoaderConfig> {
        self.apply_set_values(&args.set_values)?;
        let file = self.loader.take().unwrap_or_default();

        let mut builder = LoaderConfigBuilder::new();
        if args.models_as_subunits {
            builder = builder.treat_models_as_subunits(true);
        } else if let Some(value) = file.treat_models_as_subunits {
            builder = builder.treat_models_as_subunits(value);
        }
        if args.no_connectivity {
            builder = builder.read_connectivity(false);
        } else if let Some(value) = file.read_connectivity {
            builder = builder.read_connectivity(value);
        }
        if let Some(factor) = args.gzip_size_factor.or(file.gzip_size_factor) {
            builder = builder.gzip_size_factor(factor);
        }
        if let Some(agent) = args.user_agent.clone().or(file.user_agent) {
            builder = builder.user_agent(agent);
        }
        if let Some(secs) = args.timeout.or(file.network_timeout_secs) {
            builder = builder.network_timeout(Duration::from_secs(secs));
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let section = self.loader.get_or_insert_with(Default::default);

            match key.trim() {
                "loader.treat-models-as-subunits" => {
                    section.treat_models_as_subunits = Some(parse_value(key, value_str)?);
                }
                "loader.read-connectivity" => {
                    section.read_connectivity = Some(parse_value(key, value_str)?);
                }
                "loader.gzip-size-factor" => {
                    section.gzip_size_factor = Some(parse_value(key, value_str)?);
                }
                "loader.user-agent" => {
                    section.user_agent = Some(value_str.to_string());
                }
                "loader.network-timeout-secs" => {
                    section.network_timeout_secs = Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}
