use std::time::Duration;
use thiserror::Error;

/// A User-Agent some archive servers accept when they reject library defaults.
pub const PERMISSIVE_USER_AGENT: &str = "Mozilla/4.0 (compatible; MSIE 6.0;Windows NT 5.1; SV1)";
/// Rough ratio of decompressed to compressed size used for gzip progress estimates.
pub const DEFAULT_GZIP_SIZE_FACTOR: u64 = 4;
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Load every MODEL block, giving each model its own set of chains.
    pub treat_models_as_subunits: bool,
    /// Turn CONECT records into bonds.
    pub read_connectivity: bool,
    pub gzip_size_factor: u64,
    pub user_agent: String,
    pub network_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            treat_models_as_subunits: false,
            read_connectivity: true,
            gzip_size_factor: DEFAULT_GZIP_SIZE_FACTOR,
            user_agent: PERMISSIVE_USER_AGENT.to_string(),
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
        }
    }
}

#[derive(Default)]
pub struct LoaderConfigBuilder {
    treat_models_as_subunits: Option<bool>,
    read_connectivity: Option<bool>,
    gzip_size_factor: Option<u64>,
    user_agent: Option<String>,
    network_timeout: Option<Duration>,
}

impl LoaderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn treat_models_as_subunits(mut self, enabled: bool) -> Self {
        self.treat_models_as_subunits = Some(enabled);
        self
    }
    pub fn read_connectivity(mut self, enabled: bool) -> Self {
        self.read_connectivity = Some(enabled);
        self
    }
    pub fn gzip_size_factor(mut self, factor: u64) -> Self {
        self.gzip_size_factor = Some(factor);
        self
    }
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
    pub fn network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<LoaderConfig, ConfigError> {
        let defaults = LoaderConfig::default();

        let gzip_size_factor = self.gzip_size_factor.unwrap_or(defaults.gzip_size_factor);
        if gzip_size_factor == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "gzip_size_factor",
                reason: "must be at least 1".to_string(),
            });
        }

        let user_agent = self.user_agent.unwrap_or(defaults.user_agent);
        if user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "user_agent",
                reason: "must not be empty".to_string(),
            });
        }

        let network_timeout = self.network_timeout.unwrap_or(defaults.network_timeout);
        if network_timeout.is_zero() {
            return Err(ConfigError::InvalidParameter {
                name: "network_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(LoaderConfig {
            treat_models_as_subunits: self
                .treat_models_as_subunits
                .unwrap_or(defaults.treat_models_as_subunits),
            read_connectivity: self.read_connectivity.unwrap_or(defaults.read_connectivity),
            gzip_size_factor,
            user_agent,
            network_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_without_overrides_yields_defaults() {
        let config = LoaderConfigBuilder::new().build().unwrap();
        assert_eq!(config, LoaderConfig::default());
        assert!(!config.treat_models_as_subunits);
        assert!(config.read_connectivity);
        assert_eq!(config.gzip_size_factor, 4);
        assert_eq!(config.user_agent, PERMISSIVE_USER_AGENT);
    }

    #[test]
    fn builder_applies_overrides() {
        let config = LoaderConfigBuilder::new()
            .treat_models_as_subunits(true)
            .read_connectivity(false)
            .gzip_size_factor(8)
            .user_agent("pdbkit-test")
            .network_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert!(config.treat_models_as_subunits);
        assert!(!config.read_connectivity);
        assert_eq!(config.gzip_size_factor, 8);
        assert_eq!(config.user_agent, "pdbkit-test");
        assert_eq!(config.network_timeout, Duration::from_secs(5));
    }

    #[test]
    fn builder_rejects_invalid_values() {
        assert!(matches!(
            LoaderConfigBuilder::new().gzip_size_factor(0).build(),
            Err(ConfigError::InvalidParameter { name: "gzip_size_factor", .. })
        ));
        assert!(matches!(
            LoaderConfigBuilder::new().user_agent("  ").build(),
            Err(ConfigError::InvalidParameter { name: "user_agent", .. })
        ));
        assert!(matches!(
            LoaderConfigBuilder::new().network_timeout(Duration::ZERO).build(),
            Err(ConfigError::InvalidParameter { name: "network_timeout", .. })
        ));
    }
}
