//! Core configuration traits

use super::ConfigError;
use std::path::Path;

/// Core trait for registry configuration types
pub trait SasConfig: Clone + Send + Sync + 'static {
    /// Load configuration from a TOML file
    fn load_from_file(path: &Path) -> Result<Self, ConfigError>;

    /// Merge `SAS_`-prefixed environment variables over the loaded values
    fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Merge an explicit set of variables (environment or tests)
    fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;
}
