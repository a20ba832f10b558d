//! JSON configuration adapter

use hacfg_core::config::Configuration;
use hacfg_core::error::{Error, Result};

/// JSON configuration adapter
pub struct JsonAdapter;

impl JsonAdapter {
    /// Parse a JSON dump back into a configuration
    pub fn parse(input: &str) -> Result<Configuration> {
        serde_json::from_str(input).map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn serialize(config: &Configuration) -> Result<String> {
        serde_json::to_string_pretty(config).map_err(|e| Error::Serialize(e.to_string()))
    }
}
