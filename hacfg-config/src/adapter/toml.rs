//! TOML configuration adapter

use hacfg_core::config::Configuration;
use hacfg_core::error::{Error, Result};

/// TOML configuration adapter
pub struct TomlAdapter;

impl TomlAdapter {
    pub fn parse(input: &str) -> Result<Configuration> {
        toml::from_str(input).map_err(|e| Error::Serialize(e.to_string()))
    }

    pub fn serialize(config: &Configuration) -> Result<String> {
        toml::to_string_pretty(config).map_err(|e| Error::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load;

    #[test]
    fn test_toml_roundtrip() {
        let config = load("global\n    maxconn 100\nuserlist admins\n    user bob password $6$x groups ops\n").unwrap();
        let text = TomlAdapter::serialize(&config).unwrap();
        assert!(text.contains("[[userlists]]"));
        assert_eq!(TomlAdapter::parse(&text).unwrap(), config);
    }
}
