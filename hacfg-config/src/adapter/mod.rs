//! Serialization adapters for the configuration model

mod json;
mod toml;

pub use self::json::JsonAdapter;
pub use self::toml::TomlAdapter;
