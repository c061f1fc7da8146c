//! Process configuration read from the environment (after `.env` is loaded).

use std::str::FromStr;
use thiserror::Error;

use crate::domain::aggregates::Warehouse;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat { #[default] Pretty, Json }

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// In-memory stores are used when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub nats_url: Option<String>,
    pub log_format: LogFormat,
    /// Warehouse directory seed, a JSON array of `{id, name, location}`.
    pub warehouses: Vec<Warehouse>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let log_format = match non_empty("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::Invalid { name: "LOG_FORMAT", value: other.to_string() }),
        };
        Ok(Self {
            port: parse_or(non_empty("PORT"), "PORT", 8083)?,
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parse_or(non_empty("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 10)?,
            nats_url: non_empty("NATS_URL"),
            log_format,
            warehouses: match non_empty("WAREHOUSES") {
                None => Vec::new(),
                Some(raw) => serde_json::from_str(&raw).map_err(|_| ConfigError::Invalid { name: "WAREHOUSES", value: raw })?,
            },
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8083);
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.warehouses.is_empty());
    }

    #[test]
    fn test_warehouse_seed() {
        let config = Config::from_lookup(lookup(&[
            ("WAREHOUSES", r#"[{"id":"WH1","name":"Lagos Central","location":"Ikeja"},{"id":"WH2","name":"Abuja North","location":"Kubwa"}]"#),
        ]))
        .unwrap();
        assert_eq!(config.warehouses.len(), 2);
        assert_eq!(config.warehouses[0], Warehouse::new("WH1", "Lagos Central", "Ikeja"));

        let err = Config::from_lookup(lookup(&[("WAREHOUSES", "WH1")])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { name: "WAREHOUSES", value: "WH1".into() });
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"), ("DATABASE_URL", "postgres://localhost/fulfillment"), ("LOG_FORMAT", "json"), ("NATS_URL", " "),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/fulfillment"));
        assert_eq!(config.nats_url, None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { name: "PORT", value: "eighty".into() });
        assert!(Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
