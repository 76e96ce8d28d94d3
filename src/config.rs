//! Configuration management for the service watcher

use crate::errors::{MonitorError, Result};
use crate::service::Service;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ordered list of services to monitor at startup
    pub services: Vec<Service>,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.services.is_empty() {
            return Err("at least one service must be configured".to_string());
        }

        for service in &self.services {
            service.validate().map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Validate and convert into the service list, for callers that want a
    /// single error type.
    pub fn into_services(self) -> Result<Vec<Service>> {
        self.validate().map_err(MonitorError::Config)?;
        Ok(self.services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::PollUnit;
    use std::io::Write;

    fn valid_service() -> Service {
        Service::new("api", "127.0.0.1:8080", 30, PollUnit::Seconds)
    }

    #[test]
    fn test_empty_config_is_invalid() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config() {
        let config = Config {
            services: vec![valid_service()],
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_with_bad_service_is_invalid() {
        let config = Config {
            services: vec![Service::new("api", "badhost", 1, PollUnit::Seconds)],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "services": [
                    {{"name": "api", "address": "127.0.0.1:8080",
                      "poll_interval": 30, "poll_unit": "seconds"}},
                    {{"name": "db", "address": "db.internal:5432",
                      "poll_interval": 1, "poll_unit": "minutes"}}
                ]
            }}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.services[0].name, "api");
        assert_eq!(config.services[1].poll_unit, PollUnit::Minutes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::from_file("/definitely/not/here.json");
        assert!(matches!(result, Err(MonitorError::Io(_))));
    }

    #[test]
    fn test_load_malformed_json_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(MonitorError::Json(_))));
    }
}
