use anyhow::Result;
use config::{Config, File};
use core_logic::{ConfigError, RetryConfig};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct MonadConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_ip_echo_url")]
    pub ip_echo_url: String,
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,
    #[serde(default = "default_proxy_file")]
    pub proxy_file: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
}

fn default_api_base_url() -> String {
    "https://mscore.onrender.com".to_string()
}

fn default_ip_echo_url() -> String {
    "https://api.ipify.org?format=json".to_string()
}

fn default_origin() -> String {
    "https://monadscore.xyz".to_string()
}

fn default_accounts_file() -> String {
    core_logic::WalletManager::ACCOUNTS_FILE.to_string()
}

fn default_proxy_file() -> String {
    core_logic::ProxyManager::PROXY_FILE.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_cycle_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_step_delay_ms() -> u64 {
    500
}

impl Default for MonadConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            ip_echo_url: default_ip_echo_url(),
            origin: default_origin(),
            accounts_file: default_accounts_file(),
            proxy_file: default_proxy_file(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            request_timeout_secs: default_request_timeout_secs(),
            cycle_interval_secs: default_cycle_interval_secs(),
            step_delay_ms: default_step_delay_ms(),
        }
    }
}

impl MonadConfig {
    /// Loads settings from a TOML file. A missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;

        let config: MonadConfig = settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("ip_echo_url", &self.ip_echo_url),
            ("origin", &self.origin),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    field: field.to_string(),
                    url: value.clone(),
                });
            }
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier".to_string(),
                reason: format!("must be >= 1.0, got {}", self.backoff_multiplier),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.max_attempts, self.initial_backoff_ms)
            .with_multiplier(self.backoff_multiplier)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Full URL of a scoring service endpoint, e.g. `endpoint("/user/login")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = MonadConfig::load(path.to_str().unwrap()).unwrap();

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_backoff_ms, 2000);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.cycle_interval(), Duration::from_secs(86_400));
        assert_eq!(
            config.endpoint("/user/login"),
            "https://mscore.onrender.com/user/login"
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "api_base_url = \"http://127.0.0.1:9000/\"").unwrap();
        writeln!(file, "max_attempts = 5").unwrap();

        let config = MonadConfig::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.endpoint("/user"), "http://127.0.0.1:9000/user");
        assert_eq!(config.proxy_file, "proxy.txt");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = MonadConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let config = MonadConfig {
            origin: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
