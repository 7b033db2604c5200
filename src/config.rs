use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use sms_core::SmsError;
use sms_onfon::{DispatchOptions, Pacing};
use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Batching, pacing and transport settings
    pub dispatch: DispatchSettings,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Dispatch tuning
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Recipients per request (default: 20)
    pub batch_size: usize,
    /// Pause after this many batches (default: 40)
    pub pause_every: usize,
    /// Pause length in milliseconds (default: 1000)
    pub pause_millis: u64,
    /// Per-request timeout in seconds; unset keeps the HTTP client default
    pub request_timeout_seconds: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json or pretty (default: json)
    pub format: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 20,
            pause_every: 40,
            pause_millis: 1000,
            request_timeout_seconds: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl DispatchSettings {
    pub fn options(&self) -> Result<DispatchOptions, SmsError> {
        let options = DispatchOptions {
            batch_size: self.batch_size,
            pacing: Pacing {
                every: self.pause_every,
                pause: Duration::from_millis(self.pause_millis),
            },
        };
        options.validate()?;
        Ok(options)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // ONFON__DISPATCH__BATCH_SIZE=10 etc.
            .add_source(Environment::with_prefix("ONFON").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_provider_limits() {
        let cfg = AppConfig::default();
        let options = cfg.dispatch.options().unwrap();
        assert_eq!(options, DispatchOptions::default());
        assert_eq!(cfg.dispatch.request_timeout(), None);
        assert_eq!(cfg.logging.format, "json");
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let settings = DispatchSettings {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(settings.options(), Err(SmsError::Invalid(_))));
    }

    #[test]
    fn layered_sources_override_defaults() {
        let cfg: AppConfig = Config::builder()
            .add_source(Config::try_from(&AppConfig::default()).unwrap())
            .set_override("dispatch.batch_size", 10)
            .unwrap()
            .set_override("dispatch.request_timeout_seconds", 15)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.dispatch.batch_size, 10);
        assert_eq!(cfg.dispatch.pause_every, 40);
        assert_eq!(cfg.dispatch.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn prefixed_environment_overrides_defaults() {
        std::env::set_var("ONFON__DISPATCH__BATCH_SIZE", "7");
        std::env::set_var("ONFON__LOGGING__FORMAT", "pretty");
        let loaded = AppConfig::load();
        std::env::remove_var("ONFON__DISPATCH__BATCH_SIZE");
        std::env::remove_var("ONFON__LOGGING__FORMAT");

        let cfg = loaded.unwrap();
        assert_eq!(cfg.dispatch.batch_size, 7);
        assert_eq!(cfg.dispatch.pause_every, 40);
        assert_eq!(cfg.logging.format, "pretty");
        assert_eq!(cfg.logging.level, "info");
    }
}
