//! Resolution of the four required dispatch settings.
//!
//! Sources are consulted in order and the first non-empty value wins. The
//! usual chain is host application settings, then the process environment,
//! then caller defaults.

use sms_core::{
    DispatchConfig, SmsError, REQUIRED_KEYS, SMS_API_KEY, SMS_API_URL, SMS_CLIENT_ID,
    SMS_SENDER_ID,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A place settings can come from.
pub trait SettingsSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Key/value settings handed over by a host application.
#[derive(Debug, Clone, Default)]
pub struct HostSettings(HashMap<String, String>);

impl HostSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HostSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl SettingsSource for HostSettings {
    fn name(&self) -> &'static str {
        "host"
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Caller-supplied fallbacks, consulted last.
#[derive(Debug, Clone, Default)]
pub struct Defaults(HostSettings);

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self(self.0.with(key, value))
    }
}

impl SettingsSource for Defaults {
    fn name(&self) -> &'static str {
        "defaults"
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.0.lookup(key)
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl SettingsSource for EnvSettings {
    fn name(&self) -> &'static str {
        "env"
    }

    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Host applications configured through the `config` crate.
impl SettingsSource for config::Config {
    fn name(&self) -> &'static str {
        "config"
    }

    fn lookup(&self, key: &str) -> Option<String> {
        // Some `config` versions lowercase keys on insert.
        self.get_string(key)
            .or_else(|_| self.get_string(&key.to_lowercase()))
            .ok()
    }
}

/// Load a `.env` file into the process environment if one exists.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded .env from {}", path.display()),
        Err(e) if e.not_found() => debug!("no .env file found"),
        Err(e) => warn!("could not load .env file: {}", e),
    }
}

/// Ordered chain of [`SettingsSource`]s.
#[derive(Default)]
pub struct Resolver {
    sources: Vec<Box<dyn SettingsSource>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host settings (if any), then the environment, then `defaults`.
    pub fn standard(host: Option<HostSettings>, defaults: Defaults) -> Self {
        let mut resolver = Self::new();
        if let Some(host) = host {
            resolver = resolver.source(host);
        }
        resolver.source(EnvSettings).source(defaults)
    }

    pub fn source(mut self, source: impl SettingsSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// First non-blank value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.sources.iter().find_map(|source| {
            let value = source.lookup(key).filter(|v| !v.trim().is_empty())?;
            debug!(key, source = source.name(), "setting resolved");
            Some(value)
        })
    }

    /// Resolve every required key or report all of the missing ones.
    pub fn resolve(&self) -> Result<DispatchConfig, SmsError> {
        match REQUIRED_KEYS.map(|key| self.get(key)) {
            [Some(api_url), Some(client_id), Some(api_key), Some(sender_id)] => Ok(DispatchConfig {
                api_url,
                client_id,
                api_key,
                sender_id,
            }),
            values => Err(SmsError::Configuration {
                missing: REQUIRED_KEYS
                    .into_iter()
                    .zip(values)
                    .filter(|(_, value)| value.is_none())
                    .map(|(key, _)| key)
                    .collect(),
            }),
        }
    }
}

/// Full host settings for the four keys, handy for tests and demos.
pub fn host_settings(config: &DispatchConfig) -> HostSettings {
    HostSettings::new()
        .with(SMS_API_URL, &config.api_url)
        .with(SMS_CLIENT_ID, &config.client_id)
        .with(SMS_API_KEY, &config.api_key)
        .with(SMS_SENDER_ID, &config.sender_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sets process environment variables for one test and puts the previous
    /// values back on drop.
    struct EnvGuard(Vec<(&'static str, Option<String>)>);

    impl EnvGuard {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            let saved = vars
                .iter()
                .map(|(key, value)| {
                    let previous = std::env::var(key).ok();
                    std::env::set_var(key, value);
                    (*key, previous)
                })
                .collect();
            Self(saved)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, previous) in &self.0 {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    fn full() -> HostSettings {
        HostSettings::from_iter([
            (SMS_API_URL, "https://host.example/send"),
            (SMS_CLIENT_ID, "host-client"),
            (SMS_API_KEY, "host-key"),
            (SMS_SENDER_ID, "HOST"),
        ])
    }

    #[test]
    fn resolves_from_single_source() {
        let cfg = Resolver::new().source(full()).resolve().unwrap();
        assert_eq!(cfg.api_url, "https://host.example/send");
        assert_eq!(cfg.client_id, "host-client");
        assert_eq!(cfg.api_key, "host-key");
        assert_eq!(cfg.sender_id, "HOST");
    }

    #[test]
    fn earlier_sources_win_and_blanks_fall_through() {
        let host = HostSettings::new()
            .with(SMS_API_KEY, "from-host")
            .with(SMS_SENDER_ID, "  ");
        let cfg = Resolver::new()
            .source(host)
            .source(full())
            .resolve()
            .unwrap();
        assert_eq!(cfg.api_key, "from-host");
        assert_eq!(cfg.sender_id, "HOST");
    }

    #[test]
    fn reports_every_missing_key_in_fixed_order() {
        let partial = HostSettings::new()
            .with(SMS_CLIENT_ID, "c")
            .with(SMS_API_KEY, "");
        let err = Resolver::new().source(partial).resolve().unwrap_err();
        match &err {
            SmsError::Configuration { missing } => {
                assert_eq!(missing, &vec![SMS_API_URL, SMS_API_KEY, SMS_SENDER_ID]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "missing required SMS configuration: SMS_API_URL, SMS_API_KEY, SMS_SENDER_ID"
        );
    }

    #[test]
    fn missing_api_key_is_named() {
        let host = full().with(SMS_API_KEY, "");
        let err = Resolver::new().source(host).resolve().unwrap_err();
        assert!(err.to_string().ends_with("SMS_API_KEY"));
    }

    #[test]
    fn defaults_are_last_resort() {
        let defaults = Defaults::new()
            .with(SMS_API_URL, "https://default.example/send")
            .with(SMS_SENDER_ID, "DEFAULT");
        let host = HostSettings::new()
            .with(SMS_CLIENT_ID, "c")
            .with(SMS_API_KEY, "k")
            .with(SMS_SENDER_ID, "HOST");
        let cfg = Resolver::new()
            .source(host)
            .source(defaults)
            .resolve()
            .unwrap();
        assert_eq!(cfg.api_url, "https://default.example/send");
        assert_eq!(cfg.sender_id, "HOST");
    }

    #[test]
    fn config_crate_source() {
        let host = config::Config::builder()
            .set_override(SMS_API_URL, "https://cfg.example/send")
            .and_then(|b| b.set_override(SMS_CLIENT_ID, "cfg-client"))
            .and_then(|b| b.set_override(SMS_API_KEY, "cfg-key"))
            .and_then(|b| b.set_override(SMS_SENDER_ID, "CFG"))
            .and_then(|b| b.build())
            .unwrap();
        let cfg = Resolver::new().source(host).resolve().unwrap();
        assert_eq!(cfg.client_id, "cfg-client");
        assert_eq!(cfg.sender_id, "CFG");
    }

    #[test]
    fn host_settings_round_trip_a_config() {
        let cfg = Resolver::new().source(full()).resolve().unwrap();
        let again = Resolver::new().source(host_settings(&cfg)).resolve().unwrap();
        assert_eq!(cfg, again);
    }

    #[test]
    fn standard_chain_is_host_then_env_then_defaults() {
        let _env = EnvGuard::set(&[
            (SMS_API_URL, "https://env.example/send"),
            (SMS_CLIENT_ID, "env-client"),
            (SMS_API_KEY, "env-key"),
            (SMS_SENDER_ID, ""),
        ]);
        let host = HostSettings::new().with(SMS_CLIENT_ID, "host-client");
        let defaults = Defaults::new()
            .with(SMS_API_KEY, "default-key")
            .with(SMS_SENDER_ID, "DEF");

        let cfg = Resolver::standard(Some(host), defaults).resolve().unwrap();
        assert_eq!(cfg.client_id, "host-client");
        assert_eq!(cfg.api_url, "https://env.example/send");
        assert_eq!(cfg.api_key, "env-key");
        // Empty in the environment, so the default applies.
        assert_eq!(cfg.sender_id, "DEF");
    }
}
