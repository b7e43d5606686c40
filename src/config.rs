use std::{env, time::Duration};

use reqwest::Url;

use crate::error::ConfigError;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint and credential of the hosted store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: Url,
    pub anon_key: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let raw_url = required(URL_VAR)?;
        let anon_key = required(KEY_VAR)?;

        let mut url = Url::parse(&raw_url).map_err(|err| ConfigError::InvalidUrl {
            var: URL_VAR,
            reason: err.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                var: URL_VAR,
                reason: "not a base URL".to_string(),
            });
        }
        // Url::join drops the last segment unless the path ends with a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            url,
            anon_key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
