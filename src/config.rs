//! Licensing configuration.
//!
//! Everything here is loaded once at startup and never mutated afterwards.
//! A missing signing secret is fatal: [`LicensingConfig::from_env`] returns
//! an error and the caller is expected to abort before serving anything.

use crate::LicenseError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the HMAC signing secret (required).
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";

/// Environment variable holding the activation API key (optional).
pub const ENV_API_SECRET: &str = "API_SECRET";

/// Environment variable overriding the trusted time endpoint.
pub const ENV_TIME_SOURCE_URL: &str = "TIME_SOURCE_URL";

/// Environment variable overriding the time source timeout, in seconds.
pub const ENV_TIME_TIMEOUT_SECS: &str = "TIME_TIMEOUT_SECS";

/// Environment variable overriding the hardware probe timeout, in seconds.
pub const ENV_PROBE_TIMEOUT_SECS: &str = "HWID_PROBE_TIMEOUT_SECS";

/// Default endpoint whose `Date` header is trusted.
pub const DEFAULT_TIME_SOURCE_URL: &str = "https://www.google.com";

/// Default timeout for the time source request.
pub const DEFAULT_TIME_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for a hardware probe command.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// HMAC signing secret shared by the issuer and the validator.
///
/// Clones share the same bytes. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Arc<[u8]>);

impl SigningSecret {
    /// Wrap raw secret bytes. Empty secrets are rejected.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, LicenseError> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(LicenseError::ConfigError(format!(
                "{} cannot be empty",
                ENV_SECRET_KEY
            )));
        }
        Ok(Self(Arc::from(bytes)))
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Static shared credential that gates license activation.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    /// Wrap an API key. Empty keys are rejected.
    pub fn new(key: &str) -> Result<Self, LicenseError> {
        if key.is_empty() {
            return Err(LicenseError::ConfigError(format!(
                "{} cannot be empty",
                ENV_API_SECRET
            )));
        }
        Ok(Self(Arc::from(key)))
    }

    /// The key as presented in the request header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Configuration for issuing and validating licenses.
#[derive(Debug, Clone)]
pub struct LicensingConfig {
    /// Secret used to sign and verify license keys.
    pub secret: SigningSecret,

    /// Credential required to request activation. `None` rejects every caller.
    pub api_key: Option<ApiKey>,

    /// Endpoint whose HTTP `Date` header supplies the trusted date.
    pub time_source_url: String,

    /// Upper bound for the time source request.
    pub time_timeout: Duration,

    /// Upper bound for a hardware probe command.
    pub probe_timeout: Duration,

    /// User-Agent sent to the time source.
    pub user_agent: String,
}

impl LicensingConfig {
    /// Build a config around a secret, with every other setting at its default.
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            api_key: None,
            time_source_url: DEFAULT_TIME_SOURCE_URL.to_string(),
            time_timeout: DEFAULT_TIME_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// `ConfigError` if `SECRET_KEY` is missing or empty, or if any
    /// optional variable is present but malformed.
    pub fn from_env() -> Result<Self, LicenseError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LicenseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(ENV_SECRET_KEY).ok_or_else(|| {
            LicenseError::ConfigError(format!("{} is not set", ENV_SECRET_KEY))
        })?;
        let mut config = Self::new(SigningSecret::new(secret.as_bytes())?);

        if let Some(key) = lookup(ENV_API_SECRET) {
            config.api_key = Some(ApiKey::new(&key)?);
        }
        if let Some(url) = lookup(ENV_TIME_SOURCE_URL) {
            config.time_source_url = url;
        }
        if let Some(secs) = lookup(ENV_TIME_TIMEOUT_SECS) {
            config.time_timeout = parse_secs(ENV_TIME_TIMEOUT_SECS, &secs)?;
        }
        if let Some(secs) = lookup(ENV_PROBE_TIMEOUT_SECS) {
            config.probe_timeout = parse_secs(ENV_PROBE_TIMEOUT_SECS, &secs)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), LicenseError> {
        if !(self.time_source_url.starts_with("https://")
            || self.time_source_url.starts_with("http://"))
        {
            return Err(LicenseError::ConfigError(format!(
                "time_source_url must be an http(s) URL, got {}",
                self.time_source_url
            )));
        }
        if self.time_timeout.is_zero() {
            return Err(LicenseError::ConfigError(
                "time_timeout cannot be zero".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(LicenseError::ConfigError(
                "probe_timeout cannot be zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration, LicenseError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| LicenseError::ConfigError(format!("{} must be whole seconds: {}", name, e)))
}

fn default_user_agent() -> String {
    format!("hwlicense/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_secret_is_fatal() {
        let result = LicensingConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(LicenseError::ConfigError(_))));
    }

    #[test]
    fn empty_secret_is_fatal() {
        let result = LicensingConfig::from_lookup(lookup_from(&[(ENV_SECRET_KEY, "")]));
        assert!(matches!(result, Err(LicenseError::ConfigError(_))));
    }

    #[test]
    fn defaults_apply() {
        let config = LicensingConfig::from_lookup(lookup_from(&[(ENV_SECRET_KEY, "k")])).unwrap();
        assert_eq!(config.secret.as_bytes(), b"k");
        assert!(config.api_key.is_none());
        assert_eq!(config.time_source_url, DEFAULT_TIME_SOURCE_URL);
        assert_eq!(config.time_timeout, DEFAULT_TIME_TIMEOUT);
        assert_eq!(config.probe_timeout, DEFAULT_PROBE_TIMEOUT);
        assert!(config.user_agent.starts_with("hwlicense/"));
    }

    #[test]
    fn overrides_apply() {
        let config = LicensingConfig::from_lookup(lookup_from(&[
            (ENV_SECRET_KEY, "k"),
            (ENV_API_SECRET, "api"),
            (ENV_TIME_SOURCE_URL, "http://time.internal"),
            (ENV_TIME_TIMEOUT_SECS, "2"),
            (ENV_PROBE_TIMEOUT_SECS, " 3 "),
        ]))
        .unwrap();
        assert_eq!(config.api_key.unwrap().as_str(), "api");
        assert_eq!(config.time_source_url, "http://time.internal");
        assert_eq!(config.time_timeout, Duration::from_secs(2));
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
    }

    #[test]
    fn malformed_timeout_rejected() {
        let result = LicensingConfig::from_lookup(lookup_from(&[
            (ENV_SECRET_KEY, "k"),
            (ENV_TIME_TIMEOUT_SECS, "soon"),
        ]));
        assert!(matches!(result, Err(LicenseError::ConfigError(_))));
    }

    #[test]
    fn zero_timeout_rejected() {
        let result = LicensingConfig::from_lookup(lookup_from(&[
            (ENV_SECRET_KEY, "k"),
            (ENV_PROBE_TIMEOUT_SECS, "0"),
        ]));
        assert!(matches!(result, Err(LicenseError::ConfigError(_))));
    }

    #[test]
    fn non_http_time_source_rejected() {
        let mut config = LicensingConfig::new(SigningSecret::new("k").unwrap());
        config.time_source_url = "ntp://pool.ntp.org".to_string();
        assert!(matches!(config.validate(), Err(LicenseError::ConfigError(_))));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = LicensingConfig::new(SigningSecret::new("super-secret").unwrap());
        config.api_key = Some(ApiKey::new("api-secret").unwrap());
        let text = format!("{:?}", config);
        assert!(!text.contains("super-secret"));
        assert!(!text.contains("api-secret"));
    }
}
