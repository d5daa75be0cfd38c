//! Trusted time oracle.
//!
//! The validating machine's own clock is never consulted: an attacker can
//! roll it back at will. Instead "today" is taken from the `Date` header of a
//! remote HTTP endpoint. Validation therefore requires network access; when
//! the endpoint is unreachable the oracle reports "unavailable" and the
//! license is neither valid nor expired.

use crate::config::LicensingConfig;
use crate::LicenseError;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::Client;
use reqwest::header::{DATE, USER_AGENT};
use std::time::Duration;

/// Source of the current calendar date.
pub trait TimeOracle: Send + Sync {
    /// Current UTC date, or `None` if it could not be determined.
    fn trusted_date(&self) -> Option<NaiveDate>;
}

/// Parse an RFC 2822 date string (HTTP Date header format).
///
/// Example: "Wed, 09 Jun 2021 16:08:15 GMT"
pub fn parse_rfc2822_date(date_str: &str) -> Result<DateTime<Utc>, LicenseError> {
    DateTime::parse_from_rfc2822(date_str.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LicenseError::TimeSource(format!("Invalid date header: {} ({})", date_str, e)))
}

/// Time oracle reading the `Date` header of a HEAD request.
pub struct HttpTimeOracle {
    client: Client,
    url: String,
    user_agent: String,
}

impl HttpTimeOracle {
    /// Create an oracle from config.
    pub fn new(config: &LicensingConfig) -> Result<Self, LicenseError> {
        Self::with_endpoint(
            &config.time_source_url,
            config.time_timeout,
            &config.user_agent,
        )
    }

    /// Create an oracle for an explicit endpoint and timeout.
    pub fn with_endpoint(
        url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, LicenseError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| LicenseError::TimeSource(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    /// Get the configured endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_date(&self) -> Result<DateTime<Utc>, LicenseError> {
        let response = self
            .client
            .head(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| LicenseError::TimeSource(format!("Request failed: {}", e)))?;

        let header = response
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| LicenseError::TimeSource("Response has no Date header".to_string()))?;

        parse_rfc2822_date(header)
    }
}

impl TimeOracle for HttpTimeOracle {
    fn trusted_date(&self) -> Option<NaiveDate> {
        match self.fetch_date() {
            Ok(now) => {
                tracing::debug!(url = %self.url, %now, "trusted time acquired");
                Some(now.date_naive())
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "trusted time unavailable");
                None
            }
        }
    }
}
