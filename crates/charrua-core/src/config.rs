//! Client configuration
//!
//! All tunables of the client core in one serde-friendly tree, with
//! defaults matching the mobile app and presets for local development and
//! tests.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{CharruaError, Result};

// ----------------------------------------------------------------------------
// API Configuration
// ----------------------------------------------------------------------------

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST backend, without trailing slash
    pub base_url: String,
    /// Default timeout for every request; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,
    /// Timeout applied to login requests
    pub login_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.charruabus.com.uy/api".to_string(),
            request_timeout_secs: Some(30),
            login_timeout_secs: 15,
            user_agent: format!("charrua-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    /// Base URL with any trailing slash removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// ----------------------------------------------------------------------------
// Polling Configuration
// ----------------------------------------------------------------------------

/// Notification polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Unread count refresh period while in the foreground
    pub unread_interval_secs: u64,
    /// Reload the notification list when a push arrives
    pub refresh_list_on_push: bool,
    /// Page size for the notification list
    pub page_size: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            unread_interval_secs: 30,
            refresh_list_on_push: true,
            page_size: 20,
        }
    }
}

impl PollingConfig {
    pub fn unread_interval(&self) -> Duration {
        Duration::from_secs(self.unread_interval_secs)
    }
}

// ----------------------------------------------------------------------------
// Booking Configuration
// ----------------------------------------------------------------------------

/// Booking wizard settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Passenger limit until the backend configuration is loaded
    pub max_passengers: u32,
    /// Restart the wizard when the app returns from the payment page
    pub reset_on_payment_return: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_passengers: 5,
            reset_on_payment_return: true,
        }
    }
}

// ----------------------------------------------------------------------------
// Client Configuration
// ----------------------------------------------------------------------------

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub booking: BookingConfig,
}

impl ClientConfig {
    /// Backend running on the developer machine
    pub fn local() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
                ..ApiConfig::default()
            },
            ..Self::default()
        }
    }

    /// Configuration used by tests: short intervals, fake host
    pub fn testing() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://charrua.test/api".to_string(),
                request_timeout_secs: Some(5),
                login_timeout_secs: 15,
                user_agent: "charrua-test".to_string(),
            },
            polling: PollingConfig {
                unread_interval_secs: 30,
                refresh_list_on_push: true,
                page_size: 5,
            },
            booking: BookingConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// Check values that would make the client unusable
    pub fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(CharruaError::config_error("api.base_url must not be empty"));
        }
        let parsed = url::Url::parse(base)
            .map_err(|e| CharruaError::config_error(format!("api.base_url is invalid: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CharruaError::config_error(
                "api.base_url must use http or https",
            ));
        }
        if self.api.login_timeout_secs == 0 || self.api.request_timeout_secs == Some(0) {
            return Err(CharruaError::config_error("timeouts must be positive"));
        }
        if self.polling.unread_interval_secs == 0 {
            return Err(CharruaError::config_error(
                "polling.unread_interval_secs must be positive",
            ));
        }
        if self.polling.page_size == 0 {
            return Err(CharruaError::config_error("polling.page_size must be positive"));
        }
        if self.booking.max_passengers == 0 {
            return Err(CharruaError::config_error(
                "booking.max_passengers must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api.login_timeout(), Duration::from_secs(15));
        assert_eq!(config.polling.unread_interval(), Duration::from_secs(30));
        assert!(config.booking.reset_on_payment_return);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ClientConfig::local().validate().is_ok());
        assert!(ClientConfig::testing().validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        assert!(ClientConfig::default().with_base_url("").validate().is_err());
        assert!(ClientConfig::default()
            .with_base_url("ftp://example.com")
            .validate()
            .is_err());

        let mut config = ClientConfig::default();
        config.polling.unread_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"api":{"base_url":"http://h"}}"#).unwrap();
        assert_eq!(config.api.base_url, "http://h");
        assert_eq!(config.polling.page_size, 20);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::default().with_base_url("http://h/api/");
        assert_eq!(config.api.normalized_base_url(), "http://h/api");
    }
}
