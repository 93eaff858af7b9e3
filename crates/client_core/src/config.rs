use std::time::Duration;

use url::Url;

use crate::{error::ConfigError, messages::Locale};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_NAVIGATION_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Backend paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub events: String,
    pub login: String,
    pub current_user: String,
    pub save_fcm_token: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            events: "/events".into(),
            login: "/login".into(),
            current_user: "/currentUser".into(),
            save_fcm_token: "/saveFcmToken".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// OAuth2 client registered for the mobile app.
    pub client_id: String,
    pub client_secret: String,
    pub endpoints: Endpoints,
    pub search_debounce: Duration,
    /// Pause between the success notice and leaving the login screen.
    pub navigation_delay: Duration,
    pub request_timeout: Duration,
    pub locale: Locale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            client_id: String::new(),
            client_secret: String::new(),
            endpoints: Endpoints::default(),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            navigation_delay: DEFAULT_NAVIGATION_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            locale: Locale::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(self.base_url.trim()).map_err(|source| {
            ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: source.to_string(),
            }
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        for (name, path) in [
            ("events", &self.endpoints.events),
            ("login", &self.endpoints.login),
            ("current_user", &self.endpoints.current_user),
            ("save_fcm_token", &self.endpoints.save_fcm_token),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidEndpoint {
                    name,
                    path: path.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ClientConfig::default().validate().expect("valid defaults");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ClientConfig::with_base_url("ftp://events.example")
            .validate()
            .expect_err("must fail");
        assert!(err.to_string().contains("unsupported scheme"), "{err}");
    }

    #[test]
    fn rejects_relative_endpoint_path() {
        let mut config = ClientConfig::default();
        config.endpoints.login = "o/token/".into();
        let err = config.validate().expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidEndpoint { name: "login", .. }));
    }
}
