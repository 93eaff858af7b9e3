use std::fmt;

use reqwest::StatusCode;
use shared::error::{OAuthErrorBody, OAuthErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("endpoint '{name}' must be an absolute path, got '{path}'")]
    InvalidEndpoint { name: &'static str, path: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failure of a single backend call, before it is classified for the screen
/// that made it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no response from server: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server responded with {status}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("malformed response body: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn url(&self) -> &str {
        match self {
            ApiError::Transport { url, .. }
            | ApiError::Status { url, .. }
            | ApiError::Decode { url, .. } => url,
        }
    }

    /// OAuth2 error body carried by a non-success response, if any.
    pub fn oauth_body(&self) -> Option<OAuthErrorBody> {
        match self {
            ApiError::Status { body, .. } => OAuthErrorBody::parse(body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Username,
    Password,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingField::Username => "username",
            MissingField::Password => "password",
        })
    }
}

/// Why a login attempt ended without a session. Localized texts live in
/// [`crate::messages`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("{0} must not be empty")]
    Validation(MissingField),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("token endpoint does not accept the password grant")]
    UnsupportedGrantType,
    #[error("server rejected login: {0}")]
    ServerProvidedMessage(String),
    #[error("server rejected login without a description")]
    Rejected,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("another login is in progress")]
    Busy,
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Transport { source, .. } => LoginError::Connection(source.to_string()),
            ApiError::Decode { .. } => LoginError::Rejected,
            ApiError::Status { .. } => {
                let Some(body) = err.oauth_body() else {
                    return LoginError::Rejected;
                };
                match (&body.error, body.description()) {
                    (Some(OAuthErrorCode::InvalidGrant), _) => LoginError::InvalidCredentials,
                    (Some(OAuthErrorCode::UnsupportedGrantType), _) => {
                        LoginError::UnsupportedGrantType
                    }
                    (_, Some(description)) => {
                        LoginError::ServerProvidedMessage(description.to_string())
                    }
                    _ => LoginError::Rejected,
                }
            }
        }
    }
}

/// A page of events could not be loaded. Shown on the list, never fatal.
#[derive(Debug, Error)]
#[error("Failed to load events: {source} ({})", .source.url())]
pub struct FetchError {
    #[from]
    source: ApiError,
}

/// Push-token registration failures. Logged and dropped by the login flow.
#[derive(Debug, Error)]
pub enum PushRegistrationError {
    #[error("push messaging failed: {0}")]
    Messaging(#[source] anyhow::Error),
    #[error("failed to submit push token: {0}")]
    Submit(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16, body: &str) -> ApiError {
        ApiError::Status {
            url: "http://backend/login".into(),
            status: StatusCode::from_u16(status).expect("status"),
            body: body.into(),
        }
    }

    #[test]
    fn classifies_oauth_error_bodies() {
        assert_eq!(
            LoginError::from(status_error(400, r#"{"error":"invalid_grant"}"#)),
            LoginError::InvalidCredentials
        );
        assert_eq!(
            LoginError::from(status_error(400, r#"{"error":"unsupported_grant_type"}"#)),
            LoginError::UnsupportedGrantType
        );
        assert_eq!(
            LoginError::from(status_error(
                401,
                r#"{"error":"invalid_client","error_description":"Client authentication failed"}"#
            )),
            LoginError::ServerProvidedMessage("Client authentication failed".into())
        );
    }

    #[test]
    fn bodies_without_usable_detail_are_rejections() {
        assert_eq!(
            LoginError::from(status_error(500, "<html>oops</html>")),
            LoginError::Rejected
        );
        assert_eq!(
            LoginError::from(status_error(403, r#"{"error":"invalid_client"}"#)),
            LoginError::Rejected
        );
    }

    #[test]
    fn fetch_error_names_the_failing_url() {
        let err = FetchError::from(ApiError::Status {
            url: "http://backend/events?page=3".into(),
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to load events: server responded with 502 Bad Gateway (http://backend/events?page=3)"
        );
    }
}
