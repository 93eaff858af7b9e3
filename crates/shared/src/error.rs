use serde::{Deserialize, Serialize};

/// OAuth2 error codes the token endpoint can report (RFC 6749 §5.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthErrorCode {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthErrorBody {
    #[serde(default)]
    pub error: Option<OAuthErrorCode>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl OAuthErrorBody {
    /// Returns `None` when the body is not a JSON object.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn description(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
