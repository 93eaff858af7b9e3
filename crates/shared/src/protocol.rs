use serde::{Deserialize, Serialize};

use crate::domain::{Category, EventSummary};

pub const PASSWORD_GRANT_TYPE: &str = "password";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventListQuery {
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl EventListQuery {
    pub fn new(page: u32, query: &str, category: Option<Category>) -> Self {
        let query = query.trim();
        Self {
            page,
            q: (!query.is_empty()).then(|| query.to_string()),
            category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventPage {
    #[serde(default, deserialize_with = "results_or_empty")]
    pub results: Vec<EventSummary>,
    #[serde(default)]
    pub next: Option<String>,
}

impl EventPage {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

// Some backends send `results: null` or an object on empty pages.
fn results_or_empty<'de, D>(deserializer: D) -> Result<Vec<EventSummary>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordGrantRequest {
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
    pub grant_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmTokenRequest {
    pub fcm_token: String,
}
