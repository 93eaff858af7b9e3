use shared::domain::{EventId, EventSummary};
use url::Url;

pub const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/60";
const MISSING_TITLE: &str = "Untitled";
const MISSING_VALUE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCard {
    pub id: EventId,
    pub title: String,
    pub date: String,
    pub location: String,
    pub poster_url: String,
}

impl EventCard {
    pub fn from_summary(event: &EventSummary, base_url: &str) -> Self {
        let title = event.title.trim();
        Self {
            id: event.id,
            title: if title.is_empty() {
                MISSING_TITLE.to_string()
            } else {
                title.to_string()
            },
            date: event
                .start_time
                .map(|start| start.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| MISSING_VALUE.to_string()),
            location: event
                .location
                .as_deref()
                .map(str::trim)
                .filter(|location| !location.is_empty())
                .unwrap_or(MISSING_VALUE)
                .to_string(),
            poster_url: event
                .poster_url
                .as_deref()
                .map(|poster| resolve_media_url(base_url, poster))
                .unwrap_or_else(|| PLACEHOLDER_POSTER_URL.to_string()),
        }
    }
}

/// Media paths come back either absolute or relative to the API host.
pub fn resolve_media_url(base_url: &str, path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        return PLACEHOLDER_POSTER_URL.to_string();
    }
    if let Ok(absolute) = Url::parse(path) {
        if matches!(absolute.scheme(), "http" | "https") {
            return absolute.to_string();
        }
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
