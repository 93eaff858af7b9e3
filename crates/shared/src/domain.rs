use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(EventId);

/// Event categories offered as filter chips on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Music,
    Sports,
    Seminar,
    Conference,
    Festival,
    Workshop,
    Party,
    Competition,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Music,
        Category::Sports,
        Category::Seminar,
        Category::Conference,
        Category::Festival,
        Category::Workshop,
        Category::Party,
        Category::Competition,
        Category::Other,
    ];

    /// Identifier sent as the `category` query parameter.
    pub fn id(self) -> &'static str {
        match self {
            Category::Music => "music",
            Category::Sports => "sports",
            Category::Seminar => "seminar",
            Category::Conference => "conference",
            Category::Festival => "festival",
            Category::Workshop => "workshop",
            Category::Party => "party",
            Category::Competition => "competition",
            Category::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Music => "Music",
            Category::Sports => "Sports",
            Category::Seminar => "Seminar",
            Category::Conference => "Conference",
            Category::Festival => "Festival",
            Category::Workshop => "Workshop",
            Category::Party => "Party",
            Category::Competition => "Competition",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Organizer,
    Attendee,
    #[serde(other)]
    Other,
}

/// Profile returned by the current-user endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: EventId,
    #[serde(default)]
    pub title: String,
    /// Keeps the offset the backend sent; cards show the day in that offset.
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "poster")]
    pub poster_url: Option<String>,
}
