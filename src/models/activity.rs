use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::Preference;

/// Kinds of user activity kept in the event log
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Recommended,
    Liked,
    Disliked,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Recommended => "recommended",
            EventKind::Liked => "liked",
            EventKind::Disliked => "disliked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "recommended" => Some(EventKind::Recommended),
            "liked" => Some(EventKind::Liked),
            "disliked" => Some(EventKind::Disliked),
            _ => None,
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Preference> for EventKind {
    fn from(preference: Preference) -> Self {
        match preference {
            Preference::Liked => EventKind::Liked,
            Preference::Disliked => EventKind::Disliked,
        }
    }
}

/// One entry of a user's event log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserEvent {
    pub event_type: EventKind,
    pub game_id: String,
    pub created_at: DateTime<Utc>,
}
