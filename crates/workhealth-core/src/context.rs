//! User preference context carried into insight generation and cache keys.

use serde::{Deserialize, Serialize};

/// How many meetings the user prefers in a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPreference {
    Minimal,
    #[default]
    Balanced,
    Collaborative,
}

impl std::fmt::Display for MeetingPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingPreference::Minimal => write!(f, "minimal"),
            MeetingPreference::Balanced => write!(f, "balanced"),
            MeetingPreference::Collaborative => write!(f, "collaborative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub meeting_preference: MeetingPreference,
    /// IANA timezone name, e.g. `Europe/Berlin`.
    pub timezone: String,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            work_start_hour: 9,
            work_end_hour: 17,
            meeting_preference: MeetingPreference::Balanced,
            timezone: "UTC".to_string(),
        }
    }
}
