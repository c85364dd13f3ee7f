use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a focus session felt, recorded after the countdown stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feeling {
    Happy,
    Sad,
}

impl Feeling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feeling::Happy => "happy",
            Feeling::Sad => "sad",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "happy" => Some(Feeling::Happy),
            "sad" => Some(Feeling::Sad),
            _ => None,
        }
    }
}

/// One entry of the append-only session feedback log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub id: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: DateTime<Utc>,
    pub feeling: Feeling,
}
