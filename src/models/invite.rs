use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    Other(String),
}

impl InviteStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "pending" => InviteStatus::Pending,
            "accepted" => InviteStatus::Accepted,
            "declined" => InviteStatus::Declined,
            other => InviteStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub id: String,
    pub status: InviteStatus,
    pub title: String,
    pub interview_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InviteDetail {
    /// Server-rendered HTML row.
    Fragment(String),
    Record(Invite),
}
