use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a job card shows for the Apply button and attempt status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateView {
    pub job_id: String,
    pub apply_enabled: bool,
    pub label: String,
    pub last_checked: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilitySnapshot {
    pub job_id: String,
    pub passed: bool,
    pub last_checked: DateTime<Utc>,
}

impl From<&GateView> for EligibilitySnapshot {
    fn from(view: &GateView) -> Self {
        Self {
            job_id: view.job_id.clone(),
            passed: view.apply_enabled,
            last_checked: view.last_checked,
        }
    }
}
