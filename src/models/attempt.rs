use crate::models::question::Question;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Answers keyed by question id.
pub type AnswerMap = BTreeMap<String, AnswerValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Text(String),
    Selection(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Loading,
    Active,
    Submitting,
    Graded,
    Expired,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub job_id: String,
    pub questions: Vec<Question>,
    pub answers: AnswerMap,
    pub remaining_seconds: u32,
    pub state: AttemptState,
}

impl Attempt {
    pub fn loading(job_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id: job_id.into(),
            questions: Vec::new(),
            answers: AnswerMap::new(),
            remaining_seconds: 0,
            state: AttemptState::Loading,
        }
    }
}
