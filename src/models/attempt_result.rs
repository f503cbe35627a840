use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Passed,
    Failed,
}

impl AttemptStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            AttemptStatus::Passed
        } else {
            AttemptStatus::Failed
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            AttemptStatus::Passed => "PASSED",
            AttemptStatus::Failed => "FAILED",
        }
    }
}

/// A server-confirmed attempt outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub id: Option<String>,
    pub status: AttemptStatus,
    pub score: Option<f64>,
    pub correct: Option<u32>,
    pub total: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl AttemptResult {
    pub fn passed(&self) -> bool {
        self.status == AttemptStatus::Passed
    }

    /// `finished_at`, falling back to `started_at`.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.finished_at.or(self.started_at)
    }
}

/// Outcome of a history lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LatestAttempt {
    NotAttempted,
    Attempted(AttemptResult),
}

impl LatestAttempt {
    pub fn result(&self) -> Option<&AttemptResult> {
        match self {
            LatestAttempt::Attempted(result) => Some(result),
            LatestAttempt::NotAttempted => None,
        }
    }
}

/// How a submit response encoded its outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Graded(AttemptResult),
    /// The server reported a score (or nothing) without saying pass or fail.
    ScoreOnly {
        score: Option<f64>,
        correct: Option<u32>,
        total: Option<u32>,
    },
}

impl Verdict {
    pub fn score(&self) -> Option<f64> {
        match self {
            Verdict::Graded(result) => result.score,
            Verdict::ScoreOnly { score, .. } => *score,
        }
    }

    pub fn into_result(self) -> crate::error::Result<AttemptResult> {
        match self {
            Verdict::Graded(result) => Ok(result),
            Verdict::ScoreOnly { score, .. } => {
                Err(crate::error::Error::AmbiguousVerdict { score })
            }
        }
    }
}

/// Renders a score without a trailing `.0`.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        let rounded = format!("{:.2}", score);
        rounded.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
