use crate::dto::quiz_dto::parse_attempt_record;
use crate::error::{Error, Result};
use crate::models::attempt_result::{AttemptResult, LatestAttempt};
use crate::routes;
use crate::services::fetch_service::ResilientFetch;
use crate::utils::collection::{as_collection, LIST_KEYS};
use tracing::debug;

/// Read-only lookups of past attempts; safe to run concurrently for different jobs.
#[derive(Clone)]
pub struct HistoryService {
    fetch: ResilientFetch,
}

impl HistoryService {
    pub fn new(fetch: ResilientFetch) -> Self {
        Self { fetch }
    }

    pub async fn attempts(
        &self,
        job_id: &str,
        candidate_id: Option<&str>,
    ) -> Result<Vec<AttemptResult>> {
        let candidates = routes::quiz::attempt_history(job_id, candidate_id);
        let response = self.fetch.call(&candidates).await?;

        let collection = response
            .data
            .as_ref()
            .and_then(|data| as_collection(data, LIST_KEYS));
        let Some(records) = collection else {
            return Err(if response.ok {
                Error::MalformedResponse("attempt history is not a collection".to_string())
            } else {
                response.failure()
            });
        };

        Ok(records.iter().filter_map(parse_attempt_record).collect())
    }

    pub async fn latest_attempt(
        &self,
        job_id: &str,
        candidate_id: Option<&str>,
    ) -> Result<LatestAttempt> {
        let attempts = self.attempts(job_id, candidate_id).await?;
        let latest = pick_latest(attempts);
        debug!(job_id, attempted = latest.is_some(), "Attempt history resolved");
        Ok(latest
            .map(LatestAttempt::Attempted)
            .unwrap_or(LatestAttempt::NotAttempted))
    }
}

/// Most recent by `finished_at ?? started_at`; undated attempts rank last, ties keep server order.
pub fn pick_latest(mut attempts: Vec<AttemptResult>) -> Option<AttemptResult> {
    attempts.sort_by(|a, b| b.recency().cmp(&a.recency()));
    attempts.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempt_result::AttemptStatus;
    use chrono::{TimeZone, Utc};

    fn attempt(
        id: &str,
        status: AttemptStatus,
        started: Option<u32>,
        finished: Option<u32>,
    ) -> AttemptResult {
        let at = |day: u32| Utc.with_ymd_and_hms(2025, 9, day, 12, 0, 0).unwrap();
        AttemptResult {
            id: Some(id.to_string()),
            status,
            score: None,
            correct: None,
            total: None,
            started_at: started.map(at),
            finished_at: finished.map(at),
        }
    }

    #[test]
    fn latest_uses_finished_then_started() {
        let attempts = vec![
            attempt("old", AttemptStatus::Passed, Some(1), Some(2)),
            attempt("unfinished", AttemptStatus::Failed, Some(5), None),
            attempt("newest", AttemptStatus::Passed, Some(3), Some(4)),
            attempt("undated", AttemptStatus::Passed, None, None),
        ];
        let latest = pick_latest(attempts).unwrap();
        assert_eq!(latest.id.as_deref(), Some("unfinished"));
    }

    #[test]
    fn empty_history_has_no_latest() {
        assert!(pick_latest(Vec::new()).is_none());
    }
}
