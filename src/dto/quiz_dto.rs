use crate::error::{Error, Result};
use crate::models::attempt::AnswerMap;
use crate::models::attempt_result::{AttemptResult, AttemptStatus, Verdict};
use crate::utils::collection::{
    as_collection, first_field, lenient_bool, lenient_f64, lenient_u32, text_field,
};
use crate::utils::time::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const QUESTION_KEYS: &[&str] = &["questions", "questions_json"];

/// Numeric ids go out as numbers, anything else as a string.
fn job_id_value(job_id: &str) -> JsonValue {
    job_id
        .trim()
        .parse::<i64>()
        .map(JsonValue::from)
        .unwrap_or_else(|_| JsonValue::from(job_id))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttemptRequest {
    pub job_id: JsonValue,
    pub answers: AnswerMap,
}

impl SubmitAttemptRequest {
    pub fn new(job_id: &str, answers: AnswerMap) -> Self {
        Self {
            job_id: job_id_value(job_id),
            answers,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateQuizRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
}

impl GenerateQuizRequest {
    pub fn body(&self, job_id: &str) -> JsonValue {
        let mut body = serde_json::json!({ "job_id": job_id_value(job_id) });
        if let Some(count) = self.questions_count {
            body["questions_count"] = JsonValue::from(count);
        }
        if let Some(skills) = &self.skills {
            body["skills"] = JsonValue::from(skills.as_str());
        }
        body
    }
}

/// Raw question list from a bare array, `{questions}` or `{questions_json}`.
pub fn question_collection(body: &JsonValue) -> Result<Vec<JsonValue>> {
    as_collection(body, QUESTION_KEYS).ok_or_else(|| {
        Error::MalformedResponse("quiz body has no question collection".to_string())
    })
}

fn timestamp_field(record: &JsonValue, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(JsonValue::as_str))
        .find_map(parse_timestamp)
}

fn explicit_status(body: &JsonValue) -> Option<AttemptStatus> {
    let from_status = body
        .get("status")
        .and_then(JsonValue::as_str)
        .and_then(|s| match s.trim().to_lowercase().as_str() {
            "passed" | "pass" => Some(AttemptStatus::Passed),
            "failed" | "fail" => Some(AttemptStatus::Failed),
            _ => None,
        });
    from_status.or_else(|| {
        body.get("passed")
            .and_then(lenient_bool)
            .map(AttemptStatus::from_passed)
    })
}

fn result_with(body: &JsonValue, status: AttemptStatus) -> AttemptResult {
    AttemptResult {
        id: text_field(body, &["id", "attempt_id", "pk"]),
        status,
        score: first_field(body, &["score", "percentage"]).and_then(lenient_f64),
        correct: body.get("correct").and_then(lenient_u32),
        total: body.get("total").and_then(lenient_u32),
        started_at: timestamp_field(body, &["started_at"]),
        finished_at: timestamp_field(body, &["finished_at", "completed_at"]),
    }
}

/// Reads a submit response: a `status` string wins, then a boolean `passed`; a bare score is
/// reported without a verdict.
pub fn interpret_verdict(body: &JsonValue) -> Result<Verdict> {
    if !body.is_object() {
        return Err(Error::MalformedResponse(
            "submit response is not a JSON object".to_string(),
        ));
    }
    match explicit_status(body) {
        Some(status) => {
            let mut result = result_with(body, status);
            if result.finished_at.is_none() {
                result.finished_at = Some(Utc::now());
            }
            Ok(Verdict::Graded(result))
        }
        None => Ok(Verdict::ScoreOnly {
            score: first_field(body, &["score", "percentage"]).and_then(lenient_f64),
            correct: body.get("correct").and_then(lenient_u32),
            total: body.get("total").and_then(lenient_u32),
        }),
    }
}

/// Reads one history record. Records without any verdict count as failed.
pub fn parse_attempt_record(record: &JsonValue) -> Option<AttemptResult> {
    if !record.is_object() {
        return None;
    }
    let status = explicit_status(record).unwrap_or(AttemptStatus::Failed);
    Some(result_with(record, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempt::AnswerValue;
    use serde_json::json;

    #[test]
    fn submit_payload_keeps_numeric_job_ids_numeric() {
        let mut answers = AnswerMap::new();
        answers.insert("1".into(), AnswerValue::Text("A".into()));
        let body = serde_json::to_value(SubmitAttemptRequest::new("42", answers)).unwrap();
        assert_eq!(body, json!({"job_id": 42, "answers": {"1": "A"}}));

        let body =
            serde_json::to_value(SubmitAttemptRequest::new("job-x", AnswerMap::new())).unwrap();
        assert_eq!(body["job_id"], json!("job-x"));
    }

    #[test]
    fn verdict_encodings_funnel_into_one_result() {
        let by_status = interpret_verdict(&json!({"status": "passed", "score": 86})).unwrap();
        let Verdict::Graded(result) = by_status else { panic!("expected verdict") };
        assert_eq!(result.status, AttemptStatus::Passed);
        assert_eq!(result.score, Some(86.0));
        assert!(result.finished_at.is_some());

        let by_flag = interpret_verdict(&json!({
            "passed": false, "score": "40.00", "correct": 2, "total": 5
        }))
        .unwrap();
        let Verdict::Graded(result) = by_flag else { panic!("expected verdict") };
        assert_eq!(result.status, AttemptStatus::Failed);
        assert_eq!((result.correct, result.total), (Some(2), Some(5)));

        let score_only = interpret_verdict(&json!({"score": 71.5})).unwrap();
        assert_eq!(
            score_only,
            Verdict::ScoreOnly {
                score: Some(71.5),
                correct: None,
                total: None
            }
        );
    }

    #[test]
    fn status_string_wins_over_flag() {
        let verdict = interpret_verdict(&json!({"status": "FAILED", "passed": true})).unwrap();
        assert!(matches!(verdict, Verdict::Graded(r) if r.status == AttemptStatus::Failed));
    }

    #[test]
    fn non_object_submit_body_is_malformed() {
        assert!(matches!(
            interpret_verdict(&json!("<html>")),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn question_collection_accepts_three_shapes() {
        let q = json!({"id": 1, "question": "?"});
        assert_eq!(question_collection(&json!([q.clone()])).unwrap().len(), 1);
        assert_eq!(question_collection(&json!({"questions": [q.clone()]})).unwrap().len(), 1);
        assert_eq!(question_collection(&json!({"questions_json": [q]})).unwrap().len(), 1);
        assert!(question_collection(&json!({"detail": "x"})).is_err());
    }

    #[test]
    fn history_record_reads_backend_fields() {
        let record = json!({"id": 9, "started_at": "2025-09-20T10:00:00Z",
            "finished_at": "2025-09-20 10:05:00", "score": "80.00", "passed": true,
            "correct": 4, "total": 5, "answers": {}});
        let result = parse_attempt_record(&record).unwrap();
        assert_eq!(result.id.as_deref(), Some("9"));
        assert!(result.passed());
        assert_eq!(result.score, Some(80.0));
        assert!(result.finished_at.unwrap() > result.started_at.unwrap());

        let bare = parse_attempt_record(&json!({"id": 1})).unwrap();
        assert_eq!(bare.status, AttemptStatus::Failed);
        assert!(parse_attempt_record(&json!(3)).is_none());
    }
}
