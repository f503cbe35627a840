use crate::models::invite::{Invite, InviteStatus};
use crate::utils::collection::{first_field, scalar_text, text_field};
use crate::utils::time::parse_timestamp;
use serde_json::Value as JsonValue;

pub const INVITE_LIST_KEYS: &[&str] = &["results", "invites"];

const ID_KEYS: &[&str] = &["id", "invite_id"];

/// Identifier of an invite record, under either of its spellings.
pub fn invite_id(record: &JsonValue) -> Option<String> {
    text_field(record, ID_KEYS)
}

/// `interview` may be a bare id or a nested object carrying one.
fn interview_id(record: &JsonValue) -> Option<String> {
    if let Some(id) = text_field(record, &["interview_id"]) {
        return Some(id);
    }
    match first_field(record, &["interview"])? {
        nested @ JsonValue::Object(_) => text_field(nested, &["id", "pk"]),
        other => scalar_text(other),
    }
}

pub fn parse_invite(record: &JsonValue) -> Option<Invite> {
    let id = invite_id(record)?;
    let status = text_field(record, &["status"])
        .map(|s| InviteStatus::parse(&s))
        .unwrap_or(InviteStatus::Pending);
    let title = text_field(record, &["title", "job_title", "interview_title"])
        .unwrap_or_else(|| "Interview".to_string());
    let scheduled_at = text_field(record, &["scheduled_at", "scheduled_time", "start_time"])
        .and_then(|raw| parse_timestamp(&raw));

    Some(Invite {
        id,
        status,
        title,
        interview_id: interview_id(record),
        scheduled_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_nested_interview_and_alternate_id() {
        let invite = parse_invite(&json!({
            "invite_id": 12,
            "status": "Accepted",
            "job_title": "Backend engineer",
            "interview": {"id": 77},
            "scheduled_at": "2025-10-01 09:30:00"
        }))
        .unwrap();

        assert_eq!(invite.id, "12");
        assert_eq!(invite.status, InviteStatus::Accepted);
        assert_eq!(invite.title, "Backend engineer");
        assert_eq!(invite.interview_id.as_deref(), Some("77"));
        assert!(invite.scheduled_at.is_some());
    }

    #[test]
    fn record_without_id_is_skipped() {
        assert!(parse_invite(&json!({"status": "pending"})).is_none());
    }

    #[test]
    fn missing_fields_fall_back() {
        let invite = parse_invite(&json!({"id": "a1"})).unwrap();
        assert_eq!(invite.status, InviteStatus::Pending);
        assert_eq!(invite.title, "Interview");
        assert!(invite.interview_id.is_none());
        assert!(invite.scheduled_at.is_none());
    }
}
