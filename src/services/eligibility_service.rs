use crate::models::attempt_result::{format_score, AttemptResult, LatestAttempt};
use crate::models::eligibility::{EligibilitySnapshot, GateView};
use crate::error::Result;
use crate::models::invite::{Invite, InviteStatus};
use crate::services::history_service::HistoryService;
use crate::utils::time::now;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, warn};

pub const NOT_ATTEMPTED: &str = "Not attempted";

/// `PASSED (c/t)`, falling back to `PASSED — Score: s%`, then the bare status.
pub fn status_label(result: &AttemptResult) -> String {
    let status = result.status.as_label();
    match (result.correct, result.total, result.score) {
        (Some(correct), Some(total), _) => format!("{} ({}/{})", status, correct, total),
        (_, _, Some(score)) => format!("{} — Score: {}%", status, format_score(score)),
        _ => status.to_string(),
    }
}

/// Pure derivation: Apply is enabled iff the latest result passed.
pub fn derive_gate(job_id: &str, latest: &LatestAttempt, checked_at: DateTime<Utc>) -> GateView {
    let (apply_enabled, label) = match latest {
        LatestAttempt::NotAttempted => (false, NOT_ATTEMPTED.to_string()),
        LatestAttempt::Attempted(result) => (result.passed(), status_label(result)),
    };
    GateView {
        job_id: job_id.to_string(),
        apply_enabled,
        label,
        last_checked: checked_at,
    }
}

/// Start is allowed for an accepted invite whose interview exists and is due.
pub fn invite_start_enabled(invite: &Invite, at: DateTime<Utc>) -> bool {
    invite.status == InviteStatus::Accepted
        && invite.interview_id.is_some()
        && invite.scheduled_at.map(|when| at >= when).unwrap_or(false)
}

/// Publishes gate views per job. Each job has one sender; subscribers share it.
#[derive(Clone, Default)]
pub struct EligibilityGate {
    channels: Arc<Mutex<HashMap<String, watch::Sender<Option<GateView>>>>>,
}

impl EligibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, watch::Sender<Option<GateView>>>> {
        self.channels.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Subscribes to a job's gate. `None` until the first update.
    pub fn watch(&self, job_id: &str) -> watch::Receiver<Option<GateView>> {
        self.channels()
            .entry(job_id.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }

    pub fn current(&self, job_id: &str) -> Option<GateView> {
        self.channels()
            .get(job_id)
            .and_then(|tx| tx.borrow().clone())
    }

    pub fn snapshot(&self, job_id: &str) -> Option<EligibilitySnapshot> {
        self.current(job_id).as_ref().map(EligibilitySnapshot::from)
    }

    fn publish(&self, view: GateView) {
        let mut channels = self.channels();
        let tx = channels
            .entry(view.job_id.clone())
            .or_insert_with(|| watch::channel(None).0);
        tx.send_replace(Some(view));
    }

    /// Recomputes the gate from the latest result and notifies subscribers.
    pub fn update_gate(&self, job_id: &str, latest: &LatestAttempt) -> GateView {
        let view = derive_gate(job_id, latest, now());
        debug!(
            job_id,
            apply_enabled = view.apply_enabled,
            label = %view.label,
            "Eligibility gate updated"
        );
        self.publish(view.clone());
        view
    }

    /// Shows a score that came without a verdict; Apply keeps its previous state.
    pub fn note_unconfirmed_score(&self, job_id: &str, score: Option<f64>) -> GateView {
        let apply_enabled = self
            .current(job_id)
            .map(|view| view.apply_enabled)
            .unwrap_or(false);
        let label = match score {
            Some(score) => format!("SUBMITTED — Score: {}%", format_score(score)),
            None => "SUBMITTED".to_string(),
        };
        let view = GateView {
            job_id: job_id.to_string(),
            apply_enabled,
            label,
            last_checked: now(),
        };
        self.publish(view.clone());
        view
    }

    /// Publishes "Not attempted" only for jobs that have no view yet.
    pub fn degrade(&self, job_id: &str) -> GateView {
        match self.current(job_id) {
            Some(view) => view,
            None => self.update_gate(job_id, &LatestAttempt::NotAttempted),
        }
    }
}

/// Looks up the job's latest attempt and republishes its gate.
/// Network and shape failures keep whatever the gate already shows.
pub async fn refresh_gate(
    history: &HistoryService,
    gate: &EligibilityGate,
    job_id: &str,
    candidate_id: Option<&str>,
) -> Result<GateView> {
    match history.latest_attempt(job_id, candidate_id).await {
        Ok(latest) => Ok(gate.update_gate(job_id, &latest)),
        Err(e) if e.is_degradable() => {
            warn!(job_id, error = %e, "Attempt status unavailable");
            Ok(gate.degrade(job_id))
        }
        Err(e) => Err(e),
    }
}
