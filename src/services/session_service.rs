use crate::error::{Error, Result};
use crate::models::attempt::{AnswerMap, Attempt, AttemptState};
use crate::models::attempt_result::{format_score, LatestAttempt, Verdict};
use crate::models::eligibility::GateView;
use crate::models::form::AttemptForm;
use crate::services::answer_service::AnswerCollector;
use crate::services::eligibility_service::{refresh_gate, EligibilityGate};
use crate::services::history_service::HistoryService;
use crate::services::notification_service::{Notifier, Toast};
use crate::services::quiz_service::QuizService;
use crate::services::submission_service::SubmissionService;
use crate::services::timer_service::{time_budget, AttemptTimer, TimerEvent};
use crate::utils::time::format_countdown;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(Verdict),
    /// Nothing to submit: no open attempt, or it was already submitted.
    Skipped,
}

struct ActiveAttempt {
    attempt: Attempt,
    form: AttemptForm,
    timer: AttemptTimer,
    auto_submitted: bool,
    timer_label: String,
}

/// One candidate's dashboard session. Holds at most one open attempt; every action
/// takes `&mut self`, so submissions and answer reads never overlap.
pub struct AttemptSession {
    quiz: QuizService,
    submission: SubmissionService,
    history: HistoryService,
    gate: EligibilityGate,
    notifier: Arc<dyn Notifier>,
    candidate_id: Option<String>,
    active: Option<ActiveAttempt>,
    timer_tx: UnboundedSender<TimerEvent>,
    timer_rx: UnboundedReceiver<TimerEvent>,
}

impl AttemptSession {
    pub fn new(
        quiz: QuizService,
        submission: SubmissionService,
        history: HistoryService,
        gate: EligibilityGate,
        notifier: Arc<dyn Notifier>,
        candidate_id: Option<String>,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        Self {
            quiz,
            submission,
            history,
            gate,
            notifier,
            candidate_id,
            active: None,
            timer_tx,
            timer_rx,
        }
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    pub fn active(&self) -> Option<&Attempt> {
        self.active.as_ref().map(|a| &a.attempt)
    }

    pub fn timer_label(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.timer_label.as_str())
    }

    pub fn submit_enabled(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| matches!(a.attempt.state, AttemptState::Active | AttemptState::Expired))
            .unwrap_or(false)
    }

    /// Inputs of the open attempt, while it still accepts answers.
    pub fn form_mut(&mut self) -> Option<&mut AttemptForm> {
        self.active
            .as_mut()
            .filter(|a| a.attempt.state == AttemptState::Active)
            .map(|a| &mut a.form)
    }

    /// Tears down any previous attempt, loads the job's questions and starts the countdown.
    pub async fn open_attempt(&mut self, job_id: &str) -> Result<Uuid> {
        self.close_attempt();

        let attempt = Attempt::loading(job_id);
        let attempt_id = attempt.id;
        self.active = Some(ActiveAttempt {
            timer: AttemptTimer::stopped(attempt_id),
            attempt,
            form: AttemptForm::default(),
            auto_submitted: false,
            timer_label: String::new(),
        });

        let loaded = self.quiz.load_questions(job_id).await;
        let Some(active) = self.active.as_mut() else {
            return Err(Error::InvalidState("attempt closed while loading".to_string()));
        };

        let questions = match loaded {
            Ok(questions) => questions,
            Err(e) => {
                active.attempt.state = AttemptState::Error;
                warn!(job_id, error = %e, "Could not open quiz attempt");
                self.notifier.notify(Toast::error(e.user_message()));
                return Err(e);
            }
        };

        let seconds = time_budget(questions.len());
        active.form = AttemptForm::render(&questions);
        active.attempt.questions = questions;
        active.attempt.remaining_seconds = seconds;
        active.attempt.state = AttemptState::Active;
        active.timer_label = format_countdown(seconds);
        active.timer = AttemptTimer::start(attempt_id, seconds, self.timer_tx.clone());

        info!(
            job_id,
            %attempt_id,
            questions = active.attempt.questions.len(),
            seconds,
            "Quiz attempt opened"
        );
        Ok(attempt_id)
    }

    /// Discards the open attempt without contacting the server.
    pub fn close_attempt(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.timer.stop();
            debug!(
                attempt_id = %active.attempt.id,
                state = ?active.attempt.state,
                "Quiz attempt closed"
            );
        }
    }

    /// Manual submit. From `Active` the form is read afresh; from `Expired` the answers
    /// kept from the failed auto-submit are sent again.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let Some(active) = self.active.as_ref() else {
            return Ok(SubmitOutcome::Skipped);
        };
        let answers = match active.attempt.state {
            AttemptState::Active => {
                AnswerCollector::collect(&active.form, &active.attempt.questions)
            }
            AttemptState::Expired => active.attempt.answers.clone(),
            state => {
                debug!(attempt_id = %active.attempt.id, ?state, "Submit ignored");
                return Ok(SubmitOutcome::Skipped);
            }
        };
        let fallback = active.attempt.state;
        self.submit_answers(answers, fallback).await
    }

    pub async fn next_timer_event(&mut self) -> Option<TimerEvent> {
        self.timer_rx.recv().await
    }

    /// Applies one timer event. Expiry auto-submits once; events of other attempts are dropped.
    pub async fn handle_timer_event(&mut self, event: TimerEvent) -> Result<Option<SubmitOutcome>> {
        let Some(active) = self.active.as_mut() else {
            return Ok(None);
        };
        if active.attempt.id != event.attempt_id() {
            debug!(attempt_id = %event.attempt_id(), "Stale timer event ignored");
            return Ok(None);
        }

        match event {
            TimerEvent::Tick {
                remaining, label, ..
            } => {
                active.attempt.remaining_seconds = remaining;
                active.timer_label = label;
                Ok(None)
            }
            TimerEvent::Expired { .. } => {
                if active.auto_submitted || active.attempt.state != AttemptState::Active {
                    return Ok(None);
                }
                active.auto_submitted = true;
                active.attempt.remaining_seconds = 0;
                let answers = AnswerCollector::collect(&active.form, &active.attempt.questions);
                self.notifier.notify(Toast::info("Time is up, submitting"));
                self.submit_answers(answers, AttemptState::Expired)
                    .await
                    .map(Some)
            }
        }
    }

    /// Pumps timer events until the open attempt stops being `Active`.
    pub async fn run_timer(&mut self) -> Result<Option<SubmitOutcome>> {
        loop {
            let running = self
                .active
                .as_ref()
                .map(|a| a.attempt.state == AttemptState::Active)
                .unwrap_or(false);
            if !running {
                return Ok(None);
            }
            let Some(event) = self.next_timer_event().await else {
                return Ok(None);
            };
            if let Some(outcome) = self.handle_timer_event(event).await? {
                return Ok(Some(outcome));
            }
        }
    }

    /// Re-reads the job's latest attempt and republishes its gate.
    pub async fn refresh_status(&self, job_id: &str) -> Result<GateView> {
        refresh_gate(&self.history, &self.gate, job_id, self.candidate_id.as_deref())
            .await
            .inspect_err(|e| {
                if e.is_auth() {
                    self.notifier.notify(Toast::error(e.user_message()));
                }
            })
    }

    async fn submit_answers(
        &mut self,
        answers: AnswerMap,
        fallback: AttemptState,
    ) -> Result<SubmitOutcome> {
        let Some(active) = self.active.as_mut() else {
            return Ok(SubmitOutcome::Skipped);
        };
        active.attempt.answers = answers.clone();
        active.attempt.state = AttemptState::Submitting;
        active.form.lock();
        let job_id = active.attempt.job_id.clone();
        let attempt_id = active.attempt.id;

        let submitted = self.submission.submit(&job_id, &answers).await;

        let Some(active) = self.active.as_mut() else {
            return Err(Error::InvalidState("attempt closed while submitting".to_string()));
        };
        match submitted {
            Ok(verdict) => {
                active.attempt.state = AttemptState::Graded;
                active.timer.stop();
                info!(job_id = %job_id, %attempt_id, "Quiz attempt submitted");

                match verdict.clone().into_result() {
                    Ok(result) => {
                        let view = self
                            .gate
                            .update_gate(&job_id, &LatestAttempt::Attempted(result.clone()));
                        let toast = if result.passed() {
                            Toast::success(format!("Quiz passed: {}", view.label))
                        } else {
                            Toast::info(format!("Quiz submitted: {}", view.label))
                        };
                        self.notifier.notify(toast);
                    }
                    Err(e) => {
                        debug!(
                            job_id = %job_id,
                            error = %e,
                            "Verdict withheld, eligibility unchanged"
                        );
                        let score = verdict.score();
                        self.gate.note_unconfirmed_score(&job_id, score);
                        let message = match score {
                            Some(score) => {
                                format!("Quiz submitted, score {}%", format_score(score))
                            }
                            None => "Quiz submitted".to_string(),
                        };
                        self.notifier.notify(Toast::info(message));
                    }
                }
                self.refresh_after_submit(&job_id).await;
                Ok(SubmitOutcome::Submitted(verdict))
            }
            Err(e) => {
                active.attempt.state = fallback;
                if fallback == AttemptState::Active {
                    active.form.unlock();
                }
                warn!(job_id = %job_id, %attempt_id, error = %e, "Quiz submission failed");
                if e.is_auth() {
                    self.notifier.notify(Toast::error(e.user_message()));
                } else {
                    self.notifier
                        .notify(Toast::error(format!("Quiz submit failed: {}", e.user_message())));
                    self.refresh_after_submit(&job_id).await;
                }
                Err(e)
            }
        }
    }

    /// History may lag behind a fresh submission; an empty history does not overwrite it.
    async fn refresh_after_submit(&self, job_id: &str) {
        let latest = self
            .history
            .latest_attempt(job_id, self.candidate_id.as_deref())
            .await;
        match latest {
            Ok(LatestAttempt::NotAttempted) if self.gate.current(job_id).is_some() => {
                debug!(job_id, "Attempt history has not caught up with the submission");
            }
            Ok(latest) => {
                self.gate.update_gate(job_id, &latest);
            }
            Err(e) if e.is_auth() => {
                self.notifier.notify(Toast::error(e.user_message()));
            }
            Err(e) if e.is_degradable() => {
                warn!(job_id, error = %e, "Attempt status unavailable after submission");
                self.gate.degrade(job_id);
            }
            Err(e) => {
                warn!(job_id, error = %e, "Attempt status refresh failed");
            }
        }
    }
}
