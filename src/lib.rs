pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    credential_service::CredentialStore, eligibility_service::EligibilityGate,
    fetch_service::ResilientFetch, history_service::HistoryService,
    invite_service::InviteService, notification_service::Notifier, quiz_service::QuizService,
    session_service::AttemptSession, submission_service::SubmissionService,
    transport::Transport,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub fetch: ResilientFetch,
    pub quiz_service: QuizService,
    pub submission_service: SubmissionService,
    pub history_service: HistoryService,
    pub invite_service: InviteService,
    pub eligibility_gate: EligibilityGate,
    pub candidate_id: Option<String>,
}

impl AppState {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let credentials = Arc::new(CredentialStore::new(
            config.access_token.clone(),
            config.refresh_token.clone(),
        ));
        let fetch = ResilientFetch::new(&config.api_root, transport, credentials.clone())?;

        let quiz_service = QuizService::new(fetch.clone(), config.max_quiz_questions);
        let submission_service = SubmissionService::new(fetch.clone());
        let history_service = HistoryService::new(fetch.clone());
        let invite_service = InviteService::new(
            fetch.clone(),
            Duration::from_secs(config.fragment_timeout_secs),
        );

        Ok(Self {
            credentials,
            fetch,
            quiz_service,
            submission_service,
            history_service,
            invite_service,
            eligibility_gate: EligibilityGate::new(),
            candidate_id: config.candidate_id.clone(),
        })
    }

    /// A fresh attempt session publishing into this state's gate.
    pub fn session(&self, notifier: Arc<dyn Notifier>) -> AttemptSession {
        AttemptSession::new(
            self.quiz_service.clone(),
            self.submission_service.clone(),
            self.history_service.clone(),
            self.eligibility_gate.clone(),
            notifier,
            self.candidate_id.clone(),
        )
    }
}
