#![allow(dead_code)]

use async_trait::async_trait;
use recruitment_assessment::config::Config;
use recruitment_assessment::error::{Error, Result};
use recruitment_assessment::services::transport::{PreparedRequest, RawResponse, Transport};
use recruitment_assessment::AppState;
use serde_json::{json, Value as JsonValue};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const API_ROOT: &str = "http://backend.test";

#[derive(Clone)]
enum Reply {
    Respond(RawResponse),
    Delayed(Duration, RawResponse),
    Fail(String),
}

/// In-memory backend keyed by `"METHOD /path?query"`. Each key replays its queued replies
/// in order and repeats the last one; unknown keys answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<PreparedRequest>>,
}

fn key_of(method: &str, url: &url::Url) -> String {
    match url.query() {
        Some(query) => format!("{} {}?{}", method, url.path(), query),
        None => format!("{} {}", method, url.path()),
    }
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, key: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn on(&self, key: &str, status: u16, body: JsonValue) -> &Self {
        self.push(key, Reply::Respond(RawResponse::json(status, body)));
        self
    }

    pub fn on_text(&self, key: &str, status: u16, body: &str) -> &Self {
        self.push(key, Reply::Respond(RawResponse::text(status, "text/html", body)));
        self
    }

    pub fn on_delayed(&self, key: &str, delay: Duration, status: u16, body: JsonValue) -> &Self {
        self.push(key, Reply::Delayed(delay, RawResponse::json(status, body)));
        self
    }

    pub fn on_failure(&self, key: &str, message: &str) -> &Self {
        self.push(key, Reply::Fail(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<PreparedRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, key: &str) -> usize {
        self.calls()
            .iter()
            .filter(|r| key_of(r.method.as_str(), &r.url) == key)
            .count()
    }

    /// Bodies sent to `key`, oldest first.
    pub fn bodies(&self, key: &str) -> Vec<JsonValue> {
        self.calls()
            .into_iter()
            .filter(|r| key_of(r.method.as_str(), &r.url) == key)
            .filter_map(|r| r.body)
            .collect()
    }

    fn next_reply(&self, key: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
        let key = key_of(request.method.as_str(), &request.url);
        self.calls.lock().unwrap().push(request);

        match self.next_reply(&key) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(Reply::Fail(message)) => Err(Error::Network(message)),
            None => Ok(RawResponse::json(404, json!({"detail": "Not found."}))),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        api_root: API_ROOT.to_string(),
        access_token: Some("candidate-token".to_string()),
        ..Config::default()
    }
}

pub fn state_with(transport: Arc<ScriptedTransport>) -> AppState {
    AppState::new(&test_config(), transport).expect("app state")
}

/// `count` single-choice questions in the `{questions: [...]}` shape.
pub fn quiz_body(count: usize) -> JsonValue {
    let questions: Vec<JsonValue> = (1..=count)
        .map(|i| json!({"id": i, "question": format!("Question {}", i), "choices": ["yes", "no"]}))
        .collect();
    json!({ "questions": questions })
}
