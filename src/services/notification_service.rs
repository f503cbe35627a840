use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A non-blocking, user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Writes toasts to the log.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Info => info!(toast = %toast.message, "toast"),
            ToastLevel::Success => info!(toast = %toast.message, "toast"),
            ToastLevel::Error => warn!(toast = %toast.message, "toast"),
        }
    }
}

/// Forwards toasts to a UI loop.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: UnboundedSender<Toast>,
}

impl ChannelNotifier {
    pub fn new(tx: UnboundedSender<Toast>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, toast: Toast) {
        if let Err(e) = self.tx.send(toast) {
            error!(toast = %e.0.message, "Toast receiver is gone");
        }
    }
}

/// Keeps every toast in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap_or_else(|p| p.into_inner()).push(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn channel_notifier_forwards_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = ChannelNotifier::new(tx);
        notifier.notify(Toast::info("Time is up, submitting"));
        notifier.notify(Toast::error("Quiz submit failed"));

        assert_eq!(rx.try_recv().unwrap().level, ToastLevel::Info);
        assert_eq!(rx.try_recv().unwrap(), Toast::error("Quiz submit failed"));
    }
}
