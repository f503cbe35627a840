use crate::utils::time::format_countdown;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

const TICK: Duration = Duration::from_secs(1);
const MAX_BUDGET_SECS: u32 = 1800;

/// Seconds allowed for an attempt with `question_count` questions.
pub fn time_budget(question_count: usize) -> u32 {
    match question_count {
        0..=5 => 120,
        6..=10 => 300,
        n => {
            let blocks = n.div_ceil(10);
            let secs = blocks.saturating_mul(300).min(MAX_BUDGET_SECS as usize);
            secs as u32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Tick {
        attempt_id: Uuid,
        remaining: u32,
        label: String,
    },
    Expired {
        attempt_id: Uuid,
    },
}

impl TimerEvent {
    pub fn attempt_id(&self) -> Uuid {
        match self {
            TimerEvent::Tick { attempt_id, .. } | TimerEvent::Expired { attempt_id } => *attempt_id,
        }
    }
}

/// Countdown bound to one attempt. Dropping the timer stops its tick task.
#[derive(Debug)]
pub struct AttemptTimer {
    attempt_id: Uuid,
    state: Arc<Mutex<TimerState>>,
    handle: Option<JoinHandle<()>>,
}

impl AttemptTimer {
    pub fn stopped(attempt_id: Uuid) -> Self {
        Self {
            attempt_id,
            state: Arc::new(Mutex::new(TimerState::Stopped)),
            handle: None,
        }
    }

    /// Starts ticking once per second. The first tick fires immediately with the full budget;
    /// `Expired` is sent exactly once, on the tick that reaches zero.
    pub fn start(attempt_id: Uuid, seconds: u32, events: UnboundedSender<TimerEvent>) -> Self {
        let state = Arc::new(Mutex::new(TimerState::Running));
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut remaining = seconds;

            loop {
                interval.tick().await;
                let tick = TimerEvent::Tick {
                    attempt_id,
                    remaining,
                    label: format_countdown(remaining),
                };
                if events.send(tick).is_err() {
                    debug!(%attempt_id, "Timer receiver dropped");
                    break;
                }
                if remaining == 0 {
                    {
                        let mut state = task_state.lock().unwrap_or_else(|p| p.into_inner());
                        if *state != TimerState::Running {
                            break;
                        }
                        *state = TimerState::Expired;
                    }
                    info!(%attempt_id, "Attempt time is up");
                    let _ = events.send(TimerEvent::Expired { attempt_id });
                    break;
                }
                remaining -= 1;
            }
        });

        debug!(%attempt_id, seconds, "Attempt timer started");
        Self {
            attempt_id,
            state,
            handle: Some(handle),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn state(&self) -> TimerState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Clears the tick. A timer that already expired keeps reporting `Expired`.
    pub fn stop(&mut self) {
        {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            if *state == TimerState::Running {
                *state = TimerState::Stopped;
            }
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(attempt_id = %self.attempt_id, "Attempt timer stopped");
        }
    }
}

impl Drop for AttemptTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn budget_tiers_match_boundaries() {
        let cases = [
            (1, 120),
            (5, 120),
            (6, 300),
            (10, 300),
            (11, 600),
            (20, 600),
            (21, 900),
            (60, 1800),
            (61, 1800),
            (100, 1800),
            (1000, 1800),
        ];
        for (count, expected) in cases {
            assert_eq!(time_budget(count), expected, "count {}", count);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_expires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        let timer = AttemptTimer::start(id, 3, tx);

        let mut labels = Vec::new();
        let mut expirations = 0;
        while let Some(event) = rx.recv().await {
            match event {
                TimerEvent::Tick { label, .. } => labels.push(label),
                TimerEvent::Expired { attempt_id } => {
                    assert_eq!(attempt_id, id);
                    expirations += 1;
                }
            }
        }

        assert_eq!(labels, vec!["00:03", "00:02", "00:01", "00:00"]);
        assert_eq!(expirations, 1);
        assert_eq!(timer.state(), TimerState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_clears_the_tick() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = AttemptTimer::start(Uuid::new_v4(), 120, tx);

        assert!(matches!(rx.recv().await, Some(TimerEvent::Tick { remaining: 120, .. })));
        timer.stop();
        assert_eq!(timer.state(), TimerState::Stopped);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert!(rx.recv().await.is_none());
    }
}
