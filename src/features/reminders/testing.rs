//! Recording scheduler used by store tests.

use crate::core::SchedulingError;
use crate::features::reminders::scheduler::ReminderScheduler;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
    Schedule {
        existing_id: Option<String>,
        title: String,
        fire_at: DateTime<Utc>,
    },
    Cancel(String),
}

/// Parks `schedule` calls until the test releases them
#[derive(Default)]
struct Gate {
    entered: Notify,
    release: Notify,
}

/// Hands out `alarm-N` ids and remembers every call
#[derive(Default)]
pub struct RecordingScheduler {
    calls: Mutex<Vec<SchedulerCall>>,
    failing: AtomicBool,
    next_id: AtomicU64,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `schedule` calls fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold every following `schedule` call until [`Self::release`]
    pub fn hold_schedules(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Gate::default()));
    }

    /// Resolves once a held `schedule` call is in flight
    pub async fn schedule_started(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notified().await;
        }
    }

    /// Let the held call finish; later calls go straight through
    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.release.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn schedule_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SchedulerCall::Schedule { .. }))
            .count()
    }

    pub fn cancelled_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SchedulerCall::Cancel(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ReminderScheduler for RecordingScheduler {
    async fn request_permission(&self) -> bool {
        true
    }

    async fn schedule(
        &self,
        existing_id: Option<&str>,
        title: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<String, SchedulingError> {
        self.calls.lock().unwrap().push(SchedulerCall::Schedule {
            existing_id: existing_id.map(str::to_string),
            title: title.to_string(),
            fire_at,
        });
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SchedulingError::Platform("rejected".to_string()));
        }
        Ok(match existing_id {
            Some(id) => id.to_string(),
            None => format!("alarm-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
        })
    }

    async fn cancel(&self, id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(SchedulerCall::Cancel(id.to_string()));
    }
}
