//! Pending-request table and completion signaling.
//!
//! Each registration gets a one-shot `crossbeam` channel: `notify_completion`
//! sends on it (idempotently — a full channel means someone already
//! completed this request), `wait_for_completion` receives with a timeout.
//! Capacity and shutdown checks share one lock with the table itself so the
//! overflow check is atomic with insertion.

use std::collections::HashMap;
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::CoordinatorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Complete,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub request_id: Uuid,
}

#[derive(Debug, Clone)]
pub enum CompletionResult {
    Success(Value),
    Error { code: String, message: String },
}

struct PendingEntry {
    #[allow(dead_code)]
    team_id: String,
    sender: Sender<CompletionResult>,
    receiver: Option<Receiver<CompletionResult>>,
}

struct Table {
    entries: HashMap<Uuid, PendingEntry>,
    shutting_down: bool,
}

pub struct ResponseCoordinator {
    table: Mutex<Table>,
    max_pending: usize,
}

impl ResponseCoordinator {
    pub fn new(max_pending: usize) -> Self {
        Self {
            table: Mutex::new(Table {
                entries: HashMap::new(),
                shutting_down: false,
            }),
            max_pending,
        }
    }

    /// Register a new pending request for `team_id`. The capacity check and
    /// the insertion happen under the same lock, so two concurrent callers
    /// can never both observe spare capacity and both succeed past it.
    pub fn register(&self, team_id: impl Into<String>) -> Result<Registration, CoordinatorError> {
        let mut table = self.table.lock();
        if table.shutting_down {
            return Err(CoordinatorError::ShuttingDown);
        }
        if table.entries.len() >= self.max_pending {
            return Err(CoordinatorError::ServiceOverloaded {
                pending: table.entries.len(),
                capacity: self.max_pending,
            });
        }

        let (sender, receiver) = bounded(1);
        let request_id = Uuid::new_v4();
        table.entries.insert(
            request_id,
            PendingEntry {
                team_id: team_id.into(),
                sender,
                receiver: Some(receiver),
            },
        );
        Ok(Registration { request_id })
    }

    /// Attach a result to a pending request. Idempotent: the first call
    /// wins; later calls for the same id return `false` with no effect,
    /// whether because the request already completed or was never
    /// registered (or was already observed and removed).
    pub fn notify_completion(&self, request_id: Uuid, result: CompletionResult) -> bool {
        let table = self.table.lock();
        match table.entries.get(&request_id) {
            Some(entry) => entry.sender.try_send(result).is_ok(),
            None => false,
        }
    }

    /// Block until `request_id` completes or `timeout` elapses, then remove
    /// it from the table. A timeout (or an unknown/already-observed id)
    /// yields a `TIMEOUT` result rather than panicking — the caller treats
    /// both the same way.
    pub fn wait_for_completion(&self, request_id: Uuid, timeout: Duration) -> CompletionResult {
        let receiver = {
            let mut table = self.table.lock();
            table
                .entries
                .get_mut(&request_id)
                .and_then(|entry| entry.receiver.take())
        };

        let result = match receiver {
            Some(receiver) => receiver.recv_timeout(timeout).unwrap_or_else(|_| CompletionResult::Error {
                code: "TIMEOUT".into(),
                message: "timed out waiting for completion".into(),
            }),
            None => CompletionResult::Error {
                code: "TIMEOUT".into(),
                message: "request not found".into(),
            },
        };

        self.table.lock().entries.remove(&request_id);
        result
    }

    /// Enter a draining state: reject new registrations and push
    /// `SERVICE_SHUTDOWN` to every outstanding waiter. Entries remain in the
    /// table until a caller observes them via `wait_for_completion`.
    pub fn shutdown(&self) {
        let mut table = self.table.lock();
        table.shutting_down = true;
        for entry in table.entries.values() {
            let _ = entry.sender.try_send(CompletionResult::Error {
                code: "SERVICE_SHUTDOWN".into(),
                message: "service shutting down".into(),
            });
        }
    }

    pub fn pending_count(&self) -> usize {
        self.table.lock().entries.len()
    }
}
