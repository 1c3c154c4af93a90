//! In-flight request tracking for cancellation
//!
//! An id is present exactly while its call is dispatched and unsettled.
//! Each registration carries a generation so a stale unregister can never
//! remove a newer send that reused the same id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

/// Tracks an active request for cancellation
struct ActiveRequest {
    generation: u64,
    cancel_tx: oneshot::Sender<()>,
}

#[derive(Clone, Default)]
pub struct RequestRegistry {
    active: Arc<Mutex<HashMap<String, ActiveRequest>>>,
    generations: Arc<AtomicU64>,
}

/// Handle held by the executor for one registered send.
///
/// Dropping it unregisters the id, so every exit path cleans up.
pub struct Registration {
    registry: RequestRegistry,
    id: String,
    generation: u64,
}

impl Registration {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(&self.id, self.generation);
    }
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ActiveRequest>> {
        // The map stays consistent even if a holder panicked
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register `id` and hand back the cancellation receiver.
    ///
    /// Reusing an id that is still in flight replaces the older entry, which
    /// then can no longer be cancelled by id.
    pub fn register(&self, id: &str) -> (Registration, oneshot::Receiver<()>) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);

        let previous = self.lock().insert(
            id.to_string(),
            ActiveRequest {
                generation,
                cancel_tx,
            },
        );
        if previous.is_some() {
            tracing::warn!(id, "Request id reused while still in flight");
        }

        let registration = Registration {
            registry: self.clone(),
            id: id.to_string(),
            generation,
        };
        (registration, cancel_rx)
    }

    fn unregister(&self, id: &str, generation: u64) {
        let mut active = self.lock();
        if active.get(id).map(|a| a.generation) == Some(generation) {
            active.remove(id);
        }
    }

    /// Abort and remove one request; false when the id is unknown
    pub fn cancel(&self, id: &str) -> bool {
        let removed = self.lock().remove(id);
        match removed {
            Some(active) => {
                tracing::info!(id, "Cancelling request");
                let _ = active.cancel_tx.send(());
                true
            }
            None => false,
        }
    }

    /// Abort and remove every request, returning the cancelled ids in order
    pub fn cancel_all(&self) -> Vec<String> {
        let mut drained: Vec<(String, ActiveRequest)> = self.lock().drain().collect();
        drained.sort_by(|a, b| a.0.cmp(&b.0));
        drained
            .into_iter()
            .map(|(id, active)| {
                tracing::info!(id = %id, "Cancelling request");
                let _ = active.cancel_tx.send(());
                id
            })
            .collect()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }
}
