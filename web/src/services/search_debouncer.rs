//! Latest-wins property search.
//!
//! Each search request registers under a client key. Registering cancels
//! whatever that client had pending or in flight, then waits out the debounce
//! delay; only a request that survives the delay reaches the backend.

use crate::backend::client::PropertySearch;
use crate::backend::models::{Paginated, Property, PropertyQuery};
use crate::errors::ServiceResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
pub enum SearchOutcome {
    Results(ServiceResult<Paginated<Property>>),
    /// A newer request from the same client took over.
    Superseded,
}

struct Pending {
    generation: u64,
    token: CancellationToken,
}

type PendingMap = Arc<Mutex<HashMap<String, Pending>>>;

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<String, Pending>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One request's claim on its client slot. Dropping it frees the slot unless a
/// newer request already took it, so abandoned requests leave nothing behind.
struct Registration {
    pending: PendingMap,
    client: String,
    generation: u64,
    token: CancellationToken,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut pending = lock(&self.pending);
        if pending
            .get(&self.client)
            .is_some_and(|p| p.generation == self.generation)
        {
            pending.remove(&self.client);
        }
    }
}

#[derive(Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: PendingMap,
    generation: Arc<AtomicU64>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the client's previous registration with a fresh one.
    fn register(&self, client: &str) -> Registration {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = lock(&self.pending).insert(
            client.to_string(),
            Pending {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        Registration {
            pending: self.pending.clone(),
            client: client.to_string(),
            generation,
            token,
        }
    }

    /// Debounced search for `client`.
    pub async fn search(
        &self,
        client: &str,
        query: PropertyQuery,
        backend: &dyn PropertySearch,
    ) -> SearchOutcome {
        let registration = self.register(client);
        let token = registration.token.clone();

        tokio::select! {
            _ = token.cancelled() => {
                debug!("Search {:?} for {} superseded during debounce", query.search, client);
                return SearchOutcome::Superseded;
            }
            _ = tokio::time::sleep(self.delay) => {}
        }

        let result = backend.search(&query, token.clone()).await;
        drop(registration);

        if token.is_cancelled() {
            debug!("Search {:?} for {} aborted in flight", query.search, client);
            return SearchOutcome::Superseded;
        }
        SearchOutcome::Results(result)
    }

    #[cfg(test)]
    fn pending_clients(&self) -> usize {
        lock(&self.pending).len()
    }
}
