//! State Feed Adapter: turns the externally pushed state object into a
//! batch snapshot, defaulting through every missing nesting level. The feed
//! may be observed before the backend integration has registered any data,
//! so extraction never fails.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use shared::{domain::Batch, protocol::CoordinatorData};

/// Everything the client reads out of one pushed state object.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub batch: Batch,
    pub backends: Vec<String>,
}

/// Extract a snapshot from a pushed state shaped
/// `{ [entry_id]: { data: { batch, backends } } }`.
///
/// The first available entry is read; any missing or malformed nesting
/// level resolves to the empty default.
pub fn snapshot_from_push(state: &Value) -> FeedSnapshot {
    let Some(entry) = state.as_object().and_then(|entries| entries.values().next()) else {
        return FeedSnapshot::default();
    };
    let Some(data) = entry.get("data") else {
        return FeedSnapshot::default();
    };
    let coordinator: CoordinatorData = serde_json::from_value(data.clone()).unwrap_or_default();
    FeedSnapshot {
        batch: coordinator.batch.unwrap_or_default(),
        backends: coordinator.backends,
    }
}

/// Batch-only view of [`snapshot_from_push`].
pub fn batch_from_push(state: &Value) -> Batch {
    snapshot_from_push(state).batch
}

/// Shared cell holding the most recent pushed state. The transport side
/// writes into it; the view surface re-reads it on every render trigger,
/// including timer ticks that fire between pushes.
#[derive(Clone, Default)]
pub struct FeedHandle {
    inner: Arc<RwLock<Value>>,
}

impl FeedHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, state: Value) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = state;
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        snapshot_from_push(&guard)
    }

    pub fn batch(&self) -> Batch {
        self.snapshot().batch
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
