//! Transient preview handles for selected assets.
//!
//! A handle is acquired when an asset is loaded and released when the asset
//! is dropped, which happens when its slot is cleared, replaced or reset.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    next_id: AtomicU64,
    live: Mutex<BTreeSet<u64>>,
}

impl Inner {
    fn live(&self) -> MutexGuard<'_, BTreeSet<u64>> {
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Issues preview handles and tracks which are still held.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Inner>,
}

impl PreviewRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a new handle for an asset called `name`.
    pub fn acquire(&self, name: &str) -> PreviewHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.live().insert(id);
        PreviewHandle {
            id,
            reference: format!("preview://{id}/{name}"),
            registry: Arc::clone(&self.inner),
        }
    }

    /// Number of handles acquired and not yet released.
    pub fn live_count(&self) -> usize {
        self.inner.live().len()
    }

    /// Returns true if `reference` belongs to a handle that is still held.
    pub fn is_live(&self, reference: &str) -> bool {
        parse_id(reference).is_some_and(|id| self.inner.live().contains(&id))
    }
}

/// A locally resolvable preview reference, released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    reference: String,
    registry: Arc<Inner>,
}

impl PreviewHandle {
    /// The `preview://<id>/<name>` reference string.
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.live().remove(&self.id);
        tracing::debug!(preview = %self.reference, "released preview handle");
    }
}

fn parse_id(reference: &str) -> Option<u64> {
    reference
        .strip_prefix("preview://")?
        .split('/')
        .next()?
        .parse()
        .ok()
}
