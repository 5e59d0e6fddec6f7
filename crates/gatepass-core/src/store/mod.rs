// ── Visitor store ──
//
// Explicit repository abstraction standing in for whatever persistence
// the embedding application uses. The registry only ever talks to the
// trait; `MemoryStore` is the bundled implementation.

mod memory;

use std::sync::Arc;

use uuid::Uuid;

use crate::model::Visitor;

pub use memory::MemoryStore;

/// Repository of visitor passes, keyed by uuid.
///
/// Implementations must tolerate concurrent callers, but no change
/// notification is required — reads always reflect the latest `put`.
pub trait VisitorStore: Send + Sync {
    /// Look up a pass by uuid.
    fn get(&self, uuid: &Uuid) -> Option<Arc<Visitor>>;

    /// Insert or replace a pass. Returns `true` if the uuid was new.
    fn put(&self, visitor: Visitor) -> bool;

    /// Remove a pass. Returns the removed record if it existed.
    fn remove(&self, uuid: &Uuid) -> Option<Arc<Visitor>>;

    /// Number of stored passes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All current passes, in no particular order.
    fn snapshot(&self) -> Vec<Arc<Visitor>>;
}
