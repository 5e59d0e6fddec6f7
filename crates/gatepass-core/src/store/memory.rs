// ── In-memory visitor store ──
//
// DashMap-backed store with O(1) concurrent lookups. Records are held
// behind `Arc` so readers never copy the full record.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::VisitorStore;
use crate::model::Visitor;

/// The bundled `VisitorStore`: a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    passes: DashMap<Uuid, Arc<Visitor>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitorStore for MemoryStore {
    fn get(&self, uuid: &Uuid) -> Option<Arc<Visitor>> {
        self.passes.get(uuid).map(|r| Arc::clone(r.value()))
    }

    fn put(&self, visitor: Visitor) -> bool {
        self.passes
            .insert(visitor.uuid, Arc::new(visitor))
            .is_none()
    }

    fn remove(&self, uuid: &Uuid) -> Option<Arc<Visitor>> {
        self.passes.remove(uuid).map(|(_, v)| v)
    }

    fn len(&self) -> usize {
        self.passes.len()
    }

    fn snapshot(&self) -> Vec<Arc<Visitor>> {
        self.passes.iter().map(|r| Arc::clone(r.value())).collect()
    }
}
