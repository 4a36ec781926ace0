use crate::error::AnnotateError;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// Mints node ids from a monotonically increasing counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdAllocator {
    next: u32,
}

impl Default for NodeIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl NodeIdAllocator {
    /// Allocator whose first id is greater than every id in `existing`.
    pub fn after<I: IntoIterator<Item = NodeId>>(existing: I) -> Result<Self, AnnotateError> {
        let mut alloc = Self::default();
        if let Some(max) = existing.into_iter().max() {
            alloc.seed_from(max)?;
        }
        Ok(alloc)
    }

    /// Hand out the next id. `u32::MAX` is never handed out, so `next` can
    /// always be stored past the returned id.
    pub fn allocate(&mut self) -> Result<NodeId, AnnotateError> {
        let id = NodeId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .ok_or(AnnotateError::NodeIdsExhausted(id))?;
        Ok(id)
    }

    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }

    /// Make sure the next id is past `max_existing`. Never moves backwards.
    pub fn seed_from(&mut self, max_existing: NodeId) -> Result<(), AnnotateError> {
        let past = max_existing
            .0
            .checked_add(1)
            .ok_or(AnnotateError::NodeIdsExhausted(max_existing))?;
        self.next = self.next.max(past);
        Ok(())
    }
}
