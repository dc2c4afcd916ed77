//! Fish pools and the registry that owns them.

use fishery_core::Position;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle for a fish pool backed by a generational slot map.
    pub struct PoolId;
}

/// The whole fish population resident on one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FishPool {
    pub pop_level: i32,
    pub food_level: i32,
    position: Position,
}

impl FishPool {
    /// A freshly spawned pool: level 1, no food.
    pub fn new(position: Position) -> Self {
        Self {
            pop_level: 1,
            food_level: 0,
            position,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn is_alive(&self) -> bool {
        self.pop_level > 0
    }
}

/// Owning, insertion-ordered collection of live pools.
///
/// Removal leaves a stale handle in the order list; stale handles no longer
/// resolve and are skipped, and the list is compacted once they make up half
/// of it.
#[derive(Debug, Clone, Default)]
pub struct FishPoolRegistry {
    pools: SlotMap<PoolId, FishPool>,
    order: Vec<PoolId>,
}

impl FishPoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pools: SlotMap::with_capacity_and_key(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    /// Number of live pools.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn contains(&self, id: PoolId) -> bool {
        self.pools.contains_key(id)
    }

    pub fn get(&self, id: PoolId) -> Option<&FishPool> {
        self.pools.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: PoolId) -> Option<&mut FishPool> {
        self.pools.get_mut(id)
    }

    /// Live handles in registry order.
    pub fn handles(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.order.iter().copied().filter(move |&id| self.pools.contains_key(id))
    }

    /// Live pools in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &FishPool)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.pools.get(id).map(|pool| (id, pool)))
    }

    /// Sum of pop levels over all pools.
    pub fn total_population(&self) -> i64 {
        self.pools.values().map(|p| p.pop_level as i64).sum()
    }

    pub(crate) fn insert(&mut self, pool: FishPool) -> PoolId {
        let id = self.pools.insert(pool);
        self.order.push(id);
        id
    }

    pub(crate) fn remove(&mut self, id: PoolId) -> Option<FishPool> {
        let removed = self.pools.remove(id)?;
        if self.order.len() >= 2 * self.pools.len().max(8) {
            let pools = &self.pools;
            self.order.retain(|&id| pools.contains_key(id));
        }
        Some(removed)
    }
}
