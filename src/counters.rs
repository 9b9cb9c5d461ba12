use std::sync::Arc;

use crate::error::CragError;
use crate::model::RouteKey;
use crate::store::{paths, KeyPathStore};

/// Direction of a counter adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDelta {
    Increment,
    Decrement,
}

/// Maintains the per-route `completedCount` and per-user `completedRoutes`
/// counters through the store's atomic transaction primitive exclusively,
/// never plain read-then-write, since concurrent requests adjust the same
/// counters.
///
/// An absent counter increments to 1 and decrements to 0. Present counters
/// are not clamped: a decrement can drive the value negative when ledger and
/// counter have drifted after a partial failure, which is left visible for
/// operators rather than papered over.
#[derive(Clone)]
pub struct CounterAggregator {
    store: Arc<dyn KeyPathStore>,
}

impl CounterAggregator {
    pub fn new(store: Arc<dyn KeyPathStore>) -> Self {
        Self { store }
    }

    pub async fn adjust_route_completed_count(
        &self,
        key: &RouteKey,
        delta: CountDelta,
    ) -> Result<i64, CragError> {
        self.adjust(&paths::route_completed_count(key), delta).await
    }

    pub async fn adjust_user_completed_count(
        &self,
        user_id: &str,
        delta: CountDelta,
    ) -> Result<i64, CragError> {
        self.adjust(&paths::user_completed_routes(user_id), delta)
            .await
    }

    async fn adjust(&self, path: &str, delta: CountDelta) -> Result<i64, CragError> {
        let apply = move |current: Option<i64>| match (current, delta) {
            (None, CountDelta::Increment) => 1,
            (None, CountDelta::Decrement) => 0,
            (Some(v), CountDelta::Increment) => v + 1,
            (Some(v), CountDelta::Decrement) => v - 1,
        };
        self.store.transact(path, &apply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn absent_counter_increments_to_one_and_decrements_to_zero() {
        let store = Arc::new(MemoryStore::new());
        let counters = CounterAggregator::new(store.clone());
        let key = RouteKey::new("g1", "w1", "r1");

        assert_eq!(
            counters
                .adjust_route_completed_count(&key, CountDelta::Increment)
                .await
                .unwrap(),
            1
        );

        let other = RouteKey::new("g1", "w1", "r2");
        assert_eq!(
            counters
                .adjust_route_completed_count(&other, CountDelta::Decrement)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn present_counter_is_not_clamped_at_zero() {
        let store = Arc::new(MemoryStore::new());
        let counters = CounterAggregator::new(store.clone());

        counters
            .adjust_user_completed_count("u1", CountDelta::Decrement)
            .await
            .unwrap();
        // counter now exists at 0; a further decrement goes negative
        assert_eq!(
            counters
                .adjust_user_completed_count("u1", CountDelta::Decrement)
                .await
                .unwrap(),
            -1
        );
    }
}
