//! Route-completion and aggregate-statistics core for climbing-gym tracking.
//!
//! Everything durable lives in an external hierarchical key-path store (see
//! [`store::KeyPathStore`]) that offers point reads/writes and a single-key
//! atomic transaction, and nothing else. The modules here layer the domain
//! semantics on top: the completion ledger, the atomic counters, the
//! non-atomic per-user aggregates, and the orchestrator that sequences a
//! complete or revert run with stage-tagged failures and no rollback.
//!
//! [`CragInstance`] wires the pieces together behind the operation surface an
//! HTTP layer calls into.

pub mod api;
pub mod completion;
pub mod counters;
pub mod error;
pub mod existence;
pub mod ledger;
pub mod model;
pub mod profile;
pub mod rating;
pub mod store;

use std::sync::Arc;

use crate::api::{CompleteRouteResponse, UserRatingResponse};
use crate::completion::{CompletionError, RouteCompletionOrchestrator};
use crate::ledger::CompletionLedger;
use crate::rating::RatingAggregator;

pub use crate::error::{CragError, CragErrorCode, ResourceType};
pub use crate::model::{Route, RouteKey, Wall};
pub use crate::store::memory::{MemoryStore, MemoryStoreConfig};
pub use crate::store::KeyPathStore;

/// Facade over the completion core, owning one handle per subsystem. All
/// state is in the backing store; the instance itself is cheap and carries no
/// caches, so every read observes the store's current value.
pub struct CragInstance {
    store: Arc<dyn KeyPathStore>,
    completion: RouteCompletionOrchestrator,
    ratings: RatingAggregator,
    ledger: CompletionLedger,
}

impl CragInstance {
    pub fn new(store: Arc<dyn KeyPathStore>) -> Self {
        Self {
            completion: RouteCompletionOrchestrator::new(store.clone()),
            ratings: RatingAggregator::new(store.clone()),
            ledger: CompletionLedger::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyPathStore> {
        &self.store
    }

    /// Records a completion (`flashed` marks a first-attempt send) and
    /// updates the counters and profile aggregates.
    pub async fn complete_route(
        &self,
        key: &RouteKey,
        user_id: &str,
        flashed: bool,
    ) -> Result<CompleteRouteResponse, CompletionError> {
        let user_completed_route = self.completion.complete(key, user_id, flashed).await?;
        Ok(CompleteRouteResponse {
            user_completed_route,
        })
    }

    /// Reverts a completion, reversing the aggregate arithmetic.
    pub async fn uncomplete_route(
        &self,
        key: &RouteKey,
        user_id: &str,
    ) -> Result<CompleteRouteResponse, CompletionError> {
        let user_completed_route = self.completion.uncomplete(key, user_id).await?;
        Ok(CompleteRouteResponse {
            user_completed_route,
        })
    }

    /// Whether `user_id` currently holds a completion record for the route.
    pub async fn has_completed(&self, key: &RouteKey, user_id: &str) -> Result<bool, CragError> {
        self.ledger.has_completed(key, user_id).await
    }

    /// Upserts the user's rating for the route and adjusts the route's
    /// aggregate score by the delta against the prior value.
    pub async fn set_user_rating(
        &self,
        key: &RouteKey,
        user_id: &str,
        rating: i64,
    ) -> Result<UserRatingResponse, CragError> {
        let stored = self.ratings.set_user_rating(key, user_id, rating).await?;
        Ok(UserRatingResponse {
            user_rating: Some(stored),
        })
    }

    /// Deletes the user's rating and removes its contribution from the
    /// route's aggregate score.
    pub async fn clear_user_rating(
        &self,
        key: &RouteKey,
        user_id: &str,
    ) -> Result<UserRatingResponse, CragError> {
        self.ratings.clear_user_rating(key, user_id).await?;
        Ok(UserRatingResponse { user_rating: None })
    }
}
