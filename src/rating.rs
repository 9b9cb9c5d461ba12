use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{CragError, ResourceType};
use crate::existence::ExistenceChecker;
use crate::model::{RouteKey, RATING_MAX, RATING_MIN};
use crate::store::{paths, KeyPathStore};

/// Per-user route ratings and the route's signed aggregate score.
///
/// A user holds at most one rating per route; setting again replaces it, and
/// the route aggregate moves by the delta between old and new value through
/// the atomic transaction primitive.
#[derive(Clone)]
pub struct RatingAggregator {
    store: Arc<dyn KeyPathStore>,
    existence: ExistenceChecker,
}

impl RatingAggregator {
    pub fn new(store: Arc<dyn KeyPathStore>) -> Self {
        let existence = ExistenceChecker::new(store.clone());
        Self { store, existence }
    }

    /// Upserts the user's rating after validating range and hierarchy.
    /// Validation happens before any store mutation, so a rejected rating
    /// leaves no partial writes. Returns the stored rating.
    pub async fn set_user_rating(
        &self,
        key: &RouteKey,
        user_id: &str,
        rating: i64,
    ) -> Result<i64, CragError> {
        if !(RATING_MIN..=RATING_MAX).contains(&rating) {
            return Err(CragError::Validation(format!(
                "invalid user rating {rating}, must be in [{RATING_MIN}, {RATING_MAX}]"
            )));
        }
        if !self.existence.gym_exists(&key.gym_id).await? {
            return Err(CragError::not_found(ResourceType::Gym, &key.gym_id));
        }
        if !self.existence.wall_exists(&key.gym_id, &key.wall_id).await? {
            return Err(CragError::not_found(ResourceType::Wall, &key.wall_id));
        }
        let (exists, _) = self.existence.route_exists(key, false).await?;
        if !exists {
            return Err(CragError::not_found(ResourceType::Route, &key.route_id));
        }

        let path = paths::user_rating(key, user_id);
        let old = self
            .store
            .get(&path)
            .await?
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        self.store.set(&path, Value::from(rating)).await?;

        let delta = rating - old;
        debug!(route = %key, user_id, old, new = rating, delta, "user rating set");
        self.adjust_aggregate(key, delta).await?;
        Ok(rating)
    }

    /// Deletes the user's rating and removes its contribution from the route
    /// aggregate. Absence of the record is a NotFound, not a no-op.
    pub async fn clear_user_rating(&self, key: &RouteKey, user_id: &str) -> Result<(), CragError> {
        let path = paths::user_rating(key, user_id);
        let old = match self.store.get(&path).await? {
            None => return Err(CragError::not_found(ResourceType::UserRating, user_id)),
            Some(value) => value.as_i64().unwrap_or(0),
        };
        self.store.remove(&path).await?;
        debug!(route = %key, user_id, old, "user rating cleared");
        self.adjust_aggregate(key, -old).await
    }

    async fn adjust_aggregate(&self, key: &RouteKey, delta: i64) -> Result<(), CragError> {
        let apply = move |current: Option<i64>| current.unwrap_or(0) + delta;
        self.store
            .transact(&paths::route_user_ratings(key), &apply)
            .await?;
        Ok(())
    }
}
