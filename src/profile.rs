use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::CragError;
use crate::model::{split_features, RouteKey, Wall};
use crate::store::{paths, KeyPathStore};

/// Derived per-user statistics: the feature completion tally and the running
/// average difficulty.
///
/// Neither aggregate fits the store's single-key transaction primitive, so
/// both are plain read-modify-write sequences. Two concurrent completions by
/// the same user can lose one update; a single request in isolation always
/// produces the documented arithmetic. The counters and ledger are not
/// affected, they stay on the atomic primitive.
#[derive(Clone)]
pub struct UserProfileAggregator {
    store: Arc<dyn KeyPathStore>,
}

impl UserProfileAggregator {
    pub fn new(store: Arc<dyn KeyPathStore>) -> Self {
        Self { store }
    }

    /// Adjusts `completedFeatures` by one for every token in the wall's and
    /// the route's feature sets. A token present in both sets counts twice,
    /// once for each dimension. Decrements floor at
    /// zero. The whole map is written back in one set (last writer wins).
    pub async fn apply_feature_delta(
        &self,
        key: &RouteKey,
        user_id: &str,
        revert: bool,
    ) -> Result<(), CragError> {
        let features_path = paths::user_completed_features(user_id);
        let mut tally = match self.store.get(&features_path).await? {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let wall_tokens = self.read_wall_features(&key.gym_id, &key.wall_id).await?;
        let route_tokens = self.read_feature_string(&paths::route_features(key)).await?;

        for token in wall_tokens.iter().chain(route_tokens.iter()) {
            let current = tally.get(token).and_then(Value::as_i64).unwrap_or(0);
            let next = if revert {
                (current - 1).max(0)
            } else {
                current + 1
            };
            tally.insert(token.clone(), Value::from(next));
        }

        self.store.set(&features_path, Value::Object(tally)).await
    }

    /// Recomputes `avgDifficulty` from the previous average, the route's
    /// difficulty, and the already-adjusted `completedRoutes` count:
    /// `round10((old ± difficulty) / count)`. The recurrence deliberately
    /// feeds the rounded previous average back in rather than keeping a raw
    /// sum. A non-finite result (count of zero) collapses to 0.
    pub async fn apply_difficulty_delta(
        &self,
        key: &RouteKey,
        user_id: &str,
        revert: bool,
    ) -> Result<(), CragError> {
        let old_avg = self
            .store
            .get(&paths::user_avg_difficulty(user_id))
            .await?
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        let difficulty = self
            .store
            .get(&paths::route_difficulty(key))
            .await?
            .and_then(|v| v.as_f64())
            .ok_or_else(|| {
                CragError::Storage(format!("route '{key}' has no difficulty"))
            })?;

        let count = self
            .store
            .get(&paths::user_completed_routes(user_id))
            .await?
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        let raw = if revert {
            (old_avg - difficulty) / count
        } else {
            (old_avg + difficulty) / count
        };
        let rounded = round10(raw);

        let number = serde_json::Number::from_f64(rounded)
            .unwrap_or_else(|| serde_json::Number::from(0));
        self.store
            .set(&paths::user_avg_difficulty(user_id), Value::Number(number))
            .await
    }

    /// Reads the wall payload and takes its feature string; an absent wall or
    /// a wall with no features contributes the empty set.
    async fn read_wall_features(
        &self,
        gym_id: &str,
        wall_id: &str,
    ) -> Result<Vec<String>, CragError> {
        let wall: Wall = match self.store.get(&paths::wall(gym_id, wall_id)).await? {
            Some(raw) => serde_json::from_value(raw)
                .map_err(|e| CragError::Storage(format!("malformed wall payload: {e}")))?,
            None => Wall::default(),
        };
        Ok(wall
            .features
            .as_deref()
            .map(split_features)
            .unwrap_or_default())
    }

    async fn read_feature_string(&self, path: &str) -> Result<Vec<String>, CragError> {
        let raw = self.store.get(path).await?;
        Ok(match raw.as_ref().and_then(|v| v.as_str()) {
            Some(s) => split_features(s),
            None => Vec::new(),
        })
    }
}

/// Rounds to one decimal place, halves toward positive infinity (the
/// recurrence was defined with that rounding); non-finite input collapses
/// to 0.
fn round10(x: f64) -> f64 {
    if x.is_finite() {
        (x * 10.0 + 0.5).floor() / 10.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::round10;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round10(4.04), 4.0);
        assert_eq!(round10(4.05), 4.1);
        assert_eq!(round10(5.0), 5.0);
    }

    #[test]
    fn negative_halves_round_toward_positive_infinity() {
        assert_eq!(round10(-1.25), -1.2);
        assert_eq!(round10(-1.26), -1.3);
    }

    #[test]
    fn non_finite_collapses_to_zero() {
        assert_eq!(round10(f64::NAN), 0.0);
        assert_eq!(round10(f64::INFINITY), 0.0);
        assert_eq!(round10(5.0 / 0.0), 0.0);
    }
}
