use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::counters::{CountDelta, CounterAggregator};
use crate::error::{CragError, ResourceType};
use crate::existence::ExistenceChecker;
use crate::ledger::CompletionLedger;
use crate::model::RouteKey;
use crate::profile::UserProfileAggregator;
use crate::store::KeyPathStore;

/// The ordered steps of a completion or revert run. Every failure carries the
/// stage it happened in, so operators can reason about drift between the
/// ledger, the counters, and the profile aggregates after a partial run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStage {
    GymCheck,
    WallCheck,
    RouteCheck,
    LedgerCheck,
    LedgerWrite,
    UserCounter,
    RouteCounter,
    DifficultyAggregate,
    FeatureAggregate,
}

impl std::fmt::Display for CompletionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CompletionStage::GymCheck => "gym existence check",
            CompletionStage::WallCheck => "wall existence check",
            CompletionStage::RouteCheck => "route existence check",
            CompletionStage::LedgerCheck => "completion ledger check",
            CompletionStage::LedgerWrite => "completion ledger write",
            CompletionStage::UserCounter => "user completed-route counter",
            CompletionStage::RouteCounter => "route completed counter",
            CompletionStage::DifficultyAggregate => "average difficulty aggregate",
            CompletionStage::FeatureAggregate => "completed features aggregate",
        };
        f.write_str(name)
    }
}

/// A completion run failure, tagged with the stage that failed. Stages before
/// [`CompletionStage::LedgerWrite`] leave no state behind; anything after it
/// leaves the earlier steps' durable effects in place (there is no
/// compensating rollback).
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct CompletionError {
    pub stage: CompletionStage,
    #[source]
    pub source: CragError,
}

impl CompletionError {
    fn new(stage: CompletionStage, source: CragError) -> Self {
        Self { stage, source }
    }

    pub fn http_status(&self) -> u16 {
        self.source.http_status()
    }
}

fn at(stage: CompletionStage) -> impl FnOnce(CragError) -> CompletionError {
    move |source| CompletionError::new(stage, source)
}

/// Sequences a complete / uncomplete run: hierarchy checks, ledger mutation,
/// counter adjustments, profile aggregation. Steps are strictly sequential;
/// the ledger write is the first side effect and must succeed before any
/// counter moves. The difficulty aggregate reads the user counter *after* its
/// adjustment, which is why the counter steps come first.
pub struct RouteCompletionOrchestrator {
    existence: ExistenceChecker,
    ledger: CompletionLedger,
    counters: CounterAggregator,
    profile: UserProfileAggregator,
}

impl RouteCompletionOrchestrator {
    pub fn new(store: Arc<dyn KeyPathStore>) -> Self {
        Self {
            existence: ExistenceChecker::new(store.clone()),
            ledger: CompletionLedger::new(store.clone()),
            counters: CounterAggregator::new(store.clone()),
            profile: UserProfileAggregator::new(store),
        }
    }

    /// Records a completion for `user_id` and updates every aggregate.
    /// Returns the new completion state (always `true` on success).
    pub async fn complete(
        &self,
        key: &RouteKey,
        user_id: &str,
        flashed: bool,
    ) -> Result<bool, CompletionError> {
        self.check_hierarchy(key).await?;

        let completed = self
            .ledger
            .has_completed(key, user_id)
            .await
            .map_err(at(CompletionStage::LedgerCheck))?;
        if completed {
            return Err(CompletionError::new(
                CompletionStage::LedgerCheck,
                CragError::Conflict("user has already completed this route".into()),
            ));
        }

        self.ledger
            .mark_completed(key, user_id, flashed)
            .await
            .map_err(at(CompletionStage::LedgerWrite))?;
        self.apply_aggregates(key, user_id, false).await?;

        info!(route = %key, user_id, flashed, "route completed");
        Ok(true)
    }

    /// Reverts a completion and exactly reverses the aggregate arithmetic.
    /// Returns the new completion state (always `false` on success).
    pub async fn uncomplete(&self, key: &RouteKey, user_id: &str) -> Result<bool, CompletionError> {
        self.check_hierarchy(key).await?;

        let completed = self
            .ledger
            .has_completed(key, user_id)
            .await
            .map_err(at(CompletionStage::LedgerCheck))?;
        if !completed {
            return Err(CompletionError::new(
                CompletionStage::LedgerCheck,
                CragError::Conflict("user has not completed this route".into()),
            ));
        }

        self.ledger
            .unmark(key, user_id)
            .await
            .map_err(at(CompletionStage::LedgerWrite))?;
        self.apply_aggregates(key, user_id, true).await?;

        info!(route = %key, user_id, "route completion reverted");
        Ok(false)
    }

    async fn check_hierarchy(&self, key: &RouteKey) -> Result<(), CompletionError> {
        if !self
            .existence
            .gym_exists(&key.gym_id)
            .await
            .map_err(at(CompletionStage::GymCheck))?
        {
            return Err(CompletionError::new(
                CompletionStage::GymCheck,
                CragError::not_found(ResourceType::Gym, &key.gym_id),
            ));
        }
        if !self
            .existence
            .wall_exists(&key.gym_id, &key.wall_id)
            .await
            .map_err(at(CompletionStage::WallCheck))?
        {
            return Err(CompletionError::new(
                CompletionStage::WallCheck,
                CragError::not_found(ResourceType::Wall, &key.wall_id),
            ));
        }
        let (exists, route) = self
            .existence
            .route_exists(key, true)
            .await
            .map_err(at(CompletionStage::RouteCheck))?;
        if !exists {
            return Err(CompletionError::new(
                CompletionStage::RouteCheck,
                CragError::not_found(ResourceType::Route, &key.route_id),
            ));
        }
        debug!(
            route = %key,
            difficulty = route.as_ref().and_then(|r| r.difficulty),
            features = route.as_ref().and_then(|r| r.features.as_deref()),
            "hierarchy verified"
        );
        Ok(())
    }

    async fn apply_aggregates(
        &self,
        key: &RouteKey,
        user_id: &str,
        revert: bool,
    ) -> Result<(), CompletionError> {
        let delta = if revert {
            CountDelta::Decrement
        } else {
            CountDelta::Increment
        };
        self.counters
            .adjust_user_completed_count(user_id, delta)
            .await
            .map_err(at(CompletionStage::UserCounter))?;
        self.counters
            .adjust_route_completed_count(key, delta)
            .await
            .map_err(at(CompletionStage::RouteCounter))?;
        self.profile
            .apply_difficulty_delta(key, user_id, revert)
            .await
            .map_err(at(CompletionStage::DifficultyAggregate))?;
        self.profile
            .apply_feature_delta(key, user_id, revert)
            .await
            .map_err(at(CompletionStage::FeatureAggregate))?;
        Ok(())
    }
}
