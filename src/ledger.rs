use std::sync::Arc;

use serde_json::Value;

use crate::error::CragError;
use crate::model::RouteKey;
use crate::store::{paths, KeyPathStore};

/// Per-(route, user) completion records. Existence of the record, not its
/// value, signals "has completed"; the stored boolean records whether the
/// route was flashed.
#[derive(Clone)]
pub struct CompletionLedger {
    store: Arc<dyn KeyPathStore>,
}

impl CompletionLedger {
    pub fn new(store: Arc<dyn KeyPathStore>) -> Self {
        Self { store }
    }

    pub async fn has_completed(&self, key: &RouteKey, user_id: &str) -> Result<bool, CragError> {
        Ok(self
            .store
            .get(&paths::completion(key, user_id))
            .await?
            .is_some())
    }

    /// Writes the record. Caller must have verified `has_completed` is false;
    /// this does not re-check.
    pub async fn mark_completed(
        &self,
        key: &RouteKey,
        user_id: &str,
        flashed: bool,
    ) -> Result<(), CragError> {
        self.store
            .set(&paths::completion(key, user_id), Value::Bool(flashed))
            .await
    }

    /// Deletes the record. Caller must have verified `has_completed` is true.
    pub async fn unmark(&self, key: &RouteKey, user_id: &str) -> Result<(), CragError> {
        self.store.remove(&paths::completion(key, user_id)).await
    }
}
