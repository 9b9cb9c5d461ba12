use std::sync::Arc;

use crate::error::CragError;
use crate::model::{Route, RouteKey};
use crate::store::{paths, KeyPathStore};

/// Read-only hierarchy checks performed before any mutation. "Exists" means a
/// point read returns a non-null value; absence is a normal `false`, never an
/// error.
#[derive(Clone)]
pub struct ExistenceChecker {
    store: Arc<dyn KeyPathStore>,
}

impl ExistenceChecker {
    pub fn new(store: Arc<dyn KeyPathStore>) -> Self {
        Self { store }
    }

    pub async fn gym_exists(&self, gym_id: &str) -> Result<bool, CragError> {
        Ok(self.store.get(&paths::gym(gym_id)).await?.is_some())
    }

    pub async fn wall_exists(&self, gym_id: &str, wall_id: &str) -> Result<bool, CragError> {
        Ok(self.store.get(&paths::wall(gym_id, wall_id)).await?.is_some())
    }

    /// Checks the route and optionally returns its payload, saving the caller
    /// a second read.
    pub async fn route_exists(
        &self,
        key: &RouteKey,
        fetch: bool,
    ) -> Result<(bool, Option<Route>), CragError> {
        match self.store.get(&paths::route(key)).await? {
            None => Ok((false, None)),
            Some(value) if fetch => {
                let route: Route = serde_json::from_value(value)
                    .map_err(|e| CragError::Storage(format!("malformed route payload: {e}")))?;
                Ok((true, Some(route)))
            }
            Some(_) => Ok((true, None)),
        }
    }
}
