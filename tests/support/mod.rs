#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use cragtrack::error::CragError;
use cragtrack::store::{KeyPathStore, TransactFn};
use cragtrack::{MemoryStore, Route, RouteKey, Wall};

/// Installs a subscriber so `RUST_LOG` controls test log output. Safe to call
/// from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Seeds a full gym → wall → route hierarchy so completion and rating runs
/// pass their existence checks.
pub async fn seed_route(
    store: &dyn KeyPathStore,
    key: &RouteKey,
    difficulty: i64,
    wall_features: &str,
    route_features: &str,
) {
    let wall = Wall {
        set_date: Some("2026-01-15".into()),
        features: Some(wall_features.to_string()),
    };
    let route = Route {
        features: Some(route_features.to_string()),
        difficulty: Some(difficulty),
        ..Route::default()
    };

    store
        .set(
            &format!("/gyms/{}", key.gym_id),
            json!({ "name": "Test Gym" }),
        )
        .await
        .expect("seed gym");
    store
        .set(
            &format!("/walls/{}/{}", key.gym_id, key.wall_id),
            serde_json::to_value(&wall).expect("wall payload"),
        )
        .await
        .expect("seed wall");
    store
        .set(
            &format!("/routes/{}/{}/{}", key.gym_id, key.wall_id, key.route_id),
            serde_json::to_value(&route).expect("route payload"),
        )
        .await
        .expect("seed route");
}

pub async fn i64_at(store: &dyn KeyPathStore, path: &str) -> Option<i64> {
    store
        .get(path)
        .await
        .expect("read")
        .and_then(|v| v.as_i64())
}

pub async fn f64_at(store: &dyn KeyPathStore, path: &str) -> Option<f64> {
    store
        .get(path)
        .await
        .expect("read")
        .and_then(|v| v.as_f64())
}

/// Store operations a fault rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOp {
    Get,
    Set,
    Update,
    Remove,
    Transact,
}

/// `MemoryStore` wrapper that fails selected operations with a storage error,
/// for exercising partial-failure drift. Rules are armed after seeding and
/// match on (operation, path fragment).
pub struct FaultStore {
    inner: MemoryStore,
    rules: Mutex<Vec<(FaultOp, String)>>,
}

impl FaultStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            rules: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_on(&self, op: FaultOp, path_fragment: &str) {
        self.rules.lock().push((op, path_fragment.to_string()));
    }

    fn trip(&self, op: FaultOp, path: &str) -> Result<(), CragError> {
        let rules = self.rules.lock();
        if rules
            .iter()
            .any(|(rule_op, fragment)| *rule_op == op && path.contains(fragment.as_str()))
        {
            return Err(CragError::Storage(format!("injected fault on {path}")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyPathStore for FaultStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, CragError> {
        self.trip(FaultOp::Get, path)?;
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), CragError> {
        self.trip(FaultOp::Set, path)?;
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<(), CragError> {
        self.trip(FaultOp::Update, path)?;
        self.inner.update(path, partial).await
    }

    async fn remove(&self, path: &str) -> Result<(), CragError> {
        self.trip(FaultOp::Remove, path)?;
        self.inner.remove(path).await
    }

    async fn transact(&self, path: &str, apply: TransactFn<'_>) -> Result<i64, CragError> {
        self.trip(FaultOp::Transact, path)?;
        self.inner.transact(path, apply).await
    }
}
