pub mod memory;
pub mod paths;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::CragError;

/// Read-compute step handed to [`KeyPathStore::transact`]. Receives the
/// current numeric value at the path (`None` when absent) and returns the
/// value to commit. The store retries it internally until uncontended.
pub type TransactFn<'a> = &'a (dyn Fn(Option<i64>) -> i64 + Send + Sync);

/// Hierarchical key-value store addressed by slash-delimited paths.
///
/// This is the entire surface the completion core is allowed to touch: point
/// read, overwrite, shallow merge, delete, and a single-key atomic increment
/// style transaction. There are no multi-key transactions; every consistency
/// property the core provides has to be built from these five calls.
#[async_trait]
pub trait KeyPathStore: Send + Sync + 'static {
    /// Point read. Absence is `Ok(None)`, never an error.
    async fn get(&self, path: &str) -> Result<Option<Value>, CragError>;

    /// Overwrite the value at `path`, creating intermediate nodes as needed.
    async fn set(&self, path: &str, value: Value) -> Result<(), CragError>;

    /// Shallow merge of `partial` into the node at `path`. Null entries in
    /// `partial` delete the corresponding child.
    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<(), CragError>;

    /// Delete the subtree at `path`. Removing an absent path is a no-op.
    async fn remove(&self, path: &str) -> Result<(), CragError>;

    /// Atomic single-key numeric transaction. `apply` may run more than once;
    /// a store that exhausts its retry budget reports
    /// [`CragError::TransactionNotCommitted`], never a silent partial commit.
    /// Returns the committed value.
    async fn transact(&self, path: &str, apply: TransactFn<'_>) -> Result<i64, CragError>;
}
