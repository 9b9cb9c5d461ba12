use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::CragError;
use crate::store::{KeyPathStore, TransactFn};

/// Tuning knobs for [`MemoryStore`].
#[derive(Debug, Clone, Copy)]
pub struct MemoryStoreConfig {
    /// How many times `transact` re-runs its read-compute-swap loop before
    /// giving up with `TransactionNotCommitted`. Matches the real backing
    /// store's documented budget.
    pub max_transact_retries: u32,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_transact_retries: 25,
        }
    }
}

impl MemoryStoreConfig {
    pub fn with_max_transact_retries(mut self, retries: u32) -> Self {
        self.max_transact_retries = retries;
        self
    }
}

/// In-memory JSON-tree `KeyPathStore`; useful for tests and ephemeral use.
///
/// Semantics follow the real store: empty nodes do not exist (a read of an
/// empty object is `None`), setting null deletes, and `transact` is an
/// optimistic compare-and-swap loop over a single path.
#[derive(Debug)]
pub struct MemoryStore {
    root: Mutex<Value>,
    config: MemoryStoreConfig,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            root: Mutex::new(Value::Object(Map::new())),
            config,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// A null or empty-object node is indistinguishable from an absent one.
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn node_at<'a>(root: &'a Value, segs: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for seg in segs {
        node = node.as_object()?.get(*seg)?;
    }
    Some(node)
}

/// Intermediate nodes are objects; anything else in the way is overwritten,
/// as the real store does.
fn as_object_or_reset(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn set_at(root: &mut Value, segs: &[&str], value: Value) {
    if segs.is_empty() {
        *root = value;
        return;
    }
    let mut node = root;
    for seg in &segs[..segs.len() - 1] {
        node = as_object_or_reset(node)
            .entry(seg.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    as_object_or_reset(node).insert(segs[segs.len() - 1].to_string(), value);
}

fn remove_at(root: &mut Value, segs: &[&str]) {
    if segs.is_empty() {
        *root = Value::Object(Map::new());
        return;
    }
    let mut node = root;
    for seg in &segs[..segs.len() - 1] {
        match node.as_object_mut().and_then(|m| m.get_mut(*seg)) {
            Some(child) => node = child,
            None => return,
        }
    }
    if let Some(map) = node.as_object_mut() {
        map.remove(segs[segs.len() - 1]);
    }
}

fn read_current(root: &Value, segs: &[&str]) -> Option<Value> {
    node_at(root, segs)
        .filter(|v| !is_absent(v))
        .cloned()
}

#[async_trait]
impl KeyPathStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, CragError> {
        let root = self.root.lock();
        Ok(read_current(&root, &segments(path)))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), CragError> {
        let segs = segments(path);
        let mut root = self.root.lock();
        if value.is_null() {
            remove_at(&mut root, &segs);
        } else {
            set_at(&mut root, &segs, value);
        }
        Ok(())
    }

    async fn update(&self, path: &str, partial: Map<String, Value>) -> Result<(), CragError> {
        let segs = segments(path);
        let mut root = self.root.lock();
        for (child, value) in partial {
            let mut child_segs = segs.clone();
            child_segs.push(child.as_str());
            if value.is_null() {
                remove_at(&mut root, &child_segs);
            } else {
                set_at(&mut root, &child_segs, value);
            }
        }
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), CragError> {
        let mut root = self.root.lock();
        remove_at(&mut root, &segments(path));
        Ok(())
    }

    async fn transact(&self, path: &str, apply: TransactFn<'_>) -> Result<i64, CragError> {
        let segs = segments(path);
        for _ in 0..self.config.max_transact_retries {
            let observed = {
                let root = self.root.lock();
                read_current(&root, &segs).and_then(|v| v.as_i64())
            };
            let next = apply(observed);

            let mut root = self.root.lock();
            let current = read_current(&root, &segs).and_then(|v| v.as_i64());
            if current == observed {
                set_at(&mut root, &segs, Value::from(next));
                return Ok(next);
            }
        }
        tracing::warn!(path, "transaction retry budget exhausted");
        Err(CragError::TransactionNotCommitted {
            path: path.to_string(),
        })
    }
}
