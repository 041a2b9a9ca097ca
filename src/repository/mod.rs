//! In-memory record store owned by one session

pub mod alerts;
pub mod equipment;
pub mod logs;
pub mod parts;
pub mod tasks;
pub mod telemetry;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::models::{
    Alert, Equipment, EquipmentHealthState, MaintenanceLogEntry, MaintenanceTask, SparePart, User,
};

pub use telemetry::SampleHistory;

/// All collections of a session. Collections keep insertion order, which is
/// the input order the query engine preserves for ties.
pub struct Store {
    equipment: IndexMap<String, Equipment>,
    tasks: IndexMap<String, MaintenanceTask>,
    alerts: IndexMap<String, Alert>,
    logs: IndexMap<String, MaintenanceLogEntry>,
    parts: IndexMap<String, SparePart>,
    users: IndexMap<String, User>,
    samples: HashMap<String, SampleHistory>,
    health: HashMap<String, EquipmentHealthState>,
    history_capacity: usize,
}

impl Store {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            equipment: IndexMap::new(),
            tasks: IndexMap::new(),
            alerts: IndexMap::new(),
            logs: IndexMap::new(),
            parts: IndexMap::new(),
            users: IndexMap::new(),
            samples: HashMap::new(),
            health: HashMap::new(),
            history_capacity: history_capacity.max(1),
        }
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }
}

/// Shared handle to a session's store.
///
/// Every mutation goes through the single write lock, so a telemetry tick
/// and a user edit never interleave.
#[derive(Clone)]
pub struct Repository {
    store: Arc<RwLock<Store>>,
}

impl Repository {
    /// Create an empty repository
    pub fn new(history_capacity: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::new(history_capacity))),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().await
    }
}

/// New record id such as `task-3f2a...`
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}
