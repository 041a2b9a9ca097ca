//! Maintenance log methods on Store

use super::Store;
use crate::models::MaintenanceLogEntry;

impl Store {
    pub fn logs_list(&self) -> Vec<MaintenanceLogEntry> {
        self.logs.values().cloned().collect()
    }

    pub fn logs_count(&self) -> usize {
        self.logs.len()
    }

    /// New entries go first
    pub fn logs_insert(&mut self, entry: MaintenanceLogEntry) {
        self.logs.shift_insert(0, entry.id.clone(), entry);
    }

    pub fn logs_for_equipment(&self, equipment_id: &str) -> Vec<MaintenanceLogEntry> {
        self.logs
            .values()
            .filter(|l| l.equipment_id == equipment_id)
            .cloned()
            .collect()
    }
}
