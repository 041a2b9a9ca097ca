//! Task domain methods on Store

use super::Store;
use crate::{
    error::{AppError, AppResult},
    models::MaintenanceTask,
};

impl Store {
    pub fn tasks_list(&self) -> Vec<MaintenanceTask> {
        self.tasks.values().cloned().collect()
    }

    pub fn tasks_get_by_id(&self, id: &str) -> AppResult<&MaintenanceTask> {
        self.tasks
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))
    }

    pub fn tasks_get_mut(&mut self, id: &str) -> AppResult<&mut MaintenanceTask> {
        self.tasks
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))
    }

    /// New tasks go first, like the schedule view shows them
    pub fn tasks_insert(&mut self, task: MaintenanceTask) {
        self.tasks.shift_insert(0, task.id.clone(), task);
    }

    pub fn tasks_remove(&mut self, id: &str) -> AppResult<MaintenanceTask> {
        self.tasks
            .shift_remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))
    }

    pub fn tasks_for_equipment(&self, equipment_id: &str) -> Vec<MaintenanceTask> {
        self.tasks
            .values()
            .filter(|t| t.equipment_id == equipment_id)
            .cloned()
            .collect()
    }
}
