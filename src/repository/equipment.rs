//! Equipment domain methods on Store

use super::Store;
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::CascadeReport, Equipment, EquipmentHealthState, EquipmentOverview,
    },
};

/// Records that still point at an equipment unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dependents {
    pub tasks: usize,
    pub logs: usize,
    pub alerts: usize,
}

impl Dependents {
    pub fn is_empty(&self) -> bool {
        self.tasks == 0 && self.logs == 0 && self.alerts == 0
    }
}

impl Store {
    /// List all equipment in insertion order
    pub fn equipment_list(&self) -> Vec<Equipment> {
        self.equipment.values().cloned().collect()
    }

    /// List all equipment joined with its health state
    pub fn equipment_overviews(&self) -> Vec<EquipmentOverview> {
        self.equipment
            .values()
            .filter_map(|equipment| {
                self.health.get(&equipment.id).map(|health| EquipmentOverview {
                    equipment: equipment.clone(),
                    health: health.clone(),
                })
            })
            .collect()
    }

    /// Get equipment by ID
    pub fn equipment_get_by_id(&self, id: &str) -> AppResult<&Equipment> {
        self.equipment
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    pub fn equipment_get_mut(&mut self, id: &str) -> AppResult<&mut Equipment> {
        self.equipment
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    pub fn equipment_overview(&self, id: &str) -> AppResult<EquipmentOverview> {
        Ok(EquipmentOverview {
            equipment: self.equipment_get_by_id(id)?.clone(),
            health: self.health_get(id)?.clone(),
        })
    }

    /// Insert a unit together with its initial health state
    pub fn equipment_insert(&mut self, equipment: Equipment, health: EquipmentHealthState) {
        self.health.insert(equipment.id.clone(), health);
        self.equipment.insert(equipment.id.clone(), equipment);
    }

    /// Distinct equipment types in first-seen order
    pub fn equipment_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for equipment in self.equipment.values() {
            if !types.contains(&equipment.equipment_type) {
                types.push(equipment.equipment_type.clone());
            }
        }
        types
    }

    pub fn equipment_dependents(&self, id: &str) -> Dependents {
        Dependents {
            tasks: self.tasks.values().filter(|t| t.equipment_id == id).count(),
            logs: self.logs.values().filter(|l| l.equipment_id == id).count(),
            alerts: self.alerts.values().filter(|a| a.equipment_id == id).count(),
        }
    }

    /// Remove a unit and everything that references it
    pub fn equipment_remove_cascade(&mut self, id: &str) -> AppResult<CascadeReport> {
        if self.equipment.shift_remove(id).is_none() {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }

        let before = (self.tasks.len(), self.logs.len(), self.alerts.len());
        self.tasks.retain(|_, t| t.equipment_id != id);
        self.logs.retain(|_, l| l.equipment_id != id);
        self.alerts.retain(|_, a| a.equipment_id != id);
        self.health.remove(id);
        let samples_removed = self.samples.remove(id).map_or(0, |h| h.len());

        Ok(CascadeReport {
            equipment_id: id.to_string(),
            tasks_removed: before.0 - self.tasks.len(),
            logs_removed: before.1 - self.logs.len(),
            alerts_removed: before.2 - self.alerts.len(),
            samples_removed,
        })
    }

    /// Refresh the denormalized equipment name on dependent records
    pub fn equipment_rename_references(&mut self, id: &str, name: &str) {
        for task in self.tasks.values_mut().filter(|t| t.equipment_id == id) {
            task.equipment_name = name.to_string();
        }
        for log in self.logs.values_mut().filter(|l| l.equipment_id == id) {
            log.equipment_name = name.to_string();
        }
        for alert in self.alerts.values_mut().filter(|a| a.equipment_id == id) {
            alert.equipment_name = name.to_string();
        }
    }
}
