//! Alert domain methods on Store

use super::Store;
use crate::{
    error::{AppError, AppResult},
    models::Alert,
};

impl Store {
    pub fn alerts_list(&self) -> Vec<Alert> {
        self.alerts.values().cloned().collect()
    }

    pub fn alerts_get_mut(&mut self, id: &str) -> AppResult<&mut Alert> {
        self.alerts
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Alert {} not found", id)))
    }

    pub fn alerts_insert(&mut self, alert: Alert) {
        self.alerts.shift_insert(0, alert.id.clone(), alert);
    }

    /// Acknowledge every open alert, returning how many changed
    pub fn alerts_acknowledge_all(&mut self) -> usize {
        let mut changed = 0;
        for alert in self.alerts.values_mut().filter(|a| !a.acknowledged) {
            alert.acknowledged = true;
            changed += 1;
        }
        changed
    }
}
