//! Maintenance log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::query::{FieldFilter, Queryable, SortDirection, SortValue};

/// Spare part consumed during a maintenance job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartUsage {
    pub part_id: String,
    pub part_name: String,
    pub quantity: u32,
}

/// Record of completed maintenance work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceLogEntry {
    pub id: String,
    pub equipment_id: String,
    pub equipment_name: String,
    pub task_id: Option<String>,
    pub date: DateTime<Utc>,
    /// Technician name
    pub performed_by: String,
    pub description: String,
    pub parts_used: Vec<PartUsage>,
    pub duration_hours: f64,
}

impl Queryable for MaintenanceLogEntry {
    const KIND: &'static str = "log";
    const SORT_KEYS: &'static [&'static str] =
        &["date", "equipmentName", "performedBy", "durationHours"];
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> = Some(("date", SortDirection::Desc));

    fn text_fields(&self) -> Vec<&str> {
        vec![self.description.as_str(), self.equipment_name.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "date" => SortValue::Time(self.date),
            "equipmentName" => SortValue::text(&self.equipment_name),
            "performedBy" => SortValue::text(&self.performed_by),
            "durationHours" => SortValue::Number(self.duration_hours),
            _ => SortValue::Missing,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PartUsageRequest {
    pub part_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

/// Create log entry request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogEntry {
    #[validate(length(min = 1, message = "Equipment is required"))]
    pub equipment_id: String,
    pub task_id: Option<String>,
    pub date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Technician is required"))]
    pub performed_by: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(nested)]
    #[serde(default)]
    pub parts_used: Vec<PartUsageRequest>,
    #[validate(range(min = 0.0, message = "Duration cannot be negative"))]
    pub duration_hours: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub search: String,
    pub equipment_id: FieldFilter<String>,
    pub technician: FieldFilter<String>,
    pub sort: Option<(String, SortDirection)>,
}
