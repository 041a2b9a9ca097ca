//! Maintenance task model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::query::{FieldFilter, Queryable, SortDirection, SortValue};
use crate::models::enums::{TaskPriority, TaskStatus};

/// Scheduled maintenance work on one equipment unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTask {
    pub id: String,
    pub equipment_id: String,
    /// Copy of the equipment name at the time of the last edit
    pub equipment_name: String,
    pub description: String,
    /// User id of the assignee, or "Unassigned"
    pub assigned_to: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Queryable for MaintenanceTask {
    const KIND: &'static str = "task";
    const SORT_KEYS: &'static [&'static str] = &[
        "dueDate",
        "createdAt",
        "priority",
        "status",
        "equipmentName",
        "assignedTo",
    ];
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> = Some(("dueDate", SortDirection::Asc));

    fn text_fields(&self) -> Vec<&str> {
        vec![self.description.as_str(), self.equipment_name.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "dueDate" => SortValue::Time(self.due_date),
            "createdAt" => SortValue::Time(self.created_at),
            "priority" => SortValue::Number(self.priority as u8 as f64),
            "status" => SortValue::text(self.status.as_str()),
            "equipmentName" => SortValue::text(&self.equipment_name),
            "assignedTo" => SortValue::text(&self.assigned_to),
            _ => SortValue::Missing,
        }
    }
}

/// Create task request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[validate(length(min = 1, message = "Equipment is required"))]
    pub equipment_id: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// User id; defaults to the first technician
    pub assigned_to: Option<String>,
    pub due_date: DateTime<Utc>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub notes: Option<String>,
}

/// Update task request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub equipment_id: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub notes: Option<String>,
}

/// Task list query
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub search: String,
    pub status: FieldFilter<TaskStatus>,
    pub priority: FieldFilter<TaskPriority>,
    pub assignee: FieldFilter<String>,
    pub equipment_id: FieldFilter<String>,
    pub sort: Option<(String, SortDirection)>,
}
