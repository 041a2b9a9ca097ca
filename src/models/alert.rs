//! Alert model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::query::{FieldFilter, Queryable, SortDirection, SortValue};
use crate::models::enums::{AckState, AlertSeverity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub equipment_id: String,
    pub equipment_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub acknowledged: bool,
}

impl Queryable for Alert {
    const KIND: &'static str = "alert";
    const SORT_KEYS: &'static [&'static str] = &["timestamp", "severity", "equipmentName"];
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> =
        Some(("timestamp", SortDirection::Desc));

    fn text_fields(&self) -> Vec<&str> {
        vec![self.message.as_str(), self.equipment_name.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "timestamp" => SortValue::Time(self.timestamp),
            "severity" => SortValue::Number(self.severity as u8 as f64),
            "equipmentName" => SortValue::text(&self.equipment_name),
            _ => SortValue::Missing,
        }
    }
}

/// Raise alert request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlert {
    #[validate(length(min = 1, message = "Equipment is required"))]
    pub equipment_id: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    pub severity: AlertSeverity,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub search: String,
    pub severity: FieldFilter<AlertSeverity>,
    pub acknowledged: FieldFilter<AckState>,
    pub equipment_id: FieldFilter<String>,
    pub sort: Option<(String, SortDirection)>,
}
