//! Dashboard and report models

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{alert::Alert, enums::EquipmentStatus, equipment::EquipmentOverview};

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub total_equipment: usize,
    /// Units per status, in status order; statuses with no units are omitted
    pub status_counts: IndexMap<EquipmentStatus, usize>,
    /// Unacknowledged alerts with Error severity
    pub critical_alerts: usize,
    /// Unacknowledged alerts with Warning severity
    pub warning_alerts: usize,
    /// Tasks not completed and due after `generated_at`
    pub upcoming_tasks: usize,
    pub at_risk: Vec<EquipmentOverview>,
    pub recent_alerts: Vec<Alert>,
}

/// One labelled value of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatEntry {
    pub name: String,
    pub value: f64,
}

impl StatEntry {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    EquipmentStatus,
    MaintenanceActivity,
    HealthTrends,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<StatEntry>,
}

/// Inventory valuation and reorder picture
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValuation {
    pub total_parts: usize,
    pub total_units: u64,
    pub total_value: Decimal,
    pub low_stock: usize,
    pub out_of_stock: usize,
}
