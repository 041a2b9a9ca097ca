//! Equipment model, health samples and the derived health state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::query::{FieldFilter, Queryable, SortDirection, SortValue};
use crate::models::enums::{EquipmentStatus, RiskLevel};

/// Equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub name: String,
    /// Free-form category, e.g. "Printer" or "HVAC"
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub location: String,
    pub status: EquipmentStatus,
    pub last_service_date: DateTime<Utc>,
    pub purchase_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub assigned_technician_id: Option<String>,
}

/// One telemetry reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSample {
    pub timestamp: DateTime<Utc>,
    /// mm/s
    pub vibration: f64,
    /// Celsius
    pub temperature: f64,
    /// Cumulative, never decreases
    pub usage_hours: f64,
    /// kWh
    pub energy_consumption: f64,
}

impl HealthSample {
    /// Finite readings with non-negative usage
    pub fn is_well_formed(&self) -> bool {
        self.vibration.is_finite()
            && self.temperature.is_finite()
            && self.usage_hours.is_finite()
            && self.usage_hours >= 0.0
            && self.energy_consumption.is_finite()
    }
}

/// Derived health of one unit. Never stored on the equipment record; the
/// store keeps the latest value per unit and recomputes it on every sample
/// and status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentHealthState {
    pub equipment_id: String,
    pub status: EquipmentStatus,
    pub predicted_risk: RiskLevel,
    pub next_service_date: Option<DateTime<Utc>>,
    /// Timestamp of the latest accepted sample
    pub last_sample_at: Option<DateTime<Utc>>,
}

/// Equipment together with its derived health, as shown in list views
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentOverview {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub health: EquipmentHealthState,
}

impl EquipmentOverview {
    /// Critical status or high predicted risk
    pub fn is_at_risk(&self) -> bool {
        self.equipment.status == EquipmentStatus::Critical
            || self.health.predicted_risk == RiskLevel::High
    }
}

impl Queryable for EquipmentOverview {
    const KIND: &'static str = "equipment";
    const SORT_KEYS: &'static [&'static str] = &[
        "name",
        "type",
        "location",
        "status",
        "risk",
        "lastServiceDate",
        "nextServiceDate",
        "purchaseDate",
    ];

    fn text_fields(&self) -> Vec<&str> {
        vec![self.equipment.name.as_str(), self.equipment.location.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        let eq = &self.equipment;
        match key {
            "name" => SortValue::text(&eq.name),
            "type" => SortValue::text(&eq.equipment_type),
            "location" => SortValue::text(&eq.location),
            "status" => SortValue::text(eq.status.as_str()),
            "risk" => SortValue::Number(self.health.predicted_risk as u8 as f64),
            "lastServiceDate" => SortValue::Time(eq.last_service_date),
            "nextServiceDate" => SortValue::time(self.health.next_service_date),
            "purchaseDate" => SortValue::Time(eq.purchase_date),
            _ => SortValue::Missing,
        }
    }
}

/// Equipment detail view: the unit, its work history and recent telemetry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDetail {
    #[serde(flatten)]
    pub overview: EquipmentOverview,
    pub tasks: Vec<crate::models::task::MaintenanceTask>,
    pub logs: Vec<crate::models::log::MaintenanceLogEntry>,
    pub samples: Vec<HealthSample>,
}

/// Create equipment request. Missing fields fall back to placeholder values.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub equipment_type: Option<String>,
    pub location: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub last_service_date: Option<DateTime<Utc>>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub assigned_technician_id: Option<String>,
}

/// Update equipment request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub equipment_type: Option<String>,
    pub location: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub last_service_date: Option<DateTime<Utc>>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub assigned_technician_id: Option<String>,
}

/// Equipment list query
#[derive(Debug, Clone, Default)]
pub struct EquipmentQuery {
    pub search: String,
    pub status: FieldFilter<EquipmentStatus>,
    pub equipment_type: FieldFilter<String>,
    pub risk: FieldFilter<RiskLevel>,
    pub technician_id: FieldFilter<String>,
    pub sort: Option<(String, SortDirection)>,
}

/// Whether dependent records go along with a deleted unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Refuse when anything still references the unit
    #[default]
    Restrict,
    /// The user confirmed: remove dependents too
    Cascade,
}

/// What a delete removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub equipment_id: String,
    pub tasks_removed: usize,
    pub logs_removed: usize,
    pub alerts_removed: usize,
    pub samples_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(vibration: f64, usage_hours: f64) -> HealthSample {
        HealthSample {
            timestamp: Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
            vibration,
            temperature: 22.0,
            usage_hours,
            energy_consumption: 1.5,
        }
    }

    #[test]
    fn test_well_formed_sample() {
        assert!(sample(0.3, 10.0).is_well_formed());
        assert!(!sample(f64::NAN, 10.0).is_well_formed());
        assert!(!sample(0.3, -1.0).is_well_formed());
    }

    #[test]
    fn test_equipment_serializes_type_field() {
        let eq = Equipment {
            id: "eq-1".to_string(),
            name: "Office Printer X1000".to_string(),
            equipment_type: "Printer".to_string(),
            location: "Floor 1, Copy Room".to_string(),
            status: EquipmentStatus::Ok,
            last_service_date: Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap(),
            purchase_date: Utc.with_ymd_and_hms(2023, 1, 10, 0, 0, 0).unwrap(),
            notes: None,
            assigned_technician_id: Some("user-3".to_string()),
        };
        let json = serde_json::to_value(&eq).unwrap();
        assert_eq!(json["type"], "Printer");
        assert_eq!(json["status"], "OK");
        assert_eq!(json["assignedTechnicianId"], "user-3");
    }
}
