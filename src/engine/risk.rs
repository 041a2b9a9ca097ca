//! Failure-risk classification and service-date prediction.
//!
//! The estimator is a pure function of the previous health state, the newest
//! sample and the unit's status. It keeps no history of its own: callers
//! store the returned state and bound their sample buffers.

use chrono::{DateTime, Months, Utc};

use crate::config::RiskConfig;
use crate::error::{AppError, AppResult};
use crate::models::enums::{EquipmentStatus, RiskLevel};
use crate::models::equipment::{EquipmentHealthState, HealthSample};

/// Policy thresholds; a reading strictly above a threshold triggers it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPolicy {
    pub base_interval_months: u32,
    pub vibration_medium: f64,
    pub temperature_medium: f64,
    pub vibration_high: f64,
    pub temperature_high: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        RiskConfig::default().into()
    }
}

impl From<RiskConfig> for RiskPolicy {
    fn from(config: RiskConfig) -> Self {
        Self {
            base_interval_months: config.base_interval_months,
            vibration_medium: config.vibration_medium,
            temperature_medium: config.temperature_medium,
            vibration_high: config.vibration_high,
            temperature_high: config.temperature_high,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskEstimator {
    policy: RiskPolicy,
}

impl RiskEstimator {
    pub fn new(policy: RiskPolicy) -> Self {
        Self { policy }
    }

    /// Same thresholds with another base service interval
    pub fn with_interval(mut self, months: u32) -> Self {
        self.policy.base_interval_months = months;
        self
    }

    /// Risk implied by one sample alone, before any status override
    pub fn sample_risk(&self, sample: &HealthSample) -> RiskLevel {
        let p = &self.policy;
        if sample.vibration > p.vibration_high || sample.temperature > p.temperature_high {
            RiskLevel::High
        } else if sample.vibration > p.vibration_medium || sample.temperature > p.temperature_medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// State of a unit before (or without) any telemetry
    pub fn initial_state(
        &self,
        equipment_id: &str,
        status: EquipmentStatus,
        last_service_date: DateTime<Utc>,
    ) -> EquipmentHealthState {
        let seed = EquipmentHealthState {
            equipment_id: equipment_id.to_string(),
            status,
            predicted_risk: RiskLevel::Low,
            next_service_date: None,
            last_sample_at: None,
        };
        self.reassess(&seed, status, None, last_service_date)
    }

    /// Fold a new sample into the state.
    ///
    /// Suspended units (maintenance, offline) ignore the sample and keep
    /// their frozen risk. A sample older than the latest accepted one fails
    /// with `OutOfOrderSample` and leaves the caller's state untouched.
    pub fn estimate(
        &self,
        previous: &EquipmentHealthState,
        sample: &HealthSample,
        last_service_date: DateTime<Utc>,
    ) -> AppResult<EquipmentHealthState> {
        debug_assert!(sample.is_well_formed(), "malformed health sample: {:?}", sample);

        if previous.status.is_suspended() {
            return Ok(self.frozen(previous, previous.status));
        }

        if let Some(latest_at) = previous.last_sample_at {
            if sample.timestamp < latest_at {
                return Err(AppError::OutOfOrderSample {
                    equipment_id: previous.equipment_id.clone(),
                    sample_at: sample.timestamp,
                    latest_at,
                });
            }
        }

        let (risk, next_service_date) = self.evaluate(Some(sample), last_service_date);
        Ok(EquipmentHealthState {
            equipment_id: previous.equipment_id.clone(),
            status: previous.status,
            predicted_risk: apply_status_override(risk, previous.status),
            next_service_date: Some(next_service_date),
            last_sample_at: Some(sample.timestamp),
        })
    }

    /// Recompute after a status or service-date edit, using the latest
    /// retained sample when there is one.
    pub fn reassess(
        &self,
        previous: &EquipmentHealthState,
        status: EquipmentStatus,
        latest: Option<&HealthSample>,
        last_service_date: DateTime<Utc>,
    ) -> EquipmentHealthState {
        if status.is_suspended() {
            return self.frozen(previous, status);
        }

        let (risk, next_service_date) = self.evaluate(latest, last_service_date);
        EquipmentHealthState {
            equipment_id: previous.equipment_id.clone(),
            status,
            predicted_risk: apply_status_override(risk, status),
            next_service_date: Some(next_service_date),
            last_sample_at: previous.last_sample_at,
        }
    }

    /// State of a suspended unit after history was loaded for it in bulk:
    /// risk follows the newest reading, no service date is predicted.
    pub fn frozen_at(&self, previous: &EquipmentHealthState, latest: &HealthSample) -> EquipmentHealthState {
        EquipmentHealthState {
            equipment_id: previous.equipment_id.clone(),
            status: previous.status,
            predicted_risk: apply_status_override(self.sample_risk(latest), previous.status),
            next_service_date: None,
            last_sample_at: Some(latest.timestamp),
        }
    }

    fn frozen(&self, previous: &EquipmentHealthState, status: EquipmentStatus) -> EquipmentHealthState {
        EquipmentHealthState {
            equipment_id: previous.equipment_id.clone(),
            status,
            predicted_risk: previous.predicted_risk,
            next_service_date: None,
            last_sample_at: previous.last_sample_at,
        }
    }

    fn evaluate(
        &self,
        sample: Option<&HealthSample>,
        last_service_date: DateTime<Utc>,
    ) -> (RiskLevel, DateTime<Utc>) {
        let base = add_months(last_service_date, self.policy.base_interval_months);
        let risk = sample.map_or(RiskLevel::Low, |s| self.sample_risk(s));

        let next_service_date = match risk {
            RiskLevel::Low => base,
            RiskLevel::Medium => sub_months(base, 1),
            // Urgent, and never later than the medium date for short intervals
            RiskLevel::High => add_months(last_service_date, 1).min(sub_months(base, 1)),
        };
        (risk, next_service_date)
    }
}

/// Critical forces High; Warning lifts anything below Medium
fn apply_status_override(risk: RiskLevel, status: EquipmentStatus) -> RiskLevel {
    match status {
        EquipmentStatus::Critical => RiskLevel::High,
        EquipmentStatus::Warning => risk.max(RiskLevel::Medium),
        _ => risk,
    }
}

fn add_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn sub_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}
