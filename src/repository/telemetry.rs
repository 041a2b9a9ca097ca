//! Sample history and derived health state per equipment unit

use std::collections::VecDeque;

use super::Store;
use crate::{
    error::{AppError, AppResult},
    models::{EquipmentHealthState, HealthSample},
};

/// Bounded, time-ordered samples of one unit; the oldest is evicted first
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<HealthSample>,
    capacity: usize,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample, returning the one evicted to make room
    pub fn push(&mut self, sample: HealthSample) -> Option<HealthSample> {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front()
        } else {
            None
        }
    }

    pub fn latest(&self) -> Option<&HealthSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HealthSample> + ExactSizeIterator {
        self.samples.iter()
    }

    /// The last `n` samples, oldest first
    pub fn recent(&self, n: usize) -> Vec<HealthSample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }
}

impl Store {
    /// Append a sample to the unit's history, creating the history on first use
    pub fn samples_push(&mut self, equipment_id: &str, sample: HealthSample) -> Option<HealthSample> {
        let capacity = self.history_capacity;
        self.samples
            .entry(equipment_id.to_string())
            .or_insert_with(|| SampleHistory::new(capacity))
            .push(sample)
    }

    pub fn samples_latest(&self, equipment_id: &str) -> Option<&HealthSample> {
        self.samples.get(equipment_id).and_then(SampleHistory::latest)
    }

    pub fn samples_list(&self, equipment_id: &str) -> Vec<HealthSample> {
        self.samples
            .get(equipment_id)
            .map(|history| history.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn samples_recent(&self, equipment_id: &str, n: usize) -> Vec<HealthSample> {
        self.samples
            .get(equipment_id)
            .map(|history| history.recent(n))
            .unwrap_or_default()
    }

    pub fn health_get(&self, equipment_id: &str) -> AppResult<&EquipmentHealthState> {
        self.health
            .get(equipment_id)
            .ok_or_else(|| AppError::NotFound(format!("Health state for {} not found", equipment_id)))
    }

    pub fn health_put(&mut self, state: EquipmentHealthState) {
        self.health.insert(state.equipment_id.clone(), state);
    }
}
