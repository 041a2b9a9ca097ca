//! Telemetry ingestion: sample sources, the periodic tick and backfill

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    engine::RiskEstimator,
    error::{AppError, AppResult},
    models::{EquipmentHealthState, HealthSample},
    repository::{Repository, Store},
};

/// Produces health samples for equipment units
#[cfg_attr(test, mockall::automock)]
pub trait SampleSource: Send {
    /// Next reading for a unit, given its latest retained one. `None` means
    /// the source has nothing for this unit right now.
    fn next_sample(
        &mut self,
        equipment_id: &str,
        previous: Option<HealthSample>,
        at: DateTime<Utc>,
    ) -> Option<HealthSample>;

    /// Daily history ending at `end`, oldest first
    fn backfill(&mut self, _base_usage: f64, _days: u32, _end: DateTime<Utc>) -> Vec<HealthSample> {
        Vec::new()
    }
}

/// Random-walk telemetry for the demo fleet
pub struct SimulatedTelemetry {
    rng: StdRng,
}

impl SimulatedTelemetry {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn fresh_reading(&mut self, usage_hours: f64, at: DateTime<Utc>) -> HealthSample {
        HealthSample {
            timestamp: at,
            vibration: round_to(self.rng.gen_range(0.1..0.6), 2),
            temperature: round_to(self.rng.gen_range(20.0..30.0), 1),
            usage_hours,
            energy_consumption: round_to(self.rng.gen_range(1.0..3.0), 2),
        }
    }
}

impl SampleSource for SimulatedTelemetry {
    fn next_sample(
        &mut self,
        _equipment_id: &str,
        previous: Option<HealthSample>,
        at: DateTime<Utc>,
    ) -> Option<HealthSample> {
        let Some(last) = previous else {
            return Some(self.fresh_reading(0.0, at));
        };

        let drift = |rng: &mut StdRng| rng.gen::<f64>() - 0.45;
        let vibration = (last.vibration + drift(&mut self.rng) * 0.05).max(0.0);
        let temperature = (last.temperature + drift(&mut self.rng) * 0.5).max(15.0);
        let usage_hours = last.usage_hours + self.rng.gen::<f64>() * 0.5;
        let energy_consumption = last.energy_consumption + self.rng.gen::<f64>() * 0.1;

        Some(HealthSample {
            timestamp: at,
            vibration: round_to(vibration, 2),
            temperature: round_to(temperature, 1),
            usage_hours,
            energy_consumption,
        })
    }

    /// About eight usage hours per day on top of `base_usage`
    fn backfill(&mut self, base_usage: f64, days: u32, end: DateTime<Utc>) -> Vec<HealthSample> {
        (0..days)
            .map(|i| {
                let at = end - ChronoDuration::days(i64::from(days - 1 - i));
                let usage = base_usage + f64::from(i) * 8.0 + round_to(self.rng.gen::<f64>(), 2);
                self.fresh_reading(usage, at)
            })
            .collect()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Outcome of one telemetry tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub at: DateTime<Utc>,
    pub sampled: Vec<String>,
    /// Units under maintenance or offline
    pub suspended: Vec<String>,
    /// Units whose sample was dropped as out of order
    pub rejected: Vec<String>,
}

#[derive(Clone)]
pub struct TelemetryService {
    repository: Repository,
    estimator: RiskEstimator,
    source: Arc<Mutex<Box<dyn SampleSource>>>,
}

impl TelemetryService {
    pub fn new(repository: Repository, estimator: RiskEstimator, source: Box<dyn SampleSource>) -> Self {
        Self {
            repository,
            estimator,
            source: Arc::new(Mutex::new(source)),
        }
    }

    /// Fold one sample into a unit's health. Samples for suspended units are
    /// ignored; out-of-order samples are dropped and reported as an error.
    pub async fn ingest(&self, equipment_id: &str, sample: HealthSample) -> AppResult<EquipmentHealthState> {
        let mut store = self.repository.write().await;
        ingest_into(&mut store, &self.estimator, equipment_id, sample)
    }

    /// Retained samples for a unit, oldest first
    pub async fn history(&self, equipment_id: &str) -> AppResult<Vec<HealthSample>> {
        let store = self.repository.read().await;
        store.equipment_get_by_id(equipment_id)?;
        Ok(store.samples_list(equipment_id))
    }

    /// Take one sample per active unit
    pub async fn tick(&self, at: DateTime<Utc>) -> AppResult<TickReport> {
        let mut store = self.repository.write().await;
        let mut source = self.source.lock().await;
        let mut report = TickReport {
            at,
            ..Default::default()
        };

        for equipment in store.equipment_list() {
            if equipment.status.is_suspended() {
                report.suspended.push(equipment.id);
                continue;
            }

            let previous = store.samples_latest(&equipment.id).copied();
            let Some(sample) = source.next_sample(&equipment.id, previous, at) else {
                continue;
            };

            match ingest_into(&mut store, &self.estimator, &equipment.id, sample) {
                Ok(_) => report.sampled.push(equipment.id),
                Err(AppError::OutOfOrderSample { .. }) => report.rejected.push(equipment.id),
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(
            "Telemetry tick at {}: {} sampled, {} suspended, {} rejected",
            at,
            report.sampled.len(),
            report.suspended.len(),
            report.rejected.len()
        );
        Ok(report)
    }

    /// Load `days` of daily history for every unit, ending at `end`.
    /// Suspended units get their history too; their risk follows the newest
    /// reading but no service date is predicted.
    pub async fn backfill(&self, days: u32, end: DateTime<Utc>) -> AppResult<usize> {
        let mut store = self.repository.write().await;
        let mut source = self.source.lock().await;
        let mut accepted = 0;

        for (index, equipment) in store.equipment_list().into_iter().enumerate() {
            let samples = source.backfill(index as f64 * 1000.0, days, end);
            if equipment.status.is_suspended() {
                accepted += backfill_suspended(&mut store, &self.estimator, &equipment.id, samples)?;
                continue;
            }
            for sample in samples {
                if ingest_into(&mut store, &self.estimator, &equipment.id, sample).is_ok() {
                    accepted += 1;
                }
            }
        }

        tracing::info!("Backfilled {} samples over {} days", accepted, days);
        Ok(accepted)
    }

    /// Tick every `period` until `max_ticks` ticks have run, or forever
    pub async fn run(&self, period: Duration, max_ticks: Option<u64>) -> AppResult<u64> {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut ticks = 0;

        while max_ticks.map_or(true, |max| ticks < max) {
            interval.tick().await;
            let report = self.tick(Utc::now()).await?;
            ticks += 1;
            if !report.rejected.is_empty() {
                tracing::warn!("Tick {} dropped samples for {:?}", ticks, report.rejected);
            }
        }

        tracing::info!("Telemetry loop stopped after {} ticks", ticks);
        Ok(ticks)
    }
}

fn backfill_suspended(
    store: &mut Store,
    estimator: &RiskEstimator,
    equipment_id: &str,
    samples: Vec<HealthSample>,
) -> AppResult<usize> {
    let mut latest_at = store.samples_latest(equipment_id).map(|s| s.timestamp);
    let mut stored = 0;
    for sample in samples {
        if latest_at.is_some_and(|at| sample.timestamp < at) {
            continue;
        }
        store.samples_push(equipment_id, sample);
        latest_at = Some(sample.timestamp);
        stored += 1;
    }

    if let Some(latest) = store.samples_latest(equipment_id).copied() {
        let state = estimator.frozen_at(store.health_get(equipment_id)?, &latest);
        tracing::debug!("Suspended {} backfilled, risk {}", equipment_id, state.predicted_risk);
        store.health_put(state);
    }
    Ok(stored)
}

fn ingest_into(
    store: &mut Store,
    estimator: &RiskEstimator,
    equipment_id: &str,
    sample: HealthSample,
) -> AppResult<EquipmentHealthState> {
    let last_service_date = store.equipment_get_by_id(equipment_id)?.last_service_date;
    let previous = store.health_get(equipment_id)?.clone();

    let state = match estimator.estimate(&previous, &sample, last_service_date) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!("Dropping sample: {}", err);
            return Err(err);
        }
    };

    if !previous.status.is_suspended() {
        store.samples_push(equipment_id, sample);
        tracing::debug!(
            "Sample for {}: vibration {} temperature {} -> {}",
            equipment_id,
            sample.vibration,
            sample.temperature,
            state.predicted_risk
        );
    }
    if state.predicted_risk != previous.predicted_risk {
        tracing::info!(
            "Equipment {} risk {} -> {}",
            equipment_id,
            previous.predicted_risk,
            state.predicted_risk
        );
    }

    store.health_put(state.clone());
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentStatus, RiskLevel};
    use crate::seed;
    use chrono::TimeZone;

    fn reading(at: DateTime<Utc>, vibration: f64, temperature: f64) -> HealthSample {
        HealthSample {
            timestamp: at,
            vibration,
            temperature,
            usage_hours: 100.0,
            energy_consumption: 2.0,
        }
    }

    async fn service_with(source: Box<dyn SampleSource>) -> TelemetryService {
        let repository = Repository::new(50);
        let estimator = RiskEstimator::default();
        seed::seed_demo(&repository, &estimator).await;
        TelemetryService::new(repository, estimator, source)
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let mut a = SimulatedTelemetry::new(Some(7));
        let mut b = SimulatedTelemetry::new(Some(7));
        assert_eq!(a.backfill(0.0, 5, at), b.backfill(0.0, 5, at));
    }

    #[test]
    fn test_random_walk_bounds() {
        let mut source = SimulatedTelemetry::new(Some(42));
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let mut last = reading(start, 0.0, 15.0);

        for i in 1..200 {
            let next = source
                .next_sample("eq-1", Some(last), start + ChronoDuration::seconds(i * 5))
                .unwrap();
            assert!(next.vibration >= 0.0);
            assert!(next.temperature >= 15.0);
            assert!(next.usage_hours >= last.usage_hours);
            assert_eq!(next.vibration, round_to(next.vibration, 2));
            last = next;
        }
    }

    #[test]
    fn test_backfill_is_daily_and_ascending() {
        let end = Utc.with_ymd_and_hms(2024, 7, 30, 12, 0, 0).unwrap();
        let samples = SimulatedTelemetry::new(Some(1)).backfill(1000.0, 30, end);
        assert_eq!(samples.len(), 30);
        assert_eq!(samples[29].timestamp, end);
        assert_eq!(samples[0].timestamp, end - ChronoDuration::days(29));
        assert!(samples.windows(2).all(|w| w[0].usage_hours < w[1].usage_hours));
        assert!(samples.iter().all(|s| (0.1..=0.6).contains(&s.vibration)));
    }

    #[tokio::test]
    async fn test_tick_skips_suspended_units() {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let mut mock = MockSampleSource::new();
        mock.expect_next_sample()
            .times(4)
            .returning(|_, _, at| Some(reading(at, 0.2, 22.0)));

        let service = service_with(Box::new(mock)).await;
        let report = service.tick(at).await.unwrap();

        assert_eq!(report.sampled, vec!["eq-1", "eq-2", "eq-3", "eq-4"]);
        assert_eq!(report.suspended, vec!["eq-5"]);
        assert!(report.rejected.is_empty());
        assert_eq!(service.history("eq-1").await.unwrap().len(), 1);
        assert!(service.history("eq-5").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_escalates_risk() {
        let mut mock = MockSampleSource::new();
        mock.expect_next_sample().never();
        let service = service_with(Box::new(mock)).await;

        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let state = service.ingest("eq-4", reading(at, 0.45, 25.0)).await.unwrap();
        assert_eq!(state.predicted_risk, RiskLevel::Medium);
        // eq-4 was serviced 2024-06-01
        assert_eq!(
            state.next_service_date,
            Some(Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap())
        );

        let later = at + ChronoDuration::hours(1);
        let state = service.ingest("eq-4", reading(later, 0.55, 30.0)).await.unwrap();
        assert_eq!(state.predicted_risk, RiskLevel::High);
        assert_eq!(
            state.next_service_date,
            Some(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_out_of_order_sample_is_dropped() {
        let service = service_with(Box::new(MockSampleSource::new())).await;
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();

        let accepted = service.ingest("eq-1", reading(at, 0.2, 22.0)).await.unwrap();
        let err = service
            .ingest("eq-1", reading(at - ChronoDuration::seconds(5), 0.9, 40.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OutOfOrderSample { .. }));

        let history = service.history("eq-1").await.unwrap();
        assert_eq!(history.len(), 1);
        let store = service.repository.read().await;
        assert_eq!(store.health_get("eq-1").unwrap(), &accepted);
    }

    #[tokio::test]
    async fn test_tick_reports_rejected_samples() {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let stale = at - ChronoDuration::minutes(1);
        let mut mock = MockSampleSource::new();
        mock.expect_next_sample()
            .withf(move |id, _, when| id.to_string() == "eq-1" && *when == at)
            .returning(move |_, _, _| Some(reading(stale, 0.2, 22.0)));
        mock.expect_next_sample()
            .returning(|_, _, at| Some(reading(at, 0.2, 22.0)));

        let service = service_with(Box::new(mock)).await;
        service.ingest("eq-1", reading(at, 0.2, 22.0)).await.unwrap();

        let report = service.tick(at).await.unwrap();
        assert_eq!(report.rejected, vec!["eq-1"]);
        assert_eq!(report.sampled.len(), 3);
    }

    #[tokio::test]
    async fn test_suspended_unit_ignores_samples() {
        let service = service_with(Box::new(MockSampleSource::new())).await;
        let at = Utc.with_ymd_and_hms(2024, 7, 20, 0, 0, 0).unwrap();

        let state = service.ingest("eq-5", reading(at, 0.9, 40.0)).await.unwrap();
        assert_eq!(state.status, EquipmentStatus::Maintenance);
        assert_eq!(state.predicted_risk, RiskLevel::Low);
        assert_eq!(state.next_service_date, None);
        assert!(service.history("eq-5").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backfill_fills_every_unit() {
        let end = Utc.with_ymd_and_hms(2024, 7, 30, 0, 0, 0).unwrap();
        let service = service_with(Box::new(SimulatedTelemetry::new(Some(3)))).await;

        let accepted = service.backfill(30, end).await.unwrap();
        assert_eq!(accepted, 5 * 30);
        assert_eq!(service.history("eq-1").await.unwrap().len(), 30);
        assert_eq!(service.history("eq-5").await.unwrap().len(), 30);
    }

    #[tokio::test]
    async fn test_backfill_sets_frozen_risk_for_suspended_units() {
        let end = Utc.with_ymd_and_hms(2024, 7, 30, 0, 0, 0).unwrap();
        let mut mock = MockSampleSource::new();
        mock.expect_backfill().returning(|_, days, end| {
            (0..days)
                .map(|i| {
                    let at = end - ChronoDuration::days(i64::from(days - 1 - i));
                    reading(at, 0.2, 27.0 + f64::from(i))
                })
                .collect()
        });
        let service = service_with(Box::new(mock)).await;

        service.backfill(3, end).await.unwrap();
        let history = service.history("eq-5").await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].timestamp, end);

        // newest reading is 29 degrees, above the medium threshold
        let store = service.repository.read().await;
        let state = store.health_get("eq-5").unwrap();
        assert_eq!(state.status, EquipmentStatus::Maintenance);
        assert_eq!(state.predicted_risk, RiskLevel::Medium);
        assert_eq!(state.next_service_date, None);
        assert_eq!(state.last_sample_at, Some(end));
    }

    #[tokio::test]
    async fn test_run_stops_after_max_ticks() {
        let mut mock = MockSampleSource::new();
        mock.expect_next_sample()
            .times(8)
            .returning(|_, _, at| Some(reading(at, 0.2, 22.0)));
        let service = service_with(Box::new(mock)).await;

        let ticks = service.run(Duration::from_millis(1), Some(2)).await.unwrap();
        assert_eq!(ticks, 2);
    }
}
