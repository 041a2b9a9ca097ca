//! End-to-end tests over a demo session

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use tokio_test::{assert_err, assert_ok};

use maintenance_engine::{
    config::AppConfig,
    engine::{query, FieldFilter, FilterSpec, Matchers, RiskEstimator, SortDirection},
    models::{
        enums::StockLevel,
        equipment::{DeleteMode, EquipmentQuery, UpdateEquipment},
        spare_part::PartQuery,
        task::TaskQuery,
        EquipmentHealthState, EquipmentStatus, HealthSample, RiskLevel, SparePart,
    },
    services::{inventory::InventoryService, telemetry::SimulatedTelemetry},
    AppError, Session,
};

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn sample(at: DateTime<Utc>, vibration: f64, temperature: f64) -> HealthSample {
    HealthSample {
        timestamp: at,
        vibration,
        temperature,
        usage_hours: 10.0,
        energy_consumption: 1.5,
    }
}

async fn demo_session() -> Session {
    let mut config = AppConfig::default();
    config.telemetry.seed = Some(11);
    let source = Box::new(SimulatedTelemetry::new(config.telemetry.seed));
    assert_ok!(Session::demo(config, source).await)
}

fn part(id: &str, quantity_in_stock: u32, reorder_level: u32) -> SparePart {
    SparePart {
        id: id.to_string(),
        name: format!("Part {}", id),
        sku: id.to_uppercase(),
        quantity_in_stock,
        reorder_level,
        supplier: "Acme".to_string(),
        price: Decimal::ONE,
        location: None,
    }
}

#[test]
fn test_medium_and_high_risk_scenarios() {
    let estimator = RiskEstimator::default();
    let last_service = day(2024, 1, 1);
    let state = estimator.initial_state("eq-1", EquipmentStatus::Ok, last_service);

    let medium = assert_ok!(estimator.estimate(&state, &sample(day(2024, 1, 2), 0.45, 25.0), last_service));
    assert_eq!(medium.predicted_risk, RiskLevel::Medium);
    assert_eq!(medium.next_service_date, Some(day(2024, 6, 1)));

    let high = assert_ok!(estimator.estimate(&medium, &sample(day(2024, 1, 3), 0.55, 30.0), last_service));
    assert_eq!(high.predicted_risk, RiskLevel::High);
    assert_eq!(high.next_service_date, Some(day(2024, 2, 1)));
    assert!(high.next_service_date <= medium.next_service_date);
}

#[test]
fn test_suspended_state_is_frozen() {
    let estimator = RiskEstimator::default();
    let state = EquipmentHealthState {
        equipment_id: "eq-9".to_string(),
        status: EquipmentStatus::Offline,
        predicted_risk: RiskLevel::Medium,
        next_service_date: None,
        last_sample_at: None,
    };

    let mut current = state.clone();
    for i in 0..3 {
        current = assert_ok!(estimator.estimate(
            &current,
            &sample(day(2024, 3, 1) + Duration::hours(i), 0.9, 45.0),
            day(2024, 1, 1)
        ));
        assert_eq!(current.predicted_risk, RiskLevel::Medium);
        assert_eq!(current.next_service_date, None);
    }
}

#[test]
fn test_low_stock_filter() {
    let parts = vec![part("a", 3, 5), part("b", 0, 5), part("c", 20, 5)];
    let spec = FilterSpec::<SparePart>::new()
        .unsorted()
        .filter("stock", FieldFilter::Specific(StockLevel::LowStock.to_string()));

    let selected = assert_ok!(query(&parts, &spec, &InventoryService::matchers()));
    let ids: Vec<&str> = selected.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);

    // Filtering its own output again changes nothing
    let owned: Vec<SparePart> = selected.into_iter().cloned().collect();
    let again = assert_ok!(query(&owned, &spec, &InventoryService::matchers()));
    assert_eq!(again.len(), 1);
}

#[test]
fn test_unknown_filter_field_is_rejected() {
    let parts = vec![part("a", 3, 5)];
    let spec = FilterSpec::<SparePart>::new().filter("colour", FieldFilter::Specific("red".to_string()));
    let err = assert_err!(query(&parts, &spec, &Matchers::new()));
    assert!(matches!(err, AppError::UnknownFilterField { .. }));
}

#[tokio::test]
async fn test_text_query_on_equipment_names() {
    let session = demo_session().await;
    let params = EquipmentQuery {
        search: "ac unit".to_string(),
        ..Default::default()
    };
    let found = assert_ok!(session.services.equipment.search(&params).await);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].equipment.name, "Conference Room AC Unit");
}

#[tokio::test]
async fn test_backfill_then_tick() {
    let session = demo_session().await;
    let telemetry = &session.services.telemetry;
    let end = Utc::now();

    let accepted = assert_ok!(telemetry.backfill(30, end).await);
    assert_eq!(accepted, 150);

    let report = assert_ok!(telemetry.tick(end + Duration::seconds(5)).await);
    assert_eq!(report.sampled.len(), 4);
    assert_eq!(report.suspended, vec!["eq-5"]);

    // The unit under maintenance keeps its backfilled history but takes no new samples
    let suspended = assert_ok!(telemetry.history("eq-5").await);
    assert_eq!(suspended.len(), 30);
    let frozen = assert_ok!(session.services.equipment.health("eq-5").await);
    assert_eq!(frozen.next_service_date, None);
    assert_eq!(frozen.last_sample_at, Some(end));

    let history = assert_ok!(telemetry.history("eq-1").await);
    assert_eq!(history.len(), 31);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    // The projector stays High whatever the readings say
    let projector = assert_ok!(session.services.equipment.health("eq-3").await);
    assert_eq!(projector.predicted_risk, RiskLevel::High);
}

#[tokio::test]
async fn test_history_is_bounded() {
    let mut config = AppConfig::default();
    config.telemetry.history_capacity = 10;
    let session = assert_ok!(Session::demo(config, Box::new(SimulatedTelemetry::new(Some(5)))).await);
    let telemetry = &session.services.telemetry;

    let start = day(2024, 8, 1);
    for i in 0..25 {
        assert_ok!(telemetry.ingest("eq-4", sample(start + Duration::minutes(i), 0.2, 22.0)).await);
    }
    let history = assert_ok!(telemetry.history("eq-4").await);
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].timestamp, start + Duration::minutes(15));
}

#[tokio::test]
async fn test_cascade_delete_flow() {
    let session = demo_session().await;
    let equipment = &session.services.equipment;
    let user = &session.user;

    let err = assert_err!(equipment.delete(user, "eq-2", DeleteMode::Restrict).await);
    match err {
        AppError::ReferentialCascade { tasks, logs, alerts, .. } => {
            assert_eq!((tasks, logs, alerts), (1, 1, 1));
        }
        other => panic!("unexpected error: {other}"),
    }

    let report = assert_ok!(equipment.delete(user, "eq-2", DeleteMode::Cascade).await);
    assert_eq!(report.tasks_removed, 1);

    let tasks = assert_ok!(
        session
            .services
            .tasks
            .search(&TaskQuery {
                equipment_id: FieldFilter::Specific("eq-2".to_string()),
                ..Default::default()
            })
            .await
    );
    assert!(tasks.is_empty());

    let summary = assert_ok!(session.services.stats.dashboard(Utc::now()).await);
    assert_eq!(summary.total_equipment, 4);
    assert_eq!(summary.warning_alerts, 0);
}

#[tokio::test]
async fn test_roles_gate_mutations() {
    let mut session = demo_session().await;
    assert_ok!(session.switch_user("user-3").await);

    let err = assert_err!(
        session
            .services
            .equipment
            .update(
                &session.user,
                "eq-1",
                UpdateEquipment {
                    status: Some(EquipmentStatus::Offline),
                    ..Default::default()
                },
            )
            .await
    );
    assert!(matches!(err, AppError::Authorization(_)));

    assert_ok!(session.services.alerts.acknowledge(&session.user, "alert-1").await);

    assert_ok!(session.switch_user("user-2").await);
    let low_first = assert_ok!(
        session
            .services
            .inventory
            .search(&PartQuery {
                sort: Some(("quantityInStock".to_string(), SortDirection::Asc)),
                ..Default::default()
            })
            .await
    );
    assert_eq!(low_first[0].sku, "LP-PL500");
}

#[tokio::test]
async fn test_status_edit_reuses_latest_sample() {
    let session = demo_session().await;
    let services = &session.services;

    // eq-1 was serviced 2024-05-15
    let state = assert_ok!(services.telemetry.ingest("eq-1", sample(day(2024, 8, 1), 0.45, 22.0)).await);
    assert_eq!(state.predicted_risk, RiskLevel::Medium);

    let offline = assert_ok!(
        services
            .equipment
            .update(
                &session.user,
                "eq-1",
                UpdateEquipment {
                    status: Some(EquipmentStatus::Offline),
                    ..Default::default()
                },
            )
            .await
    );
    assert_eq!(offline.health.next_service_date, None);

    let back = assert_ok!(
        services
            .equipment
            .update(
                &session.user,
                "eq-1",
                UpdateEquipment {
                    status: Some(EquipmentStatus::Ok),
                    ..Default::default()
                },
            )
            .await
    );
    assert_eq!(back.health.predicted_risk, RiskLevel::Medium);
    assert_eq!(back.health.next_service_date, Some(day(2024, 10, 15)));
}
