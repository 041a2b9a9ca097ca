//! Equipment service

use chrono::Utc;
use validator::Validate;

use crate::{
    engine::{query, FilterSpec, Matchers, RiskEstimator},
    error::{AppError, AppResult},
    models::{
        equipment::{
            CascadeReport, CreateEquipment, DeleteMode, EquipmentDetail, EquipmentQuery,
            UpdateEquipment,
        },
        Equipment, EquipmentHealthState, EquipmentOverview, EquipmentStatus, RiskLevel, User,
    },
    repository::{new_id, Repository},
    services::access::Action,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    estimator: RiskEstimator,
}

impl EquipmentService {
    pub fn new(repository: Repository, estimator: RiskEstimator) -> Self {
        Self {
            repository,
            estimator,
        }
    }

    /// Field filters accepted by [`EquipmentService::search`]
    pub fn matchers() -> Matchers<EquipmentOverview> {
        Matchers::<EquipmentOverview>::new()
            .on_parsed("status", |o| o.equipment.status)
            .on("type", |o, value| o.equipment.equipment_type == value)
            .on_parsed("risk", |o| o.health.predicted_risk)
            .on("technicianId", |o, value| {
                o.equipment.assigned_technician_id.as_deref() == Some(value)
            })
    }

    /// All units with their health, in input order
    pub async fn list(&self) -> AppResult<Vec<EquipmentOverview>> {
        Ok(self.repository.read().await.equipment_overviews())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<EquipmentOverview> {
        self.repository.read().await.equipment_overview(id)
    }

    pub async fn health(&self, id: &str) -> AppResult<EquipmentHealthState> {
        Ok(self.repository.read().await.health_get(id)?.clone())
    }

    /// Unit with its tasks, logs and retained samples
    pub async fn detail(&self, id: &str) -> AppResult<EquipmentDetail> {
        let store = self.repository.read().await;
        Ok(EquipmentDetail {
            overview: store.equipment_overview(id)?,
            tasks: store.tasks_for_equipment(id),
            logs: store.logs_for_equipment(id),
            samples: store.samples_list(id),
        })
    }

    pub async fn search(&self, params: &EquipmentQuery) -> AppResult<Vec<EquipmentOverview>> {
        let mut spec = FilterSpec::new()
            .text(params.search.clone())
            .filter("status", params.status.to_raw())
            .filter("type", params.equipment_type.clone())
            .filter("risk", params.risk.to_raw())
            .filter("technicianId", params.technician_id.clone());
        if let Some((key, direction)) = &params.sort {
            spec = spec.sort_by(key, *direction)?;
        }

        let records = self.list().await?;
        let selected = query(&records, &spec, &Self::matchers())?;
        Ok(selected.into_iter().cloned().collect())
    }

    /// Distinct equipment types, for the type filter
    pub async fn types(&self) -> AppResult<Vec<String>> {
        Ok(self.repository.read().await.equipment_types())
    }

    /// Units flagged critical or at high risk
    pub async fn at_risk(&self) -> AppResult<Vec<EquipmentOverview>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(EquipmentOverview::is_at_risk)
            .collect())
    }

    pub async fn create(&self, actor: &User, data: CreateEquipment) -> AppResult<EquipmentOverview> {
        actor.require(Action::ManageEquipment)?;
        data.validate()?;

        let mut store = self.repository.write().await;
        if let Some(technician_id) = data.assigned_technician_id.as_deref() {
            store.users_get_by_id(technician_id)?;
        }

        let now = Utc::now();
        let equipment = Equipment {
            id: new_id("eq"),
            name: non_blank(data.name).unwrap_or_else(|| "New Equipment".to_string()),
            equipment_type: non_blank(data.equipment_type).unwrap_or_else(|| "Unknown".to_string()),
            location: non_blank(data.location).unwrap_or_else(|| "Unassigned".to_string()),
            status: data.status.unwrap_or(EquipmentStatus::Ok),
            last_service_date: data.last_service_date.unwrap_or(now),
            purchase_date: data.purchase_date.unwrap_or(now),
            notes: data.notes,
            assigned_technician_id: data.assigned_technician_id,
        };
        let health = self.estimator.initial_state(
            &equipment.id,
            equipment.status,
            equipment.last_service_date,
        );

        tracing::info!("Equipment {} created ({})", equipment.id, equipment.name);
        let id = equipment.id.clone();
        store.equipment_insert(equipment, health);
        store.equipment_overview(&id)
    }

    /// Apply an edit. Status and service-date changes re-derive health from
    /// the latest retained sample; renames propagate to dependent records.
    pub async fn update(
        &self,
        actor: &User,
        id: &str,
        data: UpdateEquipment,
    ) -> AppResult<EquipmentOverview> {
        actor.require(Action::ManageEquipment)?;
        data.validate()?;
        let blank = |value: &Option<String>| value.as_ref().is_some_and(|v| v.trim().is_empty());
        if blank(&data.name) || blank(&data.equipment_type) || blank(&data.location) {
            return Err(AppError::Validation(
                "Name, type and location cannot be blank".to_string(),
            ));
        }

        let mut store = self.repository.write().await;
        if let Some(technician_id) = data.assigned_technician_id.as_deref() {
            store.users_get_by_id(technician_id)?;
        }

        let equipment = store.equipment_get_mut(id)?;
        let renamed = data.name.as_ref().is_some_and(|n| *n != equipment.name);
        let rederive = data.status.is_some_and(|s| s != equipment.status)
            || data
                .last_service_date
                .is_some_and(|d| d != equipment.last_service_date);

        if let Some(name) = data.name {
            equipment.name = name;
        }
        if let Some(equipment_type) = data.equipment_type {
            equipment.equipment_type = equipment_type;
        }
        if let Some(location) = data.location {
            equipment.location = location;
        }
        if let Some(status) = data.status {
            equipment.status = status;
        }
        if let Some(last_service_date) = data.last_service_date {
            equipment.last_service_date = last_service_date;
        }
        if let Some(purchase_date) = data.purchase_date {
            equipment.purchase_date = purchase_date;
        }
        if data.notes.is_some() {
            equipment.notes = data.notes;
        }
        if data.assigned_technician_id.is_some() {
            equipment.assigned_technician_id = data.assigned_technician_id;
        }

        let (name, status, last_service_date) = (
            equipment.name.clone(),
            equipment.status,
            equipment.last_service_date,
        );

        if renamed {
            store.equipment_rename_references(id, &name);
        }
        if rederive {
            let previous = store.health_get(id)?.clone();
            let latest = store.samples_latest(id).copied();
            let health =
                self.estimator
                    .reassess(&previous, status, latest.as_ref(), last_service_date);
            if health.predicted_risk != previous.predicted_risk {
                tracing::info!(
                    "Equipment {} risk {} -> {} after edit",
                    id,
                    previous.predicted_risk,
                    health.predicted_risk
                );
            }
            store.health_put(health);
        }

        store.equipment_overview(id)
    }

    /// Delete a unit. Without cascade, a unit that still has tasks, logs or
    /// alerts is refused with `ReferentialCascade` so the caller can confirm.
    pub async fn delete(&self, actor: &User, id: &str, mode: DeleteMode) -> AppResult<CascadeReport> {
        actor.require(Action::ManageEquipment)?;

        let mut store = self.repository.write().await;
        store.equipment_get_by_id(id)?;

        let dependents = store.equipment_dependents(id);
        if mode == DeleteMode::Restrict && !dependents.is_empty() {
            tracing::warn!(
                "Refusing to delete equipment {}: {} task(s), {} log(s), {} alert(s) depend on it",
                id,
                dependents.tasks,
                dependents.logs,
                dependents.alerts
            );
            return Err(AppError::ReferentialCascade {
                id: id.to_string(),
                tasks: dependents.tasks,
                logs: dependents.logs,
                alerts: dependents.alerts,
            });
        }

        let report = store.equipment_remove_cascade(id)?;
        tracing::info!(
            "Equipment {} deleted with {} task(s), {} log(s), {} alert(s), {} sample(s)",
            id,
            report.tasks_removed,
            report.logs_removed,
            report.alerts_removed,
            report.samples_removed
        );
        Ok(report)
    }

    /// Count units per predicted risk level
    pub async fn count_by_risk(&self, level: RiskLevel) -> AppResult<usize> {
        Ok(self
            .list()
            .await?
            .iter()
            .filter(|o| o.health.predicted_risk == level)
            .count())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SortDirection;
    use crate::engine::query::FieldFilter;
    use crate::models::HealthSample;
    use crate::seed;
    use chrono::TimeZone;

    async fn service() -> (EquipmentService, Repository) {
        let repository = Repository::new(50);
        let estimator = RiskEstimator::default();
        seed::seed_demo(&repository, &estimator).await;
        (EquipmentService::new(repository.clone(), estimator), repository)
    }

    fn user(id: &str) -> User {
        seed::demo_users().into_iter().find(|u| u.id == id).unwrap()
    }

    #[tokio::test]
    async fn test_search_by_text() {
        let (service, _) = service().await;
        let params = EquipmentQuery {
            search: "ac".to_string(),
            ..Default::default()
        };
        let found = service.search(&params).await.unwrap();
        let names: Vec<&str> = found.iter().map(|o| o.equipment.name.as_str()).collect();
        // "Rack" matches too
        assert_eq!(names, vec!["Conference Room AC Unit", "Server Rack Fan Array"]);
    }

    #[tokio::test]
    async fn test_search_by_status_and_sort() {
        let (service, _) = service().await;
        let params = EquipmentQuery {
            status: FieldFilter::Specific(EquipmentStatus::Ok),
            sort: Some(("name".to_string(), SortDirection::Desc)),
            ..Default::default()
        };
        let found = service.search(&params).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|o| o.equipment.id.as_str()).collect();
        assert_eq!(ids, vec!["eq-1", "eq-4"]);
    }

    #[tokio::test]
    async fn test_search_rejects_bad_sort_key() {
        let (service, _) = service().await;
        let params = EquipmentQuery {
            sort: Some(("serial".to_string(), SortDirection::Asc)),
            ..Default::default()
        };
        let err = service.search(&params).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidSortKey { .. }));
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let (service, _) = service().await;
        let created = service
            .create(&user("user-2"), CreateEquipment::default())
            .await
            .unwrap();
        assert_eq!(created.equipment.name, "New Equipment");
        assert_eq!(created.equipment.equipment_type, "Unknown");
        assert_eq!(created.equipment.location, "Unassigned");
        assert_eq!(created.equipment.status, EquipmentStatus::Ok);
        assert_eq!(created.health.predicted_risk, RiskLevel::Low);
        assert!(created.health.next_service_date.is_some());
        assert_eq!(service.list().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_technician_cannot_create() {
        let (service, _) = service().await;
        let err = service
            .create(&user("user-3"), CreateEquipment::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_status_edit_rederives_health() {
        let (service, _) = service().await;
        let manager = user("user-1");

        let updated = service
            .update(
                &manager,
                "eq-1",
                UpdateEquipment {
                    status: Some(EquipmentStatus::Critical),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.health.predicted_risk, RiskLevel::High);

        let suspended = service
            .update(
                &manager,
                "eq-1",
                UpdateEquipment {
                    status: Some(EquipmentStatus::Offline),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(suspended.health.predicted_risk, RiskLevel::High);
        assert_eq!(suspended.health.next_service_date, None);
    }

    #[tokio::test]
    async fn test_service_date_edit_moves_next_service() {
        let (service, _) = service().await;
        let serviced = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        let updated = service
            .update(
                &user("user-1"),
                "eq-4",
                UpdateEquipment {
                    last_service_date: Some(serviced),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            updated.health.next_service_date,
            Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_rename_propagates() {
        let (service, repository) = service().await;
        service
            .update(
                &user("user-2"),
                "eq-2",
                UpdateEquipment {
                    name: Some("Meeting Room AC".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let store = repository.read().await;
        let task = store.tasks_get_by_id("task-1").unwrap();
        assert_eq!(task.equipment_name, "Meeting Room AC");
        assert!(store
            .alerts_list()
            .iter()
            .filter(|a| a.equipment_id == "eq-2")
            .all(|a| a.equipment_name == "Meeting Room AC"));
    }

    #[tokio::test]
    async fn test_blank_rename_is_rejected() {
        let (service, repository) = service().await;
        let err = service
            .update(
                &user("user-2"),
                "eq-2",
                UpdateEquipment {
                    name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let store = repository.read().await;
        assert_eq!(
            store.equipment_get_by_id("eq-2").unwrap().name,
            "Conference Room AC Unit"
        );
        assert_eq!(
            store.tasks_get_by_id("task-1").unwrap().equipment_name,
            "Conference Room AC Unit"
        );
    }

    #[tokio::test]
    async fn test_detail_collects_related_records() {
        let (service, repository) = service().await;
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        {
            let mut store = repository.write().await;
            for i in 0..3 {
                store.samples_push(
                    "eq-2",
                    HealthSample {
                        timestamp: start + chrono::Duration::hours(i),
                        vibration: 0.2,
                        temperature: 22.0 + i as f64,
                        usage_hours: 10.0 * i as f64,
                        energy_consumption: 1.5,
                    },
                );
            }
            store.samples_push(
                "eq-1",
                HealthSample {
                    timestamp: start,
                    vibration: 0.3,
                    temperature: 24.0,
                    usage_hours: 5.0,
                    energy_consumption: 1.0,
                },
            );
        }

        let detail = service.detail("eq-2").await.unwrap();
        assert_eq!(detail.overview.equipment.name, "Conference Room AC Unit");
        let task_ids: Vec<&str> = detail.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(task_ids, vec!["task-1"]);
        let log_ids: Vec<&str> = detail.logs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(log_ids, vec!["log-2"]);
        let temperatures: Vec<f64> = detail.samples.iter().map(|s| s.temperature).collect();
        assert_eq!(temperatures, vec![22.0, 23.0, 24.0]);

        let err = service.detail("eq-99").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (service, repository) = service().await;
        let manager = user("user-1");

        let err = service
            .delete(&manager, "eq-5", DeleteMode::Restrict)
            .await
            .unwrap_err();
        assert!(err.needs_confirmation());
        assert!(service.get_by_id("eq-5").await.is_ok());

        let report = service
            .delete(&manager, "eq-5", DeleteMode::Cascade)
            .await
            .unwrap();
        assert_eq!(report.tasks_removed, 1);
        assert_eq!(report.logs_removed, 1);
        assert!(matches!(
            service.get_by_id("eq-5").await,
            Err(AppError::NotFound(_))
        ));

        let store = repository.read().await;
        assert!(store.tasks_list().iter().all(|t| t.equipment_id != "eq-5"));
        assert!(store.logs_list().iter().all(|l| l.equipment_id != "eq-5"));
        assert!(store.health_get("eq-5").is_err());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_unit() {
        let (service, _) = service().await;
        let report = service
            .delete(&user("user-1"), "eq-4", DeleteMode::Restrict)
            .await
            .unwrap();
        assert_eq!(report, CascadeReport {
            equipment_id: "eq-4".to_string(),
            ..Default::default()
        });
    }

    #[tokio::test]
    async fn test_types_in_first_seen_order() {
        let (service, _) = service().await;
        assert_eq!(
            service.types().await.unwrap(),
            vec!["Printer", "HVAC", "Projector", "Appliance", "IT Hardware"]
        );
    }

    #[tokio::test]
    async fn test_at_risk_units() {
        let (service, _) = service().await;
        let ids: Vec<String> = service
            .at_risk()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.equipment.id)
            .collect();
        assert_eq!(ids, vec!["eq-3"]);
        assert_eq!(service.count_by_risk(RiskLevel::High).await.unwrap(), 1);
    }
}
