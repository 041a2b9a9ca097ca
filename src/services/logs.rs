//! Maintenance log service

use validator::Validate;

use crate::{
    engine::{query, FilterSpec, Matchers},
    error::AppResult,
    models::{
        log::{CreateLogEntry, LogQuery, PartUsage},
        MaintenanceLogEntry, User,
    },
    repository::{new_id, Repository},
    services::access::Action,
};

#[derive(Clone)]
pub struct LogsService {
    repository: Repository,
}

impl LogsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn matchers() -> Matchers<MaintenanceLogEntry> {
        Matchers::<MaintenanceLogEntry>::new()
            .on("equipmentId", |l, value| l.equipment_id == value)
            .on("technician", |l, value| l.performed_by == value)
    }

    pub async fn list(&self) -> AppResult<Vec<MaintenanceLogEntry>> {
        Ok(self.repository.read().await.logs_list())
    }

    pub async fn search(&self, params: &LogQuery) -> AppResult<Vec<MaintenanceLogEntry>> {
        let mut spec = FilterSpec::new()
            .text(params.search.clone())
            .filter("equipmentId", params.equipment_id.clone())
            .filter("technician", params.technician.clone());
        if let Some((key, direction)) = &params.sort {
            spec = spec.sort_by(key, *direction)?;
        }

        let records = self.list().await?;
        let selected = query(&records, &spec, &Self::matchers())?;
        Ok(selected.into_iter().cloned().collect())
    }

    /// Names of technicians that appear in the log, for the technician filter
    pub async fn technicians(&self) -> AppResult<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for entry in self.list().await? {
            if !names.contains(&entry.performed_by) {
                names.push(entry.performed_by);
            }
        }
        Ok(names)
    }

    /// Record completed work. Equipment and part names are resolved from the
    /// store; unknown references are rejected.
    pub async fn create(&self, actor: &User, data: CreateLogEntry) -> AppResult<MaintenanceLogEntry> {
        actor.require(Action::AddLogs)?;
        data.validate()?;

        let mut store = self.repository.write().await;
        let equipment_name = store.equipment_get_by_id(&data.equipment_id)?.name.clone();
        if let Some(task_id) = data.task_id.as_deref() {
            store.tasks_get_by_id(task_id)?;
        }

        let mut parts_used = Vec::with_capacity(data.parts_used.len());
        for usage in &data.parts_used {
            let part = store.parts_get_by_id(&usage.part_id)?;
            parts_used.push(PartUsage {
                part_id: part.id.clone(),
                part_name: part.name.clone(),
                quantity: usage.quantity,
            });
        }

        let entry = MaintenanceLogEntry {
            id: new_id("log"),
            equipment_id: data.equipment_id,
            equipment_name,
            task_id: data.task_id,
            date: data.date,
            performed_by: data.performed_by,
            description: data.description,
            parts_used,
            duration_hours: data.duration_hours.unwrap_or(0.0),
        };

        tracing::info!(
            "Log {} added for {} by {}",
            entry.id,
            entry.equipment_name,
            entry.performed_by
        );
        store.logs_insert(entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FieldFilter, RiskEstimator};
    use crate::error::AppError;
    use crate::models::log::PartUsageRequest;
    use crate::seed;
    use chrono::{TimeZone, Utc};

    async fn service() -> LogsService {
        let repository = Repository::new(50);
        seed::seed_demo(&repository, &RiskEstimator::default()).await;
        LogsService::new(repository)
    }

    fn user(id: &str) -> User {
        seed::demo_users().into_iter().find(|u| u.id == id).unwrap()
    }

    fn entry(parts_used: Vec<PartUsageRequest>) -> CreateLogEntry {
        CreateLogEntry {
            equipment_id: "eq-1".to_string(),
            task_id: Some("task-3".to_string()),
            date: Utc.with_ymd_and_hms(2024, 7, 29, 0, 0, 0).unwrap(),
            performed_by: "Charlie Brown".to_string(),
            description: "Replaced toner".to_string(),
            parts_used,
            duration_hours: Some(0.5),
        }
    }

    #[tokio::test]
    async fn test_newest_first_and_technician_filter() {
        let service = service().await;
        let logs = service.search(&LogQuery::default()).await.unwrap();
        let ids: Vec<&str> = logs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["log-3", "log-1", "log-2"]);

        let params = LogQuery {
            technician: FieldFilter::Specific("Diana Prince".to_string()),
            ..Default::default()
        };
        let logs = service.search(&params).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, "log-2");
        assert_eq!(
            service.technicians().await.unwrap(),
            vec!["Charlie Brown", "Diana Prince"]
        );
    }

    #[tokio::test]
    async fn test_create_resolves_part_names() {
        let service = service().await;
        let created = service
            .create(
                &user("user-3"),
                entry(vec![PartUsageRequest {
                    part_id: "part-1".to_string(),
                    quantity: 1,
                }]),
            )
            .await
            .unwrap();
        assert_eq!(created.equipment_name, "Office Printer X1000");
        assert_eq!(
            created.parts_used[0].part_name,
            "Printer Toner Cartridge - Black X1000"
        );
        assert_eq!(service.list().await.unwrap()[0].id, created.id);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_part() {
        let service = service().await;
        let err = service
            .create(
                &user("user-2"),
                entry(vec![PartUsageRequest {
                    part_id: "part-99".to_string(),
                    quantity: 1,
                }]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_validates_quantities() {
        let service = service().await;
        let err = service
            .create(
                &user("user-3"),
                entry(vec![PartUsageRequest {
                    part_id: "part-1".to_string(),
                    quantity: 0,
                }]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_managers_cannot_add_logs() {
        let service = service().await;
        let err = service.create(&user("user-1"), entry(Vec::new())).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
