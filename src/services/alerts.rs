//! Alert service

use chrono::Utc;
use validator::Validate;

use crate::{
    engine::{query, FilterSpec, Matchers},
    error::AppResult,
    models::{
        alert::{AlertQuery, CreateAlert},
        enums::AckState,
        Alert, User,
    },
    repository::{new_id, Repository},
    services::access::Action,
};

#[derive(Clone)]
pub struct AlertsService {
    repository: Repository,
}

impl AlertsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn matchers() -> Matchers<Alert> {
        Matchers::<Alert>::new()
            .on_parsed("severity", |a| a.severity)
            .on("acknowledged", |a, value| {
                value
                    .parse::<AckState>()
                    .map_or(false, |state| state.matches(a.acknowledged))
            })
            .on("equipmentId", |a, value| a.equipment_id == value)
    }

    pub async fn list(&self) -> AppResult<Vec<Alert>> {
        Ok(self.repository.read().await.alerts_list())
    }

    /// Filtered alerts, newest first unless another order is asked for
    pub async fn search(&self, params: &AlertQuery) -> AppResult<Vec<Alert>> {
        let mut spec = FilterSpec::new()
            .text(params.search.clone())
            .filter("severity", params.severity.to_raw())
            .filter("acknowledged", params.acknowledged.to_raw())
            .filter("equipmentId", params.equipment_id.clone());
        if let Some((key, direction)) = &params.sort {
            spec = spec.sort_by(key, *direction)?;
        }

        let records = self.list().await?;
        let selected = query(&records, &spec, &Self::matchers())?;
        Ok(selected.into_iter().cloned().collect())
    }

    pub async fn raise(&self, actor: &User, data: CreateAlert) -> AppResult<Alert> {
        actor.require(Action::RaiseAlerts)?;
        data.validate()?;

        let mut store = self.repository.write().await;
        let equipment_name = store.equipment_get_by_id(&data.equipment_id)?.name.clone();
        let alert = Alert {
            id: new_id("alert"),
            equipment_id: data.equipment_id,
            equipment_name,
            message: data.message,
            timestamp: data.timestamp.unwrap_or_else(Utc::now),
            severity: data.severity,
            acknowledged: false,
        };

        tracing::info!(
            "{} alert for {}: {}",
            alert.severity,
            alert.equipment_name,
            alert.message
        );
        store.alerts_insert(alert.clone());
        Ok(alert)
    }

    pub async fn acknowledge(&self, actor: &User, id: &str) -> AppResult<Alert> {
        actor.require(Action::AcknowledgeAlerts)?;
        let mut store = self.repository.write().await;
        let alert = store.alerts_get_mut(id)?;
        alert.acknowledged = true;
        Ok(alert.clone())
    }

    /// Returns how many alerts were still open
    pub async fn acknowledge_all(&self, actor: &User) -> AppResult<usize> {
        actor.require(Action::AcknowledgeAlerts)?;
        let changed = self.repository.write().await.alerts_acknowledge_all();
        tracing::info!("{} acknowledged {} alert(s)", actor.name, changed);
        Ok(changed)
    }
}
