//! Business logic services

pub mod access;
pub mod alerts;
pub mod equipment;
pub mod inventory;
pub mod logs;
pub mod stats;
pub mod tasks;
pub mod telemetry;
pub mod users;

use crate::{engine::RiskEstimator, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub telemetry: telemetry::TelemetryService,
    pub tasks: tasks::TasksService,
    pub alerts: alerts::AlertsService,
    pub logs: logs::LogsService,
    pub inventory: inventory::InventoryService,
    pub users: users::UsersService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services over one repository
    pub fn new(
        repository: Repository,
        estimator: RiskEstimator,
        source: Box<dyn telemetry::SampleSource>,
    ) -> Self {
        Self {
            equipment: equipment::EquipmentService::new(repository.clone(), estimator),
            telemetry: telemetry::TelemetryService::new(repository.clone(), estimator, source),
            tasks: tasks::TasksService::new(repository.clone()),
            alerts: alerts::AlertsService::new(repository.clone()),
            logs: logs::LogsService::new(repository.clone()),
            inventory: inventory::InventoryService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            stats: stats::StatsService::new(repository),
        }
    }
}
