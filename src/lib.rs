//! Maintenance Engine
//!
//! Equipment health estimation and list queries for a role-based
//! maintenance dashboard: telemetry in, risk and service dates out, plus one
//! filter/sort engine behind every list view.

use std::sync::Arc;

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use engine::{RiskEstimator, RiskPolicy};
use models::User;
use repository::Repository;
use services::{telemetry::SampleSource, Services};

/// One user's session: an owned store, the services over it and the acting
/// user.
#[derive(Clone)]
pub struct Session {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
    pub user: User,
}

impl Session {
    /// Session over the demo fleet, acting as the configured user
    pub async fn demo(config: AppConfig, source: Box<dyn SampleSource>) -> AppResult<Self> {
        let repository = Repository::new(config.telemetry.history_capacity);
        let estimator = RiskEstimator::new(RiskPolicy::from(config.risk));
        seed::seed_demo(&repository, &estimator).await;

        let services = Services::new(repository, estimator, source);
        let user = services.users.get_by_id(&config.session.user_id).await?;
        tracing::info!("Session opened for {} ({})", user.name, user.role);

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
            user,
        })
    }

    /// Act as another user of the same store
    pub async fn switch_user(&mut self, user_id: &str) -> AppResult<()> {
        self.user = self.services.users.get_by_id(user_id).await?;
        tracing::info!("Switched to {} ({})", self.user.name, self.user.role);
        Ok(())
    }
}
