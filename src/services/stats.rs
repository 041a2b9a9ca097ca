//! Dashboard summary and reports

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::{
    engine::{query, FilterSpec, Matchers},
    error::{AppError, AppResult},
    models::{
        enums::StockLevel,
        report::{DashboardSummary, InventoryValuation, Report, ReportKind, StatEntry},
        Alert, AlertSeverity, EquipmentStatus, TaskStatus, User,
    },
    repository::Repository,
    services::access::Section,
};

const AT_RISK_LIMIT: usize = 3;
const RECENT_ALERTS_LIMIT: usize = 5;
const TREND_WINDOW: usize = 7;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Headline numbers for the dashboard
    pub async fn dashboard(&self, now: DateTime<Utc>) -> AppResult<DashboardSummary> {
        let store = self.repository.read().await;
        let overviews = store.equipment_overviews();
        let alerts = store.alerts_list();
        let tasks = store.tasks_list();

        let mut status_counts: IndexMap<EquipmentStatus, usize> =
            EquipmentStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for overview in &overviews {
            *status_counts.entry(overview.equipment.status).or_insert(0) += 1;
        }

        let open_with = |severity: AlertSeverity| {
            alerts
                .iter()
                .filter(|a| a.severity == severity && !a.acknowledged)
                .count()
        };

        let recent_alerts = query(&alerts, &FilterSpec::new(), &Matchers::<Alert>::new())?
            .into_iter()
            .take(RECENT_ALERTS_LIMIT)
            .cloned()
            .collect();

        Ok(DashboardSummary {
            generated_at: now,
            total_equipment: overviews.len(),
            status_counts,
            critical_alerts: open_with(AlertSeverity::Error),
            warning_alerts: open_with(AlertSeverity::Warning),
            upcoming_tasks: tasks
                .iter()
                .filter(|t| t.status != TaskStatus::Completed && t.due_date > now)
                .count(),
            at_risk: overviews
                .iter()
                .filter(|o| o.is_at_risk())
                .take(AT_RISK_LIMIT)
                .cloned()
                .collect(),
            recent_alerts,
        })
    }

    /// Build one report. Reports are visible to managers only.
    pub async fn report(&self, actor: &User, kind: ReportKind, now: DateTime<Utc>) -> AppResult<Report> {
        actor.require_view(Section::Reports)?;
        let store = self.repository.read().await;

        let (title, entries): (&str, Vec<StatEntry>) = match kind {
            ReportKind::EquipmentStatus => {
                let mut counts: IndexMap<EquipmentStatus, usize> = IndexMap::new();
                for equipment in store.equipment_list() {
                    *counts.entry(equipment.status).or_insert(0) += 1;
                }
                let entries = counts
                    .into_iter()
                    .map(|(status, count)| StatEntry::new(status.as_str(), count as f64))
                    .collect();
                ("Equipment Status Overview", entries)
            }
            ReportKind::MaintenanceActivity => {
                let tasks = store.tasks_list();
                let completed = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();
                let open = tasks.iter().filter(|t| t.status.is_open()).count();
                let entries = vec![
                    StatEntry::new("Completed Tasks", completed as f64),
                    StatEntry::new("Pending/In Progress Tasks", open as f64),
                    StatEntry::new("Total Logs", store.logs_count() as f64),
                ];
                ("Maintenance Activity Summary", entries)
            }
            ReportKind::HealthTrends => {
                let entries = store
                    .equipment_list()
                    .into_iter()
                    .map(|equipment| {
                        let recent = store.samples_recent(&equipment.id, TREND_WINDOW);
                        let average = if recent.is_empty() {
                            0.0
                        } else {
                            recent.iter().map(|s| s.temperature).sum::<f64>() / recent.len() as f64
                        };
                        StatEntry::new(equipment.name, (average * 10.0).round() / 10.0)
                    })
                    .collect();
                ("Average Temperature, Last 7 Samples", entries)
            }
        };

        tracing::debug!("Report {:?} built for {}", kind, actor.name);
        Ok(Report {
            kind,
            title: title.to_string(),
            generated_at: now,
            entries,
        })
    }

    /// Stock totals. Requires inventory access.
    pub async fn inventory_valuation(&self, actor: &User) -> AppResult<InventoryValuation> {
        actor.require_view(Section::Inventory)?;
        let parts = self.repository.read().await.parts_list();

        let total_value = parts
            .iter()
            .try_fold(Decimal::ZERO, |total, part| {
                part.stock_value().and_then(|value| total.checked_add(value))
            })
            .ok_or_else(|| AppError::BadRequest("Inventory value is too large to total".to_string()))?;

        Ok(InventoryValuation {
            total_parts: parts.len(),
            total_units: parts.iter().map(|p| u64::from(p.quantity_in_stock)).sum(),
            total_value,
            low_stock: parts
                .iter()
                .filter(|p| p.has_stock_level(StockLevel::LowStock))
                .count(),
            out_of_stock: parts
                .iter()
                .filter(|p| p.has_stock_level(StockLevel::OutOfStock))
                .count(),
        })
    }
}
