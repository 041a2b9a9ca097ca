//! Data models for the maintenance engine

pub mod alert;
pub mod enums;
pub mod equipment;
pub mod log;
pub mod report;
pub mod spare_part;
pub mod task;
pub mod user;

// Re-export commonly used types
pub use alert::Alert;
pub use enums::{AlertSeverity, EquipmentStatus, RiskLevel, TaskPriority, TaskStatus, UserRole};
pub use equipment::{Equipment, EquipmentHealthState, EquipmentOverview, HealthSample};
pub use log::MaintenanceLogEntry;
pub use spare_part::SparePart;
pub use task::MaintenanceTask;
pub use user::User;
