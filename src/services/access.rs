//! Role access policy

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{User, UserRole},
};

/// Dashboard sections shown in navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    Dashboard,
    Equipment,
    Schedule,
    Alerts,
    Logs,
    Inventory,
    Reports,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::Dashboard,
        Section::Equipment,
        Section::Schedule,
        Section::Alerts,
        Section::Logs,
        Section::Inventory,
        Section::Reports,
    ];
}

/// Mutations guarded by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ManageEquipment,
    ManageTasks,
    ManageInventory,
    AddLogs,
    AcknowledgeAlerts,
    RaiseAlerts,
}

impl Action {
    fn describe(&self) -> &'static str {
        match self {
            Action::ManageEquipment => "manage equipment",
            Action::ManageTasks => "manage tasks",
            Action::ManageInventory => "manage inventory",
            Action::AddLogs => "add maintenance logs",
            Action::AcknowledgeAlerts => "acknowledge alerts",
            Action::RaiseAlerts => "raise alerts",
        }
    }
}

pub fn can_view(role: UserRole, section: Section) -> bool {
    match section {
        Section::Inventory => matches!(role, UserRole::Supervisor | UserRole::Manager),
        Section::Reports => role == UserRole::Manager,
        _ => true,
    }
}

pub fn can_perform(role: UserRole, action: Action) -> bool {
    match action {
        Action::ManageEquipment | Action::ManageTasks | Action::ManageInventory => {
            matches!(role, UserRole::Supervisor | UserRole::Manager)
        }
        Action::AddLogs => matches!(role, UserRole::Technician | UserRole::Supervisor),
        Action::AcknowledgeAlerts | Action::RaiseAlerts => true,
    }
}

/// Sections visible to a role, in navigation order
pub fn visible_sections(role: UserRole) -> Vec<Section> {
    Section::ALL
        .iter()
        .copied()
        .filter(|section| can_view(role, *section))
        .collect()
}

impl User {
    pub fn require(&self, action: Action) -> AppResult<()> {
        if can_perform(self.role, action) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "{} ({}) is not allowed to {}",
                self.name,
                self.role,
                action.describe()
            )))
        }
    }

    pub fn require_view(&self, section: Section) -> AppResult<()> {
        if can_view(self.role, section) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "{} ({}) cannot open {:?}",
                self.name, self.role, section
            )))
        }
    }
}
