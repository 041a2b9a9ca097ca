//! Shared domain enums

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Implements `as_str`, `ALL`, `Display` and case-insensitive `FromStr`
/// from one label table. Labels are the values users see in filters.
macro_rules! labeled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| {
                        v.as_str().eq_ignore_ascii_case(wanted)
                            || v.as_str().replace(' ', "_").eq_ignore_ascii_case(wanted)
                    })
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("Unknown {} '{}'", stringify!($name), s))
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

/// Operational status of an equipment unit, set by users or the alert workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentStatus {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
    Maintenance,
    Offline,
}

labeled_enum!(EquipmentStatus {
    Ok => "OK",
    Warning => "Warning",
    Critical => "Critical",
    Maintenance => "Maintenance",
    Offline => "Offline",
});

impl EquipmentStatus {
    /// Units under maintenance or offline accept no telemetry and have no
    /// predicted service date.
    pub fn is_suspended(&self) -> bool {
        matches!(self, EquipmentStatus::Maintenance | EquipmentStatus::Offline)
    }
}

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Predicted failure risk, ordered Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

labeled_enum!(RiskLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Overdue,
}

labeled_enum!(TaskStatus {
    Pending => "Pending",
    InProgress => "In Progress",
    Completed => "Completed",
    Overdue => "Overdue",
});

impl TaskStatus {
    /// Pending or in progress
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

// ---------------------------------------------------------------------------
// TaskPriority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

labeled_enum!(TaskPriority {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

// ---------------------------------------------------------------------------
// AlertSeverity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
}

labeled_enum!(AlertSeverity {
    Info => "Info",
    Warning => "Warning",
    Error => "Error",
});

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Technician,
    Supervisor,
    Manager,
}

labeled_enum!(UserRole {
    Technician => "Technician",
    Supervisor => "Supervisor",
    Manager => "Manager",
});

// ---------------------------------------------------------------------------
// Derived filter values
// ---------------------------------------------------------------------------

/// Alert acknowledgement filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckState {
    Acknowledged,
    Unacknowledged,
}

labeled_enum!(AckState {
    Acknowledged => "ACKNOWLEDGED",
    Unacknowledged => "UNACKNOWLEDGED",
});

impl AckState {
    pub fn matches(&self, acknowledged: bool) -> bool {
        match self {
            AckState::Acknowledged => acknowledged,
            AckState::Unacknowledged => !acknowledged,
        }
    }
}

/// Stock level computed from quantity and reorder level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    InStock,
    LowStock,
    OutOfStock,
}

labeled_enum!(StockLevel {
    InStock => "IN_STOCK",
    LowStock => "LOW_STOCK",
    OutOfStock => "OUT_OF_STOCK",
});

impl StockLevel {
    /// `InStock` includes low stock: anything with at least one unit.
    pub fn matches(&self, quantity_in_stock: u32, reorder_level: u32) -> bool {
        match self {
            StockLevel::InStock => quantity_in_stock > 0,
            StockLevel::LowStock => quantity_in_stock > 0 && quantity_in_stock <= reorder_level,
            StockLevel::OutOfStock => quantity_in_stock == 0,
        }
    }
}
