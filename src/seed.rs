//! Demo fleet loaded into a fresh session

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::{
    engine::RiskEstimator,
    models::{
        log::PartUsage, Alert, AlertSeverity, Equipment, EquipmentStatus, MaintenanceLogEntry,
        MaintenanceTask, SparePart, TaskPriority, TaskStatus, User, UserRole,
    },
    repository::{Repository, Store},
};

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn demo_users() -> Vec<User> {
    [
        ("user-1", "Alice Smith", UserRole::Manager, "alice@example.com"),
        ("user-2", "Bob Johnson", UserRole::Supervisor, "bob@example.com"),
        ("user-3", "Charlie Brown", UserRole::Technician, "charlie@example.com"),
        ("user-4", "Diana Prince", UserRole::Technician, "diana@example.com"),
    ]
    .into_iter()
    .map(|(id, name, role, email)| User {
        id: id.to_string(),
        name: name.to_string(),
        role,
        email: email.to_string(),
    })
    .collect()
}

pub fn demo_equipment() -> Vec<Equipment> {
    let unit = |id: &str,
                name: &str,
                equipment_type: &str,
                location: &str,
                status: EquipmentStatus,
                last_service_date: DateTime<Utc>,
                purchase_date: DateTime<Utc>,
                technician: Option<&str>| Equipment {
        id: id.to_string(),
        name: name.to_string(),
        equipment_type: equipment_type.to_string(),
        location: location.to_string(),
        status,
        last_service_date,
        purchase_date,
        notes: None,
        assigned_technician_id: technician.map(str::to_string),
    };

    let mut projector = unit(
        "eq-3",
        "CEO Office Projector",
        "Projector",
        "Floor 3, CEO Office",
        EquipmentStatus::Critical,
        date(2024, 3, 10),
        date(2023, 5, 20),
        None,
    );
    projector.notes = Some("Flickering image reported".to_string());

    vec![
        unit(
            "eq-1",
            "Office Printer X1000",
            "Printer",
            "Floor 1, Copy Room",
            EquipmentStatus::Ok,
            date(2024, 5, 15),
            date(2023, 1, 10),
            Some("user-3"),
        ),
        unit(
            "eq-2",
            "Conference Room AC Unit",
            "HVAC",
            "Floor 2, Meeting Room A",
            EquipmentStatus::Warning,
            date(2024, 4, 20),
            date(2022, 7, 1),
            Some("user-4"),
        ),
        projector,
        unit(
            "eq-4",
            "Kitchen Refrigerator",
            "Appliance",
            "Floor 1, Break Room",
            EquipmentStatus::Ok,
            date(2024, 6, 1),
            date(2023, 2, 15),
            None,
        ),
        unit(
            "eq-5",
            "Server Rack Fan Array",
            "IT Hardware",
            "Data Center, Rack 3",
            EquipmentStatus::Maintenance,
            date(2024, 7, 10),
            date(2022, 11, 5),
            Some("user-3"),
        ),
    ]
}

pub fn demo_tasks() -> Vec<MaintenanceTask> {
    let task = |id: &str,
                equipment_id: &str,
                equipment_name: &str,
                description: &str,
                assigned_to: &str,
                due_date: DateTime<Utc>,
                status: TaskStatus,
                priority: TaskPriority,
                created_at: DateTime<Utc>| MaintenanceTask {
        id: id.to_string(),
        equipment_id: equipment_id.to_string(),
        equipment_name: equipment_name.to_string(),
        description: description.to_string(),
        assigned_to: assigned_to.to_string(),
        due_date,
        status,
        priority,
        notes: None,
        created_at,
    };

    vec![
        task(
            "task-1",
            "eq-2",
            "Conference Room AC Unit",
            "Annual AC service and filter change",
            "user-4",
            date(2024, 7, 25),
            TaskStatus::Pending,
            TaskPriority::Medium,
            date(2024, 7, 1),
        ),
        task(
            "task-2",
            "eq-3",
            "CEO Office Projector",
            "Investigate flickering image issue",
            "user-3",
            date(2024, 7, 22),
            TaskStatus::InProgress,
            TaskPriority::High,
            date(2024, 7, 10),
        ),
        task(
            "task-3",
            "eq-1",
            "Office Printer X1000",
            "Replace toner cartridge (Black)",
            "user-3",
            date(2024, 7, 30),
            TaskStatus::Pending,
            TaskPriority::Low,
            date(2024, 7, 15),
        ),
        task(
            "task-4",
            "eq-5",
            "Server Rack Fan Array",
            "Complete fan replacement",
            "user-3",
            date(2024, 7, 15),
            TaskStatus::Completed,
            TaskPriority::High,
            date(2024, 7, 10),
        ),
    ]
}

pub fn demo_alerts() -> Vec<Alert> {
    let alert = |id: &str,
                 equipment_id: &str,
                 equipment_name: &str,
                 message: &str,
                 timestamp: DateTime<Utc>,
                 severity: AlertSeverity,
                 acknowledged: bool| Alert {
        id: id.to_string(),
        equipment_id: equipment_id.to_string(),
        equipment_name: equipment_name.to_string(),
        message: message.to_string(),
        timestamp,
        severity,
        acknowledged,
    };

    vec![
        alert(
            "alert-1",
            "eq-2",
            "Conference Room AC Unit",
            "High temperature detected: 32°C",
            at(2024, 7, 20, 10, 30),
            AlertSeverity::Warning,
            false,
        ),
        alert(
            "alert-2",
            "eq-3",
            "CEO Office Projector",
            "Equipment offline unexpectedly",
            at(2024, 7, 19, 15, 0),
            AlertSeverity::Error,
            true,
        ),
        alert(
            "alert-3",
            "eq-1",
            "Office Printer X1000",
            "Low toner warning",
            at(2024, 7, 21, 9, 0),
            AlertSeverity::Info,
            false,
        ),
    ]
}

pub fn demo_parts() -> Vec<SparePart> {
    [
        ("part-1", "Printer Toner Cartridge - Black X1000", "TN-X1000-BLK", 15, 5, "PrintSupply Co.", 7599, "Shelf B-3"),
        ("part-2", "AC Filter Medium Size", "ACF-M-2024", 30, 10, "HVAC Parts Inc.", 1250, "Shelf C-1"),
        ("part-3", "Projector Lamp PL-500", "LP-PL500", 5, 2, "AVWorld", 12000, "Shelf A-5"),
        ("part-4", "Server Fan 120mm", "SF-120MM-HQ", 22, 10, "ITCooling Solutions", 2500, "Shelf D-7"),
    ]
    .into_iter()
    .map(|(id, name, sku, quantity, reorder, supplier, cents, location)| SparePart {
        id: id.to_string(),
        name: name.to_string(),
        sku: sku.to_string(),
        quantity_in_stock: quantity,
        reorder_level: reorder,
        supplier: supplier.to_string(),
        price: Decimal::new(cents, 2),
        location: Some(location.to_string()),
    })
    .collect()
}

pub fn demo_logs() -> Vec<MaintenanceLogEntry> {
    vec![
        MaintenanceLogEntry {
            id: "log-1".to_string(),
            equipment_id: "eq-1".to_string(),
            equipment_name: "Office Printer X1000".to_string(),
            task_id: None,
            date: date(2024, 5, 15),
            performed_by: "Charlie Brown".to_string(),
            description: "Routine maintenance, cleaned rollers, checked connections.".to_string(),
            parts_used: Vec::new(),
            duration_hours: 1.0,
        },
        MaintenanceLogEntry {
            id: "log-2".to_string(),
            equipment_id: "eq-2".to_string(),
            equipment_name: "Conference Room AC Unit".to_string(),
            task_id: None,
            date: date(2024, 4, 20),
            performed_by: "Diana Prince".to_string(),
            description: "Cleaned coils and replaced air filter.".to_string(),
            parts_used: vec![PartUsage {
                part_id: "part-2".to_string(),
                part_name: "AC Filter Medium Size".to_string(),
                quantity: 1,
            }],
            duration_hours: 2.5,
        },
        MaintenanceLogEntry {
            id: "log-3".to_string(),
            equipment_id: "eq-5".to_string(),
            equipment_name: "Server Rack Fan Array".to_string(),
            task_id: Some("task-4".to_string()),
            date: date(2024, 7, 15),
            performed_by: "Charlie Brown".to_string(),
            description: "Replaced all fans in array as per task-4. Tested airflow.".to_string(),
            parts_used: vec![PartUsage {
                part_id: "part-4".to_string(),
                part_name: "Server Fan 120mm".to_string(),
                quantity: 8,
            }],
            duration_hours: 4.0,
        },
    ]
}

/// Fill an empty store with the demo fleet. Health starts from the unit
/// status alone; telemetry backfill refines it.
pub fn populate(store: &mut Store, estimator: &RiskEstimator) {
    for user in demo_users() {
        store.users_insert(user);
    }
    for equipment in demo_equipment() {
        let health =
            estimator.initial_state(&equipment.id, equipment.status, equipment.last_service_date);
        store.equipment_insert(equipment, health);
    }
    // Insert in reverse: the store puts new records first
    for task in demo_tasks().into_iter().rev() {
        store.tasks_insert(task);
    }
    for alert in demo_alerts().into_iter().rev() {
        store.alerts_insert(alert);
    }
    for part in demo_parts().into_iter().rev() {
        store.parts_insert(part);
    }
    for log in demo_logs().into_iter().rev() {
        store.logs_insert(log);
    }
}

pub async fn seed_demo(repository: &Repository, estimator: &RiskEstimator) {
    let mut store = repository.write().await;
    populate(&mut store, estimator);
    tracing::info!(
        "Seeded demo fleet: {} equipment, {} tasks, {} alerts, {} parts",
        store.equipment_list().len(),
        store.tasks_list().len(),
        store.alerts_list().len(),
        store.parts_list().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;

    #[test]
    fn test_populate_keeps_listing_order() {
        let mut store = Store::new(50);
        populate(&mut store, &RiskEstimator::default());
        let ids: Vec<String> = store.tasks_list().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["task-1", "task-2", "task-3", "task-4"]);
        assert_eq!(store.equipment_list()[0].id, "eq-1");
        assert_eq!(store.technicians().len(), 2);
    }

    #[test]
    fn test_initial_health_follows_status() {
        let mut store = Store::new(50);
        populate(&mut store, &RiskEstimator::default());

        let projector = store.health_get("eq-3").unwrap();
        assert_eq!(projector.predicted_risk, RiskLevel::High);

        let ac = store.health_get("eq-2").unwrap();
        assert_eq!(ac.predicted_risk, RiskLevel::Medium);

        let fans = store.health_get("eq-5").unwrap();
        assert_eq!(fans.next_service_date, None);

        let printer = store.health_get("eq-1").unwrap();
        assert_eq!(printer.next_service_date, Some(date(2024, 11, 15)));
    }
}
