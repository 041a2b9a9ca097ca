//! Maintenance schedule service

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    engine::{query, FilterSpec, Matchers},
    error::AppResult,
    models::{
        task::{CreateTask, TaskQuery, UpdateTask},
        MaintenanceTask, TaskStatus, User,
    },
    repository::{new_id, Repository, Store},
    services::access::Action,
};

/// Assignee placeholder when no technician exists
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Clone)]
pub struct TasksService {
    repository: Repository,
}

impl TasksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn matchers() -> Matchers<MaintenanceTask> {
        Matchers::<MaintenanceTask>::new()
            .on_parsed("status", |t| t.status)
            .on_parsed("priority", |t| t.priority)
            .on("assignee", |t, value| t.assigned_to == value)
            .on("equipmentId", |t, value| t.equipment_id == value)
    }

    pub async fn list(&self) -> AppResult<Vec<MaintenanceTask>> {
        Ok(self.repository.read().await.tasks_list())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<MaintenanceTask> {
        Ok(self.repository.read().await.tasks_get_by_id(id)?.clone())
    }

    /// Filtered schedule, due date ascending unless another order is asked for
    pub async fn search(&self, params: &TaskQuery) -> AppResult<Vec<MaintenanceTask>> {
        let mut spec = FilterSpec::new()
            .text(params.search.clone())
            .filter("status", params.status.to_raw())
            .filter("priority", params.priority.to_raw())
            .filter("assignee", params.assignee.clone())
            .filter("equipmentId", params.equipment_id.clone());
        if let Some((key, direction)) = &params.sort {
            spec = spec.sort_by(key, *direction)?;
        }

        let records = self.list().await?;
        let selected = query(&records, &spec, &Self::matchers())?;
        Ok(selected.into_iter().cloned().collect())
    }

    /// Open tasks due after `now`
    pub async fn upcoming(&self, now: DateTime<Utc>) -> AppResult<Vec<MaintenanceTask>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|t| t.status != TaskStatus::Completed && t.due_date > now)
            .collect())
    }

    pub async fn create(&self, actor: &User, data: CreateTask) -> AppResult<MaintenanceTask> {
        actor.require(Action::ManageTasks)?;
        data.validate()?;

        let mut store = self.repository.write().await;
        let equipment_name = store.equipment_get_by_id(&data.equipment_id)?.name.clone();
        let assigned_to = resolve_assignee(&store, data.assigned_to)?;

        let task = MaintenanceTask {
            id: new_id("task"),
            equipment_id: data.equipment_id,
            equipment_name,
            description: data.description,
            assigned_to,
            due_date: data.due_date,
            status: data.status.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
            notes: data.notes,
            created_at: Utc::now(),
        };

        tracing::info!("Task {} scheduled for {}", task.id, task.equipment_name);
        store.tasks_insert(task.clone());
        Ok(task)
    }

    pub async fn update(&self, actor: &User, id: &str, data: UpdateTask) -> AppResult<MaintenanceTask> {
        actor.require(Action::ManageTasks)?;
        data.validate()?;

        let mut store = self.repository.write().await;
        let equipment = match &data.equipment_id {
            Some(equipment_id) => {
                let name = store.equipment_get_by_id(equipment_id)?.name.clone();
                Some((equipment_id.clone(), name))
            }
            None => None,
        };
        let assigned_to = match data.assigned_to {
            Some(assignee) => Some(resolve_assignee(&store, Some(assignee))?),
            None => None,
        };

        let task = store.tasks_get_mut(id)?;
        if let Some((equipment_id, equipment_name)) = equipment {
            task.equipment_id = equipment_id;
            task.equipment_name = equipment_name;
        }
        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(assigned_to) = assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(due_date) = data.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = data.status {
            task.status = status;
        }
        if let Some(priority) = data.priority {
            task.priority = priority;
        }
        if data.notes.is_some() {
            task.notes = data.notes;
        }

        Ok(task.clone())
    }

    pub async fn delete(&self, actor: &User, id: &str) -> AppResult<()> {
        actor.require(Action::ManageTasks)?;
        let removed = self.repository.write().await.tasks_remove(id)?;
        tracing::info!("Task {} deleted", removed.id);
        Ok(())
    }
}

/// Explicit assignees must exist; otherwise the first technician, if any
fn resolve_assignee(store: &Store, requested: Option<String>) -> AppResult<String> {
    match requested {
        Some(id) if id == UNASSIGNED => Ok(id),
        Some(id) => {
            store.users_get_by_id(&id)?;
            Ok(id)
        }
        None => Ok(store
            .technicians()
            .into_iter()
            .next()
            .map_or_else(|| UNASSIGNED.to_string(), |u| u.id)),
    }
}
