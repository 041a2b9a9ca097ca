//! User methods on Store

use super::Store;
use crate::{
    error::{AppError, AppResult},
    models::User,
};

impl Store {
    pub fn users_list(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    pub fn users_get_by_id(&self, id: &str) -> AppResult<&User> {
        self.users
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub fn users_insert(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn technicians(&self) -> Vec<User> {
        self.users.values().filter(|u| u.is_technician()).cloned().collect()
    }
}
