//! User directory service

use crate::{
    error::AppResult,
    models::User,
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.repository.read().await.users_list())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<User> {
        Ok(self.repository.read().await.users_get_by_id(id)?.clone())
    }

    /// Users who can be assigned tasks
    pub async fn technicians(&self) -> AppResult<Vec<User>> {
        Ok(self.repository.read().await.technicians())
    }
}
