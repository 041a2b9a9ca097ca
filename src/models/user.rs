//! User model

use serde::{Deserialize, Serialize};

use crate::models::enums::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub email: String,
}

impl User {
    pub fn is_technician(&self) -> bool {
        self.role == UserRole::Technician
    }
}
