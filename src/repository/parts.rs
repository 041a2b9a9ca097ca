//! Spare part inventory methods on Store

use super::Store;
use crate::{
    error::{AppError, AppResult},
    models::SparePart,
};

impl Store {
    pub fn parts_list(&self) -> Vec<SparePart> {
        self.parts.values().cloned().collect()
    }

    pub fn parts_get_by_id(&self, id: &str) -> AppResult<&SparePart> {
        self.parts
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Part {} not found", id)))
    }

    pub fn parts_get_mut(&mut self, id: &str) -> AppResult<&mut SparePart> {
        self.parts
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Part {} not found", id)))
    }

    pub fn parts_sku_exists(&self, sku: &str, except_id: Option<&str>) -> bool {
        self.parts
            .values()
            .any(|p| p.sku.eq_ignore_ascii_case(sku) && Some(p.id.as_str()) != except_id)
    }

    /// New parts go first
    pub fn parts_insert(&mut self, part: SparePart) {
        self.parts.shift_insert(0, part.id.clone(), part);
    }

    pub fn parts_remove(&mut self, id: &str) -> AppResult<SparePart> {
        self.parts
            .shift_remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Part {} not found", id)))
    }
}
