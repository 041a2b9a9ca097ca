//! Spare part inventory service

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    engine::{query, FilterSpec, Matchers},
    error::{AppError, AppResult},
    models::{
        enums::StockLevel,
        spare_part::{CreatePart, PartQuery, UpdatePart},
        SparePart, User,
    },
    repository::{new_id, Repository},
    services::access::Action,
};

const DEFAULT_REORDER_LEVEL: u32 = 5;

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn matchers() -> Matchers<SparePart> {
        Matchers::<SparePart>::new()
            .on("stock", |p, value| {
                value
                    .parse::<StockLevel>()
                    .map_or(false, |level| p.has_stock_level(level))
            })
            .on("supplier", |p, value| p.supplier == value)
    }

    pub async fn list(&self) -> AppResult<Vec<SparePart>> {
        Ok(self.repository.read().await.parts_list())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<SparePart> {
        Ok(self.repository.read().await.parts_get_by_id(id)?.clone())
    }

    /// Filtered inventory, name ascending unless another order is asked for
    pub async fn search(&self, params: &PartQuery) -> AppResult<Vec<SparePart>> {
        let mut spec = FilterSpec::new()
            .text(params.search.clone())
            .filter("stock", params.stock.to_raw())
            .filter("supplier", params.supplier.clone());
        if let Some((key, direction)) = &params.sort {
            spec = spec.sort_by(key, *direction)?;
        }

        let records = self.list().await?;
        let selected = query(&records, &spec, &Self::matchers())?;
        Ok(selected.into_iter().cloned().collect())
    }

    pub async fn create(&self, actor: &User, data: CreatePart) -> AppResult<SparePart> {
        actor.require(Action::ManageInventory)?;
        data.validate()?;

        let mut store = self.repository.write().await;
        if store.parts_sku_exists(&data.sku, None) {
            return Err(AppError::Validation(format!("SKU {} already exists", data.sku)));
        }

        let part = SparePart {
            id: new_id("part"),
            name: data.name,
            sku: data.sku,
            quantity_in_stock: data.quantity_in_stock.unwrap_or(0),
            reorder_level: data.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            supplier: data.supplier.unwrap_or_default(),
            price: data.price.unwrap_or(Decimal::ZERO),
            location: data.location,
        };
        if part.price.is_sign_negative() {
            return Err(AppError::Validation("Price cannot be negative".to_string()));
        }
        if part.stock_value().is_none() {
            return Err(stock_value_too_large());
        }

        tracing::info!("Part {} ({}) added", part.sku, part.name);
        store.parts_insert(part.clone());
        Ok(part)
    }

    pub async fn update(&self, actor: &User, id: &str, data: UpdatePart) -> AppResult<SparePart> {
        actor.require(Action::ManageInventory)?;
        data.validate()?;
        if data.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(AppError::Validation("Price cannot be negative".to_string()));
        }

        let mut store = self.repository.write().await;
        if let Some(sku) = data.sku.as_deref() {
            if store.parts_sku_exists(sku, Some(id)) {
                return Err(AppError::Validation(format!("SKU {} already exists", sku)));
            }
        }

        let part = store.parts_get_mut(id)?;
        let price = data.price.unwrap_or(part.price);
        let quantity = data.quantity_in_stock.unwrap_or(part.quantity_in_stock);
        if price.checked_mul(Decimal::from(quantity)).is_none() {
            return Err(stock_value_too_large());
        }

        if let Some(name) = data.name {
            part.name = name;
        }
        if let Some(sku) = data.sku {
            part.sku = sku;
        }
        if let Some(quantity_in_stock) = data.quantity_in_stock {
            part.quantity_in_stock = quantity_in_stock;
        }
        if let Some(reorder_level) = data.reorder_level {
            part.reorder_level = reorder_level;
        }
        if let Some(supplier) = data.supplier {
            part.supplier = supplier;
        }
        if let Some(price) = data.price {
            part.price = price;
        }
        if data.location.is_some() {
            part.location = data.location;
        }

        if part.has_stock_level(StockLevel::LowStock) {
            tracing::warn!(
                "Part {} is low on stock: {} left, reorder at {}",
                part.sku,
                part.quantity_in_stock,
                part.reorder_level
            );
        }
        Ok(part.clone())
    }

    pub async fn delete(&self, actor: &User, id: &str) -> AppResult<()> {
        actor.require(Action::ManageInventory)?;
        let removed = self.repository.write().await.parts_remove(id)?;
        tracing::info!("Part {} removed", removed.sku);
        Ok(())
    }
}

fn stock_value_too_large() -> AppError {
    AppError::Validation("Price times quantity is too large".to_string())
}
