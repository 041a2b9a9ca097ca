//! Spare part inventory model

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::query::{FieldFilter, Queryable, SortDirection, SortValue};
use crate::models::enums::StockLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePart {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub quantity_in_stock: u32,
    pub reorder_level: u32,
    pub supplier: String,
    /// Per unit
    pub price: Decimal,
    /// Shelf, e.g. "A-12"
    pub location: Option<String>,
}

impl SparePart {
    pub fn has_stock_level(&self, level: StockLevel) -> bool {
        level.matches(self.quantity_in_stock, self.reorder_level)
    }

    /// Value of the units on hand, `None` when it does not fit a `Decimal`
    pub fn stock_value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity_in_stock))
    }
}

impl Queryable for SparePart {
    const KIND: &'static str = "part";
    const SORT_KEYS: &'static [&'static str] =
        &["name", "sku", "quantityInStock", "reorderLevel", "supplier", "price"];
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> = Some(("name", SortDirection::Asc));

    fn text_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.sku.as_str(), self.supplier.as_str()]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "name" => SortValue::text(&self.name),
            "sku" => SortValue::text(&self.sku),
            "quantityInStock" => SortValue::Number(f64::from(self.quantity_in_stock)),
            "reorderLevel" => SortValue::Number(f64::from(self.reorder_level)),
            "supplier" => SortValue::text(&self.supplier),
            "price" => SortValue::Number(self.price.to_f64().unwrap_or(0.0)),
            _ => SortValue::Missing,
        }
    }
}

/// Create part request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePart {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    pub quantity_in_stock: Option<u32>,
    /// Defaults to 5
    pub reorder_level: Option<u32>,
    pub supplier: Option<String>,
    pub price: Option<Decimal>,
    pub location: Option<String>,
}

/// Update part request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePart {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "SKU cannot be empty"))]
    pub sku: Option<String>,
    pub quantity_in_stock: Option<u32>,
    pub reorder_level: Option<u32>,
    pub supplier: Option<String>,
    pub price: Option<Decimal>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PartQuery {
    pub search: String,
    pub stock: FieldFilter<StockLevel>,
    pub supplier: FieldFilter<String>,
    pub sort: Option<(String, SortDirection)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn part(quantity_in_stock: u32, reorder_level: u32) -> SparePart {
        SparePart {
            id: "part-1".to_string(),
            name: "AC Filter Medium Size".to_string(),
            sku: "ACF-M-2024".to_string(),
            quantity_in_stock,
            reorder_level,
            supplier: "HVAC Parts Inc.".to_string(),
            price: Decimal::from_str("12.50").unwrap(),
            location: None,
        }
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(part(4, 10).stock_value(), Some(Decimal::from_str("50.00").unwrap()));
        assert_eq!(part(0, 10).stock_value(), Some(Decimal::ZERO));

        let mut costly = part(1_000_000, 10);
        costly.price = Decimal::MAX / Decimal::from(2);
        assert_eq!(costly.stock_value(), None);
    }

    #[test]
    fn test_price_sorts_numerically() {
        assert_eq!(part(1, 1).sort_value("price"), SortValue::Number(12.5));
    }
}
