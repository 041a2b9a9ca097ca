//! Health & query engine: pure computations with no state of their own

pub mod query;
pub mod risk;

pub use query::{query, FieldFilter, FilterSpec, Matchers, Queryable, SortDirection, SortValue};
pub use risk::{RiskEstimator, RiskPolicy};
