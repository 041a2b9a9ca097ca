//! Generic filter/sort engine shared by every list view.
//!
//! A record kind opts in by implementing [`Queryable`]: it declares which
//! text fields the free-text search looks at and which keys it can be sorted
//! by. Field filters are not hardcoded here; each caller supplies
//! [`Matchers`] that decide whether a record accepts a filter value, so
//! derived predicates (stock level, acknowledgement) work the same way as
//! plain equality.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Sentinel used by list views for "no filter on this field"
pub const ANY_SENTINEL: &str = "ALL";

/// A field filter: either no constraint or one accepted value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldFilter<T> {
    #[default]
    Any,
    Specific(T),
}

impl<T> FieldFilter<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, FieldFilter::Any)
    }

    pub fn as_ref(&self) -> FieldFilter<&T> {
        match self {
            FieldFilter::Any => FieldFilter::Any,
            FieldFilter::Specific(v) => FieldFilter::Specific(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldFilter<U> {
        match self {
            FieldFilter::Any => FieldFilter::Any,
            FieldFilter::Specific(v) => FieldFilter::Specific(f(v)),
        }
    }
}

impl<T: fmt::Display> FieldFilter<T> {
    /// Converts a typed filter into the string form the engine matches on
    pub fn to_raw(&self) -> FieldFilter<String> {
        self.as_ref().map(|v| v.to_string())
    }
}

impl<T> From<Option<T>> for FieldFilter<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldFilter::Any, FieldFilter::Specific)
    }
}

impl<T: FromStr> FromStr for FieldFilter<T> {
    type Err = T::Err;

    /// `"ALL"` (any case) and the empty string mean no constraint
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ANY_SENTINEL) {
            return Ok(FieldFilter::Any);
        }
        trimmed.parse().map(FieldFilter::Specific)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// Comparable projection of one record field
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Time(DateTime<Utc>),
    /// Sorts after every present value, in both directions
    Missing,
}

impl SortValue {
    /// Text values compare case-insensitively
    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    pub fn time(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(SortValue::Missing, SortValue::Time)
    }

    fn compare(&self, other: &SortValue, direction: SortDirection) -> Ordering {
        let ordering = match (self, other) {
            (SortValue::Missing, SortValue::Missing) => return Ordering::Equal,
            (SortValue::Missing, _) => return Ordering::Greater,
            (_, SortValue::Missing) => return Ordering::Less,
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            _ => Ordering::Equal,
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A record kind the engine can filter and sort
pub trait Queryable {
    /// Human-readable kind name used in errors and logs
    const KIND: &'static str;
    /// Keys accepted by [`Queryable::sort_value`]
    const SORT_KEYS: &'static [&'static str];
    /// Display order applied when the caller does not choose one
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> = None;

    /// Fields searched by the free-text query
    fn text_fields(&self) -> Vec<&str>;

    /// Projection used for sorting; only called with keys from `SORT_KEYS`
    fn sort_value(&self, key: &str) -> SortValue;
}

/// What to show and in which order. Sort keys are checked on construction so
/// a bad key fails before any render.
pub struct FilterSpec<R> {
    text_query: String,
    field_filters: IndexMap<String, FieldFilter<String>>,
    sort: Option<SortSpec>,
    _kind: PhantomData<fn() -> R>,
}

impl<R> Clone for FilterSpec<R> {
    fn clone(&self) -> Self {
        Self {
            text_query: self.text_query.clone(),
            field_filters: self.field_filters.clone(),
            sort: self.sort.clone(),
            _kind: PhantomData,
        }
    }
}

impl<R: Queryable> fmt::Debug for FilterSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSpec")
            .field("kind", &R::KIND)
            .field("text_query", &self.text_query)
            .field("field_filters", &self.field_filters)
            .field("sort", &self.sort)
            .finish()
    }
}

impl<R: Queryable> Default for FilterSpec<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Queryable> FilterSpec<R> {
    /// Empty search, no field filters, the kind's default order
    pub fn new() -> Self {
        Self {
            text_query: String::new(),
            field_filters: IndexMap::new(),
            sort: R::DEFAULT_SORT.map(|(key, direction)| SortSpec {
                key: key.to_string(),
                direction,
            }),
            _kind: PhantomData,
        }
    }

    pub fn text(mut self, query: impl Into<String>) -> Self {
        self.text_query = query.into();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: FieldFilter<String>) -> Self {
        self.field_filters.insert(field.into(), value);
        self
    }

    /// Fails with `InvalidSortKey` when the kind does not declare `key`
    pub fn sort_by(mut self, key: &str, direction: SortDirection) -> AppResult<Self> {
        if !R::SORT_KEYS.contains(&key) {
            return Err(AppError::InvalidSortKey {
                kind: R::KIND,
                key: key.to_string(),
            });
        }
        self.sort = Some(SortSpec {
            key: key.to_string(),
            direction,
        });
        Ok(self)
    }

    /// Keep input order
    pub fn unsorted(mut self) -> Self {
        self.sort = None;
        self
    }
}

type MatchFn<R> = Box<dyn Fn(&R, &str) -> bool + Send + Sync>;

/// Per-field predicates: `(record, accepted value) -> bool`
pub struct Matchers<R> {
    fields: IndexMap<&'static str, MatchFn<R>>,
}

impl<R> Default for Matchers<R> {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }
}

impl<R> Matchers<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, field: &'static str, matcher: F) -> Self
    where
        F: Fn(&R, &str) -> bool + Send + Sync + 'static,
    {
        self.fields.insert(field, Box::new(matcher));
        self
    }

    /// Equality on a value parsed from the filter string. Unparseable filter
    /// values match nothing.
    pub fn on_parsed<T, F>(self, field: &'static str, project: F) -> Self
    where
        T: FromStr + PartialEq,
        F: Fn(&R) -> T + Send + Sync + 'static,
    {
        self.on(field, move |record, value| {
            value
                .parse::<T>()
                .map_or(false, |wanted| project(record) == wanted)
        })
    }

    fn get(&self, field: &str) -> Option<&MatchFn<R>> {
        self.fields.get(field)
    }
}

/// Select the records that pass the text query and every field filter, then
/// order them. Ties keep their input order.
pub fn query<'a, R: Queryable>(
    records: &'a [R],
    spec: &FilterSpec<R>,
    matchers: &Matchers<R>,
) -> AppResult<Vec<&'a R>> {
    let mut active = Vec::with_capacity(spec.field_filters.len());
    for (field, value) in &spec.field_filters {
        let matcher = matchers.get(field).ok_or_else(|| AppError::UnknownFilterField {
            kind: R::KIND,
            field: field.clone(),
        })?;
        if let FieldFilter::Specific(value) = value {
            active.push((matcher, value.as_str()));
        }
    }

    let needle = spec.text_query.to_lowercase();
    let mut selected: Vec<&R> = records
        .iter()
        .filter(|record| matches_text(*record, &needle))
        .filter(|record| active.iter().all(|&(matcher, value)| matcher(*record, value)))
        .collect();

    if let Some(sort) = &spec.sort {
        let mut keyed: Vec<(SortValue, &R)> = selected
            .into_iter()
            .map(|record| (record.sort_value(&sort.key), record))
            .collect();
        // `sort_by` is stable, which is what keeps ties in input order
        keyed.sort_by(|(a, _), (b, _)| a.compare(b, sort.direction));
        selected = keyed.into_iter().map(|(_, record)| record).collect();
    }

    tracing::trace!(
        "{} query: {} of {} records selected",
        R::KIND,
        selected.len(),
        records.len()
    );
    Ok(selected)
}

fn matches_text<R: Queryable>(record: &R, needle: &str) -> bool {
    needle.is_empty()
        || record
            .text_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}
