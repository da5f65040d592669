//! Search and structured filtering over loaded resource rows.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;
use crate::services::resource::{DimensionKind, Resource, ResourceDescriptor};
use crate::services::status::Status;

/// Inclusive numeric bounds; a missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Inclusive calendar-day bounds; `to` covers the whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

/// Structured filters selected on a list page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub statuses: BTreeSet<Status>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, BTreeSet<i64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ranges: BTreeMap<String, NumericRange>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dates: BTreeMap<String, DateRange>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
            && self.values.values().all(BTreeSet::is_empty)
            && !self.ranges.values().any(NumericRange::is_active)
            && !self.dates.values().any(DateRange::is_active)
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.statuses.insert(status);
        self
    }

    pub fn with_values(mut self, dimension: &str, ids: impl IntoIterator<Item = i64>) -> Self {
        self.values
            .entry(dimension.to_string())
            .or_default()
            .extend(ids);
        self
    }

    pub fn with_range(mut self, dimension: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.ranges
            .insert(dimension.to_string(), NumericRange { min, max });
        self
    }

    pub fn with_dates(
        mut self,
        dimension: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        self.dates
            .insert(dimension.to_string(), DateRange { from, to });
        self
    }

    /// Parse flat query parameters against a descriptor.
    ///
    /// `status=Active,Scheduled`, `<dim>=1,2` for discrete dimensions,
    /// `<dim>_min`/`<dim>_max` for numeric ones and `<dim>_from`/`<dim>_to`
    /// (`YYYY-MM-DD`) for dates. Parameters naming no dimension are ignored.
    pub fn from_params<T>(
        descriptor: &ResourceDescriptor<T>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ConsoleError> {
        let mut filters = FilterSet::default();

        if let Some(raw) = params.get("status") {
            for part in split_list(raw) {
                filters.statuses.insert(part.parse()?);
            }
        }

        for dimension in &descriptor.dimensions {
            let name = dimension.name;
            match dimension.kind {
                DimensionKind::Discrete(_) => {
                    if let Some(raw) = params.get(name) {
                        let ids = split_list(raw)
                            .map(|part| {
                                part.parse::<i64>().map_err(|_| {
                                    ConsoleError::Validation(format!(
                                        "Filter '{name}' expects numeric ids, got '{part}'"
                                    ))
                                })
                            })
                            .collect::<Result<BTreeSet<_>, _>>()?;
                        if !ids.is_empty() {
                            filters.values.insert(name.to_string(), ids);
                        }
                    }
                }
                DimensionKind::Numeric(_) => {
                    let range = NumericRange {
                        min: parse_bound(params, name, "min")?,
                        max: parse_bound(params, name, "max")?,
                    };
                    if range.is_active() {
                        filters.ranges.insert(name.to_string(), range);
                    }
                }
                DimensionKind::Date(_) => {
                    let range = DateRange {
                        from: parse_day(params, name, "from")?,
                        to: parse_day(params, name, "to")?,
                    };
                    if range.is_active() {
                        filters.dates.insert(name.to_string(), range);
                    }
                }
            }
        }

        Ok(filters)
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|p| !p.is_empty())
}

fn parse_bound(
    params: &HashMap<String, String>,
    name: &str,
    suffix: &str,
) -> Result<Option<f64>, ConsoleError> {
    let key = format!("{name}_{suffix}");
    match params.get(&key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| ConsoleError::Validation(format!("'{key}' must be a number"))),
    }
}

fn parse_day(
    params: &HashMap<String, String>,
    name: &str,
    suffix: &str,
) -> Result<Option<NaiveDate>, ConsoleError> {
    let key = format!("{name}_{suffix}");
    match params.get(&key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ConsoleError::Validation(format!("'{key}' must be a YYYY-MM-DD date"))),
    }
}

/// Build the row predicate for one filter pass.
///
/// `now` is captured once so every row in the pass is judged against the same
/// instant. The text search is skipped for resources searched upstream.
pub fn build_predicate<'a, T: Resource>(
    descriptor: &'a ResourceDescriptor<T>,
    search_term: &str,
    filters: &'a FilterSet,
    now: DateTime<Utc>,
) -> impl Fn(&T) -> bool + 'a {
    let needle = if descriptor.server_side_search {
        String::new()
    } else {
        search_term.trim().to_lowercase()
    };

    move |item: &T| {
        if !descriptor.matches_search(item, &needle) {
            return false;
        }

        if !filters.statuses.is_empty() {
            match item.status(now) {
                Some(status) if filters.statuses.contains(&status) => {}
                _ => return false,
            }
        }

        descriptor.dimensions.iter().all(|dimension| match &dimension.kind {
            DimensionKind::Discrete(value) => match filters.values.get(dimension.name) {
                Some(ids) if !ids.is_empty() => value(item).is_some_and(|v| ids.contains(&v)),
                _ => true,
            },
            DimensionKind::Numeric(value) => match filters.ranges.get(dimension.name) {
                Some(range) if range.is_active() => value(item).is_some_and(|v| range.contains(v)),
                _ => true,
            },
            DimensionKind::Date(value) => match filters.dates.get(dimension.name) {
                Some(range) if range.is_active() => value(item).is_some_and(|v| range.contains(v)),
                _ => true,
            },
        })
    }
}

/// Narrow and order rows for display.
pub fn apply<T: Resource>(
    data: &[T],
    descriptor: &ResourceDescriptor<T>,
    search_term: &str,
    filters: &FilterSet,
    now: DateTime<Utc>,
) -> Vec<T> {
    let predicate = build_predicate(descriptor, search_term, filters, now);
    let mut rows: Vec<T> = data.iter().filter(|item| predicate(item)).cloned().collect();
    if let Some(order) = descriptor.sort {
        rows.sort_by(order);
    }
    rows
}
