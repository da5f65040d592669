//! Resource contract and the descriptor that configures the list pipeline.
//!
//! One generic pipeline serves every admin page. What differs per resource
//! (which fields are searched, which dimensions can be filtered, whether a
//! lifecycle gate applies) is captured in a [`ResourceDescriptor`] value built
//! with a small builder, not in per-resource code.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

use crate::errors::{ConsoleError, MutationKind};
use crate::services::status::{Status, TimeWindow};

/// Stable identifier of every resource row.
pub type ResourceId = i64;

/// Admin-managed entity families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceFamily {
    Accounts,
    DiscountEvents,
    DiscountProducts,
    DiscountOrders,
    Categories,
    Inventory,
}

impl ResourceFamily {
    /// Path segment used both upstream and by the console gateway.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::DiscountEvents => "discount-events",
            Self::DiscountProducts => "discount-products",
            Self::DiscountOrders => "discount-orders",
            Self::Categories => "categories",
            Self::Inventory => "products",
        }
    }

    /// Singular noun for user-facing messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Accounts => "account",
            Self::DiscountEvents => "discount event",
            Self::DiscountProducts => "discount product",
            Self::DiscountOrders => "discount order",
            Self::Categories => "category",
            Self::Inventory => "product",
        }
    }
}

/// Structural contract every admin resource fulfils.
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Create/edit form payload.
    type Draft: Validate + Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    const FAMILY: ResourceFamily;

    fn id(&self) -> ResourceId;

    /// Pipeline configuration for this resource.
    fn descriptor() -> ResourceDescriptor<Self>;

    /// Materialise a stored row from a draft (used by in-process repositories).
    fn from_draft(id: ResourceId, draft: &Self::Draft, created_at: DateTime<Utc>) -> Self;

    /// Overwrite editable fields from a draft.
    fn apply_draft(&mut self, draft: &Self::Draft);

    fn time_window(&self) -> Option<TimeWindow> {
        None
    }

    fn persisted_status(&self) -> Option<Status> {
        None
    }

    /// Store a new persisted status value. Returns `false` when unsupported.
    fn set_persisted_status(&mut self, _value: i64) -> bool {
        false
    }

    /// Current status: derived from the window when present, else persisted.
    fn status(&self, now: DateTime<Utc>) -> Option<Status> {
        match self.time_window() {
            Some(window) => Some(window.status_at(now)),
            None => self.persisted_status(),
        }
    }
}

/// Which derived statuses permit edit and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleGate {
    pub editable: &'static [Status],
    pub deletable: &'static [Status],
}

impl LifecycleGate {
    /// Rule for discount windows: delete only before start, edit until expiry.
    pub const TIME_WINDOW: Self = Self {
        editable: &[Status::Scheduled, Status::Active],
        deletable: &[Status::Scheduled],
    };

    /// Check an action against the target's current status.
    pub fn check(
        &self,
        action: MutationKind,
        family: ResourceFamily,
        status: Option<Status>,
    ) -> Result<(), ConsoleError> {
        let allowed = match action {
            MutationKind::Delete => self.deletable,
            MutationKind::Update | MutationKind::ChangeStatus => self.editable,
            MutationKind::Create => return Ok(()),
        };
        match status {
            Some(status) if allowed.contains(&status) => Ok(()),
            Some(status) => Err(ConsoleError::BlockedByLifecycle {
                action,
                resource: family.noun(),
                status,
            }),
            None => Err(ConsoleError::Validation(format!(
                "Cannot {action} {}: its time window is missing",
                family.noun()
            ))),
        }
    }
}

/// How a filter dimension reads its value from a row.
pub enum DimensionKind<T> {
    /// Value must be one of the selected ids.
    Discrete(fn(&T) -> Option<i64>),
    /// Value must fall in `[min, max]`.
    Numeric(fn(&T) -> Option<f64>),
    /// Timestamp must fall in `[from, to]`, whole days.
    Date(fn(&T) -> Option<DateTime<Utc>>),
}

impl<T> Clone for DimensionKind<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Discrete(f) => Self::Discrete(*f),
            Self::Numeric(f) => Self::Numeric(*f),
            Self::Date(f) => Self::Date(*f),
        }
    }
}

/// A named filter dimension.
pub struct Dimension<T> {
    pub name: &'static str,
    pub kind: DimensionKind<T>,
}

impl<T> Clone for Dimension<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind.clone(),
        }
    }
}

/// Per-resource pipeline configuration.
pub struct ResourceDescriptor<T> {
    pub family: ResourceFamily,
    pub search_fields: Vec<fn(&T) -> &str>,
    pub dimensions: Vec<Dimension<T>>,
    pub lifecycle_gate: Option<LifecycleGate>,
    pub sort: Option<fn(&T, &T) -> Ordering>,
    /// Search runs upstream instead of over loaded rows.
    pub server_side_search: bool,
    /// Rows carry a persisted status that `change_status` can set.
    pub status_change: bool,
}

impl<T> Clone for ResourceDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            family: self.family,
            search_fields: self.search_fields.clone(),
            dimensions: self.dimensions.clone(),
            lifecycle_gate: self.lifecycle_gate,
            sort: self.sort,
            server_side_search: self.server_side_search,
            status_change: self.status_change,
        }
    }
}

impl<T> std::fmt::Debug for ResourceDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("family", &self.family)
            .field("search_fields", &self.search_fields.len())
            .field(
                "dimensions",
                &self.dimensions.iter().map(|d| d.name).collect::<Vec<_>>(),
            )
            .field("lifecycle_gate", &self.lifecycle_gate)
            .field("server_side_search", &self.server_side_search)
            .field("status_change", &self.status_change)
            .finish()
    }
}

impl<T> ResourceDescriptor<T> {
    pub fn builder(family: ResourceFamily) -> DescriptorBuilder<T> {
        DescriptorBuilder {
            descriptor: ResourceDescriptor {
                family,
                search_fields: Vec::new(),
                dimensions: Vec::new(),
                lifecycle_gate: None,
                sort: None,
                server_side_search: false,
                status_change: false,
            },
        }
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension<T>> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Case-insensitive substring match over the search fields.
    ///
    /// `needle` must already be lowercased and trimmed; empty matches all.
    pub fn matches_search(&self, item: &T, needle: &str) -> bool {
        needle.is_empty()
            || self
                .search_fields
                .iter()
                .any(|field| field(item).to_lowercase().contains(needle))
    }
}

/// Builder for [`ResourceDescriptor`].
pub struct DescriptorBuilder<T> {
    descriptor: ResourceDescriptor<T>,
}

impl<T> DescriptorBuilder<T> {
    pub fn search_field(mut self, field: fn(&T) -> &str) -> Self {
        self.descriptor.search_fields.push(field);
        self
    }

    pub fn discrete(mut self, name: &'static str, value: fn(&T) -> Option<i64>) -> Self {
        self.descriptor.dimensions.push(Dimension {
            name,
            kind: DimensionKind::Discrete(value),
        });
        self
    }

    pub fn numeric(mut self, name: &'static str, value: fn(&T) -> Option<f64>) -> Self {
        self.descriptor.dimensions.push(Dimension {
            name,
            kind: DimensionKind::Numeric(value),
        });
        self
    }

    pub fn date(mut self, name: &'static str, value: fn(&T) -> Option<DateTime<Utc>>) -> Self {
        self.descriptor.dimensions.push(Dimension {
            name,
            kind: DimensionKind::Date(value),
        });
        self
    }

    pub fn lifecycle_gate(mut self, gate: LifecycleGate) -> Self {
        self.descriptor.lifecycle_gate = Some(gate);
        self
    }

    pub fn sort_by(mut self, order: fn(&T, &T) -> Ordering) -> Self {
        self.descriptor.sort = Some(order);
        self
    }

    pub fn server_side_search(mut self) -> Self {
        self.descriptor.server_side_search = true;
        self
    }

    pub fn status_change(mut self) -> Self {
        self.descriptor.status_change = true;
        self
    }

    pub fn build(self) -> ResourceDescriptor<T> {
        self.descriptor
    }
}
