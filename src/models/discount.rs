//! Time-boxed discounts: shop-wide events, per-product discounts and
//! order-value discounts. All three share the window lifecycle gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::services::resource::{
    LifecycleGate, Resource, ResourceDescriptor, ResourceFamily, ResourceId,
};
use crate::services::status::TimeWindow;

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ValidationError> {
    if start > end {
        let mut err = ValidationError::new("time_window");
        err.message = Some("TimeStart must not be after TimeEnd".into());
        return Err(err);
    }
    Ok(())
}

fn window_of(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<TimeWindow> {
    // An inverted stored window has no status; the gate rejects edit and delete.
    TimeWindow::new(start, end).ok()
}

// -- Discount events --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountEvent {
    #[serde(rename = "EventID")]
    pub event_id: ResourceId,
    #[serde(rename = "EventName")]
    pub event_name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "DiscountValue")]
    pub discount_value: f64,
    #[serde(rename = "TimeStart")]
    pub time_start: DateTime<Utc>,
    #[serde(rename = "TimeEnd")]
    pub time_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_event_window"))]
pub struct DiscountEventDraft {
    #[serde(rename = "EventName")]
    #[validate(length(min = 1, max = 100, message = "Event name is required"))]
    pub event_name: String,
    #[serde(rename = "Description", default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(rename = "DiscountValue")]
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount_value: f64,
    #[serde(rename = "TimeStart")]
    pub time_start: DateTime<Utc>,
    #[serde(rename = "TimeEnd")]
    pub time_end: DateTime<Utc>,
}

fn validate_event_window(draft: &DiscountEventDraft) -> Result<(), ValidationError> {
    check_window(draft.time_start, draft.time_end)
}

impl Resource for DiscountEvent {
    type Draft = DiscountEventDraft;

    const FAMILY: ResourceFamily = ResourceFamily::DiscountEvents;

    fn id(&self) -> ResourceId {
        self.event_id
    }

    fn descriptor() -> ResourceDescriptor<Self> {
        ResourceDescriptor::<Self>::builder(Self::FAMILY)
            .search_field(|e| e.event_name.as_str())
            .numeric("discount", |e| Some(e.discount_value))
            .date("start", |e| Some(e.time_start))
            .lifecycle_gate(LifecycleGate::TIME_WINDOW)
            .sort_by(|a, b| b.time_start.cmp(&a.time_start))
            .build()
    }

    fn from_draft(id: ResourceId, draft: &DiscountEventDraft, _created_at: DateTime<Utc>) -> Self {
        Self {
            event_id: id,
            event_name: draft.event_name.clone(),
            description: draft.description.clone(),
            discount_value: draft.discount_value,
            time_start: draft.time_start,
            time_end: draft.time_end,
        }
    }

    fn apply_draft(&mut self, draft: &DiscountEventDraft) {
        self.event_name = draft.event_name.clone();
        self.description = draft.description.clone();
        self.discount_value = draft.discount_value;
        self.time_start = draft.time_start;
        self.time_end = draft.time_end;
    }

    fn time_window(&self) -> Option<TimeWindow> {
        window_of(self.time_start, self.time_end)
    }
}

// -- Discount products --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountProduct {
    #[serde(rename = "DiscountProductID")]
    pub discount_product_id: ResourceId,
    #[serde(rename = "ProductID")]
    pub product_id: i64,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "DiscountValue")]
    pub discount_value: f64,
    #[serde(rename = "TimeStart")]
    pub time_start: DateTime<Utc>,
    #[serde(rename = "TimeEnd")]
    pub time_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_product_window"))]
pub struct DiscountProductDraft {
    #[serde(rename = "ProductID")]
    #[validate(range(min = 1, message = "A product must be selected"))]
    pub product_id: i64,
    #[serde(rename = "ProductName")]
    #[validate(length(min = 1, max = 150))]
    pub product_name: String,
    #[serde(rename = "DiscountValue")]
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount_value: f64,
    #[serde(rename = "TimeStart")]
    pub time_start: DateTime<Utc>,
    #[serde(rename = "TimeEnd")]
    pub time_end: DateTime<Utc>,
}

fn validate_product_window(draft: &DiscountProductDraft) -> Result<(), ValidationError> {
    check_window(draft.time_start, draft.time_end)
}

impl Resource for DiscountProduct {
    type Draft = DiscountProductDraft;

    const FAMILY: ResourceFamily = ResourceFamily::DiscountProducts;

    fn id(&self) -> ResourceId {
        self.discount_product_id
    }

    fn descriptor() -> ResourceDescriptor<Self> {
        ResourceDescriptor::<Self>::builder(Self::FAMILY)
            .search_field(|d| d.product_name.as_str())
            .discrete("product", |d| Some(d.product_id))
            .numeric("discount", |d| Some(d.discount_value))
            .lifecycle_gate(LifecycleGate::TIME_WINDOW)
            .sort_by(|a, b| b.time_start.cmp(&a.time_start))
            .build()
    }

    fn from_draft(id: ResourceId, draft: &DiscountProductDraft, _created_at: DateTime<Utc>) -> Self {
        Self {
            discount_product_id: id,
            product_id: draft.product_id,
            product_name: draft.product_name.clone(),
            discount_value: draft.discount_value,
            time_start: draft.time_start,
            time_end: draft.time_end,
        }
    }

    fn apply_draft(&mut self, draft: &DiscountProductDraft) {
        self.product_id = draft.product_id;
        self.product_name = draft.product_name.clone();
        self.discount_value = draft.discount_value;
        self.time_start = draft.time_start;
        self.time_end = draft.time_end;
    }

    fn time_window(&self) -> Option<TimeWindow> {
        window_of(self.time_start, self.time_end)
    }
}

// -- Discount orders --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountOrder {
    #[serde(rename = "DiscountOrderID")]
    pub discount_order_id: ResourceId,
    #[serde(rename = "DiscountName")]
    pub discount_name: String,
    #[serde(rename = "MinimumOrderValue")]
    pub minimum_order_value: f64,
    #[serde(rename = "DiscountValue")]
    pub discount_value: f64,
    #[serde(rename = "TimeStart")]
    pub time_start: DateTime<Utc>,
    #[serde(rename = "TimeEnd")]
    pub time_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_order_window"))]
pub struct DiscountOrderDraft {
    #[serde(rename = "DiscountName")]
    #[validate(length(min = 1, max = 100, message = "Discount name is required"))]
    pub discount_name: String,
    #[serde(rename = "MinimumOrderValue")]
    #[validate(range(min = 0.0, message = "Minimum order value cannot be negative"))]
    pub minimum_order_value: f64,
    #[serde(rename = "DiscountValue")]
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount_value: f64,
    #[serde(rename = "TimeStart")]
    pub time_start: DateTime<Utc>,
    #[serde(rename = "TimeEnd")]
    pub time_end: DateTime<Utc>,
}

fn validate_order_window(draft: &DiscountOrderDraft) -> Result<(), ValidationError> {
    check_window(draft.time_start, draft.time_end)
}

impl Resource for DiscountOrder {
    type Draft = DiscountOrderDraft;

    const FAMILY: ResourceFamily = ResourceFamily::DiscountOrders;

    fn id(&self) -> ResourceId {
        self.discount_order_id
    }

    fn descriptor() -> ResourceDescriptor<Self> {
        ResourceDescriptor::<Self>::builder(Self::FAMILY)
            .search_field(|o| o.discount_name.as_str())
            .numeric("discount", |o| Some(o.discount_value))
            .numeric("minimum", |o| Some(o.minimum_order_value))
            .lifecycle_gate(LifecycleGate::TIME_WINDOW)
            .sort_by(|a, b| b.time_start.cmp(&a.time_start))
            .build()
    }

    fn from_draft(id: ResourceId, draft: &DiscountOrderDraft, _created_at: DateTime<Utc>) -> Self {
        Self {
            discount_order_id: id,
            discount_name: draft.discount_name.clone(),
            minimum_order_value: draft.minimum_order_value,
            discount_value: draft.discount_value,
            time_start: draft.time_start,
            time_end: draft.time_end,
        }
    }

    fn apply_draft(&mut self, draft: &DiscountOrderDraft) {
        self.discount_name = draft.discount_name.clone();
        self.minimum_order_value = draft.minimum_order_value;
        self.discount_value = draft.discount_value;
        self.time_start = draft.time_start;
        self.time_end = draft.time_end;
    }

    fn time_window(&self) -> Option<TimeWindow> {
        window_of(self.time_start, self.time_end)
    }
}
