//! Catalogue products with stock levels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::resource::{Resource, ResourceDescriptor, ResourceFamily, ResourceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryProduct {
    #[serde(rename = "ProductID")]
    pub product_id: ResourceId,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "CategoryID")]
    pub category_id: i64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Stock")]
    pub stock: i64,
    #[serde(rename = "Vintage", default)]
    pub vintage: Option<i32>,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InventoryProductDraft {
    #[serde(rename = "ProductName")]
    #[validate(length(min = 1, max = 150, message = "Product name is required"))]
    pub product_name: String,
    #[serde(rename = "CategoryID")]
    #[validate(range(min = 1, message = "A category must be selected"))]
    pub category_id: i64,
    #[serde(rename = "Price")]
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[serde(rename = "Stock")]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,
    #[serde(rename = "Vintage", default)]
    #[validate(range(min = 1800, max = 2100))]
    pub vintage: Option<i32>,
}

impl Resource for InventoryProduct {
    type Draft = InventoryProductDraft;

    const FAMILY: ResourceFamily = ResourceFamily::Inventory;

    fn id(&self) -> ResourceId {
        self.product_id
    }

    fn descriptor() -> ResourceDescriptor<Self> {
        ResourceDescriptor::<Self>::builder(Self::FAMILY)
            .search_field(|p| p.product_name.as_str())
            .discrete("category", |p| Some(p.category_id))
            .numeric("price", |p| Some(p.price))
            .numeric("stock", |p| Some(p.stock as f64))
            .date("created", |p| Some(p.created_at))
            .sort_by(|a, b| a.product_name.cmp(&b.product_name))
            .build()
    }

    fn from_draft(id: ResourceId, draft: &InventoryProductDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            product_id: id,
            product_name: draft.product_name.clone(),
            category_id: draft.category_id,
            price: draft.price,
            stock: draft.stock,
            vintage: draft.vintage,
            created_at,
        }
    }

    fn apply_draft(&mut self, draft: &InventoryProductDraft) {
        self.product_name = draft.product_name.clone();
        self.category_id = draft.category_id;
        self.price = draft.price;
        self.stock = draft.stock;
        self.vintage = draft.vintage;
    }
}
