//! Wine categories (red, white, sparkling, …).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::resource::{Resource, ResourceDescriptor, ResourceFamily, ResourceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "CategoryID")]
    pub category_id: ResourceId,
    #[serde(rename = "CategoryName")]
    pub category_name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryDraft {
    #[serde(rename = "CategoryName")]
    #[validate(length(min = 1, max = 80, message = "Category name is required"))]
    pub category_name: String,
    #[serde(rename = "Description", default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl Resource for Category {
    type Draft = CategoryDraft;

    const FAMILY: ResourceFamily = ResourceFamily::Categories;

    fn id(&self) -> ResourceId {
        self.category_id
    }

    fn descriptor() -> ResourceDescriptor<Self> {
        ResourceDescriptor::<Self>::builder(Self::FAMILY)
            .search_field(|c| c.category_name.as_str())
            .sort_by(|a, b| a.category_name.cmp(&b.category_name))
            .build()
    }

    fn from_draft(id: ResourceId, draft: &CategoryDraft, _created_at: DateTime<Utc>) -> Self {
        Self {
            category_id: id,
            category_name: draft.category_name.clone(),
            description: draft.description.clone(),
        }
    }

    fn apply_draft(&mut self, draft: &CategoryDraft) {
        self.category_name = draft.category_name.clone();
        self.description = draft.description.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_have_no_status() {
        let category = Category::from_draft(
            1,
            &CategoryDraft {
                category_name: "Sparkling".to_string(),
                description: None,
            },
            Utc::now(),
        );
        assert_eq!(category.status(Utc::now()), None);
        assert!(Category::descriptor().lifecycle_gate.is_none());
    }

    #[test]
    fn empty_name_is_invalid() {
        let draft = CategoryDraft {
            category_name: String::new(),
            description: None,
        };
        assert!(draft.validate().is_err());
    }
}
