//! Shop accounts and the closed set of console roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::resource::{Resource, ResourceDescriptor, ResourceFamily, ResourceId};
use crate::services::status::Status;

/// Persisted `StatusID` of an enabled account.
pub const STATUS_ACTIVE: i64 = 1;
/// Persisted `StatusID` of a disabled account.
pub const STATUS_INACTIVE: i64 = 2;

/// Roles known to the console. Anything else resolves to no role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleId {
    Admin,
    Seller,
    Customer,
}

impl RoleId {
    /// Map an upstream `RoleID`; unknown ids yield `None`.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Admin),
            2 => Some(Self::Seller),
            3 => Some(Self::Customer),
            _ => None,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Admin => 1,
            Self::Seller => 2,
            Self::Customer => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "UserID")]
    pub user_id: ResourceId,
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "FullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "RoleID")]
    pub role_id: i64,
    #[serde(rename = "TierID", default)]
    pub tier_id: Option<i64>,
    #[serde(rename = "StatusID")]
    pub status_id: i64,
    #[serde(rename = "CreatedAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create/edit form for an account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AccountDraft {
    #[serde(rename = "UserName")]
    #[validate(length(min = 3, max = 50, message = "User name must be 3-50 characters"))]
    pub user_name: String,
    #[serde(rename = "Email")]
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[serde(rename = "FullName", default)]
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    #[serde(rename = "RoleID")]
    #[validate(range(min = 1, max = 3, message = "Unknown role"))]
    pub role_id: i64,
    #[serde(rename = "TierID", default)]
    #[validate(range(min = 1))]
    pub tier_id: Option<i64>,
}

impl Resource for Account {
    type Draft = AccountDraft;

    const FAMILY: ResourceFamily = ResourceFamily::Accounts;

    fn id(&self) -> ResourceId {
        self.user_id
    }

    fn descriptor() -> ResourceDescriptor<Self> {
        ResourceDescriptor::<Self>::builder(Self::FAMILY)
            .search_field(|a| a.user_name.as_str())
            .search_field(|a| a.email.as_str())
            .discrete("role", |a| Some(a.role_id))
            .discrete("tier", |a| a.tier_id)
            .server_side_search()
            .status_change()
            .build()
    }

    fn from_draft(id: ResourceId, draft: &AccountDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: id,
            user_name: draft.user_name.clone(),
            email: draft.email.clone(),
            full_name: draft.full_name.clone(),
            role_id: draft.role_id,
            tier_id: draft.tier_id,
            status_id: STATUS_ACTIVE,
            created_at: Some(created_at),
        }
    }

    fn apply_draft(&mut self, draft: &AccountDraft) {
        self.user_name = draft.user_name.clone();
        self.email = draft.email.clone();
        self.full_name = draft.full_name.clone();
        self.role_id = draft.role_id;
        self.tier_id = draft.tier_id;
    }

    fn persisted_status(&self) -> Option<Status> {
        match self.status_id {
            STATUS_ACTIVE => Some(Status::Active),
            STATUS_INACTIVE => Some(Status::Inactive),
            _ => None,
        }
    }

    fn set_persisted_status(&mut self, value: i64) -> bool {
        if matches!(value, STATUS_ACTIVE | STATUS_INACTIVE) {
            self.status_id = value;
            true
        } else {
            false
        }
    }
}
