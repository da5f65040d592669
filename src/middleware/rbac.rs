//! Role-based access control: the caller's role and the capability table.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::models::account::RoleId;
use crate::services::permissions::{Capabilities, PermissionSource};
use crate::services::resource::ResourceFamily;
use crate::AppState;

/// Header carrying the numeric role of the signed-in user.
pub const ROLE_HEADER: &str = "X-Role-Id";

/// Role of the caller, `None` when the header is missing or not a known role.
///
/// Never rejects: an unidentified caller simply gets no capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentRole(pub Option<RoleId>);

impl FromRequestParts<AppState> for CurrentRole {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(RoleId::from_id);
        Ok(CurrentRole(role))
    }
}

/// Capability table of the shop admin.
///
/// Admins manage everything. Sellers maintain the catalogue and discounts
/// but never delete, and never touch accounts. Customers manage nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl PermissionSource for RolePolicy {
    fn permissions_for(&self, family: ResourceFamily, role: RoleId) -> Option<Capabilities> {
        match (role, family) {
            (RoleId::Admin, _) => Some(Capabilities::ALL),
            (RoleId::Seller, ResourceFamily::Accounts) => None,
            (RoleId::Seller, _) => Some(Capabilities {
                can_create: true,
                can_edit: true,
                can_delete: false,
            }),
            (RoleId::Customer, _) => None,
        }
    }
}
