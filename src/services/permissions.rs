//! Permission gate: role → capability set for one resource family.

use serde::Serialize;

use crate::errors::{ConsoleError, MutationKind};
use crate::models::account::RoleId;
use crate::services::resource::ResourceFamily;

/// What the current user may do on a list page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        can_create: false,
        can_edit: false,
        can_delete: false,
    };

    pub const ALL: Self = Self {
        can_create: true,
        can_edit: true,
        can_delete: true,
    };

    pub fn allows(&self, action: MutationKind) -> bool {
        match action {
            MutationKind::Create => self.can_create,
            MutationKind::Update | MutationKind::ChangeStatus => self.can_edit,
            MutationKind::Delete => self.can_delete,
        }
    }

    /// Reject `action` unless allowed.
    pub fn require(&self, action: MutationKind, family: ResourceFamily) -> Result<(), ConsoleError> {
        if self.allows(action) {
            Ok(())
        } else {
            Err(ConsoleError::Forbidden(format!(
                "Your role cannot {action} this {}",
                family.noun()
            )))
        }
    }
}

/// External authorization module answering role lookups.
pub trait PermissionSource: Send + Sync {
    /// `None` when the source has no mapping for this pair.
    fn permissions_for(&self, family: ResourceFamily, role: RoleId) -> Option<Capabilities>;
}

/// Resolve capabilities, failing closed for missing roles and mappings.
pub fn capabilities_for(
    source: &dyn PermissionSource,
    family: ResourceFamily,
    role: Option<RoleId>,
) -> Capabilities {
    role.and_then(|role| source.permissions_for(family, role))
        .unwrap_or(Capabilities::NONE)
}
