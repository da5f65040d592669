//! Admin resources and the DTOs shared by every list view.

pub mod account;
pub mod category;
pub mod discount;
pub mod inventory;
pub mod pagination;
