//! List-management pipeline shared by every admin page.

pub mod filter;
pub mod list_controller;
pub mod mutation;
pub mod permissions;
pub mod resource;
pub mod status;
