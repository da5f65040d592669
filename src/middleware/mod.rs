//! Request extractors and the role policy.

pub mod rbac;
