//! API records and report rows.

pub mod analysis;
pub mod configuration;
pub mod finding;
pub mod pagination;
