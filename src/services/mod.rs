//! Audit services, leaf-first: rate limiting and signing, the API client,
//! pagination, reduction, inspection, validation, reporting and the pipeline.

pub mod client;
pub mod inspector;
pub mod pagination;
pub mod pipeline;
pub mod rate_limiter;
pub mod reducer;
pub mod report;
pub mod signing;
pub mod validator;
