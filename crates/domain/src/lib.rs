//! instapost domain crate
//!
//! This crate contains the provider-independent core, following hexagonal architecture:
//! - `model`: Result records and provider identities
//! - `ports`: The posting adapter trait, clock and error taxonomy
//! - `requests`: Per-provider request types and their validation
//! - `validate`: Field-level checks shared by the request types
//! - `caption`: Hashtag and mention composition
//! - `normalize`: HTTP status/body classification
//! - `rate_limit`: Token-bucket limiter
//! - `report`: Human-readable result rendering

pub mod caption;
pub mod model;
pub mod normalize;
pub mod ports;
pub mod rate_limit;
pub mod report;
pub mod requests;
pub mod validate;

pub use model::*;
pub use ports::*;
pub use rate_limit::TokenBucket;
pub use requests::*;
