//! instapost adapters crate
//!
//! This crate contains the provider adapters implementing the domain ports:
//! - `ayrshare`: Ayrshare social posting API
//! - `buffer`: Buffer profiles and updates, rate limited
//! - `graph`: Instagram Graph API two-phase publishing
//! - `late`: Late.io posts API
//! - `zapier`: Zapier catch-hook webhook

mod credentials;
mod http;

pub mod ayrshare;
pub mod buffer;
pub mod graph;
pub mod late;
pub mod zapier;

pub use ayrshare::AyrsharePublisher;
pub use buffer::BufferPublisher;
pub use credentials::Credential;
pub use graph::GraphPublisher;
pub use http::{MEDIA_CHECK_TIMEOUT, REQUEST_TIMEOUT};
pub use late::LatePublisher;
pub use zapier::WebhookPublisher;
