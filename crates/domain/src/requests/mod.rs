//! Provider request types and their validation
//!
//! Each provider takes its own argument set. `validate` turns the raw
//! arguments into a checked post ready for the request builder, or a
//! [`ValidationError`](crate::ports::ValidationError) before any network call.

mod ayrshare;
mod buffer;
mod graph;
mod late;
mod webhook;

pub use ayrshare::{AyrsharePost, AyrshareRequest};
pub use buffer::{BufferPost, BufferRequest};
pub use graph::{GRAPH_MAX_SCHEDULE_DAYS, GraphPost, GraphPostType, GraphRequest};
pub use late::{LATE_MAX_SCHEDULE_DAYS, LatePost, LatePostType, LateRequest};
pub use webhook::{WebhookPost, WebhookRequest};
