//! Custom middleware implementations for the API.
//!
//! CORS headers, request IDs with request logging, and Prometheus request metrics.

pub mod cors;
pub mod metrics;
pub mod request_id;

pub use cors::*;
pub use metrics::*;
pub use request_id::*;
