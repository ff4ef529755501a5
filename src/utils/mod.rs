//! Utility functions and helper modules.
//!
//! Request inspection helpers for logging and metrics, and the canonical
//! timestamp format shared by the stores and the history endpoint.

pub mod http;
pub mod route;
pub mod time;

pub use http::*;
pub use route::*;
pub use time::*;
