//! HTTP request handlers for API endpoints.
//!
//! This module contains the handlers behind every route plus the app factory
//! that wires them together.

pub mod health;
pub mod history;
pub mod metrics;
pub mod openapi;
pub mod version;

pub use health::*;
pub use history::*;
pub use metrics::*;
pub use openapi::*;
pub use version::*;
