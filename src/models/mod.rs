//! Data models for the weather history service.
//!
//! This module contains the provider response shape, the persisted record and
//! archive shapes, and the request/response models of the HTTP and collector
//! surfaces.

pub mod api;
pub mod record;
pub mod weather;

pub use api::*;
pub use record::*;
pub use weather::*;
