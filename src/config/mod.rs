//! Configuration structures and loading utilities.
//!
//! Everything here is read from the environment once at startup and then
//! passed by value into the components that need it.

pub mod app;
pub mod cors;
pub mod metrics;

pub use app::*;
pub use cors::*;
pub use metrics::*;
