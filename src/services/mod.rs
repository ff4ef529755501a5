//! Business logic and service layer modules.
//!
//! The weather source client and record mapper feed the collector; the history
//! service answers queries against the table store.

pub mod collector;
pub mod history;
pub mod mapper;
pub mod metrics;
pub mod scheduler;
pub mod weather;

pub use collector::*;
pub use history::*;
pub use mapper::*;
pub use metrics::*;
pub use scheduler::*;
pub use weather::*;
