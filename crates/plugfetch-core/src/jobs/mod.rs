//! Job state store: per-app acquisition status shared between the background
//! pipeline and pollers.
//!
//! Records live for the lifetime of the process and are overwritten by the
//! next acquisition request for the same id.

pub mod progress;
pub mod store;
pub mod types;

pub use progress::ProgressStats;
pub use store::{InFlightGuard, JobStore};
pub use types::*;
