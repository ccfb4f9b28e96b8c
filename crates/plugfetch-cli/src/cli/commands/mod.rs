//! CLI command handlers, one file per command.

mod app;
mod augment;
mod bridge;
mod checksum;
mod fetch;
mod installed;

pub use app::run_app;
pub use augment::run_augment;
pub use bridge::run_bridge;
pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use installed::run_installed;
