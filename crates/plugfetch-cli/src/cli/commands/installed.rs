//! `plugfetch installed <id>`

use anyhow::{anyhow, Result};
use plugfetch_core::service::Service;

pub fn run_installed(svc: &Service, id: &str) -> Result<()> {
    let reply = svc.has_installed_asset(id);
    match reply.exists {
        Some(true) => println!("{}: installed", id.trim()),
        Some(false) => println!("{}: not installed", id.trim()),
        None => return Err(anyhow!(reply.error.unwrap_or_default())),
    }
    Ok(())
}
