//! `plugfetch augment <id>` – add missing DLC lines to the shared config document.

use anyhow::{bail, Result};
use plugfetch_core::service::Service;

pub async fn run_augment(svc: &Service, id: &str) -> Result<()> {
    let reply = svc.augment_config(id).await;
    if !reply.success {
        bail!("{}", reply.error.unwrap_or_default());
    }
    println!("{}", reply.message.unwrap_or_default());
    println!(
        "config: {}",
        svc.install_layout().shared_config_path().display()
    );
    Ok(())
}
