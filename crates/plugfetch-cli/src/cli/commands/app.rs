//! `plugfetch app <id>` – catalog lookups, printed as pretty JSON.

use anyhow::{bail, Result};
use plugfetch_core::service::Service;

use crate::cli::AppLookup;

pub async fn run_app(
    svc: &Service,
    id: &str,
    lookup: AppLookup,
    currency: Option<&str>,
) -> Result<()> {
    let value = match lookup {
        AppLookup::Info => svc.app_info(id).await,
        AppLookup::Price => svc.app_price(id, currency).await,
        AppLookup::Achievements => svc.achievement_groups(id).await,
    };
    if value.get("success") == Some(&serde_json::Value::Bool(false)) {
        if let Some(err) = value.get("error").and_then(|e| e.as_str()) {
            bail!("{}", err);
        }
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
