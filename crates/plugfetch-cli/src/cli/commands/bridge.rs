//! `plugfetch bridge` – line-delimited JSON requests on stdin, replies on stdout.
//!
//! Request: `{"method": "StartAcquisition", "id": 70, "currency": "EUR"}`; `id` may be
//! a number or a string. One compact JSON reply is written per request line.

use anyhow::Result;
use plugfetch_core::service::{Reply, Service};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, Deserialize)]
struct BridgeRequest {
    method: String,
    #[serde(default)]
    id: Value,
    #[serde(default)]
    currency: Option<String>,
}

/// Identifier text as the service expects it; anything else is left for it to reject.
/// Identifier text from the request. Whole-valued floats (`70.0`) count as integers;
/// anything else numeric is passed through and rejected by the id parser.
fn raw_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(v), _) => v.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => {
                (f as u64).to_string()
            }
            _ => n.to_string(),
        },
        _ => String::new(),
    }
}

async fn handle_line(svc: &Service, line: &str) -> Value {
    let req: BridgeRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => return Reply::err(format!("invalid request: {}", e)).to_value(),
    };
    let id = raw_id(&req.id);
    tracing::debug!(method = %req.method, id = %id, "bridge request");
    match req.method.as_str() {
        "StartAcquisition" => svc.start_acquisition(&id).to_value(),
        "GetAcquisitionStatus" => svc.acquisition_status(&id).to_value(),
        "HasInstalledAsset" => svc.has_installed_asset(&id).to_value(),
        "AugmentConfig" => svc.augment_config(&id).await.to_value(),
        "GetApp" => svc.app_info(&id).await,
        "GetAppPrice" => svc.app_price(&id, req.currency.as_deref()).await,
        "GetAchievementsGroups" => svc.achievement_groups(&id).await,
        other => Reply::err(format!("unknown method: {}", other)).to_value(),
    }
}

pub async fn run_bridge(svc: &Service) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    tracing::info!("bridge ready");
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_line(svc, &line).await;
        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }
    tracing::info!("bridge stdin closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugfetch_core::config::PlugfetchConfig;

    fn service(root: &std::path::Path) -> Service {
        let cfg = PlugfetchConfig {
            install_root: Some(root.to_path_buf()),
            staging_dir: Some(root.join("staging")),
            mirrors: vec![],
            ..PlugfetchConfig::default()
        };
        Service::open(&cfg).unwrap()
    }

    #[test]
    fn raw_id_accepts_numbers_and_strings() {
        assert_eq!(raw_id(&serde_json::json!(70)), "70");
        assert_eq!(raw_id(&serde_json::json!("70")), "70");
        assert_eq!(raw_id(&Value::Null), "");
    }

    #[test]
    fn raw_id_accepts_whole_floats() {
        assert_eq!(raw_id(&serde_json::json!(70.0)), "70");
        assert_eq!(raw_id(&serde_json::json!(70.5)), "70.5");
        assert_eq!(raw_id(&serde_json::json!(-5)), "-5");
    }

    #[tokio::test]
    async fn float_id_reaches_the_service() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let reply = handle_line(&svc, r#"{"method":"GetAcquisitionStatus","id":70.0}"#).await;
        assert_eq!(reply["success"], true, "{reply}");
        assert_eq!(reply["state"]["status"], "unknown");
        let reply = handle_line(&svc, r#"{"method":"HasInstalledAsset","id":70.5}"#).await;
        assert_eq!(reply["error"], "Invalid appid");
    }

    #[tokio::test]
    async fn status_of_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let reply = handle_line(&svc, r#"{"method":"GetAcquisitionStatus","id":70}"#).await;
        assert_eq!(reply["success"], true);
        assert_eq!(reply["state"]["status"], "unknown");
    }

    #[tokio::test]
    async fn invalid_id_and_method() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let reply = handle_line(&svc, r#"{"method":"HasInstalledAsset","id":"x"}"#).await;
        assert_eq!(reply, serde_json::json!({"success": false, "error": "Invalid appid"}));
        let reply = handle_line(&svc, r#"{"method":"Reboot","id":1}"#).await;
        assert_eq!(reply["error"], "unknown method: Reboot");
        let reply = handle_line(&svc, "not json").await;
        assert_eq!(reply["success"], false);
    }

    #[tokio::test]
    async fn installed_asset_reply() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let reply = handle_line(&svc, r#"{"method":"HasInstalledAsset","id":70}"#).await;
        assert_eq!(reply, serde_json::json!({"success": true, "exists": false}));
    }
}
