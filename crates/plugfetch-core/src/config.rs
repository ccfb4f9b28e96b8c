use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable consulted when `install_root` is not set in config.toml.
pub const INSTALL_ROOT_ENV: &str = "PLUGFETCH_INSTALL_ROOT";

/// Connection parameters shared by every request (optional `[http]` section).
///
/// A transfer is abandoned when it stays below `low_speed_limit_bytes` per second
/// for `idle_timeout_secs`, or when it runs past `max_transfer_secs` in total.
/// A slow mirror that keeps delivering is never cut off by the idle window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Seconds allowed to establish a connection.
    pub connect_timeout_secs: u64,
    /// Low-speed window in seconds.
    #[serde(alias = "timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Bytes per second below which the idle window runs.
    pub low_speed_limit_bytes: u32,
    /// Hard cap on one request, redirects included.
    pub max_transfer_secs: u64,
    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            idle_timeout_secs: 60,
            low_speed_limit_bytes: 1024,
            max_transfer_secs: 3600,
            user_agent: "https://github.com/BossSloth/Steam-SteamDB-extension".to_string(),
        }
    }
}

/// Names used for the installed files (optional `[layout]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Directory under `<install_root>/config/` holding payloads.
    pub plugin_subdir: String,
    /// Payload extension without the dot.
    pub payload_ext: String,
    /// File name (without extension) of the shared configuration document.
    pub shared_config_name: String,
    /// Directive call prefix commented out in payloads.
    pub directive: String,
    /// Comment marker inserted before the directive.
    pub comment_marker: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            plugin_subdir: "stplug-in".to_string(),
            payload_ext: "lua".to_string(),
            shared_config_name: "Steamtools".to_string(),
            directive: "setManifestid(".to_string(),
            comment_marker: "--".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/plugfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlugfetchConfig {
    /// Root of the host application install (the directory containing `config/`).
    #[serde(default)]
    pub install_root: Option<PathBuf>,
    /// Where archives are staged; defaults to the XDG state dir.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
    /// Mirror URL templates tried in order; `{id}` is replaced by the app id.
    pub mirrors: Vec<String>,
    /// Metadata endpoint template for the config augmenter; `{id}` is replaced.
    pub metadata_url: String,
    /// Base URL of the catalog extension API used by the lookups.
    pub catalog_api_url: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Default mirror order, most reliable first.
pub fn default_mirrors() -> Vec<String> {
    [
        "https://github.com/grom133114454/GameLibrary/archive/refs/heads/{id}.zip",
        "https://api.swa-recloud.fun/api/v3/file/{id}.zip",
        "https://furcate.eu/FILES/{id}.zip",
        "https://raw.githubusercontent.com/sushi-dev55/sushitools-games-repo/refs/heads/main/{id}.zip",
        "https://mellyiscoolaf.pythonanywhere.com/{id}",
        "https://walftech.com/proxy.php?url=https%3A%2F%2Fsteamgames554.s3.us-east-1.amazonaws.com%2F{id}.zip",
        "https://github.com/SteamAutoCracks/ManifestHub/archive/refs/heads/{id}.zip",
        "https://github.com/Fairyvmos/bruh-hub/archive/refs/heads/{id}.zip",
        "https://github.com/hansaes/ManifestAutoUpdate/archive/refs/heads/{id}.zip",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for PlugfetchConfig {
    fn default() -> Self {
        Self {
            install_root: None,
            staging_dir: None,
            mirrors: default_mirrors(),
            metadata_url: "https://store.steampowered.com/api/appdetails?appids={id}".to_string(),
            catalog_api_url: "https://extension.steamdb.info/api/".to_string(),
            http: HttpConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl PlugfetchConfig {
    /// Install root from config, else from `PLUGFETCH_INSTALL_ROOT`.
    pub fn resolve_install_root(&self) -> Option<PathBuf> {
        if let Some(root) = &self.install_root {
            return Some(root.clone());
        }
        std::env::var_os(INSTALL_ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// Staging dir from config, else `~/.local/state/plugfetch/staging`.
    pub fn resolve_staging_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.staging_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("plugfetch")?;
        Ok(xdg_dirs.get_state_home().join("plugfetch").join("staging"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("plugfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PlugfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PlugfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PlugfetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
