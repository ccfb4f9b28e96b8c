//! Shared HTTP settings and small request helpers (libcurl via the `curl` crate).
//!
//! `HttpClient` carries timeouts and default headers; each transfer gets its
//! own `Easy` handle. Everything here blocks: call from `spawn_blocking`.
//!
//! Stalls are detected with curl's low-speed check; the overall timeout is only
//! a backstop for transfers that trickle forever.

mod classify;
mod error;

pub use classify::{classify, classify_curl_error, classify_http_status, SkipReason};
pub use error::FetchError;

use std::time::Duration;

use crate::config::HttpConfig;

/// Headers sent with metadata and catalog lookups.
const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json"),
    ("X-Requested-With", "SteamDB"),
    ("Origin", "https://github.com/BossSloth/Steam-SteamDB-extension"),
];

/// Connection settings shared by every request made by one `Service`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    connect_timeout: Duration,
    idle_timeout: Duration,
    low_speed_limit: u32,
    max_transfer: Duration,
    user_agent: String,
}

impl HttpClient {
    pub fn new(cfg: &HttpConfig) -> Self {
        HttpClient {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.idle_timeout_secs.max(1)),
            low_speed_limit: cfg.low_speed_limit_bytes.max(1),
            max_transfer: Duration::from_secs(cfg.max_transfer_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }

    /// New handle for `url` with redirects, connect/low-speed/overall limits and user agent applied.
    pub(crate) fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.idle_timeout)?;
        // 0 leaves curl without an overall cap.
        easy.timeout(self.max_transfer)?;
        easy.useragent(&self.user_agent)?;
        Ok(easy)
    }

    /// GET `url` with the JSON lookup headers and return the body as text.
    /// Non-2xx statuses are errors.
    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut easy = self.easy(url)?;
        let mut list = curl::easy::List::new();
        for (k, v) in DEFAULT_HEADERS {
            list.append(&format!("{}: {}", k, v))?;
        }
        easy.http_headers(list)?;

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Status(code));
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        HttpClient::new(&HttpConfig::default())
    }
}
