//! Pass-through lookups against the catalog extension API.
//!
//! Replies are handed back as raw JSON text; nothing here interprets them.

use url::Url;

use crate::http::{FetchError, HttpClient};
use crate::jobs::AppId;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Endpoints served under the catalog base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    App,
    AppPrice,
    AchievementGroups,
}

impl Lookup {
    fn endpoint(self) -> &'static str {
        match self {
            Lookup::App => "ExtensionApp/",
            Lookup::AppPrice => "ExtensionAppPrice/",
            Lookup::AchievementGroups => "ExtensionGetAchievements/",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: HttpClient,
    base: String,
}

impl CatalogClient {
    /// `base` is the API root, e.g. `https://extension.steamdb.info/api/`.
    pub fn new(client: HttpClient, base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        CatalogClient { client, base }
    }

    /// Full request URL for `lookup` on `id`. `currency` only applies to prices.
    pub fn url(&self, lookup: Lookup, id: AppId, currency: Option<&str>) -> Result<Url, CatalogError> {
        let base = Url::parse(&self.base)?.join(lookup.endpoint())?;
        let id = id.to_string();
        let mut params = vec![("appid", id.as_str())];
        if lookup == Lookup::AppPrice {
            params.push(("currency", currency.unwrap_or("USD")));
        }
        Ok(Url::parse_with_params(base.as_str(), &params)?)
    }

    /// Blocking GET; returns the response body.
    pub fn fetch(&self, lookup: Lookup, id: AppId, currency: Option<&str>) -> Result<String, CatalogError> {
        let url = self.url(lookup, id, currency)?;
        tracing::debug!(appid = %id, ?lookup, "catalog lookup {}", url);
        Ok(self.client.get_text(url.as_str())?)
    }
}
