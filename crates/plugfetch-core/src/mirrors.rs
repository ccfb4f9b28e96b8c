//! Mirror list: resolves an app id into the ordered source URLs to try.
//!
//! Order is a preference ranking; callers try candidates strictly in order and
//! stop at the first success. New templates are appended, never reordered.

use url::Url;

use crate::jobs::AppId;

/// Placeholder replaced by the app id in every template.
pub const ID_PLACEHOLDER: &str = "{id}";

/// One resolved source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorCandidate {
    /// Position in the mirror list (0 = most preferred).
    pub index: usize,
    pub url: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("mirror template {index} has no {{id}} placeholder: {template}")]
    MissingPlaceholder { index: usize, template: String },
    #[error("mirror template {index} does not resolve to a valid URL: {source}")]
    InvalidUrl {
        index: usize,
        #[source]
        source: url::ParseError,
    },
}

/// Validated list of mirror templates.
#[derive(Debug, Clone)]
pub struct MirrorList {
    templates: Vec<String>,
}

impl MirrorList {
    /// Validate templates up front so `resolve` is infallible.
    pub fn from_templates(templates: &[String]) -> Result<Self, MirrorError> {
        for (index, template) in templates.iter().enumerate() {
            if !template.contains(ID_PLACEHOLDER) {
                return Err(MirrorError::MissingPlaceholder {
                    index,
                    template: template.clone(),
                });
            }
            Url::parse(&template.replace(ID_PLACEHOLDER, "1"))
                .map_err(|source| MirrorError::InvalidUrl { index, source })?;
        }
        Ok(MirrorList {
            templates: templates.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Candidates for `id`, in preference order.
    pub fn resolve(&self, id: AppId) -> Vec<MirrorCandidate> {
        let id = id.to_string();
        self.templates
            .iter()
            .enumerate()
            .filter_map(|(index, template)| {
                // Templates were validated with a numeric id; digits cannot break a URL.
                Url::parse(&template.replace(ID_PLACEHOLDER, &id))
                    .ok()
                    .map(|url| MirrorCandidate { index, url })
            })
            .collect()
    }
}
