//! Latest released version lookup against the container image registry

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use semver::Version;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Placeholder reported when no release could be determined.
pub const LATEST_TAG: &str = "latest";

static COERCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])")
        .expect("version pattern is valid")
});

#[derive(Error, Debug)]
pub enum VersionCheckError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Registry request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Registry responded with status {status}")]
    Status { status: u16 },

    #[error("No release tag found in registry response")]
    NoRelease,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    results: Vec<Option<Tag>>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: Option<String>,
}

/// Extract the first `major[.minor[.patch]]` run from a tag, filling missing parts with 0.
///
/// `v1.2` becomes `1.2.0`, `release-7` becomes `7.0.0`, and a tag without digits
/// yields `None`.
pub fn coerce(tag: &str) -> Option<Version> {
    let captures = COERCE_RE.captures(tag)?;
    let part = |index: usize| -> Option<u64> {
        match captures.get(index) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(Version::new(part(2)?, part(3)?, part(4)?))
}

/// Highest coercible version among `tags`, ignoring the moving `latest` tag.
pub fn latest_version_from_tags<'a, I>(tags: I) -> Option<Version>
where
    I: IntoIterator<Item = &'a str>,
{
    tags.into_iter()
        .filter(|tag| *tag != LATEST_TAG)
        .filter_map(coerce)
        .max()
}

/// Client for the public tag listing of the release image.
pub struct VersionRegistryClient {
    client: Client,
    tags_url: String,
}

impl VersionRegistryClient {
    pub fn new(tags_url: impl Into<String>) -> Result<Self, VersionCheckError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| VersionCheckError::Client(e.to_string()))?;

        Ok(Self {
            client,
            tags_url: tags_url.into(),
        })
    }

    /// Names of every tag the registry lists. Entries without a name are skipped.
    pub async fn fetch_tag_names(&self) -> Result<Vec<String>, VersionCheckError> {
        debug!("Fetching release tags from {}", self.tags_url);

        let response = self.client.get(&self.tags_url).send().await?;
        if !response.status().is_success() {
            return Err(VersionCheckError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: TagsResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .flatten()
            .filter_map(|tag| tag.name)
            .collect())
    }

    /// Highest released version, formatted as `major.minor.patch`.
    pub async fn latest_version(&self) -> Result<String, VersionCheckError> {
        let names = self.fetch_tag_names().await?;
        latest_version_from_tags(names.iter().map(String::as_str))
            .map(|version| version.to_string())
            .ok_or(VersionCheckError::NoRelease)
    }
}
