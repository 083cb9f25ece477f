use serde::Serialize;

use crate::dtext::DText;
use crate::scrape::FetchError;
use crate::source_url::SourceUrl;

/// Errors surfaced by extractor operations.
///
/// Missing or malformed upstream data is never an error; only a failed page
/// fetch is, since the caller can retry it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub url: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The subject URL and the page it was linked from. Created once per extraction.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    url: String,
    referer: Option<String>,
    parsed_url: Option<SourceUrl>,
    parsed_referer: Option<SourceUrl>,
}

impl ExtractionRequest {
    pub fn new(url: &str, referer: Option<&str>) -> Self {
        let referer = referer
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Self {
            url: url.to_string(),
            parsed_url: SourceUrl::parse(url),
            parsed_referer: referer.as_deref().and_then(SourceUrl::parse),
            referer,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }

    pub fn parsed_url(&self) -> Option<&SourceUrl> {
        self.parsed_url.as_ref()
    }

    pub fn parsed_referer(&self) -> Option<&SourceUrl> {
        self.parsed_referer.as_ref()
    }

    /// First non-blank value of `field`, asking the subject URL before the referer.
    pub fn url_field(&self, field: fn(&SourceUrl) -> Option<&str>) -> Option<String> {
        self.parsed_url()
            .and_then(field)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                self.parsed_referer()
                    .and_then(field)
                    .filter(|v| !v.trim().is_empty())
            })
            .map(str::to_string)
    }
}

/// Everything an extractor knows about one URL, gathered in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedMetadata {
    pub site: String,
    pub url: String,
    pub referer: Option<String>,
    pub page_url: Option<String>,
    pub image_urls: Vec<String>,
    pub profile_url: Option<String>,
    pub profile_urls: Vec<String>,
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub tags: Vec<Tag>,
    pub artist_commentary_title: Option<String>,
    pub artist_commentary_desc: Option<String>,
    pub dtext_artist_commentary_desc: DText,
}

impl ExtractedMetadata {
    /// Returns true if any field beyond the request itself is present
    pub fn has_any_data(&self) -> bool {
        !self.image_urls.is_empty()
            || !self.profile_urls.is_empty()
            || self.display_name.is_some()
            || self.username.is_some()
            || !self.tags.is_empty()
            || self.artist_commentary_title.is_some()
            || self.artist_commentary_desc.is_some()
    }

    /// Describe which fields are present (for logging)
    pub fn describe_fields(&self) -> String {
        let mut fields = Vec::new();
        if !self.image_urls.is_empty() { fields.push("image_urls"); }
        if !self.profile_urls.is_empty() { fields.push("profile_urls"); }
        if self.display_name.is_some() { fields.push("display_name"); }
        if self.username.is_some() { fields.push("username"); }
        if !self.tags.is_empty() { fields.push("tags"); }
        if self.artist_commentary_title.is_some() { fields.push("commentary_title"); }
        if self.artist_commentary_desc.is_some() { fields.push("commentary_desc"); }
        fields.join(",")
    }
}
