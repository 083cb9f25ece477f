//! Typed views over source URLs.
//!
//! [`SourceUrl::parse`] classifies a raw URL string by site. Every accessor is
//! optional: asking a Google image URL for a post id simply yields `None`, so
//! callers can query subject and referer URLs the same way without caring which
//! site they belong to.

mod google;
mod normalize;
mod youtube;

pub use google::GoogleUrl;
pub use normalize::normalize;
pub use youtube::{YoutubeImage, YoutubeUrl, SITE_ORIGIN as YOUTUBE_ORIGIN};

use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Youtube,
    Google,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Youtube(YoutubeUrl),
    Google(GoogleUrl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    original: String,
    url: Url,
    kind: Kind,
}

impl SourceUrl {
    /// Returns `None` for malformed URLs and for sites nothing here recognizes.
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = normalize(url)?;

        let kind = if youtube::matches(&parsed) {
            Kind::Youtube(YoutubeUrl::parse(&parsed)?)
        } else if google::matches(&parsed) {
            Kind::Google(GoogleUrl::parse(&parsed)?)
        } else {
            return None;
        };

        Some(Self {
            original: url.to_string(),
            url: parsed,
            kind,
        })
    }

    pub fn site(&self) -> Site {
        match self.kind {
            Kind::Youtube(_) => Site::Youtube,
            Kind::Google(_) => Site::Google,
        }
    }

    /// The URL exactly as it was given.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn normalized(&self) -> &Url {
        &self.url
    }

    fn youtube(&self) -> Option<&YoutubeUrl> {
        match &self.kind {
            Kind::Youtube(youtube) => Some(youtube),
            Kind::Google(_) => None,
        }
    }

    pub fn post_id(&self) -> Option<&str> {
        self.youtube()?.post_id.as_deref()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.youtube()?.channel_id.as_deref()
    }

    pub fn handle(&self) -> Option<&str> {
        self.youtube()?.handle.as_deref()
    }

    pub fn video_id(&self) -> Option<&str> {
        self.youtube()?.video_id.as_deref()
    }

    pub fn full_image_url(&self) -> Option<String> {
        match &self.kind {
            Kind::Youtube(youtube) => youtube.full_image_url(),
            Kind::Google(google) => google.full_image_url(),
        }
    }

    pub fn is_image_url(&self) -> bool {
        match &self.kind {
            Kind::Youtube(youtube) => youtube.is_image_url(),
            Kind::Google(google) => google.is_image_url(),
        }
    }

    pub fn page_url(&self) -> Option<String> {
        self.youtube()?.page_url()
    }

    pub fn profile_url(&self) -> Option<String> {
        self.youtube()?.profile_url()
    }
}

impl std::fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.original)
    }
}
