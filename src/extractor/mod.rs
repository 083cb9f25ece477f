pub mod null;
pub mod types;
pub mod youtube;

pub use null::NullExtractor;
pub use types::{ExtractError, ExtractedMetadata, ExtractionRequest, Result, Tag};
pub use youtube::YoutubeExtractor;

use std::sync::Arc;

use crate::dtext::DText;
use crate::scrape::PageFetcher;
use crate::source_url::SourceUrl;

/// Metadata operations every site extractor answers.
///
/// "Not found" is never an error: missing data comes back as `None` or an empty
/// list. The only error is a failed page fetch. Implementations fetch at most
/// once per instance no matter how many operations are called.
pub trait Extractor {
    /// Name of the site this extractor handles, for logging and output
    fn site_name(&self) -> &'static str;

    fn request(&self) -> &ExtractionRequest;

    /// Canonical page for the content, when one can be derived.
    fn page_url(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Direct URLs to the content's images, in display order.
    fn image_urls(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// The single most canonical profile URL.
    fn profile_url(&self) -> Result<Option<String>> {
        Ok(self.profile_urls()?.into_iter().next())
    }

    /// Every known profile URL for the creator, without duplicates.
    fn profile_urls(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn display_name(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn username(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        Ok(Vec::new())
    }

    fn artist_commentary_title(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Commentary in the site's own serialization.
    fn artist_commentary_desc(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn dtext_artist_commentary_desc(&self) -> Result<DText> {
        Ok(DText::default())
    }

    /// Run every operation and collect the results.
    fn metadata(&self) -> Result<ExtractedMetadata> {
        let request = self.request();
        let metadata = ExtractedMetadata {
            site: self.site_name().to_string(),
            url: request.url().to_string(),
            referer: request.referer().map(str::to_string),
            page_url: self.page_url()?,
            image_urls: self.image_urls()?,
            profile_url: self.profile_url()?,
            profile_urls: self.profile_urls()?,
            display_name: self.display_name()?,
            username: self.username()?,
            tags: self.tags()?,
            artist_commentary_title: self.artist_commentary_title()?,
            artist_commentary_desc: self.artist_commentary_desc()?,
            dtext_artist_commentary_desc: self.dtext_artist_commentary_desc()?,
        };

        log::info!(
            "extractor={} url={} fields=[{}]",
            metadata.site,
            metadata.url,
            metadata.describe_fields()
        );

        Ok(metadata)
    }
}

/// Returns the first value any candidate produces, trying them in order.
///
/// Candidates after the first hit are never called, so a candidate that needs
/// a page fetch only triggers it when the cheaper ones came up empty.
pub fn first_present<T>(candidates: &[&dyn Fn() -> Result<Option<T>>]) -> Result<Option<T>> {
    for candidate in candidates {
        if let Some(value) = candidate()? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Builds the extractor for one site.
pub trait ExtractorFactory: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this site's extractor understands `url`
    fn handles(&self, url: &SourceUrl) -> bool;

    fn build(&self, request: ExtractionRequest, fetcher: Arc<dyn PageFetcher>) -> Box<dyn Extractor>;
}

/// Collection of all available site extractors
pub struct ExtractorRegistry {
    fetcher: Arc<dyn PageFetcher>,
    factories: Vec<Box<dyn ExtractorFactory>>,
}

impl ExtractorRegistry {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        let mut registry = Self {
            fetcher,
            factories: Vec::new(),
        };

        registry.register(Box::new(youtube::YoutubeFactory));

        registry
    }

    /// Factories are consulted in registration order.
    pub fn register(&mut self, factory: Box<dyn ExtractorFactory>) {
        self.factories.push(factory);
    }

    fn factory_for(&self, url: Option<&SourceUrl>) -> Option<&dyn ExtractorFactory> {
        let url = url?;
        self.factories
            .iter()
            .find(|factory| factory.handles(url))
            .map(|factory| &**factory)
    }

    /// Pick the extractor for `url`.
    ///
    /// The subject URL decides first. When no site claims it (an image on a
    /// shared host, say) the referer gets a turn. Anything left over goes to
    /// the [`NullExtractor`].
    pub fn find(&self, url: &str, referer: Option<&str>) -> Box<dyn Extractor> {
        let request = ExtractionRequest::new(url, referer);

        let factory = self
            .factory_for(request.parsed_url())
            .or_else(|| self.factory_for(request.parsed_referer()));

        match factory {
            Some(factory) => {
                log::debug!("extractor={} url={url}", factory.name());
                factory.build(request, Arc::clone(&self.fetcher))
            }
            None => {
                log::debug!("extractor=null url={url}");
                Box::new(NullExtractor::new(request))
            }
        }
    }

    /// Shorthand for `find(url, referer).metadata()`.
    pub fn extract(&self, url: &str, referer: Option<&str>) -> Result<ExtractedMetadata> {
        self.find(url, referer).metadata()
    }
}
