use super::{Extractor, ExtractionRequest, Result};
use crate::source_url;

/// Fallback for URLs no site extractor claims. Never fetches anything.
pub struct NullExtractor {
    request: ExtractionRequest,
}

impl NullExtractor {
    pub fn new(request: ExtractionRequest) -> Self {
        Self { request }
    }
}

impl Extractor for NullExtractor {
    fn site_name(&self) -> &'static str {
        "null"
    }

    fn request(&self) -> &ExtractionRequest {
        &self.request
    }

    /// A bare http(s) URL is assumed to point at the image itself.
    fn image_urls(&self) -> Result<Vec<String>> {
        let url = self.request.url();
        Ok(match source_url::normalize(url) {
            Some(_) => vec![url.to_string()],
            None => Vec::new(),
        })
    }
}
