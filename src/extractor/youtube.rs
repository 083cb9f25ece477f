//! YouTube community posts.
//!
//! Single image: https://www.youtube.com/post/UgkxWevNfezmf-a7CRIO0haWiaDSjTI8mGsf
//! Multiple images: https://www.youtube.com/post/UgkxBkJE1Eu_6S9sADZF5IuK5MPRSWf4VVz3
//!
//! Everything is read from the `ytInitialData` blob embedded in the post page.

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::{first_present, Extractor, ExtractorFactory, ExtractionRequest, Result, Tag};
use crate::dtext::DText;
use crate::json::{empty_object, present, Dig};
use crate::scrape::{FetchError, PageFetcher};
use crate::source_url::{Site, SourceUrl, YOUTUBE_ORIGIN};
use crate::text::{escape_html, normalize_line_endings, normalize_whitespace, unescape_url};

const POST_CACHE_DURATION: Duration = Duration::from_secs(60);
const INITIAL_DATA_MARKER: &str = "ytInitialData";
const HASHTAG_PREFIX: &str = "/hashtag/";
const REDIRECT_PREFIX: &str = "https://www.youtube.com/redirect";

const COMMUNITY_POST_PATH: &str = concat!(
    "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer",
    "/contents/0/itemSectionRenderer/contents/0/backstagePostThreadRenderer/post/backstagePostRenderer"
);
const RUN_URL_PATH: &str = "/navigationEndpoint/commandMetadata/webCommandMetadata/url";

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{.*\}").expect("Failed to compile JSON object regex"));

pub struct YoutubeFactory;

impl ExtractorFactory for YoutubeFactory {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn handles(&self, url: &SourceUrl) -> bool {
        url.site() == Site::Youtube
    }

    fn build(&self, request: ExtractionRequest, fetcher: Arc<dyn PageFetcher>) -> Box<dyn Extractor> {
        Box::new(YoutubeExtractor::new(request, fetcher))
    }
}

pub struct YoutubeExtractor {
    request: ExtractionRequest,
    fetcher: Arc<dyn PageFetcher>,
    page: OnceCell<std::result::Result<Option<Html>, FetchError>>,
    initial_data: OnceCell<Value>,
    community_post: OnceCell<Value>,
}

impl YoutubeExtractor {
    pub fn new(request: ExtractionRequest, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            request,
            fetcher,
            page: OnceCell::new(),
            initial_data: OnceCell::new(),
            community_post: OnceCell::new(),
        }
    }

    pub fn community_post_id(&self) -> Option<String> {
        // The subject may be a Google image URL (album covers on lh*.googleusercontent.com),
        // in which case only the referer knows the post.
        self.request.url_field(SourceUrl::post_id)
    }

    fn post_url(&self) -> Option<String> {
        self.community_post_id()
            .map(|post_id| format!("{YOUTUBE_ORIGIN}/post/{post_id}"))
    }

    /// The post page, fetched on first use. A failed fetch is remembered too.
    fn page(&self) -> Result<Option<&Html>> {
        let page = self.page.get_or_init(|| {
            let Some(post_url) = self.post_url() else {
                return Ok(None);
            };

            log::debug!("fetching community post {post_url}");
            self.fetcher
                .parsed_get(&post_url, POST_CACHE_DURATION)
                .map(Some)
        });

        match page {
            Ok(page) => Ok(page.as_ref()),
            Err(err) => Err(err.clone().into()),
        }
    }

    fn initial_data(&self) -> Result<&Value> {
        self.initial_data.get_or_try_init(|| {
            Ok(match self.page()? {
                Some(page) => parse_initial_data(page),
                None => empty_object(),
            })
        })
    }

    pub fn community_post(&self) -> Result<&Value> {
        self.community_post
            .get_or_try_init(|| Ok(self.initial_data()?.dig_object(COMMUNITY_POST_PATH)))
    }

    fn channel_id(&self) -> Result<Option<String>> {
        first_present(&[
            &|| Ok(self.request.url_field(SourceUrl::channel_id)),
            &|| {
                let post = self.community_post()?;
                Ok(present(post.dig_str("/authorEndpoint/browseEndpoint/browseId")).map(str::to_string))
            },
        ])
    }

    fn handle(&self) -> Result<Option<String>> {
        first_present(&[
            &|| Ok(self.request.url_field(SourceUrl::handle)),
            &|| {
                // "/@Mirae_Somang" -> "Mirae_Somang"
                let post = self.community_post()?;
                Ok(post
                    .dig_str("/authorEndpoint/browseEndpoint/canonicalBaseUrl")
                    .and_then(|path| path.strip_prefix("/@"))
                    .map(|handle| unescape_url(handle).into_owned())
                    .filter(|handle| !handle.trim().is_empty()))
            },
        ])
    }

    fn channel_url(&self) -> Result<Option<String>> {
        Ok(self
            .channel_id()?
            .map(|channel_id| format!("{YOUTUBE_ORIGIN}/channel/{channel_id}")))
    }

    fn handle_url(&self) -> Result<Option<String>> {
        Ok(self
            .handle()?
            .map(|handle| format!("{YOUTUBE_ORIGIN}/@{handle}")))
    }

    fn content_runs(&self) -> Result<&[Value]> {
        Ok(self.community_post()?.dig_array("/contentText/runs"))
    }

    /// The post text as HTML, one element per text run.
    pub fn html_artist_commentary_desc(&self) -> Result<String> {
        Ok(self.content_runs()?.iter().map(render_run).collect())
    }
}

fn parse_initial_data(page: &Html) -> Value {
    let Ok(selector) = Selector::parse("script") else {
        return empty_object();
    };

    let Some(script) = page
        .select(&selector)
        .map(|script| script.text().collect::<String>())
        .find(|text| text.contains(INITIAL_DATA_MARKER))
    else {
        log::debug!("no script containing {INITIAL_DATA_MARKER}");
        return empty_object();
    };

    let Some(json) = JSON_OBJECT.find(&script) else {
        log::debug!("{INITIAL_DATA_MARKER} script has no JSON object");
        return empty_object();
    };

    match serde_json::from_str::<Value>(json.as_str()) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => empty_object(),
        Err(err) => {
            log::debug!("failed to decode {INITIAL_DATA_MARKER}: {err}");
            empty_object()
        }
    }
}

fn render_run(run: &Value) -> String {
    let text = escape_html(run.dig_str("/text").unwrap_or_default());
    let text = normalize_whitespace(&normalize_line_endings(&text)).replace('\n', "<br>");

    match run.dig_str(RUN_URL_PATH) {
        Some(url) if url.starts_with('/') => {
            let url = unescape_url(url);
            format!(r#"<a href="{YOUTUBE_ORIGIN}{}">{text}</a>"#, escape_html(&url))
        }
        // The redirect target isn't recoverable from the run, but the visible text is the destination.
        Some(url) if url.starts_with(REDIRECT_PREFIX) => {
            format!(r#"<a href="{text}">{text}</a>"#)
        }
        _ => format!("<span>{text}</span>"),
    }
}

impl Extractor for YoutubeExtractor {
    fn site_name(&self) -> &'static str {
        "youtube"
    }

    fn request(&self) -> &ExtractionRequest {
        &self.request
    }

    fn page_url(&self) -> Result<Option<String>> {
        Ok(self.post_url().or_else(|| {
            self.request
                .parsed_url()
                .and_then(SourceUrl::page_url)
                .or_else(|| self.request.parsed_referer().and_then(SourceUrl::page_url))
        }))
    }

    fn image_urls(&self) -> Result<Vec<String>> {
        let parsed_url = self.request.parsed_url();

        if let Some(full_image_url) = parsed_url.and_then(SourceUrl::full_image_url) {
            return Ok(vec![full_image_url]);
        }

        if parsed_url.is_some_and(SourceUrl::is_image_url) {
            return Ok(vec![self.request.url().to_string()]);
        }

        if self.community_post_id().is_none() {
            return Ok(Vec::new());
        }

        // A post with multiple images has "postMultiImageRenderer"; a post with a single image doesn't.
        let post = self.community_post()?;
        let attachments: Vec<&Value> =
            match post.dig("/backstageAttachment/postMultiImageRenderer/images") {
                Some(Value::Array(images)) => images.iter().collect(),
                _ => post.dig("/backstageAttachment").into_iter().collect(),
            };

        Ok(attachments
            .into_iter()
            .filter_map(|attachment| {
                attachment.dig_str("/backstageImageRenderer/image/thumbnails/0/url")
            })
            .map(|url| {
                SourceUrl::parse(url)
                    .and_then(|parsed| parsed.full_image_url())
                    .unwrap_or_else(|| url.to_string())
            })
            .collect())
    }

    fn profile_url(&self) -> Result<Option<String>> {
        self.handle_url()
    }

    fn profile_urls(&self) -> Result<Vec<String>> {
        let mut urls: Vec<String> = Vec::new();
        for url in [self.handle_url()?, self.channel_url()?].into_iter().flatten() {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        Ok(urls)
    }

    fn display_name(&self) -> Result<Option<String>> {
        Ok(present(self.community_post()?.dig_str("/authorText/runs/0/text")).map(str::to_string))
    }

    fn username(&self) -> Result<Option<String>> {
        self.handle()
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        Ok(self
            .content_runs()?
            .iter()
            .filter_map(|run| {
                let url = unescape_url(run.dig_str(RUN_URL_PATH)?);
                let name = url.strip_prefix(HASHTAG_PREFIX)?;
                Some(Tag::new(name, format!("{YOUTUBE_ORIGIN}{url}")))
            })
            .collect())
    }

    fn artist_commentary_title(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn artist_commentary_desc(&self) -> Result<Option<String>> {
        Ok(self
            .community_post()?
            .dig("/contentText")
            .map(Value::to_string))
    }

    fn dtext_artist_commentary_desc(&self) -> Result<DText> {
        Ok(DText::from_html(
            &self.html_artist_commentary_desc()?,
            YOUTUBE_ORIGIN,
        ))
    }
}
