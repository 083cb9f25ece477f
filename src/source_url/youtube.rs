use url::Url;

use crate::text::unescape_url;

pub const SITE_ORIGIN: &str = "https://www.youtube.com";

/// The parts of a YouTube URL the extractors care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YoutubeUrl {
    pub post_id: Option<String>,
    pub channel_id: Option<String>,
    /// `@handle` without the `@`
    pub handle: Option<String>,
    /// Legacy `/c/<name>` or `/user/<name>` channel name
    pub legacy_name: Option<String>,
    pub video_id: Option<String>,
    pub image: Option<YoutubeImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeImage {
    /// Channel art, avatars and community post images on yt3.
    /// Holds the image path with the size suffix removed.
    Channel(String),
    /// Video thumbnail on i.ytimg.com
    Thumbnail { video_id: String },
}

fn is_youtube_host(host: &str) -> bool {
    matches!(
        host,
        "youtube.com" | "www.youtube.com" | "m.youtube.com" | "music.youtube.com"
    )
}

fn is_channel_image_host(host: &str) -> bool {
    matches!(host, "yt3.ggpht.com" | "yt3.googleusercontent.com")
}

fn is_thumbnail_host(host: &str) -> bool {
    host == "i.ytimg.com" || (host.starts_with('i') && host.ends_with(".ytimg.com"))
}

pub fn matches(url: &Url) -> bool {
    let host = url.host_str().unwrap_or_default();
    is_youtube_host(host) || host == "youtu.be" || is_channel_image_host(host) || is_thumbnail_host(host)
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Strips the `=s900-c-k-nd` style size suffix from an image path.
fn strip_size_suffix(path: &str) -> &str {
    path.split('=').next().unwrap_or(path)
}

impl YoutubeUrl {
    pub fn parse(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let mut parsed = Self::default();

        if is_channel_image_host(host) {
            let path = strip_size_suffix(url.path().trim_start_matches('/'));
            if !path.is_empty() {
                parsed.image = Some(YoutubeImage::Channel(path.to_string()));
            }
            return Some(parsed);
        }

        if is_thumbnail_host(host) {
            // https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg
            // https://i.ytimg.com/vi_webp/dQw4w9WgXcQ/maxresdefault.webp
            if let [kind, video_id, _file, ..] = segments.as_slice() {
                if kind.starts_with("vi") {
                    parsed.video_id = Some(video_id.to_string());
                    parsed.image = Some(YoutubeImage::Thumbnail {
                        video_id: video_id.to_string(),
                    });
                }
            }
            return Some(parsed);
        }

        if host == "youtu.be" {
            // https://youtu.be/dQw4w9WgXcQ
            parsed.video_id = segments.first().map(|id| id.to_string());
            return Some(parsed);
        }

        if !is_youtube_host(host) {
            return None;
        }

        match segments.as_slice() {
            // https://www.youtube.com/post/UgkxWevNfezmf-a7CRIO0haWiaDSjTI8mGsf
            ["post", post_id, ..] => {
                parsed.post_id = Some(post_id.to_string());
            }
            // https://www.youtube.com/channel/UCykMWf8B8I7c9BIYyYzp5JQ/community?lb=UgkxWevNfezmf-a7CRIO0haWiaDSjTI8mGsf
            ["channel", channel_id, rest @ ..] => {
                parsed.channel_id = Some(channel_id.to_string());
                parsed.post_id = Self::post_id_from_rest(url, rest);
            }
            // https://www.youtube.com/@Mirae_Somang/community?lb=UgkxWevNfezmf-a7CRIO0haWiaDSjTI8mGsf
            // https://www.youtube.com/@Mirae_Somang/post/UgkxWevNfezmf-a7CRIO0haWiaDSjTI8mGsf
            [handle, rest @ ..] if handle.starts_with('@') => {
                let handle = unescape_url(&handle[1..]).into_owned();
                parsed.handle = Some(handle).filter(|h| !h.is_empty());
                parsed.post_id = Self::post_id_from_rest(url, rest);
            }
            // https://www.youtube.com/c/ByeonghoonKim
            // https://www.youtube.com/user/ByeonghoonKim
            ["c" | "user", name, ..] => {
                parsed.legacy_name = Some(unescape_url(name).into_owned());
            }
            // https://www.youtube.com/watch?v=dQw4w9WgXcQ
            ["watch"] => {
                parsed.video_id = query_param(url, "v");
            }
            // https://www.youtube.com/shorts/dQw4w9WgXcQ
            ["shorts" | "live" | "embed", video_id, ..] => {
                parsed.video_id = Some(video_id.to_string());
            }
            _ => {}
        }

        Some(parsed)
    }

    fn post_id_from_rest(url: &Url, rest: &[&str]) -> Option<String> {
        match rest {
            ["post", post_id, ..] => Some(post_id.to_string()),
            ["community", ..] => query_param(url, "lb"),
            _ => None,
        }
    }

    pub fn full_image_url(&self) -> Option<String> {
        match self.image.as_ref()? {
            YoutubeImage::Channel(path) => {
                Some(format!("https://yt3.googleusercontent.com/{path}=d"))
            }
            YoutubeImage::Thumbnail { video_id } => {
                Some(format!("https://i.ytimg.com/vi/{video_id}/maxresdefault.jpg"))
            }
        }
    }

    pub fn is_image_url(&self) -> bool {
        self.image.is_some()
    }

    pub fn profile_url(&self) -> Option<String> {
        if let Some(handle) = &self.handle {
            Some(format!("{SITE_ORIGIN}/@{handle}"))
        } else if let Some(channel_id) = &self.channel_id {
            Some(format!("{SITE_ORIGIN}/channel/{channel_id}"))
        } else {
            self.legacy_name
                .as_ref()
                .map(|name| format!("{SITE_ORIGIN}/c/{name}"))
        }
    }

    pub fn page_url(&self) -> Option<String> {
        if let Some(post_id) = &self.post_id {
            Some(format!("{SITE_ORIGIN}/post/{post_id}"))
        } else {
            self.video_id
                .as_ref()
                .map(|video_id| format!("{SITE_ORIGIN}/watch?v={video_id}"))
        }
    }
}
