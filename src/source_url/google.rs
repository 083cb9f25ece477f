use url::Url;

/// An image on one of Google's generic image hosts (`lh3.googleusercontent.com`,
/// `lh5.ggpht.com`, ...). These serve more than YouTube, so they get their own type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleUrl {
    host: String,
    /// Image path with any `=w1200-h800` style size suffix removed
    path: String,
    has_size_suffix: bool,
}

pub fn matches(url: &Url) -> bool {
    let host = url.host_str().unwrap_or_default();
    (host.ends_with(".googleusercontent.com") || host.ends_with(".ggpht.com"))
        && !host.starts_with("yt3.")
}

impl GoogleUrl {
    pub fn parse(url: &Url) -> Option<Self> {
        if !matches(url) {
            return None;
        }

        let raw_path = url.path().trim_start_matches('/');
        let (path, has_size_suffix) = match raw_path.split_once('=') {
            Some((path, _size)) => (path, true),
            None => (raw_path, false),
        };

        Some(Self {
            host: url.host_str()?.to_string(),
            path: path.to_string(),
            has_size_suffix,
        })
    }

    pub fn is_image_url(&self) -> bool {
        !self.path.is_empty()
    }

    /// Original size version. Only `=size` style URLs can be rewritten this way.
    pub fn full_image_url(&self) -> Option<String> {
        if self.has_size_suffix && !self.path.is_empty() {
            Some(format!("https://{}/{}=d", self.host, self.path))
        } else {
            None
        }
    }
}
