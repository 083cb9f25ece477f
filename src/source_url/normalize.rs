use url::Url;

/// Query parameters that only carry tracking or share attribution.
const TRACKING_PARAMS: [&str; 12] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "mc_cid",
    "mc_eid",
    "si",
    "feature",
];

/// Parse and normalize a URL before site classification.
///
/// Applies the following transformations:
/// - Converts protocol-relative URLs to https
/// - Lowercases the hostname (the `url` crate does this while parsing)
/// - Strips known tracking query parameters (utm_*, fbclid, gclid, ref, mc_*, si, feature)
/// - Removes trailing slashes from the path (preserves root `/`)
///
/// Returns `None` for strings that aren't absolute http(s) URLs.
pub fn normalize(url: &str) -> Option<Url> {
    let url = url.trim();
    let url_to_parse = if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    };

    let mut parsed = Url::parse(&url_to_parse).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }

    let filtered_params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed.set_query(None);
    if !filtered_params.is_empty() {
        parsed.query_pairs_mut().extend_pairs(filtered_params);
    }

    // Strip trailing slashes from path (but keep root `/`)
    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    Some(parsed)
}
