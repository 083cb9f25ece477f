use serde_json::json;

use super::fixtures::{
    extractor, image, link_run, post, post_page, post_url, text_run, MockFetcher, CHANNEL_ID,
    HANDLE, POST_ID,
};
use crate::extractor::{ExtractError, Extractor, Tag};
use crate::scrape::FetchError;

fn multi_image_page() -> String {
    post_page(post(json!({
        "contentText": {"runs": [
            text_run("New pictures!\r\nMore soon "),
            link_run("#fanart", "/hashtag/fanart"),
        ]},
        "backstageAttachment": {"postMultiImageRenderer": {"images": [
            image("https://yt3.ggpht.com/FIRST=s288-c-fcrop64=1,00000000ffffffff-nd-v1"),
            image("https://yt3.ggpht.com/SECOND=s288-nd-v1"),
            {"backstageImageRenderer": {"image": {"thumbnails": []}}},
            image("https://example.com/third.jpg"),
        ]}}
    })))
}

#[test]
fn test_unrecognized_urls_are_empty_and_never_fetch() {
    for url in [
        "https://www.youtube.com/feed/trending",
        "https://example.com/post/Ugkx123",
        "not a url",
    ] {
        let fetcher = MockFetcher::page(multi_image_page());
        let youtube = extractor(url, None, &fetcher);

        assert_eq!(youtube.page_url().unwrap(), None, "{url}");
        assert!(youtube.image_urls().unwrap().is_empty(), "{url}");
        assert!(youtube.profile_urls().unwrap().is_empty(), "{url}");
        assert_eq!(youtube.profile_url().unwrap(), None, "{url}");
        assert_eq!(youtube.display_name().unwrap(), None, "{url}");
        assert_eq!(youtube.username().unwrap(), None, "{url}");
        assert!(youtube.tags().unwrap().is_empty(), "{url}");
        assert_eq!(youtube.artist_commentary_title().unwrap(), None, "{url}");
        assert_eq!(youtube.artist_commentary_desc().unwrap(), None, "{url}");
        assert!(youtube.dtext_artist_commentary_desc().unwrap().is_empty(), "{url}");
        assert_eq!(fetcher.calls(), 0, "{url}");
    }
}

#[test]
fn test_post_page_is_fetched_once() {
    let fetcher = MockFetcher::page(multi_image_page());
    let youtube = extractor(&post_url(), None, &fetcher);

    for _ in 0..2 {
        youtube.image_urls().unwrap();
        youtube.profile_url().unwrap();
        youtube.profile_urls().unwrap();
        youtube.display_name().unwrap();
        youtube.username().unwrap();
        youtube.tags().unwrap();
        youtube.artist_commentary_desc().unwrap();
        youtube.dtext_artist_commentary_desc().unwrap();
    }
    youtube.metadata().unwrap();

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(fetcher.requested(), vec![post_url()]);
}

#[test]
fn test_community_tab_url_fetches_canonical_post_page() {
    let fetcher = MockFetcher::page(multi_image_page());
    let url = format!("https://www.youtube.com/channel/{CHANNEL_ID}/community?lb={POST_ID}");
    let youtube = extractor(&url, None, &fetcher);

    assert_eq!(youtube.page_url().unwrap(), Some(post_url()));
    assert_eq!(youtube.image_urls().unwrap().len(), 3);
    assert_eq!(fetcher.requested(), vec![post_url()]);
}

#[test]
fn test_direct_image_url_is_returned_as_is() {
    let fetcher = MockFetcher::page(multi_image_page());
    let url = "https://lh5.ggpht.com/-abc/AAAA/BBBB/s1600/cover.jpg";
    let youtube = extractor(url, None, &fetcher);

    assert_eq!(youtube.image_urls().unwrap(), vec![url.to_string()]);
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn test_sized_image_url_is_upgraded_to_full_size() {
    let fetcher = MockFetcher::page(multi_image_page());
    let youtube = extractor(
        "https://yt3.ggpht.com/ABCdef=s900-c-k-c0x00ffffff-no-rj",
        Some(&post_url()),
        &fetcher,
    );

    assert_eq!(
        youtube.image_urls().unwrap(),
        vec!["https://yt3.googleusercontent.com/ABCdef=d".to_string()]
    );
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn test_multi_image_post_keeps_attachment_order() {
    let fetcher = MockFetcher::page(multi_image_page());
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(
        youtube.image_urls().unwrap(),
        vec![
            "https://yt3.googleusercontent.com/FIRST=d".to_string(),
            "https://yt3.googleusercontent.com/SECOND=d".to_string(),
            "https://example.com/third.jpg".to_string(),
        ]
    );
}

#[test]
fn test_single_image_post() {
    let page = post_page(post(json!({
        "backstageAttachment": image("https://yt3.ggpht.com/ONLY=s640-nd-v1")
    })));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(
        youtube.image_urls().unwrap(),
        vec!["https://yt3.googleusercontent.com/ONLY=d".to_string()]
    );
}

#[test]
fn test_post_without_attachment_has_no_images() {
    let page = post_page(post(json!({"contentText": {"runs": [text_run("text only")]}})));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert!(youtube.image_urls().unwrap().is_empty());
}

#[test]
fn test_profile_from_post_author() {
    let fetcher = MockFetcher::page(multi_image_page());
    let youtube = extractor(&post_url(), None, &fetcher);

    let handle_url = format!("https://www.youtube.com/@{HANDLE}");
    let channel_url = format!("https://www.youtube.com/channel/{CHANNEL_ID}");

    assert_eq!(youtube.profile_url().unwrap(), Some(handle_url.clone()));
    assert_eq!(youtube.profile_urls().unwrap(), vec![handle_url, channel_url]);
    assert_eq!(youtube.display_name().unwrap().as_deref(), Some("미래소망"));
    assert_eq!(youtube.username().unwrap().as_deref(), Some(HANDLE));
}

#[test]
fn test_profile_prefers_url_fields_over_post_author() {
    let fetcher = MockFetcher::page(multi_image_page());
    let url = format!("https://www.youtube.com/@OtherName/post/{POST_ID}");
    let youtube = extractor(&url, None, &fetcher);

    assert_eq!(youtube.username().unwrap().as_deref(), Some("OtherName"));
    assert_eq!(
        youtube.profile_urls().unwrap(),
        vec![
            "https://www.youtube.com/@OtherName".to_string(),
            format!("https://www.youtube.com/channel/{CHANNEL_ID}"),
        ]
    );
}

#[test]
fn test_profile_urls_omit_missing_ids() {
    let page = post_page(json!({
        "authorText": {"runs": [{"text": "someone"}]},
        "authorEndpoint": {"browseEndpoint": {"browseId": CHANNEL_ID, "canonicalBaseUrl": ""}}
    }));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(youtube.profile_url().unwrap(), None);
    assert_eq!(youtube.username().unwrap(), None);
    assert_eq!(
        youtube.profile_urls().unwrap(),
        vec![format!("https://www.youtube.com/channel/{CHANNEL_ID}")]
    );
}

#[test]
fn test_legacy_canonical_base_url_is_not_a_handle() {
    let page = post_page(json!({
        "authorEndpoint": {"browseEndpoint": {"browseId": CHANNEL_ID, "canonicalBaseUrl": "/channel/UCxyz"}}
    }));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(youtube.username().unwrap(), None);
    assert_eq!(youtube.profile_urls().unwrap().len(), 1);
}

#[test]
fn test_escaped_handle_is_decoded() {
    let page = post_page(json!({
        "authorEndpoint": {"browseEndpoint": {"canonicalBaseUrl": "/@%EB%AF%B8%EB%9E%98"}}
    }));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(youtube.username().unwrap().as_deref(), Some("미래"));
}

#[test]
fn test_hashtag_runs_become_tags() {
    let page = post_page(post(json!({"contentText": {"runs": [
        text_run("drawing "),
        link_run("#foo", "/hashtag/foo"),
        text_run(" "),
        link_run("#%EA%B7%B8%EB%A6%BC", "/hashtag/%EA%B7%B8%EB%A6%BC"),
        link_run("@someone", "/@someone"),
        link_run("shop", "https://www.youtube.com/redirect?q=https%3A%2F%2Fexample.com"),
    ]}})));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(
        youtube.tags().unwrap(),
        vec![
            Tag::new("foo", "https://www.youtube.com/hashtag/foo"),
            Tag::new("그림", "https://www.youtube.com/hashtag/그림"),
        ]
    );
}

#[test]
fn test_plain_runs_render_as_spans() {
    let page = post_page(post(json!({"contentText": {"runs": [
        text_run("first line\r\nsecond line"),
        text_run(" & <more>"),
    ]}})));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(
        youtube.html_artist_commentary_desc().unwrap(),
        "<span>first line<br>second line</span><span> &amp; &lt;more&gt;</span>"
    );
    assert_eq!(
        youtube.dtext_artist_commentary_desc().unwrap().as_str(),
        "first line\nsecond line & <more>"
    );
}

#[test]
fn test_link_runs_render_as_links() {
    let page = post_page(post(json!({"contentText": {"runs": [
        link_run("#foo", "/hashtag/foo"),
        text_run(" buy at "),
        link_run(
            "https://example.com/shop",
            "https://www.youtube.com/redirect?event=backstage&q=https%3A%2F%2Fexample.com%2Fshop"
        ),
    ]}})));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(
        youtube.html_artist_commentary_desc().unwrap(),
        concat!(
            r#"<a href="https://www.youtube.com/hashtag/foo">#foo</a>"#,
            "<span> buy at </span>",
            r#"<a href="https://example.com/shop">https://example.com/shop</a>"#,
        )
    );
    assert_eq!(
        youtube.dtext_artist_commentary_desc().unwrap().as_str(),
        r##""#foo":[https://www.youtube.com/hashtag/foo] buy at <https://example.com/shop>"##
    );
}

#[test]
fn test_raw_commentary_is_content_text_json() {
    let page = post_page(post(json!({"contentText": {"runs": [text_run("hello")]}})));
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    let raw = youtube.artist_commentary_desc().unwrap().unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded, json!({"runs": [{"text": "hello"}]}));
    assert_eq!(youtube.artist_commentary_title().unwrap(), None);
}

#[test]
fn test_missing_marker_degrades_to_empty() {
    let page = super::fixtures::page_with_script(r#"var somethingElse = {"contents": {}};"#);
    let fetcher = MockFetcher::page(page);
    let youtube = extractor(&post_url(), None, &fetcher);

    assert!(youtube.image_urls().unwrap().is_empty());
    assert!(youtube.tags().unwrap().is_empty());
    assert!(youtube.profile_urls().unwrap().is_empty());
    assert_eq!(youtube.artist_commentary_desc().unwrap(), None);
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn test_undecodable_initial_data_degrades_to_empty() {
    for script in [
        "var ytInitialData = {not json at all};",
        "var ytInitialData = null;",
        r#"var ytInitialData = {"contents": []};"#,
    ] {
        let fetcher = MockFetcher::page(super::fixtures::page_with_script(script));
        let youtube = extractor(&post_url(), None, &fetcher);

        assert!(youtube.image_urls().unwrap().is_empty(), "{script}");
        assert_eq!(youtube.display_name().unwrap(), None, "{script}");
        assert!(youtube.dtext_artist_commentary_desc().unwrap().is_empty(), "{script}");
    }
}

#[test]
fn test_transport_failure_propagates() {
    let error = FetchError::Retryable("www.youtube.com/post/x: status 503".to_string());
    let fetcher = MockFetcher::failing(error.clone());
    let youtube = extractor(&post_url(), None, &fetcher);

    assert_eq!(youtube.display_name(), Err(ExtractError::Fetch(error.clone())));
    assert_eq!(youtube.tags(), Err(ExtractError::Fetch(error)));
    assert!(youtube.metadata().is_err());

    // the failure is remembered, not retried
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn test_transport_failure_does_not_affect_url_only_fields() {
    let fetcher = MockFetcher::failing(FetchError::Terminal("404".to_string()));
    let url = format!("https://www.youtube.com/@{HANDLE}/post/{POST_ID}");
    let youtube = extractor(&url, None, &fetcher);

    assert_eq!(youtube.page_url().unwrap(), Some(post_url()));
    assert_eq!(
        youtube.profile_url().unwrap(),
        Some(format!("https://www.youtube.com/@{HANDLE}"))
    );
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn test_referer_supplies_post_for_google_image() {
    let fetcher = MockFetcher::page(multi_image_page());
    let youtube = extractor(
        "https://lh3.googleusercontent.com/abcDEF123=w544-h544-l90-rj",
        Some(&post_url()),
        &fetcher,
    );

    assert_eq!(
        youtube.image_urls().unwrap(),
        vec!["https://lh3.googleusercontent.com/abcDEF123=d".to_string()]
    );
    assert_eq!(youtube.page_url().unwrap(), Some(post_url()));
    assert_eq!(youtube.username().unwrap().as_deref(), Some(HANDLE));
    assert_eq!(fetcher.requested(), vec![post_url()]);
}
