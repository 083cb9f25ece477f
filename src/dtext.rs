//! HTML to DText conversion.
//!
//! DText is the plain-text markup used for artist commentaries: `[b]bold[/b]`,
//! `"link text":[https://example.com]`, `<https://bare.link>`, `h1. Heading` and
//! blank-line separated paragraphs. Only the small subset of HTML that shows up
//! in scraped commentaries is understood; anything else contributes its text.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Element, Html, Node};
use serde::Serialize;
use url::Url;

static SPACE_AROUND_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*\n[ \t]*").expect("Failed to compile newline regex"));
static EXTRA_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Failed to compile newline regex"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DText(String);

impl DText {
    /// Convert an HTML fragment. Relative links are resolved against `base_url`.
    pub fn from_html(html: &str, base_url: &str) -> Self {
        let fragment = Html::parse_fragment(html);
        let converter = Converter {
            base: Url::parse(base_url).ok(),
        };

        let raw = converter.convert(fragment.tree.root());
        let text = SPACE_AROUND_NEWLINE.replace_all(&raw, "\n");
        let text = EXTRA_NEWLINES.replace_all(&text, "\n\n");

        Self(text.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct Converter {
    base: Option<Url>,
}

impl Converter {
    fn convert(&self, node: NodeRef<'_, Node>) -> String {
        match node.value() {
            Node::Document | Node::Fragment => self.convert_children(node),
            Node::Text(text) => WHITESPACE_RUN.replace_all(&**text, " ").into_owned(),
            Node::Element(element) => self.convert_element(node, element),
            _ => String::new(),
        }
    }

    fn convert_children(&self, node: NodeRef<'_, Node>) -> String {
        node.children().map(|child| self.convert(child)).collect()
    }

    fn convert_element(&self, node: NodeRef<'_, Node>, element: &Element) -> String {
        let name = element.name();
        match name {
            "br" => "\n".to_string(),
            "script" | "style" | "template" => String::new(),
            "p" | "div" => block(self.convert_children(node).trim()),
            "b" | "strong" => inline_tag("b", &self.convert_children(node)),
            "i" | "em" => inline_tag("i", &self.convert_children(node)),
            "u" | "ins" => inline_tag("u", &self.convert_children(node)),
            "s" | "del" | "strike" => inline_tag("s", &self.convert_children(node)),
            "code" => inline_tag("code", &self.convert_children(node)),
            "blockquote" => {
                let inner = self.convert_children(node);
                let inner = inner.trim();
                if inner.is_empty() {
                    String::new()
                } else {
                    block(&format!("[quote]\n{inner}\n[/quote]"))
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let inner = self.convert_children(node);
                let inner = inner.trim();
                if inner.is_empty() {
                    String::new()
                } else {
                    block(&format!("{name}. {inner}"))
                }
            }
            "ul" | "ol" => block(self.convert_children(node).trim()),
            "li" => format!("\n* {}", self.convert_children(node).trim()),
            "a" => self.convert_link(node, element),
            "img" => match element.attr("src").and_then(|src| self.resolve(src)) {
                Some(src) => format!("\"[image]\":[{src}]"),
                None => String::new(),
            },
            _ => self.convert_children(node),
        }
    }

    fn convert_link(&self, node: NodeRef<'_, Node>, element: &Element) -> String {
        let inner = self.convert_children(node);
        let text = inner.trim();

        let href = element.attr("href").unwrap_or_default().trim();
        let Some(url) = self.resolve(href) else {
            return text.to_string();
        };

        if text.is_empty() {
            String::new()
        } else if text == url || text == href {
            format!("<{url}>")
        } else {
            format!("\"{text}\":[{url}]")
        }
    }

    fn resolve(&self, href: &str) -> Option<String> {
        if href.is_empty() {
            return None;
        }

        let url = match &self.base {
            Some(base) => base.join(href).ok()?,
            None => Url::parse(href).ok()?,
        };

        matches!(url.scheme(), "http" | "https").then(|| url.to_string())
    }
}

fn block(inner: &str) -> String {
    if inner.is_empty() {
        String::new()
    } else {
        format!("\n\n{inner}\n\n")
    }
}

fn inline_tag(tag: &str, inner: &str) -> String {
    if inner.trim().is_empty() {
        inner.to_string()
    } else {
        format!("[{tag}]{inner}[/{tag}]")
    }
}
