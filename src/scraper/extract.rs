use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Selector rules for rendered markup, most specific first.
/// The last rule matches the Japanese alt text for "product".
pub const RENDERED_RULES: &[&str] = &[
    r#"img[src*="mercari"]"#,
    ".item-image img",
    ".product-image img",
    r#"[data-testid*="image"] img"#,
    r#"img[alt*="商品"]"#,
];

/// Source attributes checked on rendered `img` elements
const RENDERED_SOURCE_ATTRS: &[&str] = &["src", "data-src"];

/// Source attributes checked on static `img` elements, lazy-load fallbacks last
const STATIC_SOURCE_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src"];

/// Attributes that carry an image URL outside of `img` elements
const DATA_IMAGE_ATTRS: &[&str] = &["data-image", "data-product-image"];

/// Substrings that mark an image file in a static-pass URL
pub const IMAGE_EXTENSION_HINTS: &[&str] = &["jpg", "png", "webp"];

/// Keyword accepted alongside the domain hint in the rendered pass
const PRODUCT_HINT: &str = "product";

/// Ordered, exact-match deduplicated list of candidate image URLs
#[derive(Debug, Default, Clone)]
pub struct CandidateSet {
    seen: HashSet<String>,
    urls: Vec<String>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a URL; returns false if the exact string was already present
    pub fn push(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

impl Extend<String> for CandidateSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for url in iter {
            self.push(url);
        }
    }
}

/// Turn an image source attribute into an absolute URL.
///
/// Protocol-relative sources get `https:`, root-relative ones resolve against
/// the page origin, absolute ones are kept verbatim and everything else is
/// resolved relative to the page.
pub fn normalize_url(src: &str, base: &Url) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    if src.starts_with("//") {
        return Some(format!("https:{}", src));
    }

    if src.starts_with('/') {
        return base.join(src).ok().map(String::from);
    }

    if Url::parse(src).is_ok() {
        return Some(src.to_string());
    }

    base.join(src).ok().map(String::from)
}

/// First non-empty attribute among `attrs`
fn first_source<'a>(element: &ElementRef<'a>, attrs: &[&str]) -> Option<&'a str> {
    attrs
        .iter()
        .filter_map(|name| element.value().attr(name))
        .find(|value| !value.trim().is_empty())
}

/// Extracts product image URLs from storefront markup
pub struct ImageExtractor {
    domain_hint: String,
    rules: Vec<Selector>,
    img: Selector,
    img_with_src: Selector,
    styled: Selector,
    data_image: Selector,
    background_url: Regex,
}

impl ImageExtractor {
    pub fn new(domain_hint: &str) -> Result<Self> {
        let rules = RENDERED_RULES
            .iter()
            .map(|rule| parse_selector(rule))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            domain_hint: domain_hint.to_lowercase(),
            rules,
            img: parse_selector("img")?,
            img_with_src: parse_selector("img[src]")?,
            styled: parse_selector(r#"[style*="background-image"]"#)?,
            data_image: parse_selector("[data-image], [data-product-image]")?,
            background_url: Regex::new(r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#)?,
        })
    }

    /// Single pass over unrendered HTML.
    ///
    /// Keeps URLs that mention the marketplace domain and look like an image file.
    pub fn extract_static(&self, html: &str, base: &Url) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut candidates = CandidateSet::new();

        for element in document.select(&self.img) {
            let Some(src) = first_source(&element, STATIC_SOURCE_ATTRS) else {
                continue;
            };
            let Some(url) = normalize_url(src, base) else {
                continue;
            };

            let lower = url.to_lowercase();
            if lower.contains(&self.domain_hint)
                && IMAGE_EXTENSION_HINTS.iter().any(|ext| lower.contains(ext))
            {
                candidates.push(url);
            }
        }

        debug!("Static pass found {} candidate images", candidates.len());
        candidates.into_vec()
    }

    /// Passes over browser-rendered markup: selector rules, then a keyword
    /// sweep of every `img`, then inline style and data attributes.
    pub fn extract_rendered(&self, html: &str, base: &Url) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut candidates = CandidateSet::new();

        self.select_by_rules(&document, base, &mut candidates);
        self.collect_hinted(&document, base, &mut candidates);
        self.collect_inline(&document, base, &mut candidates);

        if candidates.is_empty() {
            debug!("Rendered pass found no candidate images");
        } else {
            debug!("Rendered pass found {} candidate images", candidates.len());
        }
        candidates.into_vec()
    }

    /// Apply the first rule that matches anything; later rules are ignored
    /// even when none of that rule's matches qualify.
    fn select_by_rules(&self, document: &Html, base: &Url, candidates: &mut CandidateSet) {
        for (rule, selector) in RENDERED_RULES.iter().zip(&self.rules) {
            let elements: Vec<ElementRef<'_>> = document.select(selector).collect();
            if elements.is_empty() {
                continue;
            }

            debug!("Selector rule {} matched {} elements", rule, elements.len());
            for element in elements {
                let url = first_source(&element, RENDERED_SOURCE_ATTRS)
                    .and_then(|src| normalize_url(src, base));
                if let Some(url) = url {
                    if url.to_lowercase().contains(&self.domain_hint) {
                        candidates.push(url);
                    }
                }
            }
            break;
        }
    }

    fn collect_hinted(&self, document: &Html, base: &Url, candidates: &mut CandidateSet) {
        for element in document.select(&self.img_with_src) {
            let url = first_source(&element, RENDERED_SOURCE_ATTRS)
                .and_then(|src| normalize_url(src, base));
            if let Some(url) = url {
                let lower = url.to_lowercase();
                if lower.contains(&self.domain_hint) || lower.contains(PRODUCT_HINT) {
                    candidates.push(url);
                }
            }
        }
    }

    fn collect_inline(&self, document: &Html, base: &Url, candidates: &mut CandidateSet) {
        let mut sources = Vec::new();

        for element in document.select(&self.styled) {
            if let Some(style) = element.value().attr("style") {
                for capture in self.background_url.captures_iter(style) {
                    sources.push(capture[1].to_string());
                }
            }
        }

        for element in document.select(&self.data_image) {
            if let Some(src) = first_source(&element, DATA_IMAGE_ATTRS) {
                sources.push(src.to_string());
            }
        }

        for src in sources {
            if let Some(url) = normalize_url(&src, base) {
                if url.to_lowercase().contains(&self.domain_hint) {
                    candidates.push(url);
                }
            }
        }
    }
}

fn parse_selector(rule: &str) -> Result<Selector> {
    Selector::parse(rule).map_err(|e| anyhow::anyhow!("Invalid CSS selector '{}': {}", rule, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.mercari.com/mypage/listings/active/").unwrap()
    }

    fn extractor() -> ImageExtractor {
        ImageExtractor::new("mercari").unwrap()
    }

    #[test]
    fn test_normalize_protocol_relative() {
        assert_eq!(
            normalize_url("//static.mercari.com/photos/m1.jpg", &base()).as_deref(),
            Some("https://static.mercari.com/photos/m1.jpg")
        );
    }

    #[test]
    fn test_normalize_root_relative_uses_origin() {
        assert_eq!(
            normalize_url("/images/m1.jpg", &base()).as_deref(),
            Some("https://www.mercari.com/images/m1.jpg")
        );
    }

    #[test]
    fn test_normalize_page_relative_and_absolute() {
        assert_eq!(
            normalize_url("thumbs/m1.png", &base()).as_deref(),
            Some("https://www.mercari.com/mypage/listings/active/thumbs/m1.png")
        );
        assert_eq!(
            normalize_url("https://Static.Mercari.com/A.jpg", &base()).as_deref(),
            Some("https://Static.Mercari.com/A.jpg")
        );
        assert_eq!(normalize_url("   ", &base()), None);
    }

    #[test]
    fn test_candidate_set_keeps_first_seen_order() {
        let mut set = CandidateSet::new();
        set.extend(
            ["b", "a", "b", "c", "a", "B"]
                .iter()
                .map(|s| s.to_string()),
        );
        assert_eq!(set.len(), 4);
        assert_eq!(set.into_vec(), vec!["b", "a", "c", "B"]);
    }

    #[test]
    fn test_static_pass_filters_and_dedups() {
        let html = r#"
            <html><body>
              <img src="//static.mercari.com/photos/m1.jpg">
              <img src="" data-src="https://static.mercari.com/photos/m2.webp?w=300">
              <img data-lazy-src="/photos/mercari-m3.png">
              <img src="https://static.mercari.com/photos/m1.jpg">
              <img src="https://cdn.example.com/m4.jpg">
              <img src="https://static.mercari.com/icons/logo.svg">
              <img alt="no source">
            </body></html>
        "#;

        let urls = extractor().extract_static(html, &base());
        assert_eq!(
            urls,
            vec![
                "https://static.mercari.com/photos/m1.jpg",
                "https://static.mercari.com/photos/m2.webp?w=300",
                "https://www.mercari.com/photos/mercari-m3.png",
            ]
        );
    }

    #[test]
    fn test_static_pass_empty_page() {
        let urls = extractor().extract_static("<html><body><p>nothing</p></body></html>", &base());
        assert!(urls.is_empty());
    }

    #[test]
    fn test_rendered_first_matching_rule_wins() {
        // Attribute selectors are case-sensitive, so the first rule misses and
        // `.item-image img` wins. The alt-text rule would have picked up the
        // lazy image, but it never runs.
        let html = r#"
            <div class="item-image"><img src="https://static.MERCARI.com/item/1.jpg"></div>
            <div class="item-image"><img src="https://cdn.example.com/other.jpg"></div>
            <img alt="商品" data-src="https://static.mercari.com/alt/2.jpg">
        "#;

        let urls = extractor().extract_rendered(html, &base());
        assert_eq!(urls, vec!["https://static.MERCARI.com/item/1.jpg"]);
    }

    #[test]
    fn test_rendered_rule_reads_data_src() {
        let html = r#"
            <div class="item-image"><img data-src="https://static.mercari.com/x.jpg"></div>
            <div class="item-image"><img src="" data-src="https://static.mercari.com/y.jpg"></div>
        "#;

        let urls = extractor().extract_rendered(html, &base());
        assert_eq!(
            urls,
            vec![
                "https://static.mercari.com/x.jpg",
                "https://static.mercari.com/y.jpg",
            ]
        );
    }

    #[test]
    fn test_rendered_keyword_sweep_unions_results() {
        let html = r#"
            <img src="https://static.mercari.com/item/1.jpg">
            <img src="https://cdn.example.com/product/2.jpg">
            <img src="https://cdn.example.com/banner.jpg">
            <img src="https://static.mercari.com/item/1.jpg">
        "#;

        let urls = extractor().extract_rendered(html, &base());
        assert_eq!(
            urls,
            vec![
                "https://static.mercari.com/item/1.jpg",
                "https://cdn.example.com/product/2.jpg",
            ]
        );
    }

    #[test]
    fn test_rendered_inline_background_and_data_attrs() {
        let html = r#"
            <div style="background-image: url('https://static.mercari.com/bg/3.jpg')"></div>
            <div data-product-image="//static.mercari.com/data/4.jpg"></div>
            <div data-image="https://cdn.example.com/5.jpg"></div>
        "#;

        let urls = extractor().extract_rendered(html, &base());
        assert_eq!(
            urls,
            vec![
                "https://static.mercari.com/bg/3.jpg",
                "https://static.mercari.com/data/4.jpg",
            ]
        );
    }

    #[test]
    fn test_case_variants_are_distinct() {
        let html = r#"
            <img src="https://static.mercari.com/a.JPG">
            <img src="https://static.mercari.com/a.jpg">
        "#;
        let urls = extractor().extract_static(html, &base());
        assert_eq!(urls.len(), 2);
    }
}
