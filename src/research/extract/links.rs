use std::collections::HashSet;

use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::research::config::ExtractionConfig;
use crate::research::{collapse_whitespace, truncate_with_ellipsis};

/// One anchor found on a page, normalized to an absolute URL and tagged
/// internal/external against the source page's domain at extraction time.
#[derive(Debug, Clone, Serialize)]
pub struct LinkRecord {
    pub url: String,
    pub anchor_text: String,
    pub is_internal: bool,
    pub domain: String,
}

/// Pull anchors from the page, resolving relative hrefs against the
/// source URL. Deduplicates by final absolute URL in first-seen order and
/// caps the list size.
pub fn extract_links(html: &str, base_url: &str, config: &ExtractionConfig) -> Vec<LinkRecord> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let base_host = base.host_str().unwrap_or_default().to_string();
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        if links.len() >= config.max_links {
            break;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        let url = resolved.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }

        let domain = resolved.host_str().unwrap_or_default().to_string();
        let anchor_text = truncate_with_ellipsis(
            &collapse_whitespace(&element.text().collect::<String>()),
            config.max_anchor_text,
        );

        links.push(LinkRecord {
            url,
            anchor_text,
            is_internal: domain == base_host,
            domain,
        });
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_relative_links_are_resolved_against_base() {
        let html = r#"
            <a href="/about">About us</a>
            <a href="contact.html">Contact</a>
            <a href="https://other.example.net/page">Elsewhere</a>
        "#;

        let links = extract_links(html, "https://example.com/blog/post", &config());
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].url, "https://example.com/about");
        assert_eq!(links[1].url, "https://example.com/blog/contact.html");
        assert_eq!(links[2].url, "https://other.example.net/page");
    }

    #[test]
    fn test_internal_external_classification() {
        let html = r#"
            <a href="/local">Internal page link</a>
            <a href="https://other.example.net/">External page link</a>
        "#;

        let links = extract_links(html, "https://example.com/", &config());
        assert!(links[0].is_internal);
        assert_eq!(links[0].domain, "example.com");
        assert!(!links[1].is_internal);
        assert_eq!(links[1].domain, "other.example.net");
    }

    #[test]
    fn test_duplicates_keep_first_seen_order(){
        let html = r#"
            <a href="https://example.com/a">first</a>
            <a href="https://example.com/b">second</a>
            <a href="https://example.com/a">repeat</a>
        "#;

        let links = extract_links(html, "https://example.com/", &config());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].anchor_text, "first");
        assert_eq!(links[1].url, "https://example.com/b");
    }

    #[test]
    fn test_non_web_schemes_are_skipped() {
        let html = r##"
            <a href="mailto:team@example.com">Mail</a>
            <a href="tel:+15551234">Call</a>
            <a href="javascript:void(0)">Click</a>
            <a href="#section">Jump</a>
            <a href="https://example.com/real">Real</a>
        "##;

        let links = extract_links(html, "https://example.com/", &config());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/real");
    }

    #[test]
    fn test_link_list_is_capped() {
        let mut html = String::new();
        for i in 0..80 {
            html.push_str(&format!(r#"<a href="https://example.com/p{}">link {}</a>"#, i, i));
        }

        let links = extract_links(&html, "https://example.com/", &config());
        assert_eq!(links.len(), config().max_links);
    }

    #[test]
    fn test_unparseable_base_yields_empty() {
        let links = extract_links("<a href='/x'>x</a>", "not a url", &config());
        assert!(links.is_empty());
    }
}
