use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use super::SearchResult;
use crate::research::{collapse_whitespace, truncate_with_ellipsis};

const SNIPPET_CHARS: usize = 200;
const MIN_TITLE_CHARS: usize = 5;
const FALLBACK_MIN_TITLE_CHARS: usize = 10;

/// Anchor texts that mark navigation chrome rather than results.
const SKIP_TITLE_WORDS: [&str; 5] = ["search", "menu", "login", "privacy", "cookie"];

/// Hosts that are never acceptable as result targets.
const SKIP_RESULT_HOSTS: [&str; 3] = ["duckduckgo", "google", "bing"];

/// One structural pattern for a results page: a selector locating result
/// links and, optionally, one locating the matching snippets.
pub struct ResultPattern {
    pub name: &'static str,
    pub link_selector: &'static str,
    pub snippet_selector: Option<&'static str>,
}

/// Extracts `{title, url, snippet}` tuples from a search-engine results
/// page.
///
/// Engine markup changes frequently and without notice, so patterns are
/// tried in order from most to least specific; the first pattern that
/// yields at least one result wins. When every structural pattern fails,
/// a permissive anchor scan keeps at most one plausible result per
/// external host.
pub struct ResultParser {
    engine_host: String,
    patterns: Vec<ResultPattern>,
    normalize_url: fn(&str) -> Option<String>,
}

impl ResultParser {
    pub fn new(
        engine_host: impl Into<String>,
        patterns: Vec<ResultPattern>,
        normalize_url: fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            engine_host: engine_host.into(),
            patterns,
            normalize_url,
        }
    }

    pub fn parse(&self, html: &str, max_results: usize) -> Vec<SearchResult> {
        let document = Html::parse_document(html);

        for pattern in &self.patterns {
            let results = self.apply_pattern(&document, pattern, max_results);
            if !results.is_empty() {
                log::debug!(
                    "result pattern '{}' matched {} results",
                    pattern.name,
                    results.len()
                );
                return results;
            }
        }

        self.fallback_scan(&document, max_results)
    }

    fn apply_pattern(
        &self,
        document: &Html,
        pattern: &ResultPattern,
        max_results: usize,
    ) -> Vec<SearchResult> {
        let Ok(link_selector) = Selector::parse(pattern.link_selector) else {
            return Vec::new();
        };

        let snippets: Vec<String> = pattern
            .snippet_selector
            .and_then(|s| Selector::parse(s).ok())
            .map(|selector| {
                document
                    .select(&selector)
                    .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                    .collect()
            })
            .unwrap_or_default();

        let mut results = Vec::new();
        for (index, element) in document.select(&link_selector).enumerate() {
            if results.len() >= max_results {
                break;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(url) = (self.normalize_url)(href) else {
                continue;
            };

            let title = collapse_whitespace(&element.text().collect::<String>());
            if !self.acceptable_result(&title, &url, MIN_TITLE_CHARS) {
                continue;
            }

            let snippet = snippets
                .get(index)
                .map(|s| truncate_with_ellipsis(s, SNIPPET_CHARS))
                .unwrap_or_default();

            results.push(SearchResult {
                title,
                url,
                snippet,
                position: results.len() + 1,
            });
        }

        results
    }

    /// Last resort: any anchor with an absolute URL and plausible anchor
    /// text, at most one per external host.
    fn fallback_scan(&self, document: &Html, max_results: usize) -> Vec<SearchResult> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let mut seen_hosts = HashSet::new();
        let mut results = Vec::new();

        for element in document.select(&selector) {
            if results.len() >= max_results {
                break;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !href.starts_with("http") {
                continue;
            }

            let Some(host) = Url::parse(href).ok().and_then(|u| {
                u.host_str().map(|h| h.to_lowercase())
            }) else {
                continue;
            };

            let title = collapse_whitespace(&element.text().collect::<String>());
            if !self.acceptable_result(&title, href, FALLBACK_MIN_TITLE_CHARS) {
                continue;
            }
            if !seen_hosts.insert(host.clone()) {
                continue;
            }

            results.push(SearchResult {
                title,
                url: href.to_string(),
                snippet: format!("Result from {}", host),
                position: results.len() + 1,
            });
        }

        results
    }

    fn acceptable_result(&self, title: &str, url: &str, min_title_chars: usize) -> bool {
        if title.chars().count() <= min_title_chars || !url.starts_with("http") {
            return false;
        }

        let title_lower = title.to_lowercase();
        if SKIP_TITLE_WORDS.iter().any(|w| title_lower.contains(w)) {
            return false;
        }

        let Some(host) = Url::parse(url).ok().and_then(|u| {
            u.host_str().map(|h| h.to_lowercase())
        }) else {
            return false;
        };

        host != self.engine_host && !SKIP_RESULT_HOSTS.iter().any(|s| host.contains(s))
    }
}

/// URL normalizer for engines that link results directly.
pub fn direct_url(href: &str) -> Option<String> {
    if href.starts_with("http") {
        Some(href.to_string())
    } else {
        None
    }
}
