use std::sync::Arc;

use async_trait::async_trait;

use super::parser::{ResultParser, ResultPattern};
use super::{SearchBackend, SearchResult};
use crate::research::errors::ResearchError;
use crate::research::fetcher::Fetcher;

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const DDG_LITE_URL: &str = "https://lite.duckduckgo.com/lite/";

/// Resolve DuckDuckGo's redirect links to the target URL.
///
/// Result hrefs look like `//duckduckgo.com/l/?uddg=https%3A%2F%2F...&rut=...`.
pub(super) fn resolve_redirect_url(href: &str) -> Option<String> {
    if let Some(pos) = href.find("uddg=") {
        let encoded = &href[pos + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        urlencoding::decode(encoded)
            .ok()
            .map(|u| u.into_owned())
            .filter(|u| u.starts_with("http"))
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else {
        None
    }
}

/// Scraper for the full HTML interface at `html.duckduckgo.com`.
pub struct DuckDuckGoHtmlBackend {
    fetcher: Arc<Fetcher>,
    parser: ResultParser,
}

impl DuckDuckGoHtmlBackend {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        let patterns = vec![
            ResultPattern {
                name: "ddg-result",
                link_selector: ".result .result__title a",
                snippet_selector: Some(".result__snippet"),
            },
            ResultPattern {
                name: "ddg-links-main",
                link_selector: ".results_links .result__title a",
                snippet_selector: Some(".result__snippet"),
            },
            ResultPattern {
                name: "ddg-web-result",
                link_selector: ".web-result .result__title a",
                snippet_selector: Some(".result__snippet"),
            },
            ResultPattern {
                name: "ddg-title-heading",
                link_selector: "h2.result__title a",
                snippet_selector: None,
            },
            ResultPattern {
                name: "ddg-title-any",
                link_selector: ".result__title a",
                snippet_selector: None,
            },
        ];

        Self {
            fetcher,
            parser: ResultParser::new("html.duckduckgo.com", patterns, resolve_redirect_url),
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoHtmlBackend {
    fn name(&self) -> &'static str {
        "duckduckgo-html"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, ResearchError> {
        let url = format!("{}?q={}", DDG_HTML_URL, urlencoding::encode(query));
        let outcome = self.fetcher.get(&url).await?;

        if !outcome.is_success() {
            return Err(ResearchError::Search {
                query: query.to_string(),
                message: format!("HTTP {}", outcome.status_code),
            });
        }

        Ok(self.parser.parse(&outcome.body, count))
    }
}

/// Scraper for the lite interface at `lite.duckduckgo.com`, which serves
/// a plain table of links and tends to survive markup changes longer.
pub struct DuckDuckGoLiteBackend {
    fetcher: Arc<Fetcher>,
    parser: ResultParser,
}

impl DuckDuckGoLiteBackend {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        let patterns = vec![
            ResultPattern {
                name: "lite-nofollow",
                link_selector: "td a[rel='nofollow']",
                snippet_selector: None,
            },
            ResultPattern {
                name: "lite-table",
                link_selector: "table a[href]",
                snippet_selector: None,
            },
        ];

        Self {
            fetcher,
            parser: ResultParser::new("lite.duckduckgo.com", patterns, resolve_redirect_url),
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoLiteBackend {
    fn name(&self) -> &'static str {
        "duckduckgo-lite"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, ResearchError> {
        let url = format!("{}?q={}", DDG_LITE_URL, urlencoding::encode(query));
        let outcome = self.fetcher.get(&url).await?;

        if !outcome.is_success() {
            return Err(ResearchError::Search {
                query: query.to_string(),
                message: format!("HTTP {}", outcome.status_code),
            });
        }

        Ok(self.parser.parse(&outcome.body, count))
    }
}
