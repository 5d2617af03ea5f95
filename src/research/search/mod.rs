pub mod duckduckgo;
pub mod fallback;
pub mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::ResearchError;
use super::fetcher::Fetcher;
use duckduckgo::{DuckDuckGoHtmlBackend, DuckDuckGoLiteBackend};
use fallback::TopicSourceBackend;

/// One result extracted from a search backend. Immutable once created;
/// deduplicated by exact URL across query variants within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub position: usize,
}

/// A single search backend in the strategy chain.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, ResearchError>;
}

/// Tries backends in fixed priority order and accepts the first
/// non-empty result set.
///
/// A backend that errors or returns nothing just hands over to the next
/// one; if every backend comes up empty the chain returns an empty list
/// rather than an error, so the caller always has a value to work with.
pub struct SearchStrategyChain {
    backends: Vec<Box<dyn SearchBackend>>,
}

impl SearchStrategyChain {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self::with_backends(vec![
            Box::new(DuckDuckGoHtmlBackend::new(fetcher.clone())),
            Box::new(DuckDuckGoLiteBackend::new(fetcher)),
            Box::new(TopicSourceBackend),
        ])
    }

    pub fn with_backends(backends: Vec<Box<dyn SearchBackend>>) -> Self {
        Self { backends }
    }

    pub async fn search(&self, query: &str, count: usize) -> Vec<SearchResult> {
        for backend in &self.backends {
            match backend.search(query, count).await {
                Ok(results) if !results.is_empty() => {
                    log::debug!(
                        "backend '{}' returned {} results for '{}'",
                        backend.name(),
                        results.len(),
                        query
                    );
                    return results;
                }
                Ok(_) => {
                    log::debug!("backend '{}' returned no results for '{}'", backend.name(), query);
                }
                Err(e) => {
                    log::warn!("backend '{}' failed for '{}': {}", backend.name(), query, e);
                }
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubBackend {
        name: &'static str,
        results: Vec<SearchResult>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl StubBackend {
        fn new(name: &'static str, results: Vec<SearchResult>, fail: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    results,
                    fail,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl SearchBackend for StubBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(
            &self,
            query: &str,
            _count: usize,
        ) -> Result<Vec<SearchResult>, ResearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ResearchError::Search {
                    query: query.to_string(),
                    message: "stub failure".to_string(),
                });
            }
            Ok(self.results.clone())
        }
    }

    fn result(url: &str, position: usize) -> SearchResult {
        SearchResult {
            title: format!("Result at {}", url),
            url: url.to_string(),
            snippet: String::new(),
            position,
        }
    }

    #[tokio::test]
    async fn test_first_nonempty_backend_wins_and_later_ones_are_untouched() {
        let (first, first_calls) = StubBackend::new("first", Vec::new(), false);
        let (second, second_calls) = StubBackend::new(
            "second",
            vec![
                result("https://a.example.org", 1),
                result("https://b.example.org", 2),
                result("https://c.example.org", 3),
            ],
            false,
        );
        let (third, third_calls) = StubBackend::new("third", vec![result("https://d.example.org", 1)], false);

        let chain =
            SearchStrategyChain::with_backends(vec![Box::new(first), Box::new(second), Box::new(third)]);
        let results = chain.search("anything", 10).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].url, "https://a.example.org");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_error_advances_the_chain() {
        let (first, _) = StubBackend::new("first", Vec::new(), true);
        let (second, _) = StubBackend::new("second", vec![result("https://a.example.org", 1)], false);

        let chain = SearchStrategyChain::with_backends(vec![Box::new(first), Box::new(second)]);
        let results = chain.search("anything", 10).await;

        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_all_backends_failing_yields_empty_not_error() {
        let (first, _) = StubBackend::new("first", Vec::new(), true);
        let (second, _) = StubBackend::new("second", Vec::new(), false);

        let chain = SearchStrategyChain::with_backends(vec![Box::new(first), Box::new(second)]);
        let results = chain.search("anything", 10).await;

        assert!(results.is_empty());
    }
}
