use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use futures::StreamExt;
use serde::Serialize;

use super::analysis::{self, relevance};
use super::config::{FetchConfig, ResearchConfig};
use super::errors::ResearchError;
use super::extract::{
    extract_links, extract_media, extract_metadata, extract_structured_data,
    ContentExtractionChain, ExtractedContent, LinkRecord, MediaInfo, PageMetadata,
    StructuredDataBlock,
};
use super::fetcher::{FetchOutcome, Fetcher, UrlStatus};
use super::report::{self, OperationRecord, PipelineStage, ResearchReport};
use super::search::fallback::topic_sources;
use super::search::{SearchResult, SearchStrategyChain};

/// Ceiling applied when no explicit deadline is configured.
const RUN_CEILING_SECS: u64 = 86_400;

const QUERY_SUFFIXES: [&str; 9] = [
    "latest news",
    "trends",
    "analysis",
    "research",
    "overview",
    "developments",
    "updates",
    "explained",
    "information",
];

/// Everything extracted from one fetched page.
#[derive(Debug, Clone, Serialize)]
pub struct PageCapture {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub metadata: PageMetadata,
    pub content: ExtractedContent,
    pub analysis: analysis::ContentAnalysis,
    pub statistics: analysis::TextStatistics,
    pub links: Vec<LinkRecord>,
    pub total_links: usize,
    pub media: MediaInfo,
    pub structured_data: Vec<StructuredDataBlock>,
}

/// One source that made it through fetch, extraction and analysis.
#[derive(Debug, Clone, Serialize)]
pub struct SourceAnalysis {
    pub source: SearchResult,
    pub capture: PageCapture,
    pub relevance_score: f64,
}

/// Drives the end-to-end pipeline: search variants, URL deduplication,
/// bounded parallel deep-fetches, aggregate analysis and report
/// synthesis. Per-source failures are recorded and skipped; the run
/// itself only fails on invalid arguments.
pub struct ResearchPipeline {
    config: ResearchConfig,
    fetcher: Arc<Fetcher>,
    search_chain: SearchStrategyChain,
    extraction_chain: ContentExtractionChain,
}

impl ResearchPipeline {
    pub fn new(config: ResearchConfig) -> Result<Self, ResearchError> {
        let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);

        // search engines get their own, shorter-fused client
        let search_fetcher = Arc::new(Fetcher::new(FetchConfig {
            timeout_seconds: config.search.timeout_seconds,
            user_agent: config.search.user_agent.clone(),
            ..config.fetch.clone()
        })?);
        let search_chain = SearchStrategyChain::new(search_fetcher);
        let extraction_chain = ContentExtractionChain::new(config.extraction.clone());

        Ok(Self {
            config,
            fetcher,
            search_chain,
            extraction_chain,
        })
    }

    /// Search without analysis. Never fails; an unreachable web yields
    /// the curated fallback sources.
    pub async fn search(&self, query: &str, count: usize) -> Vec<SearchResult> {
        self.search_chain.search(query, count).await
    }

    /// Fetch one URL and run the extraction suite over it.
    pub async fn extract(&self, url: &str, deep: bool) -> Result<PageCapture, ResearchError> {
        let outcome = self.fetcher.get(url).await?;
        if !outcome.is_success() {
            return Err(ResearchError::network(
                url,
                format!("HTTP {}", outcome.status_code),
            ));
        }
        Ok(self.capture_page(outcome, deep))
    }

    /// Probe a URL without downloading its body.
    pub async fn check_url(&self, url: &str) -> Result<UrlStatus, ResearchError> {
        self.fetcher.check(url).await
    }

    /// Run a full research pass over a topic.
    ///
    /// Only argument validation can fail; every downstream problem is
    /// recorded in the report's operations log instead.
    pub async fn research(
        &self,
        topic: &str,
        num_sources: usize,
        deep_fetch: bool,
    ) -> Result<ResearchReport, ResearchError> {
        if topic.trim().is_empty() {
            return Err(ResearchError::validation("topic", "must not be empty"));
        }
        if num_sources == 0 {
            return Err(ResearchError::validation("num_sources", "must be positive"));
        }

        let mut operations: Vec<OperationRecord> = Vec::new();

        let variants = query_variants(topic, self.config.concurrency.max_query_variants);
        println!(
            "{} Researching {} across {} query variants",
            "🔍".cyan(),
            topic.yellow(),
            variants.len()
        );

        let per_variant = futures::future::join_all(
            variants
                .iter()
                .map(|v| self.search_chain.search(v, self.config.search.max_results)),
        )
        .await;

        for (variant, results) in variants.iter().zip(&per_variant) {
            log::debug!("variant '{}' produced {} results", variant, results.len());
            operations.push(OperationRecord::success(PipelineStage::Search, variant.clone()));
        }

        let mut candidates = dedupe_by_url(per_variant.into_iter().flatten());
        let sources_discovered = candidates.len();

        if candidates.is_empty() {
            println!(
                "{} No search results; falling back to direct sources",
                "⚠".yellow()
            );
            operations.push(OperationRecord::failure(
                PipelineStage::Search,
                topic,
                "no results from any backend; using direct sources",
            ));
            candidates = direct_sources(topic);
        }

        println!(
            "{} {} unique sources, analyzing up to {}",
            "📑".cyan(),
            candidates.len(),
            num_sources
        );

        let targets: Vec<SearchResult> = candidates.into_iter().take(num_sources).collect();
        let fetched = self.fetch_all(targets, deep_fetch, &mut operations).await;

        let mut analyzed: Vec<SourceAnalysis> = Vec::new();
        for (source, result) in fetched {
            match result {
                Ok(capture) => {
                    operations.push(OperationRecord::success(PipelineStage::Fetch, source.url.clone()));
                    if capture.content.is_empty() {
                        println!("{} No usable content from {}", "⚠".yellow(), source.url);
                        operations.push(OperationRecord::failure(
                            PipelineStage::Extract,
                            source.url.clone(),
                            ResearchError::NoUsableContent {
                                url: source.url.clone(),
                            }
                            .to_string(),
                        ));
                        continue;
                    }
                    operations.push(OperationRecord::success(PipelineStage::Extract, source.url.clone()));

                    let title = if capture.metadata.title.is_empty() {
                        source.title.clone()
                    } else {
                        capture.metadata.title.clone()
                    };
                    let relevance_score = relevance::score(
                        topic,
                        &title,
                        &capture.content.full_text,
                        &self.config.analysis,
                    );
                    operations.push(OperationRecord::success(PipelineStage::Analyze, source.url.clone()));

                    println!(
                        "{} Analyzed {} (relevance {:.3})",
                        "📄".green(),
                        source.url,
                        relevance_score
                    );
                    analyzed.push(SourceAnalysis {
                        source,
                        capture,
                        relevance_score,
                    });
                }
                Err(e) => {
                    println!("{} {}: {}", "✗".red(), source.url, e);
                    operations.push(OperationRecord::failure(
                        PipelineStage::Fetch,
                        source.url.clone(),
                        e.to_string(),
                    ));
                }
            }
        }

        let combined: String = analyzed
            .iter()
            .map(|s| s.capture.content.full_text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let keywords = analysis::extract_keywords(&combined, self.config.analysis.top_keywords);
        let sentiment = analysis::analyze_sentiment(
            analyzed.iter().map(|s| s.capture.content.full_text.as_str()),
            &self.config.analysis,
        );
        let topics = analysis::identify_topics(&combined, self.config.analysis.top_topics);
        operations.push(OperationRecord::success(PipelineStage::Synthesize, topic));

        let report = report::synthesize(
            topic,
            sources_discovered,
            &analyzed,
            &keywords,
            &sentiment,
            &topics,
            operations,
            &self.config.report,
        );

        println!(
            "{} Research complete: {} of {} sources analyzed ({})",
            "🎯".green(),
            report.total_sources_analyzed,
            num_sources,
            report.executive_summary.research_quality
        );

        Ok(report)
    }

    /// Fan the per-URL work out over a bounded worker pool, preserving
    /// result order. Stops issuing fetches at the configured deadline and
    /// returns whatever completed.
    async fn fetch_all(
        &self,
        targets: Vec<SearchResult>,
        deep_fetch: bool,
        operations: &mut Vec<OperationRecord>,
    ) -> Vec<(SearchResult, Result<PageCapture, ResearchError>)> {
        let workers = self.config.concurrency.max_concurrent_fetches.max(1);
        let stream = futures::stream::iter(
            targets
                .into_iter()
                .map(|source| self.analyze_source(source, deep_fetch)),
        )
        .buffered(workers);
        tokio::pin!(stream);

        let deadline = Duration::from_secs(
            self.config
                .concurrency
                .deadline_secs
                .unwrap_or(RUN_CEILING_SECS),
        );
        let timer = tokio::time::sleep(deadline);
        tokio::pin!(timer);

        let mut completed = Vec::new();
        loop {
            tokio::select! {
                _ = &mut timer => {
                    println!(
                        "{} Deadline reached; continuing with {} completed sources",
                        "⏱".yellow(),
                        completed.len()
                    );
                    operations.push(OperationRecord::failure(
                        PipelineStage::Fetch,
                        "deadline",
                        "run deadline reached before all sources completed",
                    ));
                    break;
                }
                next = stream.next() => match next {
                    Some(item) => completed.push(item),
                    None => break,
                },
            }
        }

        completed
    }

    async fn analyze_source(
        &self,
        source: SearchResult,
        deep_fetch: bool,
    ) -> (SearchResult, Result<PageCapture, ResearchError>) {
        let result = match self.fetcher.get(&source.url).await {
            Ok(outcome) if outcome.is_success() => Ok(self.capture_page(outcome, deep_fetch)),
            Ok(outcome) => Err(ResearchError::network(
                source.url.as_str(),
                format!("HTTP {}", outcome.status_code),
            )),
            Err(e) => Err(e),
        };

        (source, result)
    }

    fn capture_page(&self, outcome: FetchOutcome, deep: bool) -> PageCapture {
        let metadata = extract_metadata(&outcome.body);
        let content = self.extraction_chain.extract(&outcome.body);
        let analysis = analysis::analyze_structure(&content.full_text, &self.config.analysis);
        let statistics = analysis::text_statistics(&content.full_text);

        let (links, media, structured_data) = if deep {
            (
                extract_links(&outcome.body, &outcome.url, &self.config.extraction),
                extract_media(&outcome.body, &outcome.url, &self.config.extraction),
                extract_structured_data(&outcome.body),
            )
        } else {
            (Vec::new(), MediaInfo::default(), Vec::new())
        };

        PageCapture {
            url: outcome.url,
            final_url: outcome.final_url,
            status_code: outcome.status_code,
            content_type: outcome.content_type,
            metadata,
            content,
            analysis,
            statistics,
            total_links: links.len(),
            links,
            media,
            structured_data,
        }
    }
}

/// The topic itself plus templated refinements, bounded.
fn query_variants(topic: &str, max_variants: usize) -> Vec<String> {
    let topic = topic.trim();
    let mut variants = vec![topic.to_string()];
    for suffix in QUERY_SUFFIXES {
        variants.push(format!("{} {}", topic, suffix));
    }
    variants.truncate(max_variants.max(1));
    variants
}

/// First occurrence of each URL wins; original order is preserved.
fn dedupe_by_url(results: impl IntoIterator<Item = SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}

/// Direct sources for when search produced nothing: an encyclopedia
/// entry built from the topic plus the curated topic table.
fn direct_sources(topic: &str) -> Vec<SearchResult> {
    let topic = topic.trim();
    let mut results = vec![SearchResult {
        title: format!("Wikipedia: {}", topic),
        url: format!("https://en.wikipedia.org/wiki/{}", topic.replace(' ', "_")),
        snippet: format!("Encyclopedia entry for {}", topic),
        position: 1,
    }];

    for (index, mut source) in topic_sources(topic, 3).into_iter().enumerate() {
        source.position = index + 2;
        results.push(source);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str) -> SearchResult {
        SearchResult {
            title: format!("Result at {}", url),
            url: url.to_string(),
            snippet: String::new(),
            position: 1,
        }
    }

    #[test]
    fn test_query_variants_start_with_topic_and_are_bounded() {
        let variants = query_variants("rust async", 10);
        assert_eq!(variants[0], "rust async");
        assert_eq!(variants.len(), 10);
        assert!(variants[1..].iter().all(|v| v.starts_with("rust async ")));

        let few = query_variants("rust", 3);
        assert_eq!(few.len(), 3);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence_in_order() {
        let deduped = dedupe_by_url(vec![
            result("https://a.example.org"),
            result("https://b.example.org"),
            result("https://a.example.org"),
            result("https://c.example.org"),
            result("https://b.example.org"),
        ]);

        let urls: Vec<&str> = deduped.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://a.example.org",
                "https://b.example.org",
                "https://c.example.org"
            ]
        );
    }

    #[test]
    fn test_direct_sources_lead_with_encyclopedia_entry() {
        let sources = direct_sources("climate change");
        assert_eq!(sources[0].url, "https://en.wikipedia.org/wiki/climate_change");
        assert!(sources.len() > 1);
        for (index, source) in sources.iter().enumerate() {
            assert_eq!(source.position, index + 1);
        }
    }

    #[tokio::test]
    async fn test_empty_topic_fails_validation_before_any_network() {
        let pipeline = ResearchPipeline::new(ResearchConfig::default()).unwrap();
        let err = pipeline.research("   ", 5, true).await.unwrap_err();
        assert!(matches!(err, ResearchError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_zero_sources_fails_validation() {
        let pipeline = ResearchPipeline::new(ResearchConfig::default()).unwrap();
        let err = pipeline.research("valid topic", 0, true).await.unwrap_err();
        assert!(matches!(err, ResearchError::Validation { .. }));
    }
}
