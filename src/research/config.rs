use serde::{Deserialize, Serialize};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the search layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub timeout_seconds: u64,
    pub max_results: usize,
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            max_results: 10,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// Configuration for page fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub retry_attempts: usize,
    pub retry_delay_ms: u64,
    pub max_redirects: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            user_agent: BROWSER_USER_AGENT.to_string(),
            retry_attempts: 1,
            retry_delay_ms: 500,
            max_redirects: 10,
        }
    }
}

/// Configuration for content extraction from fetched pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// A strategy's output is rejected below this many characters.
    pub min_content_length: usize,
    /// Extracted text is truncated to this many characters.
    pub max_content_length: usize,
    pub summary_chars: usize,
    pub max_paragraphs: usize,
    pub max_links: usize,
    pub max_images: usize,
    pub max_videos: usize,
    pub max_anchor_text: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_length: 100,
            max_content_length: 8000,
            summary_chars: 500,
            max_paragraphs: 20,
            max_links: 50,
            max_images: 10,
            max_videos: 5,
            max_anchor_text: 100,
        }
    }
}

/// Configuration for text analysis and relevance scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub top_keywords: usize,
    pub top_topics: usize,
    pub reading_words_per_minute: f64,
    pub positive_threshold: f64,
    pub negative_threshold: f64,
    pub title_weight: f64,
    pub body_weight: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_keywords: 15,
            top_topics: 10,
            reading_words_per_minute: 200.0,
            positive_threshold: 0.1,
            negative_threshold: -0.1,
            title_weight: 0.4,
            body_weight: 0.6,
        }
    }
}

/// Report synthesis thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub high_min_sources: usize,
    pub high_min_chars: usize,
    pub medium_min_sources: usize,
    pub medium_min_chars: usize,
    pub max_key_findings: usize,
    pub finding_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            high_min_sources: 8,
            high_min_chars: 5000,
            medium_min_sources: 4,
            medium_min_chars: 2000,
            max_key_findings: 5,
            finding_chars: 200,
        }
    }
}

/// Top-level configuration for a research run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchConfig {
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub extraction: ExtractionConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
    pub concurrency: ConcurrencyConfig,
}

/// Fan-out limits and the optional overall deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub max_concurrent_fetches: usize,
    pub max_query_variants: usize,
    /// When set, the run stops issuing new fetches at the deadline and
    /// synthesizes the report from whatever sources completed.
    pub deadline_secs: Option<u64>,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            max_query_variants: 10,
            deadline_secs: None,
        }
    }
}
