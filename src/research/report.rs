use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::analysis::{SentimentAnalysis, WordCount};
use super::config::ReportConfig;
use super::orchestrator::SourceAnalysis;
use super::truncate_with_ellipsis;

/// Coarse classification of a run's overall evidentiary strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityTier::High => write!(f, "HIGH"),
            QualityTier::Medium => write!(f, "MEDIUM"),
            QualityTier::Low => write!(f, "LOW"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Search,
    Fetch,
    Extract,
    Analyze,
    Synthesize,
}

/// Outcome of one pipeline step, in a machine-checkable form.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OperationOutcome {
    Success,
    Failure(String),
}

/// One entry of the run's operations log.
#[derive(Debug, Clone, Serialize)]
pub struct OperationRecord {
    pub stage: PipelineStage,
    pub target: String,
    pub outcome: OperationOutcome,
}

impl OperationRecord {
    pub fn success(stage: PipelineStage, target: impl Into<String>) -> Self {
        Self {
            stage,
            target: target.into(),
            outcome: OperationOutcome::Success,
        }
    }

    pub fn failure(stage: PipelineStage, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage,
            target: target.into(),
            outcome: OperationOutcome::Failure(reason.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, OperationOutcome::Success)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub research_topic: String,
    pub research_scope: String,
    pub content_analyzed: String,
    pub research_quality: QualityTier,
    pub completion_status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchMetrics {
    pub sources_discovered: usize,
    pub sources_analyzed: usize,
    pub total_content_chars: usize,
    /// Share of logged operations that completed without error, percent.
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentOverview {
    pub primary_keywords: Vec<String>,
    pub sentiment: String,
    pub main_topics: Vec<String>,
    pub information_density: String,
}

/// One analyzed source's contribution, ranked by relevance.
#[derive(Debug, Clone, Serialize)]
pub struct KeyFinding {
    pub source: String,
    pub url: String,
    pub finding: String,
    pub relevance: f64,
}

/// The final product of a research run. Always well-formed: a run that
/// analyzed nothing still reports LOW quality with an explicit note.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub topic: String,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub executive_summary: ExecutiveSummary,
    pub key_insights: Vec<String>,
    pub research_metrics: ResearchMetrics,
    pub content_overview: ContentOverview,
    pub key_findings: Vec<KeyFinding>,
    pub recommendations: Vec<String>,
    pub research_limitations: Vec<String>,
    pub total_sources_analyzed: usize,
    pub operations: Vec<OperationRecord>,
}

/// Assemble the final report from the run's accumulated state.
#[allow(clippy::too_many_arguments)]
pub fn synthesize(
    topic: &str,
    sources_discovered: usize,
    analyzed: &[SourceAnalysis],
    keywords: &[WordCount],
    sentiment: &SentimentAnalysis,
    topics: &[WordCount],
    operations: Vec<OperationRecord>,
    config: &ReportConfig,
) -> ResearchReport {
    let sources_analyzed = analyzed.len();
    let total_content_chars: usize = analyzed
        .iter()
        .map(|s| s.capture.content.character_count)
        .sum();

    let quality = quality_tier(sources_analyzed, total_content_chars, config);
    let successes = operations.iter().filter(|op| op.succeeded()).count();
    let success_rate = if operations.is_empty() {
        0.0
    } else {
        (successes as f64 / operations.len() as f64 * 1000.0).round() / 10.0
    };

    let keyword_names: Vec<String> = keywords.iter().map(|k| k.word.clone()).collect();
    let topic_names: Vec<String> = topics.iter().map(|t| t.word.clone()).collect();

    let mut key_insights = Vec::new();
    if sources_analyzed > 0 {
        if !keyword_names.is_empty() {
            key_insights.push(format!(
                "Key terms: {}",
                keyword_names.iter().take(8).cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        key_insights.push(format!(
            "Overall sentiment: {} (score: {:.2})",
            sentiment.classification, sentiment.score
        ));
        if !topic_names.is_empty() {
            key_insights.push(format!(
                "Main topics: {}",
                topic_names.iter().take(5).cloned().collect::<Vec<_>>().join(", ")
            ));
        }
    }

    let completion_status = if sources_analyzed == 0 {
        "No sources could be analyzed".to_string()
    } else {
        "Analysis completed".to_string()
    };

    ResearchReport {
        topic: topic.to_string(),
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        executive_summary: ExecutiveSummary {
            research_topic: topic.to_string(),
            research_scope: format!(
                "{} operations across {} discovered sources",
                operations.len(),
                sources_discovered
            ),
            content_analyzed: format!(
                "{} sources successfully analyzed ({} characters)",
                sources_analyzed, total_content_chars
            ),
            research_quality: quality,
            completion_status,
        },
        key_insights,
        research_metrics: ResearchMetrics {
            sources_discovered,
            sources_analyzed,
            total_content_chars,
            success_rate,
        },
        content_overview: ContentOverview {
            primary_keywords: keyword_names.iter().take(5).cloned().collect(),
            sentiment: if sources_analyzed > 0 {
                sentiment.classification.to_string()
            } else {
                "Not determined".to_string()
            },
            main_topics: topic_names.iter().take(5).cloned().collect(),
            information_density: information_density(total_content_chars).to_string(),
        },
        key_findings: key_findings(analyzed, config),
        recommendations: recommendations(topic, &keyword_names, sentiment, sources_analyzed),
        research_limitations: vec![
            "Some sources may require manual verification".to_string(),
            "Content extraction is limited by website accessibility".to_string(),
            "Analysis is based on publicly available information".to_string(),
        ],
        total_sources_analyzed: sources_analyzed,
        operations,
    }
}

fn quality_tier(sources: usize, content_chars: usize, config: &ReportConfig) -> QualityTier {
    if sources > config.high_min_sources && content_chars > config.high_min_chars {
        QualityTier::High
    } else if sources > config.medium_min_sources && content_chars > config.medium_min_chars {
        QualityTier::Medium
    } else {
        QualityTier::Low
    }
}

fn information_density(content_chars: usize) -> &'static str {
    if content_chars > 10_000 {
        "High"
    } else if content_chars > 3_000 {
        "Medium"
    } else {
        "Low"
    }
}

fn key_findings(analyzed: &[SourceAnalysis], config: &ReportConfig) -> Vec<KeyFinding> {
    let mut findings: Vec<KeyFinding> = analyzed
        .iter()
        .filter(|s| s.capture.content.summary.chars().count() > 50)
        .map(|s| {
            let title = if s.capture.metadata.title.is_empty() {
                s.source.title.clone()
            } else {
                s.capture.metadata.title.clone()
            };
            KeyFinding {
                source: title,
                url: s.source.url.clone(),
                finding: truncate_with_ellipsis(&s.capture.content.summary, config.finding_chars),
                relevance: s.relevance_score,
            }
        })
        .collect();

    findings.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    findings.truncate(config.max_key_findings);
    findings
}

fn recommendations(
    topic: &str,
    keywords: &[String],
    sentiment: &SentimentAnalysis,
    sources_analyzed: usize,
) -> Vec<String> {
    let mut recommendations = vec![
        format!("Continue monitoring developments in {}", topic),
        "Cross-reference findings with additional authoritative sources".to_string(),
    ];

    if !keywords.is_empty() {
        recommendations.push(format!(
            "Focus on key areas: {}",
            keywords.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        ));
    }

    if sources_analyzed > 0 {
        match sentiment.classification {
            super::analysis::Sentiment::Negative => recommendations
                .push("Pay attention to potential risks or challenges identified".to_string()),
            super::analysis::Sentiment::Positive => recommendations
                .push("Explore opportunities highlighted in the research".to_string()),
            super::analysis::Sentiment::Neutral => {}
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::analysis::{analyze_sentiment, text_statistics, Sentiment};
    use crate::research::config::AnalysisConfig;
    use crate::research::extract::{ExtractedContent, MediaInfo, PageMetadata};
    use crate::research::orchestrator::PageCapture;
    use crate::research::search::SearchResult;

    fn capture(url: &str, text: &str) -> PageCapture {
        let full_text = text.to_string();
        PageCapture {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code: 200,
            content_type: Some("text/html".to_string()),
            metadata: PageMetadata::default(),
            statistics: text_statistics(&full_text),
            content: ExtractedContent {
                word_count: full_text.split_whitespace().count(),
                character_count: full_text.chars().count(),
                summary: full_text.clone(),
                paragraphs: Vec::new(),
                full_text,
            },
            analysis: Default::default(),
            links: Vec::new(),
            total_links: 0,
            media: MediaInfo::default(),
            structured_data: Vec::new(),
        }
    }

    fn analyzed_source(url: &str, relevance: f64, chars: usize) -> SourceAnalysis {
        let text = "x ".repeat(chars / 2);
        SourceAnalysis {
            source: SearchResult {
                title: format!("Source at {}", url),
                url: url.to_string(),
                snippet: String::new(),
                position: 1,
            },
            capture: capture(url, &text),
            relevance_score: relevance,
        }
    }

    fn neutral_sentiment() -> SentimentAnalysis {
        analyze_sentiment(["plain text"], &AnalysisConfig::default())
    }

    fn synthesize_with(
        analyzed: &[SourceAnalysis],
        operations: Vec<OperationRecord>,
    ) -> ResearchReport {
        synthesize(
            "test topic",
            10,
            analyzed,
            &[],
            &neutral_sentiment(),
            &[],
            operations,
            &ReportConfig::default(),
        )
    }

    #[test]
    fn test_quality_tier_thresholds() {
        let config = ReportConfig::default();
        assert_eq!(quality_tier(9, 6000, &config), QualityTier::High);
        assert_eq!(quality_tier(9, 4000, &config), QualityTier::Medium);
        assert_eq!(quality_tier(5, 2500, &config), QualityTier::Medium);
        assert_eq!(quality_tier(5, 1500, &config), QualityTier::Low);
        assert_eq!(quality_tier(1, 90_000, &config), QualityTier::Low);
        assert_eq!(quality_tier(0, 0, &config), QualityTier::Low);
    }

    #[test]
    fn test_failures_are_counted_but_not_analyzed() {
        let analyzed = vec![
            analyzed_source("https://a.example.org", 0.9, 400),
            analyzed_source("https://b.example.org", 0.5, 400),
            analyzed_source("https://c.example.org", 0.7, 400),
        ];
        let operations = vec![
            OperationRecord::success(PipelineStage::Fetch, "https://a.example.org"),
            OperationRecord::success(PipelineStage::Fetch, "https://b.example.org"),
            OperationRecord::success(PipelineStage::Fetch, "https://c.example.org"),
            OperationRecord::failure(PipelineStage::Fetch, "https://d.example.org", "dns failure"),
            OperationRecord::failure(PipelineStage::Fetch, "https://e.example.org", "timeout"),
        ];

        let report = synthesize_with(&analyzed, operations);
        assert_eq!(report.total_sources_analyzed, 3);
        assert_eq!(report.research_metrics.success_rate, 60.0);

        let failed_targets: Vec<&str> = report
            .operations
            .iter()
            .filter(|op| !op.succeeded())
            .map(|op| op.target.as_str())
            .collect();
        assert_eq!(failed_targets, vec!["https://d.example.org", "https://e.example.org"]);
    }

    #[test]
    fn test_key_findings_sorted_by_relevance() {
        let analyzed = vec![
            analyzed_source("https://low.example.org", 0.2, 400),
            analyzed_source("https://high.example.org", 0.9, 400),
            analyzed_source("https://mid.example.org", 0.5, 400),
        ];

        let report = synthesize_with(&analyzed, Vec::new());
        let relevances: Vec<f64> = report.key_findings.iter().map(|f| f.relevance).collect();
        assert_eq!(relevances, vec![0.9, 0.5, 0.2]);
    }

    #[test]
    fn test_zero_source_run_is_well_formed() {
        let operations = vec![OperationRecord::failure(
            PipelineStage::Search,
            "test topic",
            "no results from any backend",
        )];

        let report = synthesize_with(&[], operations);
        assert_eq!(report.executive_summary.research_quality, QualityTier::Low);
        assert_eq!(report.total_sources_analyzed, 0);
        assert!(report.key_insights.is_empty());
        assert!(report.key_findings.is_empty());
        assert_eq!(report.executive_summary.completion_status, "No sources could be analyzed");
        assert_eq!(report.content_overview.sentiment, "Not determined");
    }

    #[test]
    fn test_sentiment_drives_recommendations() {
        let negative = analyze_sentiment(["a crisis and a failure and a problem"], &AnalysisConfig::default());
        assert_eq!(negative.classification, Sentiment::Negative);

        let recs = recommendations("energy", &[], &negative, 3);
        assert!(recs.iter().any(|r| r.contains("risks or challenges")));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = synthesize_with(&[analyzed_source("https://a.example.org", 0.4, 400)], Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["executive_summary"]["research_quality"], "LOW");
        assert_eq!(json["total_sources_analyzed"], 1);
    }
}
