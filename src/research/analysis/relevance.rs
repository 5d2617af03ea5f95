use std::collections::HashSet;

use super::round_to;
use crate::research::config::AnalysisConfig;

/// Score a document's relevance to a query.
///
/// The query is split into distinct lowercase terms; each ratio is the
/// fraction of terms present in the title or body. Titles are short and
/// high-variance, so the body carries the larger weight. Result is in
/// [0, 1], rounded to three decimals; an empty query scores 0.
pub fn score(query: &str, title: &str, body: &str, config: &AnalysisConfig) -> f64 {
    let terms: HashSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    if terms.is_empty() {
        return 0.0;
    }

    let title_lower = title.to_lowercase();
    let body_lower = body.to_lowercase();

    let title_hits = terms.iter().filter(|t| title_lower.contains(t.as_str())).count();
    let body_hits = terms.iter().filter(|t| body_lower.contains(t.as_str())).count();

    let total = terms.len() as f64;
    let title_ratio = title_hits as f64 / total;
    let body_ratio = body_hits as f64 / total;

    round_to(
        config.title_weight * title_ratio + config.body_weight * body_ratio,
        3,
    )
}
