use async_trait::async_trait;

use super::{SearchBackend, SearchResult};
use crate::research::errors::ResearchError;

/// A curated set of authoritative sources for one topic area.
struct TopicCategory {
    name: &'static str,
    /// Single-word aliases are matched against query tokens; multi-word
    /// aliases as phrases within the query.
    aliases: &'static [&'static str],
    sources: &'static [(&'static str, &'static str)],
}

const CATEGORIES: &[TopicCategory] = &[
    TopicCategory {
        name: "climate",
        aliases: &["climate", "global warming", "environment", "carbon", "greenhouse"],
        sources: &[
            ("NASA Climate Change", "https://climate.nasa.gov"),
            ("IPCC", "https://www.ipcc.ch"),
            ("EPA Climate Change", "https://www.epa.gov/climate-change"),
        ],
    },
    TopicCategory {
        name: "ai",
        aliases: &["ai", "artificial intelligence", "machine learning", "ml"],
        sources: &[
            ("OpenAI Research", "https://openai.com/research"),
            ("Google AI", "https://ai.google"),
            ("Microsoft AI", "https://www.microsoft.com/en-us/ai"),
        ],
    },
    TopicCategory {
        name: "technology",
        aliases: &["technology", "tech", "innovation", "software"],
        sources: &[
            ("TechCrunch", "https://techcrunch.com"),
            ("Wired", "https://www.wired.com"),
            ("Ars Technica", "https://arstechnica.com"),
        ],
    },
    TopicCategory {
        name: "science",
        aliases: &["science", "research", "physics", "biology"],
        sources: &[
            ("Nature", "https://www.nature.com"),
            ("Science", "https://science.org"),
            ("Scientific American", "https://www.scientificamerican.com"),
        ],
    },
    TopicCategory {
        name: "health",
        aliases: &["health", "medicine", "medical", "disease"],
        sources: &[
            ("World Health Organization", "https://www.who.int"),
            ("CDC", "https://www.cdc.gov"),
            ("NIH", "https://www.nih.gov"),
        ],
    },
    TopicCategory {
        name: "economics",
        aliases: &["economics", "economy", "finance", "markets"],
        sources: &[
            ("IMF", "https://www.imf.org"),
            ("World Bank", "https://www.worldbank.org"),
            ("Federal Reserve", "https://www.federalreserve.gov"),
        ],
    },
    TopicCategory {
        name: "news",
        aliases: &["news"],
        sources: &[
            ("BBC News", "https://www.bbc.com/news"),
            ("Reuters", "https://www.reuters.com"),
            ("AP News", "https://apnews.com"),
        ],
    },
];

fn category_matches(category: &TopicCategory, query_lower: &str) -> bool {
    let tokens: Vec<&str> = query_lower.split_whitespace().collect();
    category.aliases.iter().any(|alias| {
        if alias.contains(' ') {
            query_lower.contains(alias)
        } else {
            tokens.iter().any(|t| t == alias)
        }
    })
}

/// Synthesize plausible sources from the curated topic table.
///
/// Guarantees the orchestrator always has something to analyze even when
/// live search engines are unreachable. Unmatched topics fall back to the
/// general news sources.
pub fn topic_sources(query: &str, count: usize) -> Vec<SearchResult> {
    let query_lower = query.to_lowercase();

    let mut sources: Vec<(&str, &str)> = Vec::new();
    for category in CATEGORIES {
        if category_matches(category, &query_lower) {
            sources.extend(category.sources.iter().copied());
        }
    }

    if sources.is_empty() {
        let news = CATEGORIES
            .iter()
            .find(|c| c.name == "news")
            .expect("news category is always present");
        sources.extend(news.sources.iter().copied());
    }

    sources
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(index, (title, url))| SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            snippet: format!("Known authoritative source for {}", query),
            position: index + 1,
        })
        .collect()
}

/// Final chain backend: never touches the network, never fails.
pub struct TopicSourceBackend;

#[async_trait]
impl SearchBackend for TopicSourceBackend {
    fn name(&self) -> &'static str {
        "topic-sources"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, ResearchError> {
        Ok(topic_sources(query, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_match_by_token() {
        let results = topic_sources("ai trends", 5);
        assert!(results.iter().any(|r| r.url.contains("openai.com")));
    }

    #[test]
    fn test_short_alias_does_not_match_inside_words() {
        // "ai" must not match the word "air"
        let results = topic_sources("air quality report", 5);
        assert!(!results.iter().any(|r| r.url.contains("openai.com")));
    }

    #[test]
    fn test_phrase_alias_matches() {
        let results = topic_sources("effects of global warming on agriculture", 5);
        assert!(results.iter().any(|r| r.url.contains("climate.nasa.gov")));
    }

    #[test]
    fn test_unmatched_topic_falls_back_to_news() {
        let results = topic_sources("medieval basket weaving", 5);
        assert_eq!(results.len(), 3);
        assert!(results.iter().any(|r| r.url.contains("reuters.com")));
    }

    #[test]
    fn test_count_bounds_results_and_positions_are_sequential() {
        let results = topic_sources("climate technology news", 4);
        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.position, i + 1);
        }
    }

    #[tokio::test]
    async fn test_backend_never_fails() {
        let backend = TopicSourceBackend;
        let results = backend.search("anything at all", 3).await.unwrap();
        assert!(!results.is_empty());
    }
}
