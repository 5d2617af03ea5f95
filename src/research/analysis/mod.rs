pub mod relevance;

use std::collections::{HashMap, HashSet};
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::config::AnalysisConfig;

lazy_static! {
    static ref SENTENCE_TERMINATORS: Regex = Regex::new(r"[.!?]+").expect("valid regex");
    static ref NUMBERS: Regex = Regex::new(r"\d+").expect("valid regex");
    static ref WORD_TOKENS: Regex = Regex::new(r"\b\w+\b").expect("valid regex");
    static ref TOPIC_PHRASES: Regex =
        Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").expect("valid regex");
    static ref STOP_WORDS: HashSet<&'static str> = [
        "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "this",
        "that", "these", "those", "is", "are", "was", "were", "be", "been", "have", "has", "had",
        "will", "would", "could", "should", "may", "might", "can", "must",
    ]
    .into_iter()
    .collect();
}

const POSITIVE_WORDS: [&str; 12] = [
    "good", "great", "excellent", "positive", "success", "improve", "benefit", "advance",
    "progress", "innovation", "solution", "effective",
];

const NEGATIVE_WORDS: [&str; 12] = [
    "bad", "poor", "negative", "problem", "issue", "concern", "risk", "challenge", "difficulty",
    "failure", "decline", "crisis",
];

/// Structural statistics for one piece of extracted text.
/// Pure arithmetic over the input; no I/O.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentAnalysis {
    pub total_words: usize,
    pub total_sentences: usize,
    pub avg_words_per_sentence: f64,
    pub avg_chars_per_word: f64,
    pub question_count: usize,
    pub exclamation_count: usize,
    pub number_count: usize,
    pub estimated_reading_minutes: f64,
}

/// Full-text statistics with readability metrics.
#[derive(Debug, Clone, Serialize)]
pub struct TextStatistics {
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub words: usize,
    pub sentences: usize,
    pub paragraphs: usize,
    pub unique_words: usize,
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    pub words_per_paragraph: f64,
    pub lexical_diversity: f64,
    pub flesch_score: f64,
    pub reading_level: String,
    pub most_common_words: Vec<WordCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentAnalysis {
    pub score: f64,
    pub positive_hits: usize,
    pub negative_hits: usize,
    pub classification: Sentiment,
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Compute structural statistics for a text.
///
/// Sentence count is the number of terminal-punctuation runs, so an
/// ellipsis or "?!" counts once.
pub fn analyze_structure(text: &str, config: &AnalysisConfig) -> ContentAnalysis {
    let words: Vec<&str> = text.split_whitespace().collect();
    let total_words = words.len();
    let total_sentences = SENTENCE_TERMINATORS.find_iter(text).count();

    let total_word_chars: usize = words.iter().map(|w| w.chars().count()).sum();

    ContentAnalysis {
        total_words,
        total_sentences,
        avg_words_per_sentence: round_to(
            total_words as f64 / total_sentences.max(1) as f64,
            2,
        ),
        avg_chars_per_word: round_to(total_word_chars as f64 / total_words.max(1) as f64, 2),
        question_count: text.matches('?').count(),
        exclamation_count: text.matches('!').count(),
        number_count: NUMBERS.find_iter(text).count(),
        estimated_reading_minutes: round_to(
            total_words as f64 / config.reading_words_per_minute,
            1,
        ),
    }
}

/// Full text statistics including the Flesch-style readability score.
///
/// The syllable count is approximated as `avg_word_length * 0.6`; the
/// score tracks that approximation rather than an exact Flesch-Kincaid
/// implementation.
pub fn text_statistics(text: &str) -> TextStatistics {
    let words = text.split_whitespace().count();
    let sentences = SENTENCE_TERMINATORS.find_iter(text).count();
    let paragraphs = text.split("\n\n").filter(|p| !p.trim().is_empty()).count();

    let tokens: Vec<String> = WORD_TOKENS
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect();
    let unique_words = tokens.iter().collect::<HashSet<_>>().len();

    let avg_word_length = if tokens.is_empty() {
        0.0
    } else {
        tokens.iter().map(|t| t.chars().count()).sum::<usize>() as f64 / tokens.len() as f64
    };
    let avg_sentence_length = if sentences > 0 {
        words as f64 / sentences as f64
    } else {
        0.0
    };

    let flesch_score = 206.835 - (1.015 * avg_sentence_length) - (84.6 * (avg_word_length * 0.6));

    TextStatistics {
        characters: text.chars().count(),
        characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        words,
        sentences,
        paragraphs,
        unique_words,
        avg_word_length: round_to(avg_word_length, 2),
        avg_sentence_length: round_to(avg_sentence_length, 2),
        words_per_paragraph: if paragraphs > 0 {
            round_to(words as f64 / paragraphs as f64, 2)
        } else {
            0.0
        },
        lexical_diversity: if words > 0 {
            round_to(unique_words as f64 / words as f64, 3)
        } else {
            0.0
        },
        flesch_score: round_to(flesch_score, 1),
        reading_level: reading_level(flesch_score).to_string(),
        most_common_words: count_ranked(tokens, 5),
    }
}

fn reading_level(flesch_score: f64) -> &'static str {
    match flesch_score {
        s if s >= 90.0 => "Very Easy",
        s if s >= 80.0 => "Easy",
        s if s >= 70.0 => "Fairly Easy",
        s if s >= 60.0 => "Standard",
        s if s >= 50.0 => "Fairly Difficult",
        s if s >= 30.0 => "Difficult",
        _ => "Very Difficult",
    }
}

/// Top keywords by frequency, stop-word filtered.
///
/// Ties keep first-occurrence order.
pub fn extract_keywords(text: &str, top_k: usize) -> Vec<WordCount> {
    let lower = text.to_lowercase();
    let tokens = WORD_TOKENS
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|t| t.chars().count() > 3 && !STOP_WORDS.contains(t.as_str()));

    count_ranked(tokens, top_k)
}

/// Candidate topic phrases: runs of capitalized words.
pub fn identify_topics(text: &str, top_k: usize) -> Vec<WordCount> {
    let phrases = TOPIC_PHRASES
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|p| p.chars().count() > 3);

    count_ranked(phrases, top_k)
}

/// Count items and return the top `k` by descending count, ties in
/// first-occurrence order.
fn count_ranked(items: impl IntoIterator<Item = String>, top_k: usize) -> Vec<WordCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for item in items {
        if !counts.contains_key(&item) {
            order.push(item.clone());
        }
        *counts.entry(item).or_insert(0) += 1;
    }

    let mut ranked: Vec<WordCount> = order
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            WordCount { word, count }
        })
        .collect();

    // stable sort keeps first-occurrence order within equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top_k);
    ranked
}

/// Coarse lexicon-difference sentiment over a set of documents.
///
/// Each lexicon word present in a document counts as one hit for that
/// document; the score is `(positive - negative) / max(1, total hits)`.
pub fn analyze_sentiment<'a, I>(documents: I, config: &AnalysisConfig) -> SentimentAnalysis
where
    I: IntoIterator<Item = &'a str>,
{
    let mut positive_hits = 0;
    let mut negative_hits = 0;

    for document in documents {
        let lower = document.to_lowercase();
        positive_hits += POSITIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();
        negative_hits += NEGATIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();
    }

    let score = (positive_hits as f64 - negative_hits as f64)
        / (positive_hits + negative_hits).max(1) as f64;

    let classification = if score > config.positive_threshold {
        Sentiment::Positive
    } else if score < config.negative_threshold {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    SentimentAnalysis {
        score,
        positive_hits,
        negative_hits,
        classification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_structure_counts_for_mixed_punctuation() {
        let analysis = analyze_structure("Dogs are great. Are dogs loyal? Yes!", &config());
        assert_eq!(analysis.total_sentences, 3);
        assert_eq!(analysis.question_count, 1);
        assert_eq!(analysis.exclamation_count, 1);
        assert_eq!(analysis.total_words, 7);
    }

    #[test]
    fn test_punctuation_runs_count_once() {
        let analysis = analyze_structure("Wait... what?! Really.", &config());
        assert_eq!(analysis.total_sentences, 3);
        assert_eq!(analysis.question_count, 1);
        assert_eq!(analysis.exclamation_count, 1);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let text = "The 3 quick foxes jumped over 2 lazy dogs. Was it fun? Absolutely!";
        let first = analyze_structure(text, &config());
        let second = analyze_structure(text, &config());
        assert_eq!(first.total_words, second.total_words);
        assert_eq!(first.avg_words_per_sentence, second.avg_words_per_sentence);
        assert_eq!(first.number_count, second.number_count);
        assert_eq!(first.number_count, 2);
    }

    #[test]
    fn test_empty_text_analysis_is_all_zero() {
        let analysis = analyze_structure("", &config());
        assert_eq!(analysis.total_words, 0);
        assert_eq!(analysis.total_sentences, 0);
        assert_eq!(analysis.avg_chars_per_word, 0.0);
        assert_eq!(analysis.estimated_reading_minutes, 0.0);
    }

    #[test]
    fn test_reading_time_uses_configured_speed() {
        let text = vec!["word"; 400].join(" ");
        let analysis = analyze_structure(&text, &config());
        assert_eq!(analysis.estimated_reading_minutes, 2.0);
    }

    #[test]
    fn test_keywords_filter_stop_words_and_short_tokens() {
        let text = "the system improves the system with new pipeline design and the pipeline";
        let keywords = extract_keywords(text, 10);

        let words: Vec<&str> = keywords.iter().map(|k| k.word.as_str()).collect();
        assert!(words.contains(&"system"));
        assert!(words.contains(&"pipeline"));
        assert!(!words.contains(&"the"));
        assert!(!words.contains(&"and"));
        assert!(!words.contains(&"new")); // three letters
    }

    #[test]
    fn test_keyword_ties_keep_first_occurrence_order() {
        let keywords = extract_keywords("zebra apple zebra apple mango", 3);
        assert_eq!(keywords[0].word, "zebra");
        assert_eq!(keywords[1].word, "apple");
        assert_eq!(keywords[2].word, "mango");
        assert_eq!(keywords[0].count, 2);
        assert_eq!(keywords[2].count, 1);
    }

    #[test]
    fn test_topic_phrases_span_capitalized_runs() {
        let text = "Advances in Machine Learning reshape Machine Learning research across Europe";
        let topics = identify_topics(text, 5);
        assert_eq!(topics[0].word, "Machine Learning");
        assert_eq!(topics[0].count, 2);
        assert!(topics.iter().any(|t| t.word == "Europe"));
    }

    #[test]
    fn test_sentiment_positive_negative_neutral() {
        let positive = analyze_sentiment(["a great success with excellent progress"], &config());
        assert_eq!(positive.classification, Sentiment::Positive);
        assert!(positive.score > 0.0);

        let negative = analyze_sentiment(["a poor result, a failure and a crisis"], &config());
        assert_eq!(negative.classification, Sentiment::Negative);

        let neutral = analyze_sentiment(["the sky is blue today"], &config());
        assert_eq!(neutral.classification, Sentiment::Neutral);
        assert_eq!(neutral.score, 0.0);
    }

    #[test]
    fn test_sentiment_counts_hits_across_documents() {
        let analysis = analyze_sentiment(["great progress", "a serious problem"], &config());
        assert_eq!(analysis.positive_hits, 2);
        assert_eq!(analysis.negative_hits, 1);
    }

    #[test]
    fn test_statistics_for_simple_text() {
        let stats = text_statistics("One two three. Four five six.\n\nSeven eight.");
        assert_eq!(stats.words, 8);
        assert_eq!(stats.sentences, 3);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.unique_words, 8);
        assert_eq!(stats.lexical_diversity, 1.0);
        assert!(!stats.reading_level.is_empty());
    }

    #[test]
    fn test_flesch_score_falls_with_longer_words() {
        let simple = text_statistics("The cat sat on the mat. It was fun.");
        let dense = text_statistics(
            "Institutional interdependencies notwithstanding, infrastructural considerations predominate.",
        );
        assert!(simple.flesch_score > dense.flesch_score);
    }
}
