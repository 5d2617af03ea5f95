use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::research::config::ExtractionConfig;
use crate::research::{collapse_whitespace, truncate_with_ellipsis};

/// Paragraphs shorter than this are treated as link lists or captions.
const MIN_PARAGRAPH_CHARS: usize = 20;

lazy_static! {
    static ref NOISE_REGIONS: Vec<Regex> = ["script", "style", "nav", "footer", "header", "aside"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")).expect("valid noise regex")
        })
        .collect();
    static ref PARAGRAPH_SELECTOR: Selector = Selector::parse("p").expect("valid selector");
}

/// Readable text pulled out of one page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedContent {
    pub full_text: String,
    pub paragraphs: Vec<String>,
    pub word_count: usize,
    pub character_count: usize,
    pub summary: String,
}

impl ExtractedContent {
    pub fn is_empty(&self) -> bool {
        self.full_text.is_empty()
    }
}

struct StrategyOutput {
    text: String,
    paragraphs: Vec<String>,
}

/// One content-isolation heuristic. Returning `None` or thin text hands
/// over to the next strategy in the chain.
trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_extract(&self, document: &Html, min_chars: usize) -> Option<StrategyOutput>;
}

/// Semantic HTML5 containers: `article`, `main`, `[role='main']`.
struct SemanticContainerStrategy;

/// Containers named after their content by convention: `.content`,
/// `.post-content` and friends.
struct ClassHeuristicStrategy;

/// Aggregates every paragraph-level block on the page.
struct ParagraphAggregationStrategy;

/// Whole-document last resort.
struct FullDocumentStrategy;

const SEMANTIC_SELECTORS: [&str; 3] = ["article", "main", "[role='main']"];

const CLASS_SELECTORS: [&str; 10] = [
    ".content",
    "#content",
    ".article",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".post",
    ".main-content",
    "#main",
    ".story-body",
];

fn first_substantial_container(
    document: &Html,
    selectors: &[&str],
    min_chars: usize,
) -> Option<StrategyOutput> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if text.chars().count() > min_chars {
                return Some(StrategyOutput {
                    text,
                    paragraphs: element_paragraphs(element),
                });
            }
        }
    }
    None
}

fn element_paragraphs(element: ElementRef) -> Vec<String> {
    element
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect()
}

fn document_paragraphs(document: &Html) -> Vec<String> {
    document
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect()
}

impl ExtractionStrategy for SemanticContainerStrategy {
    fn name(&self) -> &'static str {
        "semantic-container"
    }

    fn try_extract(&self, document: &Html, min_chars: usize) -> Option<StrategyOutput> {
        first_substantial_container(document, &SEMANTIC_SELECTORS, min_chars)
    }
}

impl ExtractionStrategy for ClassHeuristicStrategy {
    fn name(&self) -> &'static str {
        "class-heuristic"
    }

    fn try_extract(&self, document: &Html, min_chars: usize) -> Option<StrategyOutput> {
        first_substantial_container(document, &CLASS_SELECTORS, min_chars)
    }
}

impl ExtractionStrategy for ParagraphAggregationStrategy {
    fn name(&self) -> &'static str {
        "paragraph-aggregation"
    }

    fn try_extract(&self, document: &Html, _min_chars: usize) -> Option<StrategyOutput> {
        let paragraphs = document_paragraphs(document);
        if paragraphs.is_empty() {
            return None;
        }
        Some(StrategyOutput {
            text: paragraphs.join(" "),
            paragraphs,
        })
    }
}

impl ExtractionStrategy for FullDocumentStrategy {
    fn name(&self) -> &'static str {
        "full-document"
    }

    fn try_extract(&self, document: &Html, _min_chars: usize) -> Option<StrategyOutput> {
        let body_selector = Selector::parse("body").expect("valid selector");
        let text = match document.select(&body_selector).next() {
            Some(body) => body.text().collect::<String>(),
            None => document.root_element().text().collect::<String>(),
        };

        Some(StrategyOutput {
            text: collapse_whitespace(&text),
            paragraphs: document_paragraphs(document),
        })
    }
}

/// Cascade of content-isolation heuristics, most specific first.
///
/// No single heuristic isolates "main content" reliably across real-world
/// layouts; ordering from specific to permissive keeps precision high
/// before trading it for recall. A strategy's output only counts when the
/// cleaned text clears the configured length threshold; when everything
/// fails the result is empty content, not an error.
pub struct ContentExtractionChain {
    config: ExtractionConfig,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ContentExtractionChain {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            strategies: vec![
                Box::new(SemanticContainerStrategy),
                Box::new(ClassHeuristicStrategy),
                Box::new(ParagraphAggregationStrategy),
                Box::new(FullDocumentStrategy),
            ],
        }
    }

    pub fn extract(&self, html: &str) -> ExtractedContent {
        let cleaned = strip_noise_regions(html);
        let document = Html::parse_document(&cleaned);

        for strategy in &self.strategies {
            let Some(output) = strategy.try_extract(&document, self.config.min_content_length)
            else {
                continue;
            };

            let text = collapse_whitespace(&output.text);
            if text.chars().count() > self.config.min_content_length {
                log::debug!("content extracted via strategy '{}'", strategy.name());
                return self.assemble(text, output.paragraphs);
            }
            log::debug!("strategy '{}' produced below-threshold text", strategy.name());
        }

        ExtractedContent::default()
    }

    fn assemble(&self, text: String, paragraphs: Vec<String>) -> ExtractedContent {
        let full_text = truncate_with_ellipsis(&text, self.config.max_content_length);
        let summary = truncate_with_ellipsis(&full_text, self.config.summary_chars);

        ExtractedContent {
            word_count: full_text.split_whitespace().count(),
            character_count: full_text.chars().count(),
            paragraphs: paragraphs
                .into_iter()
                .take(self.config.max_paragraphs)
                .collect(),
            summary,
            full_text,
        }
    }
}

/// Drop script/style/nav/footer/header/aside regions before parsing.
fn strip_noise_regions(html: &str) -> String {
    let mut cleaned = html.to_string();
    for pattern in NOISE_REGIONS.iter() {
        cleaned = pattern.replace_all(&cleaned, " ").into_owned();
    }
    cleaned
}
