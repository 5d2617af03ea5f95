use scraper::{Html, Selector};
use serde::Serialize;

/// One embedded structured-data block. Only JSON-LD is recognized.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredDataBlock {
    pub kind: String,
    pub data: serde_json::Value,
}

/// Parse embedded JSON-LD blocks. A block that is not valid JSON is
/// silently skipped; it never aborts the page's extraction.
pub fn extract_structured_data(html: &str) -> Vec<StructuredDataBlock> {
    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut blocks = Vec::new();

    for element in document.select(&selector) {
        let raw = element.text().collect::<String>();
        match serde_json::from_str::<serde_json::Value>(raw.trim()) {
            Ok(data) => blocks.push(StructuredDataBlock {
                kind: "json-ld".to_string(),
                data,
            }),
            Err(e) => log::debug!("skipping unparseable json-ld block: {}", e),
        }
    }

    blocks
}
