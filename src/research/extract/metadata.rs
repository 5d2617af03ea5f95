use scraper::{Html, Selector};
use serde::Serialize;

use crate::research::collapse_whitespace;

/// Page metadata assembled from independent best-effort lookups.
/// A field the page does not declare stays an empty string; a missing
/// field is never an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub robots: String,
    pub viewport: String,
    pub charset: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub og_url: String,
    pub og_type: String,
    pub twitter_card: String,
    pub twitter_title: String,
    pub twitter_description: String,
}

pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    PageMetadata {
        title: element_text(&document, "title"),
        description: attr_lookup(&document, "meta[name='description']", "content"),
        keywords: attr_lookup(&document, "meta[name='keywords']", "content"),
        author: attr_lookup(&document, "meta[name='author']", "content"),
        robots: attr_lookup(&document, "meta[name='robots']", "content"),
        viewport: attr_lookup(&document, "meta[name='viewport']", "content"),
        charset: attr_lookup(&document, "meta[charset]", "charset"),
        og_title: attr_lookup(&document, "meta[property='og:title']", "content"),
        og_description: attr_lookup(&document, "meta[property='og:description']", "content"),
        og_image: attr_lookup(&document, "meta[property='og:image']", "content"),
        og_url: attr_lookup(&document, "meta[property='og:url']", "content"),
        og_type: attr_lookup(&document, "meta[property='og:type']", "content"),
        twitter_card: attr_lookup(&document, "meta[name='twitter:card']", "content"),
        twitter_title: attr_lookup(&document, "meta[name='twitter:title']", "content"),
        twitter_description: attr_lookup(&document, "meta[name='twitter:description']", "content"),
    }
}

fn element_text(document: &Html, selector_str: &str) -> String {
    Selector::parse(selector_str)
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        })
        .unwrap_or_default()
}

fn attr_lookup(document: &Html, selector_str: &str, attr: &str) -> String {
    Selector::parse(selector_str)
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string())
        })
        .unwrap_or_default()
}
