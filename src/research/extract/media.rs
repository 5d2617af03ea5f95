use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::research::config::ExtractionConfig;

#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoRecord {
    pub src: String,
}

/// Images and videos referenced by a page, with sources resolved to
/// absolute URLs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MediaInfo {
    pub images: Vec<ImageRecord>,
    pub videos: Vec<VideoRecord>,
}

pub fn extract_media(html: &str, base_url: &str, config: &ExtractionConfig) -> MediaInfo {
    let base = Url::parse(base_url).ok();
    let document = Html::parse_document(html);
    let mut media = MediaInfo::default();

    if let Ok(selector) = Selector::parse("img[src]") {
        for element in document.select(&selector) {
            if media.images.len() >= config.max_images {
                break;
            }
            let Some(src) = element.value().attr("src") else {
                continue;
            };
            let Some(src) = resolve(&base, src) else {
                continue;
            };
            media.images.push(ImageRecord {
                src,
                alt: element.value().attr("alt").unwrap_or_default().to_string(),
            });
        }
    }

    if let Ok(selector) = Selector::parse("video[src], video source[src]") {
        for element in document.select(&selector) {
            if media.videos.len() >= config.max_videos {
                break;
            }
            let Some(src) = element.value().attr("src") else {
                continue;
            };
            let Some(src) = resolve(&base, src) else {
                continue;
            };
            media.videos.push(VideoRecord { src });
        }
    }

    media
}

fn resolve(base: &Option<Url>, src: &str) -> Option<String> {
    match base {
        Some(base) => base
            .join(src)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .map(|u| u.to_string()),
        None if src.starts_with("http") => Some(src.to_string()),
        None => None,
    }
}
