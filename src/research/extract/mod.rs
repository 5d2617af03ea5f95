pub mod content;
pub mod links;
pub mod media;
pub mod metadata;
pub mod structured;

pub use content::{ContentExtractionChain, ExtractedContent};
pub use links::{extract_links, LinkRecord};
pub use media::{extract_media, MediaInfo};
pub use metadata::{extract_metadata, PageMetadata};
pub use structured::{extract_structured_data, StructuredDataBlock};
