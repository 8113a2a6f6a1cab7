pub mod extract;
pub mod sections;
pub mod text;

use crate::model::PolicyDocument;

/// Three-pass pipeline: decode entities → split sections → run extractors.
pub fn parse_document(raw: &str) -> PolicyDocument {
    let decoded = text::decode_entities(raw);
    let sections = sections::extract_sections(&decoded);
    extract::extract_all(&decoded, sections)
}
