use std::path::Path;

use tracing::warn;

use crate::model::PolicyDocument;
use crate::parser;

/// Read and parse a brief from disk. Load failures are reported and degrade
/// to an empty-but-valid document; a malformed README must never take down
/// the automation run before remediation starts.
pub async fn parse_file(path: &Path) -> PolicyDocument {
    if !path.exists() {
        warn!("readme not found: {}", path.display());
        return PolicyDocument::default();
    }
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => parser::parse_document(&raw),
        Err(e) => {
            warn!("failed to read {}: {}", path.display(), e);
            PolicyDocument::default()
        }
    }
}
