use std::sync::LazyLock;

use regex::Regex;

use crate::model::Section;
use crate::parser::sections::find_section;
use crate::parser::text;

const GUIDELINES_HEADING: &str = "Competition Guidelines";

// Fallback for briefs where the heading is not a proper <h2>.
static FALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)competition\s+guidelines\s*(?:</[^>]+>)?(.*?)(?:<h2[^>]*>|\z)").unwrap()
});

/// Every list item under the guidelines section, verbatim (tag-stripped,
/// trimmed). Missing section is normal, not an error.
pub fn extract(html: &str, sections: &[Section]) -> Vec<String> {
    let body = find_section(sections, GUIDELINES_HEADING)
        .map(|s| s.body.clone())
        .or_else(|| FALLBACK_RE.captures(html).map(|caps| caps[1].to_string()));

    match body {
        Some(body) => text::list_items(&body),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sections::extract_sections;

    #[test]
    fn items_from_section() {
        let html = "<h2>Competition Guidelines</h2><ul>\
                    <li>Do not attack the scoring server.</li>\
                    <li>Forensics questions are worth points.</li></ul>";
        let sections = extract_sections(html);
        let guidelines = extract(html, &sections);
        assert_eq!(guidelines.len(), 2);
        assert_eq!(guidelines[0], "Do not attack the scoring server.");
    }

    #[test]
    fn fallback_without_h2() {
        let html = "<b>Competition Guidelines</b><ul><li>Read the README first.</li></ul>";
        let guidelines = extract(html, &[]);
        assert_eq!(guidelines, vec!["Read the README first."]);
    }

    #[test]
    fn missing_section_is_silent() {
        assert!(extract("<p>No guidelines here.</p>", &[]).is_empty());
    }
}
