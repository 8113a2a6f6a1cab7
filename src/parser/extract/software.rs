use std::sync::LazyLock;

use regex::Regex;

use crate::model::SoftwareRequirement;
use crate::parser::text;

/// Keyword vocabulary for the prohibited pass. These are category labels,
/// not product names; a match means the brief mentions the category at all.
const PROHIBITED_KEYWORDS: &[&str] = &[
    "hacking tools",
    "hacking software",
    "games",
    "peer-to-peer",
    "p2p",
    "torrent",
    "keygen",
    "password cracker",
    "media files",
    "remote access tools",
];

/// Words that requirement patterns capture but that are never product names.
const NAME_STOPWORDS: &[&str] = &["the", "a", "an", "for", "use", "company"];

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 50;

// Requirement phrasing varies wildly, so correctness is pattern-union: any
// one clause shape yields candidates, and the stop-word and length filters
// contain the false positives.
static LATEST_STABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)latest\s+stable\s+version\s+of\s+([^.<\n]{2,120})").unwrap()
});
static ACCESS_LATEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)access\s+to\s+the\s+latest\s+versions?\s+of\s+([^.<\n]{2,120})").unwrap()
});
static SHOULD_USE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)should\s+be\s+using\s+([^.,<\n]{2,80})").unwrap());
static DEFAULT_BROWSER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)default\s+browser\s+should\s+be\s+([^.,<\n]{2,80})").unwrap()
});
static NAME_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*,\s*and\s+|\s*,\s*|\s+and\s+").unwrap());
static NO_STORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:do not|don't|should not|must not)[^.<]{0,60}(?:microsoft|windows)\s+store")
        .unwrap()
});

const STORE_NOTE: &str = "do not install via store";

/// Two independent passes over the full decoded text: prohibited keywords by
/// containment, required software by pattern-union. Software mentions are
/// scattered across the whole brief, so neither pass is section-scoped.
pub fn extract(html: &str) -> (Vec<SoftwareRequirement>, Vec<String>) {
    let lower = html.to_lowercase();

    let prohibited: Vec<String> = PROHIBITED_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();

    let mut required: Vec<SoftwareRequirement> = Vec::new();
    let patterns = [
        &*LATEST_STABLE_RE,
        &*ACCESS_LATEST_RE,
        &*SHOULD_USE_RE,
        &*DEFAULT_BROWSER_RE,
    ];
    for re in patterns {
        for caps in re.captures_iter(html) {
            for candidate in NAME_SPLIT_RE.split(&caps[1]) {
                let name = text::trim_punctuation(candidate);
                if name.len() < MIN_NAME_LEN || name.len() > MAX_NAME_LEN {
                    continue;
                }
                if NAME_STOPWORDS.contains(&name.to_lowercase().as_str()) {
                    continue;
                }
                if required.iter().any(|r| r.name.eq_ignore_ascii_case(name)) {
                    continue;
                }
                let should_be_latest =
                    lower.contains("latest") && lower.contains(&name.to_lowercase());
                required.push(SoftwareRequirement {
                    name: name.to_string(),
                    version: None,
                    should_be_latest,
                    is_required: true,
                    notes: None,
                });
            }
        }
    }

    // Post-pass: a store prohibition elsewhere in the brief annotates every
    // requirement rather than producing its own entry.
    if NO_STORE_RE.is_match(html) {
        for req in &mut required {
            req.notes = Some(match req.notes.take() {
                Some(existing) => format!("{}; {}", existing, STORE_NOTE),
                None => STORE_NOTE.to_string(),
            });
        }
    }

    (required, prohibited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prohibited_keywords_by_containment() {
        let html = "<p>This machine has active Peer-to-Peer software and Games installed.</p>";
        let (_, prohibited) = extract(html);
        assert!(prohibited.contains(&"peer-to-peer".to_string()));
        assert!(prohibited.contains(&"games".to_string()));
    }

    #[test]
    fn latest_stable_clause() {
        let html = "<p>Users need the latest stable version of Firefox.</p>";
        let (required, _) = extract(html);
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].name, "Firefox");
        assert!(required[0].should_be_latest);
        assert!(required[0].is_required);
    }

    #[test]
    fn name_list_is_split_on_comma_and() {
        let html = "<p>Employees require access to the latest version of Chrome, VLC and 7-Zip.</p>";
        let (required, _) = extract(html);
        let names: Vec<&str> = required.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Chrome", "VLC", "7-Zip"]);
    }

    #[test]
    fn stop_words_rejected() {
        let html = "<p>Everyone should be using the company laptop and access to the latest version of the.</p>";
        let (required, _) = extract(html);
        assert!(required.iter().all(|r| !NAME_STOPWORDS
            .contains(&r.name.to_lowercase().as_str())));
    }

    #[test]
    fn default_browser_clause() {
        let html = "<p>The default browser should be Firefox</p>";
        let (required, _) = extract(html);
        assert_eq!(required[0].name, "Firefox");
    }

    #[test]
    fn duplicate_mentions_merge_case_insensitively() {
        let html = "<p>Install the latest stable version of firefox.</p>\
                    <p>The default browser should be Firefox</p>";
        let (required, _) = extract(html);
        assert_eq!(required.len(), 1);
    }

    #[test]
    fn store_prohibition_annotates_requirements() {
        let html = "<p>Users need the latest stable version of VLC.</p>\
                    <p>Software should not be installed from the Microsoft Store.</p>";
        let (required, _) = extract(html);
        assert_eq!(required[0].notes.as_deref(), Some("do not install via store"));
    }

    #[test]
    fn no_matches_yields_empty() {
        let (required, prohibited) = extract("<p>Nothing of interest here.</p>");
        assert!(required.is_empty());
        assert!(prohibited.is_empty());
    }
}
