use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Section, SCORING_SERVICE};
use crate::parser::text;

// Tolerant of the heading/list boundary: matches whether "Critical Services"
// sits in a heading, a paragraph, or a bare line before the list.
static CRITICAL_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)critical\s+services\s*:?(.{0,4000}?)(?:<h2[^>]*>|\z)").unwrap());
static DISABLE_THE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)disable\s+the\s+([A-Za-z0-9 ()./_-]{1,60}?)\s+service").unwrap()
});
static SHOULD_BE_DISABLED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:the\s+)?([A-Za-z0-9()./_-][A-Za-z0-9 ()./_-]{0,59}?)\s+service\s+should\s+be\s+disabled",
    )
    .unwrap()
});

/// How far back to look for a negating "do not" before a disable match.
const NEGATION_WINDOW: usize = 30;

const MAX_SERVICE_NAME: usize = 50;

pub struct ServicePolicy {
    pub critical: Vec<String>,
    pub prohibited: Vec<String>,
}

/// Three passes, in order: the critical-services list, disable-intent
/// scanning, and the scoring-engine override. The override is a final
/// correction step and must stay last; reordering it under the other two
/// silently breaks the protection.
pub fn extract(html: &str, sections: &[Section]) -> ServicePolicy {
    let mut critical = critical_from_section(html, sections);

    let mut prohibited: Vec<String> = Vec::new();
    for re in [&*DISABLE_THE_RE, &*SHOULD_BE_DISABLED_RE] {
        for caps in re.captures_iter(html) {
            if negated(html, caps.get(0).unwrap().start()) {
                continue;
            }
            let name = caps[1].trim().to_string();
            if name.is_empty() || name.len() >= MAX_SERVICE_NAME {
                continue;
            }
            if critical.iter().any(|c| c.eq_ignore_ascii_case(&name)) {
                continue;
            }
            if !prohibited.iter().any(|p| p.eq_ignore_ascii_case(&name)) {
                prohibited.push(name);
            }
        }
    }

    // Scoring-engine override: the scoring service must never be disabled,
    // whatever the rest of the brief pattern-matched to.
    let lower = html.to_lowercase();
    if lower.contains("do not stop") && lower.contains("ccs client") {
        prohibited.retain(|s| !s.to_lowercase().contains("ccs"));
        if !critical
            .iter()
            .any(|s| s.to_lowercase().contains("ccs client"))
        {
            critical.push(SCORING_SERVICE.to_string());
        }
    }

    ServicePolicy {
        critical,
        prohibited,
    }
}

fn critical_from_section(html: &str, sections: &[Section]) -> Vec<String> {
    let body = sections
        .iter()
        .find(|s| s.heading.to_lowercase().starts_with("critical services"))
        .map(|s| s.body.clone())
        .or_else(|| CRITICAL_SECTION_RE.captures(html).map(|caps| caps[1].to_string()));

    let Some(body) = body else {
        return Vec::new();
    };

    let mut critical = Vec::new();
    for item in text::list_items(&body) {
        let bare = item.trim_matches(['(', ')']).trim();
        if bare.is_empty() || bare.eq_ignore_ascii_case("none") {
            continue;
        }
        if !critical.iter().any(|c: &String| c.eq_ignore_ascii_case(&item)) {
            critical.push(item);
        }
    }
    critical
}

/// regex has no lookbehind, so the "do not " guard is a manual check of the
/// text window preceding the match.
fn negated(html: &str, match_start: usize) -> bool {
    let mut window_start = match_start.saturating_sub(NEGATION_WINDOW);
    while !html.is_char_boundary(window_start) {
        window_start -= 1;
    }
    let window = html[window_start..match_start].to_lowercase();
    window.contains("do not") || window.contains("don't")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sections::extract_sections;

    fn run(html: &str) -> ServicePolicy {
        let sections = extract_sections(html);
        extract(html, &sections)
    }

    #[test]
    fn critical_list_from_section() {
        let html = "<h2>Critical Services</h2><ul><li>DNS Server</li><li>World Wide Web Publishing</li></ul>";
        let policy = run(html);
        assert_eq!(policy.critical, vec!["DNS Server", "World Wide Web Publishing"]);
    }

    #[test]
    fn critical_none_yields_empty() {
        let html = "<h2>Critical Services</h2><ul><li>(none)</li></ul>";
        let policy = run(html);
        assert!(policy.critical.is_empty());
    }

    #[test]
    fn critical_without_heading_tag() {
        let html = "<p>Critical Services:</p><ul><li>FTP Server</li></ul>";
        let policy = run(html);
        assert_eq!(policy.critical, vec!["FTP Server"]);
    }

    #[test]
    fn disable_intent_patterns() {
        let html = "<p>Please disable the Telnet service.</p>\
                    <p>The Remote Registry service should be disabled.</p>";
        let policy = run(html);
        assert_eq!(policy.prohibited, vec!["Telnet", "Remote Registry"]);
    }

    #[test]
    fn warning_is_not_an_instruction() {
        let html = "<p>Do not stop or disable the CCS Client service.</p>";
        let policy = run(html);
        assert!(policy.prohibited.is_empty());
    }

    #[test]
    fn critical_entries_never_prohibited() {
        let html = "<h2>Critical Services</h2><ul><li>DNS Server</li></ul>\
                    <p>disable the DNS Server service</p>";
        let policy = run(html);
        assert!(policy.prohibited.is_empty());
    }

    #[test]
    fn scoring_override_purges_prohibited() {
        let html = "<p>Do not stop the CCS Client under any circumstances.</p>\
                    <p>You may want to disable the CCS Updater service.</p>";
        let policy = run(html);
        assert!(policy.prohibited.iter().all(|s| !s.to_lowercase().contains("ccs")));
        assert!(policy.critical.iter().any(|s| s == "CCS Client"));
    }

    #[test]
    fn scoring_override_beats_explicit_none() {
        let html = "<h2>Critical Services</h2><ul><li>(none)</li></ul>\
                    <p>Do not stop or disable the CCS Client service.</p>";
        let policy = run(html);
        assert!(policy.critical.iter().any(|s| s == "CCS Client"));
        assert!(policy.prohibited.is_empty());
    }

    #[test]
    fn no_service_text_yields_empty_policy() {
        let policy = run("<p>Nothing about services here.</p>");
        assert!(policy.critical.is_empty());
        assert!(policy.prohibited.is_empty());
    }
}
