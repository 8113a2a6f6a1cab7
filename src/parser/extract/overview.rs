use std::sync::LazyLock;

use regex::Regex;

use crate::model::Section;
use crate::parser::text;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());
static OS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(Windows Server 20(?:08|12|16|19|22)(?: R2)?|Windows (?:11|10|8\.1|8|7|Vista)|Ubuntu \d{2}\.\d{2}|Debian \d+|Fedora \d+|Linux Mint \d+)\b",
    )
    .unwrap()
});

pub struct Overview {
    pub title: String,
    pub operating_system: String,
    pub scenario: String,
}

/// Best-effort descriptive fields: document title (or first <h1>), the first
/// recognizable OS name, and the scenario/overview prose.
pub fn extract(html: &str, sections: &[Section]) -> Overview {
    let title = TITLE_RE
        .captures(html)
        .or_else(|| H1_RE.captures(html))
        .map(|caps| text::strip_tags(&caps[1]))
        .unwrap_or_default();

    let operating_system = OS_RE
        .find(html)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let scenario = sections
        .iter()
        .find(|s| {
            let lower = s.heading.to_lowercase();
            lower.contains("scenario") || lower == "overview"
        })
        .map(|s| text::strip_tags(&s.body).replace('\n', " ").trim().to_string())
        .unwrap_or_default();

    Overview {
        title,
        operating_system,
        scenario,
    }
}
