use std::sync::LazyLock;

use regex::Regex;

use super::text;
use crate::model::Section;

static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").unwrap());

/// Split decoded markup into heading → body sections, one per `<h2>`. The
/// body is the literal markup between a heading and the next one (or end of
/// document). Non-greedy matching tolerates malformed and overlapping tags;
/// a document with no headings yields an empty list.
pub fn extract_sections(html: &str) -> Vec<Section> {
    let matches: Vec<(usize, usize, String)> = H2_RE
        .captures_iter(html)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            (whole.start(), whole.end(), text::strip_tags(&caps[1]))
        })
        .filter(|(_, _, heading)| !heading.is_empty())
        .collect();

    matches
        .iter()
        .enumerate()
        .map(|(i, (_, body_start, heading))| {
            let body_end = matches
                .get(i + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(html.len());
            Section {
                heading: heading.clone(),
                body: html[*body_start..body_end].to_string(),
            }
        })
        .collect()
}

/// Case-insensitive heading lookup over an extracted section list.
pub fn find_section<'a>(sections: &'a [Section], heading: &str) -> Option<&'a Section> {
    sections
        .iter()
        .find(|s| s.heading.eq_ignore_ascii_case(heading))
}
