use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,30});").unwrap()
});
static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</p>|</li>|</tr>|</h[1-6]>|</pre>|</div>|</ul>|</ol>").unwrap()
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static MULTI_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static LI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").unwrap());
static P_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").unwrap());

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", " "),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201C}"),
    ("rdquo", "\u{201D}"),
    ("hellip", "\u{2026}"),
    ("copy", "\u{A9}"),
    ("amp", "&"),
];

/// Decode named and numeric character references in a single pass, so
/// `&amp;lt;` comes out as `&lt;` and not `<`. Unknown entities pass through.
pub fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            if let Some(num) = body.strip_prefix('#') {
                let code = match num.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                };
                return code
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            NAMED_ENTITIES
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(body))
                .map(|(_, lit)| lit.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Remove markup, keeping block boundaries as newlines so line-oriented
/// parsing still sees real lines. Tolerates unclosed and overlapping tags.
pub fn strip_tags(html: &str) -> String {
    let with_breaks = BREAK_RE.replace_all(html, "\n");
    let stripped = TAG_RE.replace_all(&with_breaks, "");
    MULTI_SPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Inner text of every `<li>` in the fragment, tag-stripped and trimmed.
/// Empty items are dropped.
pub fn list_items(html: &str) -> Vec<String> {
    LI_RE
        .captures_iter(html)
        .map(|caps| strip_tags(&caps[1]))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Raw inner markup of every paragraph-level element (`<p>` and `<li>`),
/// in document order.
pub fn paragraphs(html: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = P_RE
        .captures_iter(html)
        .map(|caps| (caps.get(0).unwrap().start(), caps[1].to_string()))
        .collect();
    found.extend(
        LI_RE
            .captures_iter(html)
            .map(|caps| (caps.get(0).unwrap().start(), caps[1].to_string())),
    );
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, raw)| raw).collect()
}

/// Trim surrounding quotes and trailing clause punctuation off a captured
/// name. Runs to a fixpoint so `"Firefox".` loses both the period and the
/// quotes.
pub fn trim_punctuation(s: &str) -> &str {
    let mut out = s.trim();
    loop {
        let next = out
            .trim_matches(['"', '\'', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'])
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')'])
            .trim();
        if next == out {
            return out;
        }
        out = next;
    }
}
