use std::sync::LazyLock;

use regex::Regex;

use crate::model::{is_plausible_new_username, is_valid_username, GroupRequirement};
use crate::parser::text;

// Spans newlines: the member clause regularly wraps.
static GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)(?:make|create)\s+a\s+(?:new\s+)?group\s+(?:called\s+|named\s+)?["']?([A-Za-z][A-Za-z0-9 _-]{0,28}?)["']?\s+and\s+add\b[^:<]{0,120}:\s*([^<.]+)"#,
    )
    .unwrap()
});

static CREATE_ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:create|make)\s+a\s+new\s+(?:user\s+account|account|user)\s+(?:named|called|for)\s+["']?([A-Za-z][A-Za-z0-9._-]{1,29})"#,
    )
    .unwrap()
});
static NEW_EMPLOYEE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)new\s+employee[^.<]{0,80}?named\s+["']?([A-Za-z][A-Za-z0-9._-]{1,29})"#).unwrap()
});

/// "make/create a group NAME and add ... : MEMBERS" clauses. A requirement
/// is produced only when both a name and at least one valid member survive.
pub fn extract(html: &str) -> Vec<GroupRequirement> {
    GROUP_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let group_name = caps[1].trim().to_string();
            if group_name.is_empty() {
                return None;
            }
            let members = tokenize_members(&caps[2]);
            if members.is_empty() {
                return None;
            }
            Some(GroupRequirement {
                group_name,
                members,
            })
        })
        .collect()
}

/// Dedicated new-account patterns, separate from the actionable-item
/// classifier which also feeds `users_to_create`.
pub fn extract_new_users(html: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for re in [&*CREATE_ACCOUNT_RE, &*NEW_EMPLOYEE_RE] {
        for caps in re.captures_iter(html) {
            let name = text::trim_punctuation(&caps[1]).to_string();
            if !is_plausible_new_username(&name) {
                continue;
            }
            if !found.iter().any(|f| f.eq_ignore_ascii_case(&name)) {
                found.push(name);
            }
        }
    }
    found
}

fn tokenize_members(clause: &str) -> Vec<String> {
    text::strip_tags(clause)
        .split([',', ' ', '\t', '\n'])
        .map(text::trim_punctuation)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("and") && *t != "&")
        .filter(|t| is_valid_username(t))
        .map(str::to_string)
        .collect()
}
