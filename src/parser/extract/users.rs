use std::sync::LazyLock;

use regex::Regex;

use crate::model::{
    is_valid_username, AuthorizedUser, Section, MAX_USERNAME_LINE, PRIMARY_USER_MARKER,
};
use crate::parser::text;

static PRE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").unwrap());
static PASSWORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^password\s?:\s*(.*)$").unwrap());
static YOU_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\(\s*you\s*\)").unwrap());

/// Parse the authorized-user block into (administrators, standard users).
/// Yields two empty lists when no candidate block exists.
pub fn extract(html: &str, sections: &[Section]) -> (Vec<AuthorizedUser>, Vec<AuthorizedUser>) {
    match locate_user_block(html, sections) {
        Some(block) => parse_user_block(&block),
        None => (Vec::new(), Vec::new()),
    }
}

/// Prefer a section titled with "Authorized Administrators"; otherwise scan
/// preformatted blocks for one that talks about accounts at all. The section
/// heading is kept as the block's first line so the mode scanner sees it.
fn locate_user_block(html: &str, sections: &[Section]) -> Option<String> {
    if let Some(s) = sections
        .iter()
        .find(|s| s.heading.to_lowercase().contains("authorized administrators"))
    {
        return Some(format!("{}\n{}", s.heading, s.body));
    }

    PRE_RE
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .find(|block| {
            let lower = block.to_lowercase();
            lower.contains("authorized")
                || lower.contains("administrator")
                || lower.contains("password")
        })
}

/// Which list the most recent username landed in, so a following
/// "Password:" line can be attributed to it.
enum LastUser {
    None,
    Admin(usize),
    User(usize),
}

/// Line scanner with two mutually exclusive modes. Headers and data are
/// interleaved in free-form text, so mode flags plus a most-recent-user
/// cursor is the whole state.
fn parse_user_block(markup: &str) -> (Vec<AuthorizedUser>, Vec<AuthorizedUser>) {
    let plain = text::strip_tags(markup);
    let mut admins: Vec<AuthorizedUser> = Vec::new();
    let mut users: Vec<AuthorizedUser> = Vec::new();
    let mut in_admins = false;
    let mut in_users = false;
    let mut last = LastUser::None;

    for line in plain.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();

        if lower.contains("authorized administrators") || lower.contains("authorized admins") {
            in_admins = true;
            in_users = false;
            continue;
        }
        if lower.contains("authorized users") || lower.contains("authorized user") {
            in_users = true;
            in_admins = false;
            continue;
        }

        // A password line belongs to the preceding username, never a new user.
        if let Some(caps) = PASSWORD_RE.captures(line) {
            let password = caps[1].trim();
            if !password.is_empty() {
                match last {
                    LastUser::Admin(i) => admins[i].password = Some(password.to_string()),
                    LastUser::User(i) => users[i].password = Some(password.to_string()),
                    LastUser::None => {}
                }
            }
            continue;
        }

        if !in_admins && !in_users {
            continue;
        }
        if line.len() >= MAX_USERNAME_LINE {
            continue;
        }

        let is_primary = lower.contains(PRIMARY_USER_MARKER);
        let name = if is_primary {
            YOU_RE.replace_all(line, "").trim().to_string()
        } else {
            line.to_string()
        };
        if !is_valid_username(&name) {
            continue;
        }

        let user = AuthorizedUser {
            username: name,
            password: None,
            is_admin: in_admins,
            is_primary_user: is_primary,
            notes: None,
        };
        if in_admins {
            admins.push(user);
            last = LastUser::Admin(admins.len() - 1);
        } else {
            users.push(user);
            last = LastUser::User(users.len() - 1);
        }
    }

    (admins, users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sections::extract_sections;

    fn parse(block: &str) -> (Vec<AuthorizedUser>, Vec<AuthorizedUser>) {
        parse_user_block(block)
    }

    #[test]
    fn admins_then_users_with_password() {
        let block = "Authorized Administrators\nalice (you)\nPassword: Tr0ub4dor&3\nAuthorized Users\nbob";
        let (admins, users) = parse(block);
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].username, "alice");
        assert!(admins[0].is_admin);
        assert!(admins[0].is_primary_user);
        assert_eq!(admins[0].password.as_deref(), Some("Tr0ub4dor&3"));
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "bob");
        assert!(!users[0].is_admin);
        assert!(!users[0].is_primary_user);
        assert!(users[0].password.is_none());
    }

    #[test]
    fn password_before_any_user_is_ignored() {
        let block = "Authorized Administrators\nPassword: orphan\ncarol";
        let (admins, _) = parse(block);
        assert_eq!(admins.len(), 1);
        assert!(admins[0].password.is_none());
    }

    #[test]
    fn password_attaches_to_most_recent_user() {
        let block = "Authorized Users\ndave\nerin\nPassword: s3cret";
        let (_, users) = parse(block);
        assert!(users[0].password.is_none());
        assert_eq!(users[1].password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn lines_outside_any_mode_are_ignored() {
        let block = "machine notes\nstray\nAuthorized Users\nfrank";
        let (admins, users) = parse(block);
        assert!(admins.is_empty());
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "frank");
    }

    #[test]
    fn overlong_lines_are_skipped() {
        let long = "x".repeat(120);
        let block = format!("Authorized Users\n{}\ngrace", long);
        let (_, users) = parse(&block);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "grace");
    }

    #[test]
    fn marker_casing_is_tolerated() {
        let block = "Authorized Administrators\nhank (YOU)";
        let (admins, _) = parse(block);
        assert_eq!(admins[0].username, "hank");
        assert!(admins[0].is_primary_user);
    }

    #[test]
    fn modes_are_mutually_exclusive() {
        let block = "Authorized Users\nivy\nAuthorized Administrators\njack";
        let (admins, users) = parse(block);
        assert_eq!(users.len(), 1);
        assert_eq!(admins.len(), 1);
        assert!(admins[0].is_admin);
    }

    #[test]
    fn block_found_via_section_heading() {
        let html = "<h2>Authorized Administrators</h2><pre>kate (you)\nPassword: pw1</pre>";
        let sections = extract_sections(html);
        let (admins, _) = extract(html, &sections);
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].username, "kate");
    }

    #[test]
    fn block_found_via_pre_scan() {
        let html = "<p>intro</p><pre>Authorized Users\nleo</pre>";
        let (admins, users) = extract(html, &[]);
        assert!(admins.is_empty());
        assert_eq!(users[0].username, "leo");
    }

    #[test]
    fn markup_inside_block_is_stripped() {
        let block = "<b>Authorized Administrators</b><br>mia<br><b>Password:</b> pw2";
        let (admins, _) = parse(block);
        assert_eq!(admins[0].username, "mia");
        assert_eq!(admins[0].password.as_deref(), Some("pw2"));
    }
}
