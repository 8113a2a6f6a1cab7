use std::collections::BTreeMap;

use serde::Serialize;

/// Candidate username lines longer than this are formatting noise, not names.
pub const MAX_USERNAME_LINE: usize = 100;

/// Marker the brief appends to the currently logged-in user's line.
pub const PRIMARY_USER_MARKER: &str = "(you)";

/// The scoring-engine service. Must never end up in `prohibited_services`.
pub const SCORING_SERVICE: &str = "CCS Client";

/// Dictionary words that regularly leak out of name-capture patterns.
pub const COMMON_WORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "from", "will", "have",
    "user", "account", "new", "all", "any", "each", "your", "their",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizedUser {
    pub username: String,
    pub password: Option<String>,
    pub is_admin: bool,
    pub is_primary_user: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftwareRequirement {
    pub name: String,
    pub version: Option<String>,
    pub should_be_latest: bool,
    pub is_required: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRequirement {
    pub group_name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    CreateUser,
    CreateGroup,
    AddUserToGroup,
    RemoveUserFromGroup,
    EnableService,
    DisableService,
    InstallSoftware,
    RemoveSoftware,
    ConfigureSetting,
    SecurityPolicy,
    FileOperation,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionableItem {
    pub kind: ActionKind,
    pub description: String,
    /// Verbatim source paragraph, kept for audit.
    pub raw_text: String,
    pub details: BTreeMap<String, String>,
}

/// Everything the remediation layer consumes, assembled once per parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyDocument {
    pub title: String,
    pub operating_system: String,
    pub scenario: String,
    pub administrators: Vec<AuthorizedUser>,
    pub users: Vec<AuthorizedUser>,
    pub required_software: Vec<SoftwareRequirement>,
    pub prohibited_software: Vec<String>,
    pub critical_services: Vec<String>,
    pub prohibited_services: Vec<String>,
    pub group_requirements: Vec<GroupRequirement>,
    pub users_to_create: Vec<String>,
    pub guidelines: Vec<String>,
    pub actionable_items: Vec<ActionableItem>,
    pub sections: Vec<Section>,
}

impl PolicyDocument {
    /// Case-insensitive section lookup. Iteration over `sections` preserves
    /// document order.
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.heading.eq_ignore_ascii_case(heading))
    }

    pub fn add_prohibited_software(&mut self, keyword: &str) {
        if !self
            .prohibited_software
            .iter()
            .any(|k| k.eq_ignore_ascii_case(keyword))
        {
            self.prohibited_software.push(keyword.to_string());
        }
    }

    pub fn add_required_software(&mut self, req: SoftwareRequirement) {
        if !self
            .required_software
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(&req.name))
        {
            self.required_software.push(req);
        }
    }

    pub fn add_user_to_create(&mut self, username: &str) {
        if !self
            .users_to_create
            .iter()
            .any(|u| u.eq_ignore_ascii_case(username))
        {
            self.users_to_create.push(username.to_string());
        }
    }

    /// (kind, description) is the sole de-dup key; raw text may differ.
    pub fn add_actionable(&mut self, item: ActionableItem) {
        if !self
            .actionable_items
            .iter()
            .any(|i| i.kind == item.kind && i.description == item.description)
        {
            self.actionable_items.push(item);
        }
    }
}

/// Shared validation for every extracted identity token.
pub fn is_valid_username(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() || s.len() > 50 {
        return false;
    }
    if !s.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    let lower = s.to_lowercase();
    !lower.contains("password") && !lower.contains("authorized") && !lower.contains(':')
}

/// Stricter rule for names destined for account provisioning.
pub fn is_plausible_new_username(s: &str) -> bool {
    is_valid_username(s) && s.len() >= 3 && !COMMON_WORDS.contains(&s.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rejects_reserved_substrings() {
        assert!(!is_valid_username("Password: hunter2"));
        assert!(!is_valid_username("Authorized Users"));
        assert!(!is_valid_username("note: see below"));
        assert!(is_valid_username("jsmith"));
    }

    #[test]
    fn username_needs_a_letter() {
        assert!(!is_valid_username("12345"));
        assert!(!is_valid_username("---"));
        assert!(is_valid_username("user2"));
    }

    #[test]
    fn username_length_bounds() {
        assert!(!is_valid_username(""));
        assert!(!is_valid_username(&"a".repeat(51)));
        assert!(is_valid_username(&"a".repeat(50)));
    }

    #[test]
    fn new_username_filters_common_words() {
        assert!(!is_plausible_new_username("the"));
        assert!(!is_plausible_new_username("account"));
        assert!(!is_plausible_new_username("al"));
        assert!(is_plausible_new_username("frank"));
    }

    #[test]
    fn actionable_dedup_is_kind_plus_description() {
        let mut doc = PolicyDocument::default();
        let a = ActionableItem {
            kind: ActionKind::DisableService,
            description: "Disable the 'Telnet' service".into(),
            raw_text: "first".into(),
            details: BTreeMap::new(),
        };
        let mut b = a.clone();
        b.raw_text = "second".into();
        doc.add_actionable(a);
        doc.add_actionable(b);
        assert_eq!(doc.actionable_items.len(), 1);
    }

    #[test]
    fn section_lookup_is_case_insensitive() {
        let doc = PolicyDocument {
            sections: vec![Section {
                heading: "Competition Guidelines".into(),
                body: "<ul><li>x</li></ul>".into(),
            }],
            ..Default::default()
        };
        assert!(doc.section("competition guidelines").is_some());
        assert!(doc.section("no such").is_none());
    }
}
