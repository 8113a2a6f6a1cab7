use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{is_plausible_new_username, ActionKind, ActionableItem};
use crate::parser::text;

/// Paragraphs shorter than this are headings, labels, or noise.
const MIN_PARAGRAPH_LEN: usize = 10;

/// One entry per category, tested in this fixed order. A paragraph may match
/// several detectors and yield several items; de-dup happens on
/// (kind, description) at insertion.
const DETECTORS: &[(&str, Detector)] = &[
    ("user-creation", detect_user_creation),
    ("group-management", detect_group),
    ("service", detect_service),
    ("software", detect_software),
    ("security-policy", detect_security_policy),
    ("file-operation", detect_file_operation),
];

type Detector = fn(&Paragraph) -> Option<ActionableItem>;

struct Paragraph {
    raw: String,
    text: String,
    lower: String,
}

/// Classify every paragraph-level element of the brief against the category
/// detectors. Each detector that cannot pin down a concrete entity yields
/// nothing rather than a vague placeholder row.
pub fn extract(html: &str) -> Vec<ActionableItem> {
    let mut items: Vec<ActionableItem> = Vec::new();

    for raw in text::paragraphs(html) {
        let plain = text::strip_tags(&raw).replace('\n', " ");
        if plain.len() < MIN_PARAGRAPH_LEN {
            continue;
        }
        let para = Paragraph {
            lower: plain.to_lowercase(),
            text: plain,
            raw,
        };
        for (_, detect) in DETECTORS {
            if let Some(item) = detect(&para) {
                let duplicate = items
                    .iter()
                    .any(|i| i.kind == item.kind && i.description == item.description);
                if !duplicate {
                    items.push(item);
                }
            }
        }
    }

    items
}

fn item(
    kind: ActionKind,
    description: String,
    para: &Paragraph,
    details: &[(&str, &str)],
) -> ActionableItem {
    ActionableItem {
        kind,
        description,
        raw_text: para.raw.clone(),
        details: details
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

// ── User creation ──

static USER_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r#"(?i)(?:user|account)\s+(?:named|called)\s+["']?([A-Za-z][A-Za-z0-9._-]{1,29})"#)
            .unwrap(),
        Regex::new(
            r#"(?i)create\s+(?:a\s+)?(?:new\s+)?(?:user\s+account|account|user)\s+for\s+["']?([A-Za-z][A-Za-z0-9._-]{1,29})"#,
        )
        .unwrap(),
        Regex::new(r#"(?i)add\s+(?:a\s+)?(?:new\s+)?user\s+["']?([A-Za-z][A-Za-z0-9._-]{1,29})\b"#)
            .unwrap(),
    ]
});

fn detect_user_creation(para: &Paragraph) -> Option<ActionableItem> {
    let verbed = para.lower.contains("create")
        || para.lower.contains("add")
        || para.lower.contains("make");
    if !verbed || !(para.lower.contains("user") || para.lower.contains("account")) {
        return None;
    }
    let captured = USER_NAME_PATTERNS
        .iter()
        .find_map(|re| re.captures(&para.text).map(|caps| caps[1].to_string()))?;
    let name = text::trim_punctuation(&captured);
    if !is_plausible_new_username(name) {
        return None;
    }
    Some(item(
        ActionKind::CreateUser,
        format!("Create user account '{}'", name),
        para,
        &[("Username", name)],
    ))
}

// ── Group management ──

static GROUP_NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)group\s+(?:named|called)\s+["']?([A-Za-z][A-Za-z0-9 _-]{0,28}?)["']?(?:\s+(?:and|with|group)\b|[.,:;!?]|\s*$)"#)
        .unwrap()
});
static ADD_TO_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)add\s+["']?([A-Za-z][A-Za-z0-9._-]{1,29})["']?\s+to\s+(?:the\s+)?["']?([A-Za-z][A-Za-z0-9 _-]{0,28}?)["']?\s+group"#)
        .unwrap()
});
static REMOVE_FROM_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)remove\s+["']?([A-Za-z][A-Za-z0-9._-]{1,29})["']?\s+from\s+(?:the\s+)?["']?([A-Za-z][A-Za-z0-9 _-]{0,28}?)["']?\s+group"#)
        .unwrap()
});

/// Sub-classified by keyword priority: create > add-to > remove-from.
/// A generic "group" mention with no extractable entity yields nothing.
fn detect_group(para: &Paragraph) -> Option<ActionableItem> {
    if !para.lower.contains("group") {
        return None;
    }

    if para.lower.contains("create") || para.lower.contains("make") {
        if let Some(caps) = GROUP_NAMED_RE.captures(&para.text) {
            let group = caps[1].trim().to_string();
            return Some(item(
                ActionKind::CreateGroup,
                format!("Create group '{}'", group),
                para,
                &[("GroupName", group.as_str())],
            ));
        }
    }
    if para.lower.contains("add") {
        if let Some(caps) = ADD_TO_GROUP_RE.captures(&para.text) {
            let user = text::trim_punctuation(&caps[1]).to_string();
            let group = caps[2].trim().to_string();
            if is_plausible_new_username(&user) {
                return Some(item(
                    ActionKind::AddUserToGroup,
                    format!("Add '{}' to group '{}'", user, group),
                    para,
                    &[("Username", user.as_str()), ("GroupName", group.as_str())],
                ));
            }
        }
    }
    if para.lower.contains("remove") {
        if let Some(caps) = REMOVE_FROM_GROUP_RE.captures(&para.text) {
            let user = text::trim_punctuation(&caps[1]).to_string();
            let group = caps[2].trim().to_string();
            if is_plausible_new_username(&user) {
                return Some(item(
                    ActionKind::RemoveUserFromGroup,
                    format!("Remove '{}' from group '{}'", user, group),
                    para,
                    &[("Username", user.as_str()), ("GroupName", group.as_str())],
                ));
            }
        }
    }
    None
}

// ── Services ──

static SERVICE_WARNING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)do not\s+(?:stop|disable)").unwrap());
static SERVICE_BEFORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:[A-Z][A-Za-z0-9()./-]*\s+){0,4}[A-Z][A-Za-z0-9()./-]*)\s+[sS]ervice").unwrap()
});
static SERVICE_NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)service\s+(?:named|called)\s+["']?([A-Za-z0-9 ()./_-]{2,40}?)["']?(?:[.,;]|\s+(?:is|should|must)\b|\s*$)"#)
        .unwrap()
});

/// Verbs that leak into the capitalized-run capture at sentence starts.
const SERVICE_LEAD_VERBS: &[&str] = &[
    "Ensure", "Enable", "Disable", "Stop", "Start", "Verify", "Make", "Keep", "Set", "Check",
    "Please", "The",
];

fn detect_service(para: &Paragraph) -> Option<ActionableItem> {
    let state_verb = ["enable", "disable", "start", "stop", "running"]
        .iter()
        .any(|v| para.lower.contains(v));
    let mentions = (para.lower.contains("service") && state_verb)
        || para.lower.contains("should be running");
    if !mentions {
        return None;
    }

    // A "do not stop/disable" warning marks the service critical; emitting a
    // Disable item for it would be exactly backwards.
    if SERVICE_WARNING_RE.is_match(&para.text) {
        return None;
    }

    let disabling = para.lower.contains("disable")
        || para.lower.contains("turn off")
        || para.lower.contains("should not be running")
        || para.lower.contains("stop ");
    let name = capture_service_name(&para.text)?;

    let (kind, verb) = if disabling {
        (ActionKind::DisableService, "Disable")
    } else {
        (ActionKind::EnableService, "Enable")
    };
    Some(item(
        kind,
        format!("{} the '{}' service", verb, name),
        para,
        &[("ServiceName", name.as_str())],
    ))
}

fn capture_service_name(text: &str) -> Option<String> {
    if let Some(caps) = SERVICE_BEFORE_RE.captures(text) {
        let mut words: Vec<&str> = caps[1].split_whitespace().collect();
        while words
            .first()
            .is_some_and(|w| SERVICE_LEAD_VERBS.contains(w))
        {
            words.remove(0);
        }
        if !words.is_empty() {
            return Some(words.join(" "));
        }
    }
    SERVICE_NAMED_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

// ── Software ──

static INSTALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:install|update)\s+(?:the\s+latest\s+version\s+of\s+)?(?:the\s+)?([A-Za-z][\w .+#-]{1,40}?)(?:\s+(?:on|to|from|for|and|immediately)\b|[.,;!?]|\s*$)",
    )
    .unwrap()
});
static REMOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:remove|uninstall)\s+(?:the\s+)?([A-Za-z][\w .+#-]{1,40}?)(?:\s+(?:from|on|and|immediately)\b|[.,;!?]|\s*$)",
    )
    .unwrap()
});

fn detect_software(para: &Paragraph) -> Option<ActionableItem> {
    // Disambiguation: user-management prose also says "remove"/"add".
    if para.lower.contains("user")
        || para.lower.contains("account")
        || para.lower.contains("home director")
    {
        return None;
    }
    let removing = para.lower.contains("remove")
        || para.lower.contains("uninstall")
        || para.lower.contains("delete");
    let installing = para.lower.contains("install") || para.lower.contains("update");
    if !removing && !installing {
        return None;
    }

    let re = if removing { &*REMOVE_RE } else { &*INSTALL_RE };
    let captured = re.captures(&para.text).map(|caps| caps[1].to_string())?;
    let name = text::trim_punctuation(&captured).to_string();
    // Product names are capitalized; lowercase captures are prose fragments.
    if !name.chars().next().is_some_and(char::is_uppercase) {
        return None;
    }

    let (kind, verb) = if removing {
        (ActionKind::RemoveSoftware, "Remove")
    } else {
        (ActionKind::InstallSoftware, "Install")
    };
    Some(item(
        kind,
        format!("{} {}", verb, name),
        para,
        &[("SoftwareName", name.as_str())],
    ))
}

// ── Security policy ──

/// Fixed category table, first hit wins. No entity capture: the output is a
/// category, not a name.
fn detect_security_policy(para: &Paragraph) -> Option<ActionableItem> {
    let lower = &para.lower;
    let password_terms = ["policy", "complexity", "length", "age", "history", "expir", "lockout"];
    let (category, description) = if lower.contains("password")
        && password_terms.iter().any(|t| lower.contains(t))
    {
        ("Password Policy", "Configure password policy requirements")
    } else if lower.contains("firewall") {
        ("Firewall", "Configure the firewall")
    } else if lower.contains("audit") {
        ("Audit Policy", "Configure audit policy")
    } else if lower.contains("action center") {
        ("Action Center", "Review Action Center settings")
    } else if lower.contains("antivirus") || lower.contains("defender") {
        ("Antivirus", "Verify antivirus protection is active")
    } else if lower.contains("security polic") || lower.contains("harden") {
        ("General", "Review general security policy")
    } else {
        return None;
    };
    Some(item(
        ActionKind::SecurityPolicy,
        description.to_string(),
        para,
        &[("Category", category)],
    ))
}

// ── File operations ──

fn detect_file_operation(para: &Paragraph) -> Option<ActionableItem> {
    let lower = &para.lower;
    if lower.contains("do not remove") || lower.contains("do not delete") {
        return None;
    }
    let verbed = lower.contains("delete") || lower.contains("remove");
    let nouned = lower.contains("file") || lower.contains("media");
    if !verbed || !nouned {
        return None;
    }
    let category = if lower.contains("media") && lower.contains("prohibited") {
        "prohibited media files"
    } else if lower.contains("hacking") {
        "hacking tools"
    } else if lower.contains("unauthorized") {
        "unauthorized files"
    } else {
        return None;
    };
    Some(item(
        ActionKind::FileOperation,
        format!("Remove {}", category),
        para,
        &[("Category", category)],
    ))
}
