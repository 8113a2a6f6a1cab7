pub mod actions;
pub mod groups;
pub mod guidelines;
pub mod overview;
pub mod services;
pub mod software;
pub mod users;

use crate::model::{ActionKind, PolicyDocument, Section};

/// Run every field extractor over the decoded text and assemble the policy
/// document. Passes are independent; only the loader's decode must precede
/// them, and the scoring-engine override runs last inside the service pass.
pub fn extract_all(html: &str, sections: Vec<Section>) -> PolicyDocument {
    let mut doc = PolicyDocument {
        sections,
        ..Default::default()
    };

    let meta = overview::extract(html, &doc.sections);
    doc.title = meta.title;
    doc.operating_system = meta.operating_system;
    doc.scenario = meta.scenario;

    let (administrators, users) = users::extract(html, &doc.sections);
    doc.administrators = administrators;
    doc.users = users;

    let (required, prohibited) = software::extract(html);
    for req in required {
        doc.add_required_software(req);
    }
    for keyword in prohibited {
        doc.add_prohibited_software(&keyword);
    }

    let service_policy = services::extract(html, &doc.sections);
    doc.critical_services = service_policy.critical;
    doc.prohibited_services = service_policy.prohibited;

    doc.group_requirements = groups::extract(html);
    for name in groups::extract_new_users(html) {
        doc.add_user_to_create(&name);
    }

    doc.guidelines = guidelines::extract(html, &doc.sections);

    for item in actions::extract(html) {
        doc.add_actionable(item);
    }

    // CreateUser items feed account provisioning too.
    let from_classifier: Vec<String> = doc
        .actionable_items
        .iter()
        .filter(|i| i.kind == ActionKind::CreateUser)
        .filter_map(|i| i.details.get("Username").cloned())
        .collect();
    for name in from_classifier {
        doc.add_user_to_create(&name);
    }

    doc
}

// ── Tests ──
