//! Validation of create payloads
//!
//! [`validate_order_payload`] turns an untrusted JSON body into a
//! [`NewOrder`]: strings are trimmed, `priority` defaults to `medium`, and
//! server-controlled fields are dropped. It never fails fast; every
//! violation is collected, in this order:
//!
//! 1. each required field is present, a string, and non-empty after trimming
//! 2. `priority`, when given, is one of `low`, `medium`, `high`
//! 3. `contact_phone` matches `+7-XXX-XXX-XX-XX`
//! 4. `contact_email` is a valid address
//! 5. length limits
//! 6. no keys outside the accepted set
//!
//! Client-supplied `status`, `id`, `order_number`, `created_at` and
//! `updated_at` are accepted and ignored.

pub mod filters;
pub mod validators;

use crate::core::error::{FieldViolation, ValidationError};
use crate::core::field::{self, FieldFormat};
use crate::core::order::{NewOrder, Priority};
use serde_json::{Map, Value};

/// Fields every create payload must carry, in reporting order
pub const REQUIRED_FIELDS: [&str; 7] = [
    "equipment_type",
    "equipment_id",
    "issue_description",
    "requester_name",
    "department",
    "contact_phone",
    "contact_email",
];

/// Fields the server owns; ignored when a client sends them
pub const SERVER_CONTROLLED_FIELDS: [&str; 5] =
    ["id", "order_number", "status", "created_at", "updated_at"];

enum Extracted {
    Absent,
    NotString,
    Text(String),
}

fn extract(body: &Map<String, Value>, field: &str) -> Extracted {
    let trim = filters::trim();
    match filters::null_as_absent()(body.get(field).cloned()) {
        None => Extracted::Absent,
        Some(value) => match trim(value) {
            Value::String(s) => Extracted::Text(s),
            _ => Extracted::NotString,
        },
    }
}

fn required_text(
    body: &Map<String, Value>,
    field: &'static str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match extract(body, field) {
        Extracted::Absent => {
            violations.push(FieldViolation::new(field, "field is required"));
            None
        }
        Extracted::NotString => {
            violations.push(FieldViolation::new(field, "must be a string"));
            None
        }
        Extracted::Text(text) => match validators::not_empty()(&text) {
            Ok(()) => Some(text),
            Err(reason) => {
                violations.push(FieldViolation::new(field, reason));
                None
            }
        },
    }
}

fn priority(body: &Map<String, Value>, violations: &mut Vec<FieldViolation>) -> Option<Priority> {
    match extract(body, "priority") {
        Extracted::Absent => Some(Priority::default()),
        Extracted::NotString => {
            violations.push(FieldViolation::new("priority", "must be a string"));
            None
        }
        Extracted::Text(text) => match validators::one_of(Priority::NAMES)(&text) {
            Ok(()) => text.parse().ok(),
            Err(reason) => {
                violations.push(FieldViolation::new("priority", reason));
                None
            }
        },
    }
}

fn check(
    field: &'static str,
    value: Option<&String>,
    validator: impl Fn(&str) -> Result<(), String>,
    violations: &mut Vec<FieldViolation>,
) {
    if let Some(value) = value
        && let Err(reason) = validator(value)
    {
        violations.push(FieldViolation::new(field, reason));
    }
}

fn is_accepted_key(key: &str) -> bool {
    REQUIRED_FIELDS.contains(&key) || SERVER_CONTROLLED_FIELDS.contains(&key) || key == "priority"
}

/// Validate and normalize a create payload.
///
/// No side effects; on failure the error lists every `(field, reason)`
/// violation found.
pub fn validate_order_payload(payload: &Value) -> Result<NewOrder, ValidationError> {
    let Some(body) = payload.as_object() else {
        return Err(ValidationError::single("body", "JSON body must be an object"));
    };

    let mut violations = Vec::new();

    let equipment_type = required_text(body, "equipment_type", &mut violations);
    let equipment_id = required_text(body, "equipment_id", &mut violations);
    let issue_description = required_text(body, "issue_description", &mut violations);
    let requester_name = required_text(body, "requester_name", &mut violations);
    let department = required_text(body, "department", &mut violations);
    let contact_phone = required_text(body, "contact_phone", &mut violations);
    let contact_email = required_text(body, "contact_email", &mut violations);

    let priority = priority(body, &mut violations);

    check(
        "contact_phone",
        contact_phone.as_ref(),
        validators::format(FieldFormat::Phone),
        &mut violations,
    );
    check(
        "contact_email",
        contact_email.as_ref(),
        validators::format(FieldFormat::Email),
        &mut violations,
    );

    for (name, value) in [
        ("equipment_type", equipment_type.as_ref()),
        ("equipment_id", equipment_id.as_ref()),
        ("issue_description", issue_description.as_ref()),
        ("requester_name", requester_name.as_ref()),
        ("department", department.as_ref()),
        ("contact_email", contact_email.as_ref()),
    ] {
        if let Some(max) = field::max_chars(name) {
            check(name, value, validators::max_chars(max), &mut violations);
        }
    }

    for key in body.keys().filter(|key| !is_accepted_key(key)) {
        violations.push(FieldViolation::new(key.as_str(), "unknown field"));
    }

    match (
        equipment_type,
        equipment_id,
        issue_description,
        requester_name,
        department,
        contact_phone,
        contact_email,
        priority,
    ) {
        (
            Some(equipment_type),
            Some(equipment_id),
            Some(issue_description),
            Some(requester_name),
            Some(department),
            Some(contact_phone),
            Some(contact_email),
            Some(priority),
        ) if violations.is_empty() => Ok(NewOrder {
            equipment_type,
            equipment_id,
            issue_description,
            priority,
            requester_name,
            department,
            contact_phone,
            contact_email,
        }),
        _ => Err(ValidationError::new(violations)),
    }
}
