//! Field formats and length limits for order payloads

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidateEmail;

/// Field format validators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Russian mobile number written as `+7-XXX-XXX-XX-XX`
    Phone,
    /// Syntactically valid address whose domain contains a dot
    Email,
}

impl FieldFormat {
    /// Validate a trimmed value against this format
    pub fn validate(&self, value: &str) -> bool {
        match self {
            FieldFormat::Phone => Self::is_valid_phone(value),
            FieldFormat::Email => Self::is_valid_email(value),
        }
    }

    /// Reason reported when [`FieldFormat::validate`] fails
    pub fn reason(&self) -> &'static str {
        match self {
            FieldFormat::Phone => "must match +7-XXX-XXX-XX-XX",
            FieldFormat::Email => "must be a valid email address",
        }
    }

    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PHONE_REGEX
            .get_or_init(|| Regex::new(r"^\+7-[0-9]{3}-[0-9]{3}-[0-9]{2}-[0-9]{2}$").expect("static regex"));
        regex.is_match(phone)
    }

    fn is_valid_email(email: &str) -> bool {
        if !email.validate_email() {
            return false;
        }
        // Domain literals such as `[1.2.3.4]` are not accepted.
        email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.') && !domain.starts_with('['))
    }
}

/// Maximum length, in characters, of each free-text field
pub fn max_chars(field: &str) -> Option<usize> {
    match field {
        "equipment_type" | "equipment_id" | "requester_name" | "department" => Some(120),
        "issue_description" => Some(2000),
        "contact_email" => Some(255),
        _ => None,
    }
}
