//! Shape and length checks for sanitised form data.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::security::sanitize::FormData;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?1?[\s.-]?\(?[0-9]{3}\)?[\s.-]?[0-9]{3}[\s.-]?[0-9]{4}$").expect("static regex")
});

static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s'-]{2,50}$").expect("static regex"));

static ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\s,.#-]{5,200}$").expect("static regex"));

/// Maximum length, in characters, per known field.
pub const MAX_FIELD_LENGTHS: &[(&str, usize)] = &[
    ("email", 254),
    ("phone", 20),
    ("name", 50),
    ("address", 200),
    ("message", 1000),
    ("searchQuery", 100),
];

/// Outcome of validating a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Validate the fields that are present. Absent or blank fields are not an
/// error here; required-field checks belong to each form.
pub fn validate_form_data(form: &FormData) -> ValidationResult {
    let mut errors = Vec::new();
    let filled = |field: &str| form.get(field).filter(|v| !v.is_empty());

    if let Some(email) = filled("email") {
        if !EMAIL.is_match(email) {
            errors.push("Invalid email format".to_string());
        }
    }

    if let Some(phone) = filled("phone") {
        if !PHONE.is_match(phone) {
            errors.push("Invalid phone number format".to_string());
        }
    }

    if let Some(name) = filled("name") {
        if !NAME.is_match(name) {
            errors.push(
                "Name must be 2-50 characters and contain only letters, spaces, hyphens, and apostrophes"
                    .to_string(),
            );
        }
    }

    if let Some(address) = filled("address") {
        if !ADDRESS.is_match(address) {
            errors.push("Invalid address format".to_string());
        }
    }

    for (field, max) in MAX_FIELD_LENGTHS {
        if let Some(value) = form.get(field) {
            if value.chars().count() > *max {
                errors.push(format!("{field} exceeds maximum length of {max} characters"));
            }
        }
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}
