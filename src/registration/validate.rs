use std::fmt;
use std::sync::LazyLock;

use axum::http::Method;
use regex::Regex;
use serde_json::Value;

use super::record::NewRegistration;

/// Required keys, in the order they are reported when missing.
pub const REQUIRED_FIELDS: [&str; 5] = ["parentName", "email", "phone", "childName", "academicPath"];

// Deliberately loose: rejects only missing `@`, missing `.` after it, or whitespace.
// Unicode `\s` omits U+FEFF, so it is listed explicitly.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s\x{FEFF}@]+@[^\s\x{FEFF}@]+\.[^\s\x{FEFF}@]+$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodNotAllowed;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingFields(Vec<&'static str>),
    InvalidEmail,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            ValidationError::InvalidEmail => write!(f, "Invalid email format"),
        }
    }
}

pub fn ensure_post(method: &Method) -> Result<(), MethodNotAllowed> {
    if method == Method::POST {
        Ok(())
    } else {
        Err(MethodNotAllowed)
    }
}

/// Check a raw submission and normalize it.
///
/// All missing required fields are collected before failing. The email
/// pattern is only applied once every required field is present. A payload
/// that is not a JSON object is treated as empty; callers reject `null` first.
pub fn validate(raw: &Value) -> Result<NewRegistration, ValidationError> {
    let empty = serde_json::Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| field_text(obj.get(*key)).is_none())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let text = |key: &str| field_text(obj.get(key)).unwrap_or_default();
    let email = text("email");

    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(NewRegistration {
        parent_name: text("parentName"),
        email,
        phone: text("phone"),
        child_name: text("childName"),
        academic_path: text("academicPath"),
        message: text("message"),
    })
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Text of a field if it counts as filled in.
///
/// Absent, null, false, zero and empty strings count as not filled in.
/// Other scalars are kept as their textual form, arrays and objects as JSON.
pub fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        other @ (Value::Array(_) | Value::Object(_)) => Some(other.to_string()),
    }
}
