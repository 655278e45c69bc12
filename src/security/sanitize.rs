//! Form payload sanitising.
//!
//! Strips markup delimiters, `javascript:` URLs and inline event-handler
//! attributes from every string field. Removal repeats until the value
//! stops changing, so fragments cannot be spliced back together into a
//! pattern that was just removed.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static JAVASCRIPT_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:").expect("static regex"));

static EVENT_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)on\w+\s*=").expect("static regex"));

/// Sanitised form fields, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// True when the field is present and not blank.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Sanitise every string-valued entry; other JSON values are dropped.
pub fn sanitize_form_data(raw: &Map<String, Value>) -> FormData {
    raw.iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key.clone(), sanitize_value(s))),
            _ => None,
        })
        .collect()
}

/// Sanitise a single string value.
pub fn sanitize_value(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let stripped: String = current.chars().filter(|c| *c != '<' && *c != '>').collect();
        let stripped = JAVASCRIPT_SCHEME.replace_all(&stripped, "");
        let stripped = EVENT_HANDLER.replace_all(&stripped, "").into_owned();
        if stripped == current {
            break;
        }
        current = stripped;
    }
    current.trim().to_string()
}
