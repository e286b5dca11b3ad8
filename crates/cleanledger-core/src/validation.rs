//! Field validation for the transaction form
//!
//! All rules are pure: they look at the form and the type options of the
//! transaction being edited and report every failing field at once.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::form::TransactionForm;
use crate::types::TransactionType;

pub const DESCRIPTION_REQUIRED: &str = "Please enter a description";
pub const VENDOR_REQUIRED: &str = "Please enter a vendor";
pub const INVALID_CHARACTERS: &str = "This field can only contain letters, - and numbers";
pub const KEYWORD_REQUIRED: &str = "Please enter at least one keyword";
pub const TYPE_NOT_ALLOWED: &str =
    "This type does not match the debit/credit side of the transaction";

/// Form fields that can fail validation, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    SanitizedDescription,
    Type,
    Category,
    Subcategory,
    Vendor,
    Keyword,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::SanitizedDescription => write!(f, "sanitizedDescription"),
            Field::Type => write!(f, "type"),
            Field::Category => write!(f, "category"),
            Field::Subcategory => write!(f, "subcategory"),
            Field::Vendor => write!(f, "vendor"),
            Field::Keyword => write!(f, "keyword"),
        }
    }
}

/// Field name to error message, one entry per failing field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Letters, digits, hyphen and whitespace only
pub fn has_allowed_characters(value: &str) -> bool {
    static ALLOWED: OnceCell<Regex> = OnceCell::new();
    let allowed = ALLOWED.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\-\s]*$").unwrap());
    allowed.is_match(value)
}

fn required_text(value: &str, required_message: &'static str) -> Option<&'static str> {
    if value.is_empty() {
        return Some(required_message);
    }
    optional_text(value)
}

fn optional_text(value: &str) -> Option<&'static str> {
    if has_allowed_characters(value) {
        None
    } else {
        Some(INVALID_CHARACTERS)
    }
}

/// Validate the form against the type options of the edited transaction
pub fn validate(form: &TransactionForm, allowed_types: &[TransactionType]) -> FieldErrors {
    let mut errors = FieldErrors::default();

    let checks = [
        (
            Field::SanitizedDescription,
            required_text(&form.sanitized_description, DESCRIPTION_REQUIRED),
        ),
        (Field::Category, optional_text(&form.category)),
        (Field::Subcategory, optional_text(&form.subcategory)),
        (Field::Vendor, required_text(&form.vendor, VENDOR_REQUIRED)),
    ];
    for (field, failure) in checks {
        if let Some(message) = failure {
            errors.insert(field, message);
        }
    }

    if !allowed_types.contains(&form.transaction_type) {
        errors.insert(Field::Type, TYPE_NOT_ALLOWED);
    }

    // Keywords only matter when a rule is being registered.
    if form.register_rule && form.keywords().is_empty() {
        errors.insert(Field::Keyword, KEYWORD_REQUIRED);
    }

    errors
}
