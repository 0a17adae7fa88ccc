//! Required-field validation, both inline (one field as it is edited) and as the export
//! readiness gate (the whole document).
//!
//! Error keys: `name`, `email`, `phone` for personal info; `exp_{id}_{field}` and
//! `edu_{id}_{field}` for entries, where `field` is the camelCase field name.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{EducationField, ExperienceField, PersonalField, ResumeDocument};

/// Field-keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    /// Records `outcome` under `key`, or clears the key when the field is valid.
    pub fn set(&mut self, key: impl Into<String>, outcome: Option<String>) {
        let key = key.into();
        match outcome {
            Some(message) => {
                self.0.insert(key, message);
            }
            None => {
                self.0.remove(&key);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Drops every error whose key starts with `prefix`.
    pub fn remove_prefixed(&mut self, prefix: &str) {
        self.0.retain(|key, _| !key.starts_with(prefix));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Keys
// ────────────────────────────────────────────────────────────────────────────

pub fn experience_key(id: u32, field: ExperienceField) -> String {
    format!("exp_{id}_{}", field.key())
}

pub fn education_key(id: u32, field: EducationField) -> String {
    format!("edu_{id}_{}", field.key())
}

pub fn experience_prefix(id: u32) -> String {
    format!("exp_{id}_")
}

pub fn education_prefix(id: u32) -> String {
    format!("edu_{id}_")
}

// ────────────────────────────────────────────────────────────────────────────
// Field rules
// ────────────────────────────────────────────────────────────────────────────

const REQUIRED_EXPERIENCE: [ExperienceField; 3] = [
    ExperienceField::Company,
    ExperienceField::Position,
    ExperienceField::StartDate,
];

const REQUIRED_EDUCATION: [EducationField; 2] = [EducationField::Institution, EducationField::Degree];

/// Validates one personal-info field. Only name, email and phone are checked.
pub fn validate_personal(field: PersonalField, value: &str) -> Option<String> {
    match field {
        PersonalField::Name => required("Name", value),
        PersonalField::Email => required("Email", value).or_else(|| {
            (!is_valid_email(value)).then(|| "Invalid email format".to_string())
        }),
        PersonalField::Phone => required("Phone", value).or_else(|| {
            (!is_valid_phone(value)).then(|| "Invalid phone format".to_string())
        }),
        PersonalField::Title
        | PersonalField::Address
        | PersonalField::LinkedIn
        | PersonalField::Website => None,
    }
}

pub fn validate_experience(field: ExperienceField, value: &str) -> Option<String> {
    match field {
        ExperienceField::Company => required("Company", value),
        ExperienceField::Position => required("Position", value),
        ExperienceField::StartDate => required("Start date", value),
        ExperienceField::EndDate | ExperienceField::Description => None,
    }
}

pub fn validate_education(field: EducationField, value: &str) -> Option<String> {
    match field {
        EducationField::Institution => required("Institution", value),
        EducationField::Degree => required("Degree", value),
        EducationField::GraduationDate | EducationField::Gpa | EducationField::Description => None,
    }
}

fn required(label: &str, value: &str) -> Option<String> {
    value
        .trim()
        .is_empty()
        .then(|| format!("{label} is required"))
}

/// `^[^\s@]+@[^\s@]+\.[^\s@]+$`
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // a dot with at least one character on each side
    let chars: Vec<char> = domain.chars().collect();
    chars.len() >= 3 && chars[1..chars.len() - 1].contains(&'.')
}

/// `^[+]?[(]?[0-9]{3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$`
pub fn is_valid_phone(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    let mut pos = 0;

    let optional = |pos: &mut usize, accept: fn(char) -> bool| {
        if chars.get(*pos).copied().is_some_and(accept) {
            *pos += 1;
        }
    };
    let is_separator = |c: char| c == '-' || c == '.' || c.is_whitespace();

    optional(&mut pos, |c| c == '+');
    optional(&mut pos, |c| c == '(');
    if !digits(&chars, &mut pos, 3, 3) {
        return false;
    }
    optional(&mut pos, |c| c == ')');
    optional(&mut pos, is_separator);
    if !digits(&chars, &mut pos, 3, 3) {
        return false;
    }
    optional(&mut pos, is_separator);
    digits(&chars, &mut pos, 4, 6) && pos == chars.len()
}

fn digits(chars: &[char], pos: &mut usize, min: usize, max: usize) -> bool {
    let run = chars[*pos..]
        .iter()
        .take(max)
        .take_while(|c| c.is_ascii_digit())
        .count();
    *pos += run;
    run >= min
}

// ────────────────────────────────────────────────────────────────────────────
// Readiness
// ────────────────────────────────────────────────────────────────────────────

/// Checks every required field of the document. `Ok` means the document may be exported.
pub fn check_readiness(document: &ResumeDocument) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    for field in [PersonalField::Name, PersonalField::Email, PersonalField::Phone] {
        if let Some(message) = validate_personal(field, document.personal(field)) {
            errors.insert(field.key(), message);
        }
    }

    for entry in &document.experience {
        for field in REQUIRED_EXPERIENCE {
            let value = match field {
                ExperienceField::Company => &entry.company,
                ExperienceField::Position => &entry.position,
                _ => &entry.start_date,
            };
            if let Some(message) = validate_experience(field, value) {
                errors.insert(experience_key(entry.id, field), message);
            }
        }
    }

    for entry in &document.education {
        for field in REQUIRED_EDUCATION {
            let value = match field {
                EducationField::Institution => &entry.institution,
                _ => &entry.degree,
            };
            if let Some(message) = validate_education(field, value) {
                errors.insert(education_key(entry.id, field), message);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.set_personal(PersonalField::Name, "Jane Doe");
        doc.set_personal(PersonalField::Email, "jane@x.com");
        doc.set_personal(PersonalField::Phone, "1234567890");
        doc.update_experience(1, ExperienceField::Company, "Acme").unwrap();
        doc.update_experience(1, ExperienceField::Position, "Engineer").unwrap();
        doc.update_experience(1, ExperienceField::StartDate, "01/2020").unwrap();
        doc.update_education(1, EducationField::Institution, "State U").unwrap();
        doc.update_education(1, EducationField::Degree, "BS").unwrap();
        doc
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("jane@x.com"));
        assert!(is_valid_email("a.b@c.d.e"));
        assert!(!is_valid_email("jane@x"));
        assert!(!is_valid_email("jane@.com"));
        assert!(!is_valid_email("jane@x."));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("jane@@x.com"));
        assert!(!is_valid_email("jane doe@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone_pattern() {
        for ok in [
            "1234567890",
            "123-456-7890",
            "(123) 456-7890",
            "+(123)456.7890",
            "123 456 789012",
            "+123-456-7890",
        ] {
            assert!(is_valid_phone(ok), "{ok} should be valid");
        }
        for bad in [
            "",
            "12345",
            "123-456-789",
            "123-456-7890123",
            "abc-def-ghij",
            "123--456-7890",
            "1234567890 ",
        ] {
            assert!(!is_valid_phone(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_required_message() {
        assert_eq!(
            validate_personal(PersonalField::Name, "  "),
            Some("Name is required".to_string())
        );
        assert_eq!(
            validate_personal(PersonalField::Email, "nope"),
            Some("Invalid email format".to_string())
        );
        assert_eq!(validate_personal(PersonalField::Website, ""), None);
        assert_eq!(
            validate_experience(ExperienceField::StartDate, ""),
            Some("Start date is required".to_string())
        );
        assert_eq!(validate_education(EducationField::Gpa, ""), None);
    }

    #[test]
    fn test_ready_document_passes() {
        assert_eq!(check_readiness(&ready()), Ok(()));
    }

    #[test]
    fn test_blank_email_fails_with_email_key() {
        let mut doc = ready();
        doc.set_personal(PersonalField::Email, "");
        let errors = check_readiness(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_entry_keys_use_ids() {
        let mut doc = ready();
        let id = doc.add_experience();
        let edu = doc.add_education();
        let errors = check_readiness(&doc).unwrap_err();
        let keys: Vec<&str> = errors.keys().collect();
        assert!(keys.contains(&format!("exp_{id}_company").as_str()));
        assert!(keys.contains(&format!("exp_{id}_position").as_str()));
        assert!(keys.contains(&format!("exp_{id}_startDate").as_str()));
        assert!(keys.contains(&format!("edu_{edu}_institution").as_str()));
        assert!(keys.contains(&format!("edu_{edu}_degree").as_str()));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_default_document_is_not_ready() {
        let errors = check_readiness(&ResumeDocument::default()).unwrap_err();
        for key in ["name", "email", "phone", "exp_1_company", "edu_1_degree"] {
            assert!(errors.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_remove_prefixed() {
        let mut errors = FieldErrors::default();
        errors.insert("exp_1_company", "x");
        errors.insert("exp_12_company", "x");
        errors.insert("edu_1_degree", "x");
        errors.remove_prefixed(&experience_prefix(1));
        assert!(!errors.contains_key("exp_1_company"));
        assert!(errors.contains_key("exp_12_company"));
        assert!(errors.contains_key("edu_1_degree"));
    }

    #[test]
    fn test_set_clears_on_valid() {
        let mut errors = FieldErrors::default();
        errors.set("name", Some("Name is required".into()));
        assert!(errors.contains_key("name"));
        errors.set("name", None);
        assert!(errors.is_empty());
    }
}
