//! Résumé content model and its field-level edit operations.
//!
//! # Invariants
//! - `experience` and `education` never drop below one entry.
//! - Entry ids are unique per collection, assigned as `max + 1` (1 when empty).
//!   `repair` renumbers ids outside `1..=MAX_ENTRY_ID`, so `max + 1` cannot overflow.
//! - `achievements` and `skills` always keep at least one (possibly blank) slot.
//!
//! Every operation either applies completely or leaves the document untouched.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest entry id a restored draft may keep. Larger ids are renumbered by `repair`.
pub const MAX_ENTRY_ID: u32 = i32::MAX as u32;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(rename = "linkedIn")]
    pub linked_in: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: u32,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub start_date: String,
    /// `None` or blank renders as "Present".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl ExperienceEntry {
    pub fn blank(id: u32) -> Self {
        Self {
            id,
            company: String::new(),
            position: String::new(),
            start_date: String::new(),
            end_date: None,
            description: String::new(),
            achievements: vec![String::new()],
        }
    }

    /// True when the entry has no end date, i.e. it is the current position.
    pub fn is_current(&self) -> bool {
        self.end_date
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub id: u32,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub graduation_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EducationEntry {
    pub fn blank(id: u32) -> Self {
        Self {
            id,
            institution: String::new(),
            degree: String::new(),
            graduation_date: String::new(),
            gpa: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Default for ResumeDocument {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            summary: String::new(),
            experience: vec![ExperienceEntry::blank(1)],
            education: vec![EducationEntry::blank(1)],
            skills: vec![String::new()],
        }
    }
}

/// Editable personal-info fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    Name,
    Title,
    Email,
    Phone,
    Address,
    LinkedIn,
    Website,
}

impl PersonalField {
    /// Key used for inline and readiness errors.
    pub fn key(self) -> &'static str {
        match self {
            PersonalField::Name => "name",
            PersonalField::Title => "title",
            PersonalField::Email => "email",
            PersonalField::Phone => "phone",
            PersonalField::Address => "address",
            PersonalField::LinkedIn => "linkedIn",
            PersonalField::Website => "website",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExperienceField {
    Company,
    Position,
    StartDate,
    EndDate,
    Description,
}

impl ExperienceField {
    pub fn key(self) -> &'static str {
        match self {
            ExperienceField::Company => "company",
            ExperienceField::Position => "position",
            ExperienceField::StartDate => "startDate",
            ExperienceField::EndDate => "endDate",
            ExperienceField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EducationField {
    Institution,
    Degree,
    GraduationDate,
    Gpa,
    Description,
}

impl EducationField {
    pub fn key(self) -> &'static str {
        match self {
            EducationField::Institution => "institution",
            EducationField::Degree => "degree",
            EducationField::GraduationDate => "graduationDate",
            EducationField::Gpa => "gpa",
            EducationField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("No experience entry with id {0}")]
    UnknownExperience(u32),

    #[error("No education entry with id {0}")]
    UnknownEducation(u32),

    #[error("Index {index} is out of range for {collection} (len {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },
}

/// Summary of the fixes `repair` applied to a restored document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub added_experience: bool,
    pub added_education: bool,
    pub added_skill_slot: bool,
    pub filled_achievement_slots: usize,
    pub reassigned_ids: usize,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == RepairReport::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Edit operations
// ────────────────────────────────────────────────────────────────────────────

impl ResumeDocument {
    pub fn set_personal(&mut self, field: PersonalField, value: impl Into<String>) {
        let value = value.into();
        let info = &mut self.personal_info;
        let slot = match field {
            PersonalField::Name => &mut info.name,
            PersonalField::Title => &mut info.title,
            PersonalField::Email => &mut info.email,
            PersonalField::Phone => &mut info.phone,
            PersonalField::Address => &mut info.address,
            PersonalField::LinkedIn => &mut info.linked_in,
            PersonalField::Website => &mut info.website,
        };
        *slot = value;
    }

    pub fn personal(&self, field: PersonalField) -> &str {
        let info = &self.personal_info;
        match field {
            PersonalField::Name => &info.name,
            PersonalField::Title => &info.title,
            PersonalField::Email => &info.email,
            PersonalField::Phone => &info.phone,
            PersonalField::Address => &info.address,
            PersonalField::LinkedIn => &info.linked_in,
            PersonalField::Website => &info.website,
        }
    }

    pub fn set_summary(&mut self, value: impl Into<String>) {
        self.summary = value.into();
    }

    /// Appends a blank experience entry and returns its id.
    pub fn add_experience(&mut self) -> u32 {
        let id = next_id(self.experience.iter().map(|e| e.id));
        self.experience.push(ExperienceEntry::blank(id));
        id
    }

    /// Removes an experience entry. Returns `false` (and changes nothing) when the id is
    /// unknown or the entry is the last one.
    pub fn remove_experience(&mut self, id: u32) -> bool {
        if self.experience.len() <= 1 {
            return false;
        }
        let before = self.experience.len();
        self.experience.retain(|e| e.id != id);
        self.experience.len() != before
    }

    pub fn update_experience(
        &mut self,
        id: u32,
        field: ExperienceField,
        value: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let entry = self.experience_mut(id)?;
        let value = value.into();
        match field {
            ExperienceField::Company => entry.company = value,
            ExperienceField::Position => entry.position = value,
            ExperienceField::StartDate => entry.start_date = value,
            ExperienceField::EndDate => {
                entry.end_date = if value.trim().is_empty() {
                    None
                } else {
                    Some(value)
                }
            }
            ExperienceField::Description => entry.description = value,
        }
        Ok(())
    }

    pub fn add_achievement(&mut self, exp_id: u32) -> Result<usize, DocumentError> {
        let entry = self.experience_mut(exp_id)?;
        entry.achievements.push(String::new());
        Ok(entry.achievements.len() - 1)
    }

    pub fn update_achievement(
        &mut self,
        exp_id: u32,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let entry = self.experience_mut(exp_id)?;
        let len = entry.achievements.len();
        let slot = entry
            .achievements
            .get_mut(index)
            .ok_or(DocumentError::IndexOutOfRange {
                collection: "achievements",
                index,
                len,
            })?;
        *slot = value.into();
        Ok(())
    }

    /// Removes one achievement slot. The last remaining slot is never removed.
    pub fn remove_achievement(&mut self, exp_id: u32, index: usize) -> Result<bool, DocumentError> {
        let entry = self.experience_mut(exp_id)?;
        let len = entry.achievements.len();
        if index >= len {
            return Err(DocumentError::IndexOutOfRange {
                collection: "achievements",
                index,
                len,
            });
        }
        if len <= 1 {
            return Ok(false);
        }
        entry.achievements.remove(index);
        Ok(true)
    }

    pub fn add_education(&mut self) -> u32 {
        let id = next_id(self.education.iter().map(|e| e.id));
        self.education.push(EducationEntry::blank(id));
        id
    }

    pub fn remove_education(&mut self, id: u32) -> bool {
        if self.education.len() <= 1 {
            return false;
        }
        let before = self.education.len();
        self.education.retain(|e| e.id != id);
        self.education.len() != before
    }

    pub fn update_education(
        &mut self,
        id: u32,
        field: EducationField,
        value: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let entry = self
            .education
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(DocumentError::UnknownEducation(id))?;
        let value = value.into();
        match field {
            EducationField::Institution => entry.institution = value,
            EducationField::Degree => entry.degree = value,
            EducationField::GraduationDate => entry.graduation_date = value,
            EducationField::Gpa => entry.gpa = non_blank(value),
            EducationField::Description => entry.description = non_blank(value),
        }
        Ok(())
    }

    pub fn add_skill(&mut self) -> usize {
        self.skills.push(String::new());
        self.skills.len() - 1
    }

    pub fn update_skill(&mut self, index: usize, value: impl Into<String>) -> Result<(), DocumentError> {
        let len = self.skills.len();
        let slot = self
            .skills
            .get_mut(index)
            .ok_or(DocumentError::IndexOutOfRange {
                collection: "skills",
                index,
                len,
            })?;
        *slot = value.into();
        Ok(())
    }

    pub fn remove_skill(&mut self, index: usize) -> Result<bool, DocumentError> {
        let len = self.skills.len();
        if index >= len {
            return Err(DocumentError::IndexOutOfRange {
                collection: "skills",
                index,
                len,
            });
        }
        if len <= 1 {
            return Ok(false);
        }
        self.skills.remove(index);
        Ok(true)
    }

    /// Reinstates the empty defaults.
    pub fn reset(&mut self) {
        *self = ResumeDocument::default();
    }

    /// Re-establishes the structural invariants on a document restored from storage.
    pub fn repair(&mut self) -> RepairReport {
        let mut report = RepairReport::default();

        if self.experience.is_empty() {
            self.experience.push(ExperienceEntry::blank(1));
            report.added_experience = true;
        }
        if self.education.is_empty() {
            self.education.push(EducationEntry::blank(1));
            report.added_education = true;
        }
        if self.skills.is_empty() {
            self.skills.push(String::new());
            report.added_skill_slot = true;
        }
        for entry in &mut self.experience {
            if entry.achievements.is_empty() {
                entry.achievements.push(String::new());
                report.filled_achievement_slots += 1;
            }
        }

        report.reassigned_ids += normalize_ids(self.experience.iter_mut().map(|e| &mut e.id));
        report.reassigned_ids += normalize_ids(self.education.iter_mut().map(|e| &mut e.id));
        report
    }

    pub fn experience_entry(&self, id: u32) -> Option<&ExperienceEntry> {
        self.experience.iter().find(|e| e.id == id)
    }

    pub fn education_entry(&self, id: u32) -> Option<&EducationEntry> {
        self.education.iter().find(|e| e.id == id)
    }

    fn experience_mut(&mut self, id: u32) -> Result<&mut ExperienceEntry, DocumentError> {
        self.experience
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(DocumentError::UnknownExperience(id))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// `max + 1`, or the lowest free id once `max` is `u32::MAX`.
fn next_id(ids: impl Iterator<Item = u32>) -> u32 {
    let taken: BTreeSet<u32> = ids.collect();
    match taken.last() {
        None => 1,
        Some(&max) => max.checked_add(1).unwrap_or_else(|| {
            // fewer entries than ids, so a gap always exists
            (1..u32::MAX).find(|id| !taken.contains(id)).unwrap_or(0)
        }),
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Gives every zero, out-of-range or duplicate id a fresh `max + 1` value, keeping the first
/// occurrence of each valid id.
fn normalize_ids<'a>(ids: impl Iterator<Item = &'a mut u32>) -> usize {
    let ids: Vec<&mut u32> = ids.collect();
    let valid = |id: u32| (1..=MAX_ENTRY_ID).contains(&id);
    let mut max = ids.iter().map(|id| **id).filter(|id| valid(*id)).max().unwrap_or(0);
    let mut seen = HashSet::new();
    let mut reassigned = 0;
    for id in ids {
        if !valid(*id) || !seen.insert(*id) {
            max += 1;
            *id = max;
            seen.insert(max);
            reassigned += 1;
        }
    }
    reassigned
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_one_slot_everywhere() {
        let doc = ResumeDocument::default();
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.education.len(), 1);
        assert_eq!(doc.skills, vec![String::new()]);
        assert_eq!(doc.experience[0].achievements, vec![String::new()]);
        assert_eq!(doc.experience[0].id, 1);
        assert_eq!(doc.education[0].id, 1);
    }

    #[test]
    fn test_sequential_add_experience_ids_strictly_increase() {
        let mut doc = ResumeDocument::default();
        let ids: Vec<u32> = (0..5).map(|_| doc.add_experience()).collect();
        assert_eq!(ids, vec![2, 3, 4, 5, 6]);
        let all: Vec<u32> = doc.experience.iter().map(|e| e.id).collect();
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_next_id_uses_max_not_len() {
        let mut doc = ResumeDocument::default();
        doc.add_experience(); // 2
        doc.add_experience(); // 3
        assert!(doc.remove_experience(2));
        assert_eq!(doc.add_experience(), 4);
    }

    #[test]
    fn test_remove_last_experience_is_noop() {
        let mut doc = ResumeDocument::default();
        assert!(!doc.remove_experience(1));
        assert_eq!(doc.experience.len(), 1);
    }

    #[test]
    fn test_remove_last_education_is_noop() {
        let mut doc = ResumeDocument::default();
        let id = doc.add_education();
        assert!(doc.remove_education(id));
        assert!(!doc.remove_education(1));
        assert_eq!(doc.education.len(), 1);
    }

    #[test]
    fn test_remove_unknown_experience_returns_false() {
        let mut doc = ResumeDocument::default();
        doc.add_experience();
        assert!(!doc.remove_experience(99));
        assert_eq!(doc.experience.len(), 2);
    }

    #[test]
    fn test_update_experience_blank_end_date_is_none() {
        let mut doc = ResumeDocument::default();
        doc.update_experience(1, ExperienceField::EndDate, "03/2022")
            .unwrap();
        assert_eq!(doc.experience[0].end_date.as_deref(), Some("03/2022"));
        doc.update_experience(1, ExperienceField::EndDate, "  ").unwrap();
        assert!(doc.experience[0].end_date.is_none());
        assert!(doc.experience[0].is_current());
    }

    #[test]
    fn test_update_unknown_experience_errors() {
        let mut doc = ResumeDocument::default();
        let err = doc
            .update_experience(7, ExperienceField::Company, "Acme")
            .unwrap_err();
        assert_eq!(err, DocumentError::UnknownExperience(7));
    }

    #[test]
    fn test_achievement_slots_never_empty() {
        let mut doc = ResumeDocument::default();
        assert_eq!(doc.remove_achievement(1, 0), Ok(false));
        let idx = doc.add_achievement(1).unwrap();
        assert_eq!(idx, 1);
        doc.update_achievement(1, 1, "Shipped X").unwrap();
        assert_eq!(doc.remove_achievement(1, 0), Ok(true));
        assert_eq!(doc.experience[0].achievements, vec!["Shipped X".to_string()]);
    }

    #[test]
    fn test_achievement_index_out_of_range() {
        let mut doc = ResumeDocument::default();
        let err = doc.update_achievement(1, 4, "x").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::IndexOutOfRange {
                collection: "achievements",
                index: 4,
                len: 1
            }
        ));
    }

    #[test]
    fn test_skill_slots_never_empty() {
        let mut doc = ResumeDocument::default();
        assert_eq!(doc.remove_skill(0), Ok(false));
        doc.update_skill(0, "Rust").unwrap();
        doc.add_skill();
        doc.update_skill(1, "Go").unwrap();
        assert_eq!(doc.remove_skill(0), Ok(true));
        assert_eq!(doc.skills, vec!["Go".to_string()]);
        assert!(doc.remove_skill(3).is_err());
    }

    #[test]
    fn test_education_blank_optional_fields_become_none() {
        let mut doc = ResumeDocument::default();
        doc.update_education(1, EducationField::Gpa, "3.8").unwrap();
        doc.update_education(1, EducationField::Description, " ")
            .unwrap();
        assert_eq!(doc.education[0].gpa.as_deref(), Some("3.8"));
        assert!(doc.education[0].description.is_none());
    }

    #[test]
    fn test_reset_reinstates_defaults() {
        let mut doc = ResumeDocument::default();
        doc.set_personal(PersonalField::Name, "Jane Doe");
        doc.add_experience();
        doc.reset();
        assert_eq!(doc, ResumeDocument::default());
    }

    #[test]
    fn test_repair_fills_empty_collections_and_dedups_ids() {
        let mut doc = ResumeDocument {
            experience: vec![
                ExperienceEntry {
                    achievements: vec![],
                    ..ExperienceEntry::blank(3)
                },
                ExperienceEntry::blank(3),
            ],
            education: vec![],
            skills: vec![],
            ..ResumeDocument::default()
        };
        let report = doc.repair();
        assert!(report.added_education);
        assert!(report.added_skill_slot);
        assert_eq!(report.filled_achievement_slots, 1);
        assert_eq!(report.reassigned_ids, 1);
        assert_eq!(doc.experience[0].id, 3);
        assert_eq!(doc.experience[1].id, 4);
        assert!(doc.experience.iter().all(|e| !e.achievements.is_empty()));
    }

    #[test]
    fn test_repair_renumbers_max_id_from_stored_draft() {
        let json = r#"{"experience": [{"id": 4294967295}, {"id": 2}], "education": [{"id": 0}]}"#;
        let mut doc: ResumeDocument = serde_json::from_str(json).unwrap();
        let report = doc.repair();
        assert!(!report.is_clean());
        assert_eq!(report.reassigned_ids, 2);
        assert_eq!(doc.experience[0].id, 3);
        assert_eq!(doc.experience[1].id, 2);
        assert_eq!(doc.education[0].id, 1);

        let next = doc.add_experience();
        assert_eq!(next, 4);
    }

    #[test]
    fn test_add_after_max_id_picks_free_id() {
        let mut doc = ResumeDocument {
            experience: vec![ExperienceEntry::blank(u32::MAX), ExperienceEntry::blank(1)],
            ..ResumeDocument::default()
        };
        let id = doc.add_experience();
        assert_eq!(id, 2);
        let ids: HashSet<u32> = doc.experience.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_repair_on_valid_document_is_clean() {
        let mut doc = ResumeDocument::default();
        assert!(doc.repair().is_clean());
    }

    #[test]
    fn test_json_shape_uses_camel_case() {
        let mut doc = ResumeDocument::default();
        doc.set_personal(PersonalField::LinkedIn, "in/jane");
        doc.update_experience(1, ExperienceField::StartDate, "01/2020")
            .unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["personalInfo"]["linkedIn"], "in/jane");
        assert_eq!(json["experience"][0]["startDate"], "01/2020");
        assert!(json["experience"][0].get("endDate").is_none());
    }

    #[test]
    fn test_original_shape_with_empty_strings_deserializes() {
        let raw = r#"{
            "personalInfo": {"name": "Jane", "title": "", "email": "", "phone": "",
                             "address": "", "linkedIn": "", "website": ""},
            "summary": "",
            "experience": [{"id": 1, "company": "", "position": "", "startDate": "",
                            "endDate": "", "description": "", "achievements": [""]}],
            "education": [{"id": 1, "institution": "", "degree": "", "graduationDate": "",
                           "gpa": "", "description": ""}],
            "skills": [""]
        }"#;
        let doc: ResumeDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.personal_info.name, "Jane");
        assert!(doc.experience[0].is_current());
        assert_eq!(doc.education[0].gpa.as_deref(), Some(""));
    }
}
