//! Section builders shared by every layout family.
//!
//! # Omission rules
//! - Summary: omitted when blank after trimming.
//! - Achievements: the list is omitted unless one entry is non-blank; blank entries are dropped.
//! - Skills: blank entries are dropped, but the section itself always renders.
//! - Optional contact and education fields: omitted when blank.

use crate::models::{EducationEntry, ExperienceEntry, PersonalInfo, ResumeDocument};
use crate::render::{
    AchievementList, EducationItem, ExperienceItem, Heading, Section, SectionBody, SectionKind,
    SkillsStyle,
};

/// How entry titles are composed.
#[derive(Debug, Clone, Copy)]
pub struct ItemStyle {
    /// "position | company" on one line instead of a separate company line.
    pub combined_title: bool,
    pub achievements_heading: Option<&'static str>,
}

impl ItemStyle {
    pub const STACKED: ItemStyle = ItemStyle {
        combined_title: false,
        achievements_heading: Some("Key Achievements:"),
    };
    pub const COMBINED: ItemStyle = ItemStyle {
        combined_title: true,
        achievements_heading: None,
    };
}

/// Arrangement of the contact block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactStyle {
    /// "email | phone", address, "LinkedIn: …", "Website: …".
    Piped,
    /// Email and phone on one row, the remaining links on a second.
    Rows,
    /// Like `Piped` but LinkedIn and website share one line.
    Compact,
    /// One item per line, no labels.
    List,
}

pub fn heading(text: &str, color: crate::render::Rgba) -> Heading {
    Heading {
        text: text.to_string(),
        color,
        icon: None,
        divider: None,
    }
}

pub fn summary_section(doc: &ResumeDocument, heading: Heading) -> Option<Section> {
    let summary = doc.summary.trim();
    if summary.is_empty() {
        return None;
    }
    Some(Section {
        kind: SectionKind::Summary,
        heading,
        body: SectionBody::Paragraph(summary.to_string()),
    })
}

pub fn experience_section(doc: &ResumeDocument, heading: Heading, style: ItemStyle) -> Section {
    let items = doc
        .experience
        .iter()
        .map(|entry| experience_item(entry, style))
        .collect();
    Section {
        kind: SectionKind::Experience,
        heading,
        body: SectionBody::Experience(items),
    }
}

pub fn education_section(doc: &ResumeDocument, heading: Heading, style: ItemStyle) -> Section {
    let items = doc
        .education
        .iter()
        .map(|entry| education_item(entry, style))
        .collect();
    Section {
        kind: SectionKind::Education,
        heading,
        body: SectionBody::Education(items),
    }
}

pub fn skills_section(doc: &ResumeDocument, heading: Heading, style: SkillsStyle) -> Section {
    Section {
        kind: SectionKind::Skills,
        heading,
        body: SectionBody::Skills {
            skills: visible_skills(doc),
            style,
        },
    }
}

pub fn contact_section(info: &PersonalInfo, heading: Heading) -> Section {
    Section {
        kind: SectionKind::Contact,
        heading,
        body: SectionBody::Lines(contact_lines(info, ContactStyle::List)),
    }
}

pub fn contact_lines(info: &PersonalInfo, style: ContactStyle) -> Vec<String> {
    let email_phone = join_present(&[&info.email, &info.phone], " | ");
    let mut lines = Vec::new();

    match style {
        ContactStyle::Piped => {
            lines.extend(email_phone);
            lines.extend(present(&info.address));
            lines.extend(present(&info.linked_in).map(|v| format!("LinkedIn: {v}")));
            lines.extend(present(&info.website).map(|v| format!("Website: {v}")));
        }
        ContactStyle::Compact => {
            lines.extend(email_phone);
            lines.extend(present(&info.address));
            let linked_in = present(&info.linked_in).map(|v| format!("LinkedIn: {v}"));
            let website = present(&info.website).map(|v| format!("Website: {v}"));
            let links: Vec<String> = linked_in.into_iter().chain(website).collect();
            if !links.is_empty() {
                lines.push(links.join(" | "));
            }
        }
        ContactStyle::Rows => {
            lines.extend(join_present(&[&info.email, &info.phone], "   "));
            lines.extend(join_present(
                &[&info.address, &info.linked_in, &info.website],
                "   ",
            ));
        }
        ContactStyle::List => {
            for value in [
                &info.email,
                &info.phone,
                &info.address,
                &info.linked_in,
                &info.website,
            ] {
                lines.extend(present(value));
            }
        }
    }
    lines
}

/// "start - end", with a blank or absent end date shown as "Present".
pub fn date_range(entry: &ExperienceEntry) -> String {
    let end = entry
        .end_date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("Present");
    format!("{} - {}", entry.start_date, end)
}

pub fn visible_skills(doc: &ResumeDocument) -> Vec<String> {
    doc.skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn visible_achievements(entry: &ExperienceEntry) -> Option<Vec<String>> {
    let items: Vec<String> = entry
        .achievements
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn experience_item(entry: &ExperienceEntry, style: ItemStyle) -> ExperienceItem {
    let (title, company) = if style.combined_title {
        (join_title(&entry.position, &entry.company), None)
    } else {
        (entry.position.clone(), present(&entry.company))
    };
    ExperienceItem {
        id: entry.id,
        title,
        company,
        dates: date_range(entry),
        description: present(&entry.description),
        achievements: visible_achievements(entry).map(|items| AchievementList {
            heading: style.achievements_heading.map(str::to_string),
            items,
        }),
    }
}

fn education_item(entry: &EducationEntry, style: ItemStyle) -> EducationItem {
    let (title, institution) = if style.combined_title {
        (join_title(&entry.degree, &entry.institution), None)
    } else {
        (entry.degree.clone(), present(&entry.institution))
    };
    EducationItem {
        id: entry.id,
        title,
        institution,
        graduation_date: present(&entry.graduation_date),
        gpa: entry
            .gpa
            .as_deref()
            .and_then(present)
            .map(|g| format!("GPA: {g}")),
        description: entry.description.as_deref().and_then(present),
    }
}

fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn join_present(values: &[&String], separator: &str) -> Option<String> {
    let parts: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}

fn join_title(primary: &str, secondary: &str) -> String {
    match (primary.trim(), secondary.trim()) {
        (p, "") => p.to_string(),
        ("", s) => s.to_string(),
        (p, s) => format!("{p} | {s}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: &str, end: Option<&str>) -> ExperienceEntry {
        ExperienceEntry {
            start_date: start.into(),
            end_date: end.map(str::to_string),
            ..ExperienceEntry::blank(1)
        }
    }

    #[test]
    fn test_date_range_present_when_absent_or_blank() {
        assert_eq!(date_range(&entry("01/2020", None)), "01/2020 - Present");
        assert_eq!(date_range(&entry("01/2020", Some(""))), "01/2020 - Present");
        assert_eq!(date_range(&entry("01/2020", Some(" "))), "01/2020 - Present");
        assert_eq!(date_range(&entry("01/2020", Some("06/2021"))), "01/2020 - 06/2021");
    }

    #[test]
    fn test_start_date_rendered_as_is() {
        assert_eq!(date_range(&entry("Spring '19", None)), "Spring '19 - Present");
    }

    #[test]
    fn test_achievements_filtered() {
        let mut e = entry("2020", None);
        e.achievements = vec!["".into(), "Shipped X".into(), "  ".into()];
        assert_eq!(visible_achievements(&e), Some(vec!["Shipped X".to_string()]));
    }

    #[test]
    fn test_achievements_all_blank_is_none() {
        let mut e = entry("2020", None);
        e.achievements = vec!["".into(), " ".into()];
        assert_eq!(visible_achievements(&e), None);
    }

    #[test]
    fn test_first_blank_achievement_does_not_hide_list() {
        // the list renders as long as any entry is non-blank, not only the first
        let mut e = entry("2020", None);
        e.achievements = vec!["".into(), "Led migration".into()];
        assert!(visible_achievements(&e).is_some());
    }

    #[test]
    fn test_contact_piped_omits_blank_fields() {
        let info = PersonalInfo {
            email: "jane@x.com".into(),
            phone: "1234567890".into(),
            website: "jane.dev".into(),
            ..PersonalInfo::default()
        };
        assert_eq!(
            contact_lines(&info, ContactStyle::Piped),
            vec!["jane@x.com | 1234567890".to_string(), "Website: jane.dev".to_string()]
        );
    }

    #[test]
    fn test_contact_compact_joins_links() {
        let info = PersonalInfo {
            email: "jane@x.com".into(),
            linked_in: "in/jane".into(),
            website: "jane.dev".into(),
            ..PersonalInfo::default()
        };
        assert_eq!(
            contact_lines(&info, ContactStyle::Compact),
            vec![
                "jane@x.com".to_string(),
                "LinkedIn: in/jane | Website: jane.dev".to_string()
            ]
        );
    }

    #[test]
    fn test_contact_list_has_no_labels() {
        let info = PersonalInfo {
            email: "jane@x.com".into(),
            linked_in: "in/jane".into(),
            ..PersonalInfo::default()
        };
        assert_eq!(
            contact_lines(&info, ContactStyle::List),
            vec!["jane@x.com".to_string(), "in/jane".to_string()]
        );
    }

    #[test]
    fn test_empty_contact_has_no_lines() {
        for style in [
            ContactStyle::Piped,
            ContactStyle::Rows,
            ContactStyle::Compact,
            ContactStyle::List,
        ] {
            assert!(contact_lines(&PersonalInfo::default(), style).is_empty());
        }
    }

    #[test]
    fn test_combined_title() {
        assert_eq!(join_title("Engineer", "Acme"), "Engineer | Acme");
        assert_eq!(join_title("Engineer", ""), "Engineer");
        assert_eq!(join_title("", "Acme"), "Acme");
    }

    #[test]
    fn test_education_item_gpa_label() {
        let e = EducationEntry {
            gpa: Some("3.9".into()),
            description: Some("  ".into()),
            ..EducationEntry::blank(2)
        };
        let item = education_item(&e, ItemStyle::STACKED);
        assert_eq!(item.gpa.as_deref(), Some("GPA: 3.9"));
        assert!(item.description.is_none());
        assert!(item.graduation_date.is_none());
    }
}
