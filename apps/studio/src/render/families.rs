//! One strategy per layout family. Each arranges the shared sections and decides where the
//! template accent appears.

use crate::render::sections::{
    contact_lines, contact_section, education_section, experience_section, heading,
    skills_section, summary_section, ContactStyle, ItemStyle,
};
use crate::render::{
    Block, Border, Column, FamilyLayout, Header, Heading, RenderContext, Rgba, Section,
    SkillsStyle,
};

/// Tag background alpha, i.e. the accent at 20%.
const TAG_ALPHA: u8 = 0x33;

/// Accent-filled header, accent-tinted skill tags.
pub fn default_layout(ctx: &RenderContext<'_>) -> FamilyLayout {
    let info = &ctx.document.personal_info;
    let plain = |text: &str| heading(text, Rgba::TEXT);

    let header = Header {
        name: info.name.clone(),
        title: non_blank(&info.title),
        contact: contact_lines(info, ContactStyle::Piped),
        fill: Some(ctx.accent),
        border: None,
        name_color: Rgba::WHITE,
        text_color: Rgba::WHITE,
    };

    single_column(
        header,
        [
            summary_section(ctx.document, plain("Professional Summary")),
            Some(experience_section(ctx.document, plain("Experience"), ItemStyle::STACKED)),
            Some(education_section(ctx.document, plain("Education"), ItemStyle::STACKED)),
            Some(skills_section(
                ctx.document,
                plain("Skills"),
                SkillsStyle::Tags {
                    fill: Some(ctx.accent.with_alpha(TAG_ALPHA)),
                    border: None,
                },
            )),
        ],
    )
}

/// Accent name and headings, underlined header, divider under every heading.
pub fn professional_layout(ctx: &RenderContext<'_>) -> FamilyLayout {
    let info = &ctx.document.personal_info;
    let accented = |text: &str| Heading {
        divider: Some(ctx.accent),
        ..heading(text, ctx.accent)
    };

    let header = Header {
        name: info.name.clone(),
        title: non_blank(&info.title),
        contact: contact_lines(info, ContactStyle::Piped),
        fill: None,
        border: Some(Border::Bottom {
            color: ctx.accent,
            width: 3.0,
        }),
        name_color: ctx.accent,
        text_color: Rgba::TEXT,
    };

    single_column(
        header,
        [
            summary_section(ctx.document, accented("Professional Summary")),
            Some(experience_section(ctx.document, accented("Experience"), ItemStyle::STACKED)),
            Some(education_section(ctx.document, accented("Education"), ItemStyle::STACKED)),
            Some(skills_section(
                ctx.document,
                accented("Skills"),
                SkillsStyle::Tags {
                    fill: Some(Rgba::NEUTRAL_TAG),
                    border: None,
                },
            )),
        ],
    )
}

/// Accent sidebar holding identity, contact and skills; everything else in the main column.
pub fn creative_layout(ctx: &RenderContext<'_>) -> FamilyLayout {
    let info = &ctx.document.personal_info;
    let on_accent = |text: &str| heading(text, Rgba::WHITE);
    let plain = |text: &str| heading(text, Rgba::TEXT);

    let profile = Header {
        name: info.name.clone(),
        title: non_blank(&info.title),
        contact: Vec::new(),
        fill: None,
        border: None,
        name_color: Rgba::WHITE,
        text_color: Rgba::WHITE,
    };

    let sidebar = Column {
        fill: Some(ctx.accent),
        text_color: Rgba::WHITE,
        blocks: vec![
            Block::Header(profile),
            Block::Section(contact_section(info, on_accent("Contact"))),
            Block::Section(skills_section(
                ctx.document,
                on_accent("Skills"),
                SkillsStyle::List,
            )),
        ],
    };

    let main_sections = [
        summary_section(ctx.document, plain("About Me")),
        Some(experience_section(ctx.document, plain("Experience"), ItemStyle::STACKED)),
        Some(education_section(ctx.document, plain("Education"), ItemStyle::STACKED)),
    ];

    FamilyLayout {
        sidebar: Some(sidebar),
        main: Column {
            fill: None,
            text_color: Rgba::TEXT,
            blocks: main_sections.into_iter().flatten().map(Block::Section).collect(),
        },
    }
}

/// Left accent bar on the header, accent dot before headings, outlined tags.
pub fn modern_layout(ctx: &RenderContext<'_>) -> FamilyLayout {
    let info = &ctx.document.personal_info;
    let dotted = |text: &str| Heading {
        icon: Some(ctx.accent),
        ..heading(text, Rgba::TEXT)
    };

    let header = Header {
        name: info.name.clone(),
        title: non_blank(&info.title),
        contact: contact_lines(info, ContactStyle::Rows),
        fill: None,
        border: Some(Border::Left {
            color: ctx.accent,
            width: 5.0,
        }),
        name_color: Rgba::TEXT,
        text_color: Rgba::TEXT,
    };

    single_column(
        header,
        [
            summary_section(ctx.document, dotted("Professional Summary")),
            Some(experience_section(ctx.document, dotted("Experience"), ItemStyle::STACKED)),
            Some(education_section(ctx.document, dotted("Education"), ItemStyle::STACKED)),
            Some(skills_section(
                ctx.document,
                dotted("Skills"),
                SkillsStyle::Tags {
                    fill: None,
                    border: Some(ctx.accent),
                },
            )),
        ],
    )
}

/// Plain text layout; the accent only appears as the rule under headings.
pub fn simple_layout(ctx: &RenderContext<'_>) -> FamilyLayout {
    let info = &ctx.document.personal_info;
    let ruled = |text: &str| Heading {
        divider: Some(ctx.accent),
        ..heading(text, Rgba::TEXT)
    };

    let header = Header {
        name: info.name.clone(),
        title: non_blank(&info.title),
        contact: contact_lines(info, ContactStyle::Compact),
        fill: None,
        border: None,
        name_color: Rgba::TEXT,
        text_color: Rgba::TEXT,
    };

    single_column(
        header,
        [
            summary_section(ctx.document, ruled("Summary")),
            Some(experience_section(ctx.document, ruled("Experience"), ItemStyle::COMBINED)),
            Some(education_section(ctx.document, ruled("Education"), ItemStyle::COMBINED)),
            Some(skills_section(
                ctx.document,
                ruled("Skills"),
                SkillsStyle::Inline { separator: " • " },
            )),
        ],
    )
}

fn single_column<const N: usize>(header: Header, sections: [Option<Section>; N]) -> FamilyLayout {
    let mut blocks = vec![Block::Header(header)];
    blocks.extend(sections.into_iter().flatten().map(Block::Section));
    FamilyLayout {
        sidebar: None,
        main: Column {
            fill: None,
            text_color: Rgba::TEXT,
            blocks,
        },
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonalField, ResumeDocument};
    use crate::render::{SectionBody, SectionKind};

    fn ctx_doc() -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.set_personal(PersonalField::Name, "Jane Doe");
        doc.set_personal(PersonalField::Email, "jane@x.com");
        doc.update_skill(0, "Rust").unwrap();
        doc
    }

    fn sections(layout: &FamilyLayout) -> Vec<&Section> {
        layout
            .main
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Section(s) => Some(s),
                Block::Header(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_professional_headings_have_accent_divider() {
        let doc = ctx_doc();
        let accent = Rgba::rgb(1, 2, 3);
        let layout = professional_layout(&RenderContext { document: &doc, accent });
        for section in sections(&layout) {
            assert_eq!(section.heading.divider, Some(accent));
            assert_eq!(section.heading.color, accent);
        }
    }

    #[test]
    fn test_modern_headings_have_icon() {
        let doc = ctx_doc();
        let accent = Rgba::rgb(1, 2, 3);
        let layout = modern_layout(&RenderContext { document: &doc, accent });
        assert!(sections(&layout).iter().all(|s| s.heading.icon == Some(accent)));
    }

    #[test]
    fn test_simple_uses_inline_skills_and_combined_titles() {
        let mut doc = ctx_doc();
        doc.update_experience(1, crate::models::ExperienceField::Position, "Engineer")
            .unwrap();
        doc.update_experience(1, crate::models::ExperienceField::Company, "Acme")
            .unwrap();
        doc.update_achievement(1, 0, "Shipped X").unwrap();
        let layout = simple_layout(&RenderContext {
            document: &doc,
            accent: Rgba::FALLBACK_ACCENT,
        });
        let all = sections(&layout);
        let exp = all.iter().find(|s| s.kind == SectionKind::Experience).unwrap();
        match &exp.body {
            SectionBody::Experience(items) => {
                assert_eq!(items[0].title, "Engineer | Acme");
                assert!(items[0].company.is_none());
                assert_eq!(items[0].achievements.as_ref().unwrap().heading, None);
            }
            other => panic!("unexpected body {other:?}"),
        }
        let skills = all.iter().find(|s| s.kind == SectionKind::Skills).unwrap();
        assert!(matches!(
            skills.body,
            SectionBody::Skills {
                style: SkillsStyle::Inline { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_default_header_is_accent_filled() {
        let doc = ctx_doc();
        let accent = Rgba::rgb(9, 9, 9);
        let layout = default_layout(&RenderContext { document: &doc, accent });
        match &layout.main.blocks[0] {
            Block::Header(h) => {
                assert_eq!(h.fill, Some(accent));
                assert_eq!(h.contact, vec!["jane@x.com".to_string()]);
            }
            other => panic!("expected header first, got {other:?}"),
        }
    }

    #[test]
    fn test_creative_sidebar_contact_list() {
        let doc = ctx_doc();
        let layout = creative_layout(&RenderContext {
            document: &doc,
            accent: Rgba::FALLBACK_ACCENT,
        });
        let sidebar = layout.sidebar.unwrap();
        let contact = sidebar
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Section(s) if s.kind == SectionKind::Contact => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(contact.body, SectionBody::Lines(vec!["jane@x.com".to_string()]));
    }
}
