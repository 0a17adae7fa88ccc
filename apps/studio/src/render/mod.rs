//! Template renderer — maps a `ResumeDocument` onto a styled visual tree.
//!
//! Rendering is a pure function of `(document, template)`. Each `LayoutFamily` has one
//! strategy in `families`; all of them build their sections through `sections`, which is
//! where the omission rules live.

pub mod color;
pub mod families;
pub mod sections;

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{LayoutFamily, ResumeDocument, TemplateDescriptor};

pub use color::Rgba;

// ────────────────────────────────────────────────────────────────────────────
// Visual tree
// ────────────────────────────────────────────────────────────────────────────

/// A fully styled résumé, ready for surface layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualDocument {
    pub family: LayoutFamily,
    pub template_name: String,
    pub accent: Rgba,
    pub background: Rgba,
    /// Only the Creative family has a sidebar.
    pub sidebar: Option<Column>,
    pub main: Column,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub fill: Option<Rgba>,
    pub text_color: Rgba,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Header(Header),
    Section(Section),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    pub title: Option<String>,
    pub contact: Vec<String>,
    pub fill: Option<Rgba>,
    pub border: Option<Border>,
    pub name_color: Rgba,
    pub text_color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Border {
    Bottom { color: Rgba, width: f32 },
    Left { color: Rgba, width: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    Summary,
    Contact,
    Experience,
    Education,
    Skills,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub text: String,
    pub color: Rgba,
    /// Dot drawn before the heading text.
    pub icon: Option<Rgba>,
    /// Rule drawn under the heading.
    pub divider: Option<Rgba>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: Heading,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SectionBody {
    Paragraph(String),
    Lines(Vec<String>),
    Experience(Vec<ExperienceItem>),
    Education(Vec<EducationItem>),
    Skills { skills: Vec<String>, style: SkillsStyle },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SkillsStyle {
    Tags {
        fill: Option<Rgba>,
        border: Option<Rgba>,
    },
    List,
    Inline {
        separator: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceItem {
    pub id: u32,
    pub title: String,
    pub company: Option<String>,
    pub dates: String,
    pub description: Option<String>,
    pub achievements: Option<AchievementList>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementList {
    pub heading: Option<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationItem {
    pub id: u32,
    pub title: String,
    pub institution: Option<String>,
    pub graduation_date: Option<String>,
    pub gpa: Option<String>,
    pub description: Option<String>,
}

impl VisualDocument {
    /// All sections, sidebar first.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sidebar
            .iter()
            .chain(std::iter::once(&self.main))
            .flat_map(|column| column.blocks.iter())
            .filter_map(|block| match block {
                Block::Section(section) => Some(section),
                Block::Header(_) => None,
            })
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections().find(|s| s.kind == kind)
    }

    pub fn header(&self) -> Option<&Header> {
        self.sidebar
            .iter()
            .chain(std::iter::once(&self.main))
            .flat_map(|column| column.blocks.iter())
            .find_map(|block| match block {
                Block::Header(header) => Some(header),
                Block::Section(_) => None,
            })
    }

    /// Skills as displayed, whatever the skills style.
    pub fn visible_skills(&self) -> Vec<&str> {
        match self.section(SectionKind::Skills).map(|s| &s.body) {
            Some(SectionBody::Skills { skills, .. }) => skills.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Inputs shared by every family strategy.
pub struct RenderContext<'a> {
    pub document: &'a ResumeDocument,
    pub accent: Rgba,
}

/// What a family strategy produces: an optional sidebar plus the main column.
pub struct FamilyLayout {
    pub sidebar: Option<Column>,
    pub main: Column,
}

/// Renders a résumé with the given template.
///
/// Fails only when no template is supplied. Missing optional content is omitted and an
/// unreadable accent color falls back to a neutral one.
pub fn render(
    document: &ResumeDocument,
    template: Option<&TemplateDescriptor>,
) -> Result<VisualDocument, AppError> {
    let template = template.ok_or(AppError::MissingTemplate)?;
    let family = template.layout_family();
    let accent = accent_color(template);
    let ctx = RenderContext { document, accent };

    let FamilyLayout { sidebar, main } = match family {
        LayoutFamily::Default => families::default_layout(&ctx),
        LayoutFamily::Professional => families::professional_layout(&ctx),
        LayoutFamily::Creative => families::creative_layout(&ctx),
        LayoutFamily::Modern => families::modern_layout(&ctx),
        LayoutFamily::Simple => families::simple_layout(&ctx),
    };

    debug!(
        "Rendered template '{}' as {family} ({} sections)",
        template.name,
        sidebar
            .iter()
            .chain(std::iter::once(&main))
            .map(|c| c.blocks.len())
            .sum::<usize>()
    );

    Ok(VisualDocument {
        family,
        template_name: template.name.clone(),
        accent,
        background: Rgba::WHITE,
        sidebar,
        main,
    })
}

fn accent_color(template: &TemplateDescriptor) -> Rgba {
    match Rgba::from_hex(&template.primary_color) {
        Some(color) => color.with_alpha(0xff),
        None => {
            warn!(
                "Template '{}' has unreadable primaryColor '{}', using fallback accent",
                template.name, template.primary_color
            );
            Rgba::FALLBACK_ACCENT
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
