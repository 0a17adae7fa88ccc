//! Template descriptors and layout-family resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five rendering strategies a template can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutFamily {
    Default,
    Professional,
    Creative,
    Modern,
    Simple,
}

impl LayoutFamily {
    pub const ALL: [LayoutFamily; 5] = [
        LayoutFamily::Default,
        LayoutFamily::Professional,
        LayoutFamily::Creative,
        LayoutFamily::Modern,
        LayoutFamily::Simple,
    ];

    /// Resolves a template name to its layout family.
    ///
    /// Matching is case-insensitive. "Minimal" is the catalog's name for the simple layout.
    /// Anything unrecognized falls back to `Default`.
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "professional" => LayoutFamily::Professional,
            "creative" => LayoutFamily::Creative,
            "modern" => LayoutFamily::Modern,
            "simple" | "minimal" => LayoutFamily::Simple,
            _ => LayoutFamily::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutFamily::Default => "default",
            LayoutFamily::Professional => "professional",
            LayoutFamily::Creative => "creative",
            LayoutFamily::Modern => "modern",
            LayoutFamily::Simple => "simple",
        }
    }
}

impl fmt::Display for LayoutFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template identity. Older drafts stored slugs, the catalog uses integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateId {
    Number(u32),
    Slug(String),
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateId::Number(n) => write!(f, "{n}"),
            TemplateId::Slug(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub id: TemplateId,
    pub name: String,
    /// Preview artwork reference shown by the catalog.
    #[serde(default)]
    pub image: String,
    /// Accent color, `#rrggbb` or `#rgb`.
    #[serde(default)]
    pub primary_color: String,
}

impl TemplateDescriptor {
    pub fn layout_family(&self) -> LayoutFamily {
        LayoutFamily::resolve(&self.name)
    }
}

/// The static template catalog offered by the template switcher.
pub fn template_catalog() -> Vec<TemplateDescriptor> {
    const ENTRIES: [(u32, &str, &str, &str); 5] = [
        (1, "Professional", "/assets/professional.jpg", "#0070f3"),
        (2, "Creative", "/assets/creative.jpg", "#6b46c1"),
        (3, "Minimal", "/assets/classic.jpg", "#2c3e50"),
        (4, "Modern", "/assets/modern.jpg", "#38a169"),
        (5, "Classic", "/assets/classic.jpg", "#34495e"),
    ];

    ENTRIES
        .iter()
        .map(|(id, name, image, color)| TemplateDescriptor {
            id: TemplateId::Number(*id),
            name: name.to_string(),
            image: image.to_string(),
            primary_color: color.to_string(),
        })
        .collect()
}

/// Looks a template up by id in the given catalog.
pub fn find_template<'a>(
    catalog: &'a [TemplateDescriptor],
    id: &TemplateId,
) -> Option<&'a TemplateDescriptor> {
    catalog.iter().find(|t| &t.id == id)
}

/// Resolves a user-typed template reference: an id (`"3"`, `"modern"`) or a name, ignoring case.
pub fn lookup_template<'a>(
    catalog: &'a [TemplateDescriptor],
    query: &str,
) -> Option<&'a TemplateDescriptor> {
    let query = query.trim();
    let id = match query.parse::<u32>() {
        Ok(n) => TemplateId::Number(n),
        Err(_) => TemplateId::Slug(query.to_lowercase()),
    };
    find_template(catalog, &id).or_else(|| {
        catalog.iter().find(|t| {
            t.id.to_string().eq_ignore_ascii_case(query) || t.name.eq_ignore_ascii_case(query)
        })
    })
}
