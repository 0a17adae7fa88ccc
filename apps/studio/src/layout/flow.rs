//! Surface layout — places a `VisualDocument` onto a fixed-width, content-height surface.
//!
//! Every column is laid out top to bottom with a single pen. Text is greedily word-wrapped by
//! measured width; a word wider than the column is broken at character boundaries. The result is
//! a flat list of draw operations in paint order.

use serde::Serialize;

use crate::layout::font_metrics::{TextStyle, Typeface};
use crate::layout::SurfaceConfig;
use crate::render::{
    Block, Border, Column, EducationItem, ExperienceItem, Header, Heading, Rgba, Section,
    SectionBody, SkillsStyle, VisualDocument,
};

// ────────────────────────────────────────────────────────────────────────────
// Surface
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgba,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width: f32,
        color: Rgba,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        color: Rgba,
    },
    Text {
        x: f32,
        baseline: f32,
        style: TextStyle,
        color: Rgba,
        text: String,
    },
}

/// A laid-out résumé in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
    pub background: Rgba,
    pub ops: Vec<DrawOp>,
}

impl Surface {
    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_runs().any(|t| t.contains(needle))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

pub fn layout_document(
    visual: &VisualDocument,
    typeface: &Typeface,
    config: &SurfaceConfig,
) -> Surface {
    let mut fills = Vec::new();
    let mut ops = Vec::new();
    let mut bottom = 0.0_f32;

    let main_left = match &visual.sidebar {
        Some(sidebar) => {
            let sidebar_width = (config.width * config.sidebar_fraction).round();
            let mut pen = Pen::new(typeface, config, sidebar, 0.0, sidebar_width);
            pen.column(sidebar);
            bottom = bottom.max(pen.y + config.padding);
            if let Some(fill) = sidebar.fill {
                fills.push((0.0, sidebar_width, fill));
            }
            ops.extend(pen.ops);
            sidebar_width
        }
        None => 0.0,
    };

    let mut pen = Pen::new(typeface, config, &visual.main, main_left, config.width);
    pen.column(&visual.main);
    bottom = bottom.max(pen.y + config.padding);
    if let Some(fill) = visual.main.fill {
        fills.push((main_left, config.width, fill));
    }
    ops.extend(pen.ops);

    let height = bottom.ceil();
    let mut all = Vec::with_capacity(fills.len() + ops.len());
    all.extend(fills.into_iter().map(|(left, right, color)| DrawOp::FillRect {
        x: left,
        y: 0.0,
        w: right - left,
        h: height,
        color,
    }));
    all.extend(ops);

    Surface {
        width: config.width,
        height,
        background: visual.background,
        ops: all,
    }
}

/// Greedy word wrap. Explicit newlines start a new line; blank input yields no lines.
///
/// Adapted from the line simulation used for bullet-fill checks: a word goes on the current
/// line if it fits after a space, otherwise it starts the next one.
pub fn wrap_text(text: &str, typeface: &Typeface, style: TextStyle, max_width: f32) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let space_w = typeface.measure(" ", style);
    let mut lines = Vec::new();

    for paragraph in text.trim().lines() {
        let mut current = String::new();
        let mut current_w = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_w = typeface.measure(word, style);
            if !current.is_empty() && current_w + space_w + word_w <= max_width {
                current.push(' ');
                current.push_str(word);
                current_w += space_w + word_w;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if word_w <= max_width {
                current.push_str(word);
                current_w = word_w;
            } else {
                let mut pieces = break_word(word, typeface, style, max_width);
                current = pieces.pop().unwrap_or_default();
                current_w = typeface.measure(&current, style);
                lines.extend(pieces);
            }
        }
        lines.push(current);
    }
    lines
}

fn break_word(word: &str, typeface: &Typeface, style: TextStyle, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && typeface.measure(&piece, style) > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

// ────────────────────────────────────────────────────────────────────────────
// Pen
// ────────────────────────────────────────────────────────────────────────────

struct Pen<'a> {
    typeface: &'a Typeface,
    config: &'a SurfaceConfig,
    col_left: f32,
    col_right: f32,
    left: f32,
    right: f32,
    y: f32,
    text_color: Rgba,
    muted: Rgba,
    ops: Vec<DrawOp>,
}

impl<'a> Pen<'a> {
    fn new(
        typeface: &'a Typeface,
        config: &'a SurfaceConfig,
        column: &Column,
        col_left: f32,
        col_right: f32,
    ) -> Self {
        // muted grey only reads on the light body background
        let muted = if column.fill.is_some() {
            column.text_color
        } else {
            Rgba::MUTED
        };
        Self {
            typeface,
            config,
            col_left,
            col_right,
            left: col_left + config.padding,
            right: col_right - config.padding,
            y: 0.0,
            text_color: column.text_color,
            muted,
            ops: Vec::new(),
        }
    }

    fn width(&self) -> f32 {
        (self.right - self.left).max(1.0)
    }

    fn column(&mut self, column: &Column) {
        let bleeds = matches!(column.blocks.first(), Some(Block::Header(h)) if h.fill.is_some());
        self.y = if bleeds { 0.0 } else { self.config.padding };

        for block in &column.blocks {
            match block {
                Block::Header(header) => self.header(header),
                Block::Section(section) => self.section(section),
            }
        }
        // trailing gap belongs to the padding
        self.y -= self.config.section_gap;
        self.y = self.y.max(self.config.padding);
    }

    // ── primitives ──────────────────────────────────────────────────────────

    fn line_height(&self, style: TextStyle) -> f32 {
        style.size * self.config.line_height
    }

    /// Emits one line of text at `x` and advances the pen by one line height.
    fn text_line(&mut self, text: String, x: f32, style: TextStyle, color: Rgba) {
        let line_h = self.line_height(style);
        let baseline = self.y + (line_h - style.size) / 2.0 + self.typeface.ascent(style);
        if !text.is_empty() {
            self.ops.push(DrawOp::Text {
                x,
                baseline,
                style,
                color,
                text,
            });
        }
        self.y += line_h;
    }

    fn paragraph(&mut self, text: &str, style: TextStyle, color: Rgba, indent: f32) {
        let lines = wrap_text(text, self.typeface, style, self.width() - indent);
        for line in lines {
            self.text_line(line, self.left + indent, style, color);
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) -> usize {
        self.ops.push(DrawOp::FillRect { x, y, w, h, color });
        self.ops.len() - 1
    }

    fn set_rect_height(&mut self, index: usize, height: f32) {
        if let Some(DrawOp::FillRect { h, .. }) = self.ops.get_mut(index) {
            *h = height;
        }
    }

    // ── header ──────────────────────────────────────────────────────────────

    fn header(&mut self, header: &Header) {
        let cfg = self.config;
        let top = self.y;
        let saved_left = self.left;

        // background and left bar are sized once the content height is known
        let background = header
            .fill
            .map(|color| self.fill_rect(self.col_left, top, self.col_right - self.col_left, 0.0, color));
        if header.fill.is_some() {
            self.y += cfg.padding;
        }
        let bar = match header.border {
            Some(Border::Left { color, width }) => {
                let index = self.fill_rect(self.left, top, width, 0.0, color);
                self.left += width + cfg.border_inset;
                Some(index)
            }
            _ => None,
        };

        if !header.name.trim().is_empty() {
            self.paragraph(&header.name, TextStyle::bold(cfg.name_size), header.name_color, 0.0);
        }
        if let Some(title) = &header.title {
            self.paragraph(title, TextStyle::regular(cfg.title_size), header.text_color, 0.0);
        }
        if !header.contact.is_empty() {
            self.y += cfg.item_gap / 2.0;
            for line in &header.contact {
                self.paragraph(line, TextStyle::regular(cfg.small_size), header.text_color, 0.0);
            }
        }

        if let Some(index) = bar {
            self.set_rect_height(index, self.y - top);
        }
        self.left = saved_left;

        if let Some(index) = background {
            self.y += cfg.padding;
            self.set_rect_height(index, self.y - top);
        }
        if let Some(Border::Bottom { color, width }) = header.border {
            self.y += cfg.item_gap;
            let w = self.width();
            self.fill_rect(self.left, self.y, w, width, color);
            self.y += width;
        }
        self.y += cfg.section_gap;
    }

    // ── sections ────────────────────────────────────────────────────────────

    fn section(&mut self, section: &Section) {
        self.heading(&section.heading);
        let body = TextStyle::regular(self.config.body_size);

        match &section.body {
            SectionBody::Paragraph(text) => self.paragraph(text, body, self.text_color, 0.0),
            SectionBody::Lines(lines) => {
                let small = TextStyle::regular(self.config.small_size);
                for line in lines {
                    self.paragraph(line, small, self.text_color, 0.0);
                }
            }
            SectionBody::Experience(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.y += self.config.item_gap;
                    }
                    self.experience_item(item);
                }
            }
            SectionBody::Education(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.y += self.config.item_gap;
                    }
                    self.education_item(item);
                }
            }
            SectionBody::Skills { skills, style } => self.skills(skills, *style),
        }
        self.y += self.config.section_gap;
    }

    fn heading(&mut self, heading: &Heading) {
        let cfg = self.config;
        let style = TextStyle::bold(cfg.heading_size);
        let mut indent = 0.0;

        if let Some(color) = heading.icon {
            let r = style.size * 0.25;
            self.ops.push(DrawOp::Circle {
                cx: self.left + r,
                cy: self.y + self.line_height(style) / 2.0,
                r,
                color,
            });
            indent = style.size * 0.8;
        }
        self.paragraph(&heading.text, style, heading.color, indent);

        if let Some(color) = heading.divider {
            self.y += 4.0;
            let w = self.width();
            self.fill_rect(self.left, self.y, w, 2.0, color);
            self.y += 2.0;
        }
        self.y += cfg.heading_gap;
    }

    /// Title on the left, a right-aligned note (dates) on the same first line.
    fn titled_row(&mut self, title: &str, note: Option<&str>) {
        let cfg = self.config;
        let title_style = TextStyle::bold(cfg.item_title_size);
        let note_style = TextStyle::regular(cfg.small_size);
        let top = self.y;

        let note_w = note
            .map(|n| self.typeface.measure(n, note_style))
            .unwrap_or(0.0);
        let reserve = if note_w > 0.0 { note_w + cfg.tag_gap } else { 0.0 };
        let lines = wrap_text(title, self.typeface, title_style, (self.width() - reserve).max(1.0));
        for line in lines {
            self.text_line(line, self.left, title_style, self.text_color);
        }

        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            let title_bottom = self.y;
            self.y = top;
            let x = (self.right - note_w).max(self.left);
            let line_h = self.line_height(title_style);
            let baseline = self.y + (line_h - note_style.size) / 2.0 + self.typeface.ascent(note_style);
            self.ops.push(DrawOp::Text {
                x,
                baseline,
                style: note_style,
                color: self.muted,
                text: note.to_string(),
            });
            self.y = title_bottom.max(top + line_h);
        }
    }

    fn experience_item(&mut self, item: &ExperienceItem) {
        let cfg = self.config;
        let body = TextStyle::regular(cfg.body_size);
        let small = TextStyle::regular(cfg.small_size);

        self.titled_row(&item.title, Some(&item.dates));
        if let Some(company) = &item.company {
            self.paragraph(company, body, self.muted, 0.0);
        }
        if let Some(description) = &item.description {
            self.y += cfg.item_gap / 3.0;
            self.paragraph(description, body, self.text_color, 0.0);
        }
        if let Some(achievements) = &item.achievements {
            self.y += cfg.item_gap / 3.0;
            if let Some(heading) = &achievements.heading {
                self.paragraph(heading, TextStyle::bold(cfg.small_size), self.text_color, 0.0);
            }
            for achievement in &achievements.items {
                let bullet_y = self.y;
                self.paragraph(achievement, small, self.text_color, cfg.bullet_indent);
                let line_h = self.line_height(small);
                self.ops.push(DrawOp::Circle {
                    cx: self.left + cfg.bullet_indent / 2.0,
                    cy: bullet_y + line_h / 2.0,
                    r: 2.0,
                    color: self.text_color,
                });
            }
        }
    }

    fn education_item(&mut self, item: &EducationItem) {
        let cfg = self.config;
        let body = TextStyle::regular(cfg.body_size);
        let small = TextStyle::regular(cfg.small_size);

        self.titled_row(&item.title, item.graduation_date.as_deref());
        if let Some(institution) = &item.institution {
            self.paragraph(institution, body, self.muted, 0.0);
        }
        if let Some(gpa) = &item.gpa {
            self.paragraph(gpa, small, self.text_color, 0.0);
        }
        if let Some(description) = &item.description {
            self.paragraph(description, small, self.text_color, 0.0);
        }
    }

    fn skills(&mut self, skills: &[String], style: SkillsStyle) {
        let cfg = self.config;
        let small = TextStyle::regular(cfg.small_size);

        match style {
            SkillsStyle::Inline { separator } => {
                let joined = skills.join(separator);
                self.paragraph(&joined, TextStyle::regular(cfg.body_size), self.text_color, 0.0);
            }
            SkillsStyle::List => {
                for skill in skills {
                    self.paragraph(skill, small, self.text_color, 0.0);
                }
            }
            SkillsStyle::Tags { fill, border } => {
                let tag_h = self.line_height(small) + 2.0 * cfg.tag_padding_y;
                let mut x = self.left;
                let mut row_top = self.y;
                for (i, skill) in skills.iter().enumerate() {
                    let max_text = self.width() - 2.0 * cfg.tag_padding_x;
                    let text_w = self.typeface.measure(skill, small).min(max_text);
                    let tag_w = text_w + 2.0 * cfg.tag_padding_x;
                    if i > 0 && x + tag_w > self.right {
                        x = self.left;
                        row_top += tag_h + cfg.tag_gap;
                    }
                    if let Some(color) = fill {
                        self.fill_rect(x, row_top, tag_w, tag_h, color);
                    }
                    if let Some(color) = border {
                        self.ops.push(DrawOp::StrokeRect {
                            x,
                            y: row_top,
                            w: tag_w,
                            h: tag_h,
                            width: 1.0,
                            color,
                        });
                    }
                    self.y = row_top + cfg.tag_padding_y;
                    self.text_line(skill.clone(), x + cfg.tag_padding_x, small, self.text_color);
                    x += tag_w + cfg.tag_gap;
                }
                if !skills.is_empty() {
                    self.y = row_top + tag_h;
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
