use std::collections::BTreeMap;

use pdf_writer::{Content, Name, Str};

use crate::columns::Align;
use crate::fonts::{FontEntry, FontSet, Weight};

use super::layout::{TextLine, wrap_text};

/// Fixed page template: size, uniform page margin and the left edge of the body column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub body_left: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
        margin: 40.0,
        body_left: 50.0,
    };

    /// Width the item table may occupy.
    pub fn available_width(&self) -> f32 {
        self.width - self.body_left - self.margin
    }

    /// Lowest y (measured from the top edge) content may reach.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin
    }

    pub fn fits(&self, y: f32, height: f32) -> bool {
        y + height <= self.content_bottom()
    }
}

/// Running draw position: page index and y measured downward from the top edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutCursor {
    pub page: usize,
    pub y: f32,
}

/// How a shape is painted. Every styled draw is bracketed by a graphics-state
/// save/restore, so nothing here leaks into later draws.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DrawStyle {
    pub(crate) fill: Option<[u8; 3]>,
    pub(crate) stroke: Option<[u8; 3]>,
    pub(crate) line_width: f32,
    pub(crate) opacity: f32,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            line_width: 1.0,
            opacity: 1.0,
        }
    }
}

impl DrawStyle {
    pub(crate) fn stroked(color: [u8; 3], line_width: f32) -> Self {
        Self {
            stroke: Some(color),
            line_width,
            ..Self::default()
        }
    }

    pub(crate) fn filled(color: [u8; 3]) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    pub(crate) fn with_fill(mut self, color: [u8; 3]) -> Self {
        self.fill = Some(color);
        self
    }

    pub(crate) fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TextStyle {
    pub(crate) weight: Weight,
    pub(crate) size: f32,
    pub(crate) color: [u8; 3],
    pub(crate) underline: bool,
}

impl TextStyle {
    pub(crate) const fn regular(size: f32) -> Self {
        Self {
            weight: Weight::Regular,
            size,
            color: [0, 0, 0],
            underline: false,
        }
    }

    pub(crate) const fn bold(size: f32) -> Self {
        Self {
            weight: Weight::Bold,
            size,
            color: [0, 0, 0],
            underline: false,
        }
    }

    pub(crate) const fn colored(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    pub(crate) const fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }
}

fn rgb(c: [u8; 3]) -> (f32, f32, f32) {
    (c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0)
}

pub(crate) type PageHook<'a> = Box<dyn Fn(&mut Canvas<'a>) + 'a>;

/// What the canvas leaves behind once layout is done.
pub(crate) struct CanvasOutput {
    pub(crate) pages: Vec<Content>,
    /// (resource name, alpha) for every opacity used on any page.
    pub(crate) opacity_states: Vec<(String, f32)>,
    pub(crate) images_per_page: Vec<usize>,
}

/// Page manager: owns the content streams, the cursor and the page-creation hook.
pub(crate) struct Canvas<'a> {
    geometry: PageGeometry,
    fonts: &'a FontSet,
    pages: Vec<Content>,
    content: Content,
    cursor: LayoutCursor,
    font_size: f32,
    opacity_states: BTreeMap<u32, String>,
    images_per_page: Vec<usize>,
    page_hook: Option<PageHook<'a>>,
}

impl<'a> Canvas<'a> {
    /// Opens the first page and runs `page_hook` on it and on every later page.
    pub(crate) fn new(geometry: PageGeometry, fonts: &'a FontSet, page_hook: Option<PageHook<'a>>) -> Self {
        let mut canvas = Self {
            geometry,
            fonts,
            pages: Vec::new(),
            content: Content::new(),
            cursor: LayoutCursor {
                page: 0,
                y: geometry.margin,
            },
            font_size: 12.0,
            opacity_states: BTreeMap::new(),
            images_per_page: vec![0],
            page_hook,
        };
        canvas.run_page_hook();
        canvas
    }

    fn run_page_hook(&mut self) {
        if let Some(hook) = self.page_hook.take() {
            hook(self);
            self.page_hook = Some(hook);
        }
    }

    pub(crate) fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub(crate) fn fonts(&self) -> &'a FontSet {
        self.fonts
    }

    pub(crate) fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    pub(crate) fn set_y(&mut self, y: f32) {
        self.cursor.y = y;
    }

    pub(crate) fn advance(&mut self, dy: f32) {
        self.cursor.y += dy;
    }

    pub(crate) fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    pub(crate) fn line_height(&self) -> f32 {
        self.fonts.regular.line_height(self.font_size)
    }

    /// Advance by `lines` line heights of the current font size.
    pub(crate) fn move_down(&mut self, lines: f32) {
        self.cursor.y += self.line_height() * lines;
    }

    pub(crate) fn new_page(&mut self) {
        self.pages.push(std::mem::replace(&mut self.content, Content::new()));
        self.images_per_page.push(0);
        self.cursor = LayoutCursor {
            page: self.cursor.page + 1,
            y: self.geometry.margin,
        };
        log::debug!("PAGE break → page {}", self.cursor.page + 1);
        self.run_page_hook();
    }

    fn at_page_top(&self) -> bool {
        (self.cursor.y - self.geometry.margin).abs() < 1.0
    }

    /// Start a new page unless `height` still fits below the cursor. Content that
    /// cannot fit even on an empty page is placed anyway. Returns whether a page
    /// break happened.
    pub(crate) fn ensure_space(&mut self, height: f32) -> bool {
        if !self.at_page_top() && !self.geometry.fits(self.cursor.y, height) {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn pdf_y(&self, top_y: f32) -> f32 {
        self.geometry.height - top_y
    }

    fn opacity_state(&mut self, opacity: f32) -> Option<String> {
        if opacity >= 1.0 {
            return None;
        }
        let key = (opacity * 1000.0).round() as u32;
        let name = self
            .opacity_states
            .entry(key)
            .or_insert_with(|| format!("GS{key}"))
            .clone();
        Some(name)
    }

    fn begin_style(&mut self, style: &DrawStyle) {
        let gs = self.opacity_state(style.opacity);
        self.content.save_state();
        if let Some(name) = gs {
            self.content.set_parameters(Name(name.as_bytes()));
        }
        if let Some(c) = style.fill {
            let (r, g, b) = rgb(c);
            self.content.set_fill_rgb(r, g, b);
        }
        if let Some(c) = style.stroke {
            let (r, g, b) = rgb(c);
            self.content.set_stroke_rgb(r, g, b);
            self.content.set_line_width(style.line_width);
        }
    }

    fn paint(&mut self, style: &DrawStyle) {
        match (style.fill.is_some(), style.stroke.is_some()) {
            (true, true) => {
                self.content.fill_nonzero_and_stroke();
            }
            (true, false) => {
                self.content.fill_nonzero();
            }
            (false, true) => {
                self.content.stroke();
            }
            (false, false) => {
                self.content.end_path();
            }
        }
    }

    /// Rectangle with its top-left corner at (`x`, `y`).
    pub(crate) fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, style: &DrawStyle) {
        self.begin_style(style);
        let bottom = self.pdf_y(y + h);
        self.content.rect(x, bottom, w, h);
        self.paint(style);
        self.content.restore_state();
    }

    pub(crate) fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, style: &DrawStyle) {
        self.begin_style(style);
        let (py1, py2) = (self.pdf_y(y1), self.pdf_y(y2));
        self.content.move_to(x1, py1);
        self.content.line_to(x2, py2);
        self.content.stroke();
        self.content.restore_state();
    }

    /// Draw an image XObject into the box with top-left corner (`x`, `y`).
    pub(crate) fn image(&mut self, name: &str, x: f32, y: f32, w: f32, h: f32, style: &DrawStyle) {
        self.begin_style(style);
        let bottom = self.pdf_y(y + h);
        self.content.transform([w, 0.0, 0.0, h, x, bottom]);
        self.content.x_object(Name(name.as_bytes()));
        self.content.restore_state();
        if let Some(count) = self.images_per_page.last_mut() {
            *count += 1;
        }
    }

    fn font(&self, weight: Weight) -> &'a FontEntry {
        self.fonts.get(weight)
    }

    fn draw_line_of_text(&mut self, line: &TextLine, x: f32, width: f32, top: f32, align: Align, style: &TextStyle) {
        if line.text.is_empty() {
            return;
        }
        let font = self.font(style.weight);
        let start_x = match align {
            Align::Left => x,
            Align::Center => x + (width - line.width) / 2.0,
            Align::Right => x + width - line.width,
        };
        let baseline = self.pdf_y(top + style.size * font.ascender_ratio);
        let bytes = font.encode(&line.text);

        self.content.save_state();
        let (r, g, b) = rgb(style.color);
        self.content.set_fill_rgb(r, g, b);
        self.content.begin_text();
        self.content.set_font(Name(font.pdf_name.as_bytes()), style.size);
        self.content.next_line(start_x, baseline);
        self.content.show(Str(&bytes));
        self.content.end_text();
        if style.underline {
            let thick = (style.size * 0.05).max(0.5);
            let ul_y = baseline - style.size * 0.12;
            self.content.rect(start_x, ul_y - thick, line.width, thick);
            self.content.fill_nonzero();
        }
        self.content.restore_state();
    }

    /// Draw `text` wrapped to `width` with its top at `y`. Positioned absolutely:
    /// the cursor does not move and no page break is taken. Returns the height used.
    pub(crate) fn text_box(&mut self, text: &str, x: f32, y: f32, width: f32, align: Align, style: &TextStyle) -> f32 {
        self.font_size = style.size;
        let font = self.font(style.weight);
        let line_h = font.line_height(style.size);
        let lines = wrap_text(text, font, style.size, width);
        for (i, line) in lines.iter().enumerate() {
            self.draw_line_of_text(line, x, width, y + i as f32 * line_h, align, style);
        }
        lines.len() as f32 * line_h
    }

    /// Single unwrapped line at (`x`, `y`), aligned within `width`.
    pub(crate) fn text_line(&mut self, text: &str, x: f32, y: f32, width: f32, align: Align, style: &TextStyle) {
        self.font_size = style.size;
        let font = self.font(style.weight);
        let line = TextLine {
            text: text.to_string(),
            width: font.text_width(text, style.size),
        };
        self.draw_line_of_text(&line, x, width, y, align, style);
    }

    /// Flow `text` at the cursor: wrap to `width` (default: to the right margin),
    /// break pages line by line and leave the cursor below the last line.
    pub(crate) fn flow_text(&mut self, text: &str, x: f32, width: Option<f32>, align: Align, style: &TextStyle) {
        self.font_size = style.size;
        let width = width.unwrap_or(self.geometry.width - self.geometry.margin - x);
        let font = self.font(style.weight);
        let line_h = font.line_height(style.size);
        for line in wrap_text(text, font, style.size, width) {
            self.ensure_space(line_h);
            let y = self.cursor.y;
            self.draw_line_of_text(&line, x, width, y, align, style);
            self.cursor.y += line_h;
        }
    }

    /// Flow a line centered between the page margins.
    pub(crate) fn flow_centered(&mut self, text: &str, style: &TextStyle) {
        let g = self.geometry;
        self.flow_text(text, g.margin, Some(g.width - 2.0 * g.margin), Align::Center, style);
    }

    pub(crate) fn finish(mut self) -> CanvasOutput {
        self.pages.push(std::mem::replace(&mut self.content, Content::new()));
        CanvasOutput {
            pages: self.pages,
            opacity_states: self
                .opacity_states
                .into_iter()
                .map(|(key, name)| (name, key as f32 / 1000.0))
                .collect(),
            images_per_page: self.images_per_page,
        }
    }
}
