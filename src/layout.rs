//! Text Auto-Fit Layout
//!
//! Each line gets the largest font size whose measured width stays within 88% of
//! the box width, found by a fixed-length bisection against a [`TextMeasurer`].

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use crate::formats::ViewBox;

pub const DEFAULT_FONT_FAMILY: &str = "Inter, sans-serif";
pub const DEFAULT_FONT_WEIGHT: u16 = 700;
pub const DEFAULT_MAX_LINES: usize = 2;
pub const DEFAULT_MIN_SIZE: f64 = 10.0;
pub const PLACEHOLDER_TEXT: &str = "Your Text";

/// Share of the box height used as the default maximum font size.
pub const MAX_SIZE_HEIGHT_RATIO: f64 = 0.32;
/// Share of the box width text may occupy.
pub const TARGET_WIDTH_RATIO: f64 = 0.88;
pub const FIT_ITERATIONS: usize = 14;

/// Vertical centre of a lone line, as a share of box height.
const SINGLE_LINE_Y: f64 = 0.54;
const FIRST_LINE_Y: f64 = 0.40;
const LINE_STEP_Y: f64 = 0.22;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: DEFAULT_FONT_FAMILY.to_string(),
            weight: DEFAULT_FONT_WEIGHT,
        }
    }
}

/// Width oracle for a run of text at a given size.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec, font_size: f64) -> f64;
}

/// Average-advance approximation used when no real font metrics are available.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicMeasurer {
    pub char_width_factor: f64,
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
        }
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn measure(&self, text: &str, _font: &FontSpec, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * self.char_width_factor
    }
}

/// Per-glyph advance widths in 1/1000 em, indexed from U+0020.
#[derive(Debug, Clone)]
pub struct AdvanceTableMeasurer {
    ascii_advances: Vec<u16>,
    /// Advance for printable characters outside the table
    fallback_advance: u16,
}

// Helvetica-Bold AFM advances, U+0020..=U+007E.
const HELVETICA_BOLD_ADVANCES: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a-m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n-z
    389, 280, 389, 584, // {..~
];

impl AdvanceTableMeasurer {
    pub fn new(ascii_advances: Vec<u16>, fallback_advance: u16) -> Self {
        Self {
            ascii_advances,
            fallback_advance,
        }
    }

    pub fn helvetica_bold() -> Self {
        Self::new(HELVETICA_BOLD_ADVANCES.to_vec(), 611)
    }

    fn advance(&self, c: char) -> f64 {
        let code = c as usize;
        if (0x20..0x20 + self.ascii_advances.len()).contains(&code) {
            return f64::from(self.ascii_advances[code - 0x20]) / 1000.0;
        }
        match c.width() {
            Some(0) | None => 0.0,
            Some(2) => 1.0,
            _ => f64::from(self.fallback_advance) / 1000.0,
        }
    }
}

impl Default for AdvanceTableMeasurer {
    fn default() -> Self {
        Self::helvetica_bold()
    }
}

impl TextMeasurer for AdvanceTableMeasurer {
    fn measure(&self, text: &str, _font: &FontSpec, font_size: f64) -> f64 {
        text.chars().map(|c| self.advance(c)).sum::<f64>() * font_size
    }
}

/// Layout request. Zero or missing numbers fall back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    #[serde(default)]
    pub view_box: Option<ViewBox>,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub max_lines: Option<usize>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_weight: Option<u16>,
    #[serde(default)]
    pub min_size: Option<f64>,
    #[serde(default)]
    pub max_size: Option<f64>,
}

impl LayoutOptions {
    pub fn new(view_box: ViewBox, lines: Vec<String>) -> Self {
        Self {
            view_box: Some(view_box),
            lines,
            ..Default::default()
        }
    }

    fn font(&self) -> FontSpec {
        FontSpec {
            family: self
                .font_family
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            weight: self
                .font_weight
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_FONT_WEIGHT),
        }
    }

    /// Resolved `(min, max)` size bounds, with `max >= min`.
    pub fn size_bounds(&self) -> (f64, f64) {
        let vb = self.view_box.unwrap_or_default();
        let positive = |v: Option<f64>| v.filter(|s| s.is_finite() && *s > 0.0);
        let min = positive(self.min_size).unwrap_or(DEFAULT_MIN_SIZE);
        let max = positive(self.max_size).unwrap_or(vb.height * MAX_SIZE_HEIGHT_RATIO);
        (min, max.max(min))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

/// A positioned line, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineLayout {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: u16,
    pub anchor: TextAnchor,
}

/// Largest size in `[min_size, max_size]` whose width fits `max_width`.
///
/// When even `min_size` overflows, `min_size` is returned and the text clips.
pub fn fit_text_width(
    measurer: &dyn TextMeasurer,
    text: &str,
    max_width: f64,
    font: &FontSpec,
    min_size: f64,
    max_size: f64,
) -> f64 {
    let mut lo = min_size;
    let mut hi = max_size;
    let mut best = min_size;
    for _ in 0..FIT_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if measurer.measure(text, font, mid) <= max_width {
            best = mid;
            lo = mid;
        } else {
            hi = mid;
        }
    }
    best.min(max_size).max(min_size)
}

/// Lay out with the heuristic measurer.
pub fn layout_tag(options: &LayoutOptions) -> Vec<LineLayout> {
    layout_tag_with(options, &HeuristicMeasurer::default())
}

pub fn layout_tag_with(options: &LayoutOptions, measurer: &dyn TextMeasurer) -> Vec<LineLayout> {
    let vb = options.view_box.unwrap_or_default();
    let max_lines = options
        .max_lines
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_LINES);

    let mut lines: Vec<&str> = options
        .lines
        .iter()
        .map(String::as_str)
        .filter(|t| !t.trim().is_empty())
        .take(max_lines)
        .collect();
    if lines.is_empty() {
        lines.push(PLACEHOLDER_TEXT);
    }

    let font = options.font();
    let (min_size, max_size) = options.size_bounds();
    let target_width = vb.width * TARGET_WIDTH_RATIO;
    let line_count = lines.len();

    lines
        .into_iter()
        .enumerate()
        .map(|(idx, text)| {
            let font_size = fit_text_width(measurer, text, target_width, &font, min_size, max_size);
            let y_factor = if line_count == 1 {
                SINGLE_LINE_Y
            } else {
                FIRST_LINE_Y + idx as f64 * LINE_STEP_Y
            };
            tracing::trace!(text, font_size, "fitted line");
            LineLayout {
                text: text.to_string(),
                x: vb.center_x(),
                y: vb.y + vb.height * y_factor,
                font_size,
                font_family: font.family.clone(),
                font_weight: font.weight,
                anchor: TextAnchor::Middle,
            }
        })
        .collect()
}

/// Letter case applied to tag text before layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    #[default]
    Upper,
    Title,
    None,
}

impl TextCase {
    pub fn apply(&self, text: &str) -> String {
        match self {
            TextCase::Upper => text.to_uppercase(),
            TextCase::Title => title_case(text),
            TextCase::None => text.to_string(),
        }
    }
}

// Each whitespace-separated word: leading punctuation kept, first word character
// upper-cased, the remainder lower-cased.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() || c == '_' {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
