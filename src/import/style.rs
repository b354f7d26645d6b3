//! Style selection and mapping tables for text import.

use regex::Regex;

use crate::fonts::FontFamily;
use crate::model::{Alignment, RawAlignment, RawColor, StyleRun, TextData};

/// One way of finding the style of a type layer.
pub trait StyleStrategy: Send + Sync {
    /// Strategy name, used in log output.
    fn name(&self) -> &'static str;

    /// Extract a style, or `None` if this strategy finds nothing.
    fn extract(&self, text: &TextData) -> Option<StyleRun>;
}

/// The first non-empty style run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstRun;

impl StyleStrategy for FirstRun {
    fn name(&self) -> &'static str {
        "first-run"
    }

    fn extract(&self, text: &TextData) -> Option<StyleRun> {
        text.runs.iter().find(|run| !run.is_empty()).cloned()
    }
}

/// The layer-level default style.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerDefault;

impl StyleStrategy for LayerDefault {
    fn name(&self) -> &'static str {
        "layer-default"
    }

    fn extract(&self, text: &TextData) -> Option<StyleRun> {
        text.default_style
            .as_ref()
            .filter(|style| !style.is_empty())
            .cloned()
    }
}

/// 16px Arial in black.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fallback;

impl Fallback {
    /// The fallback style.
    pub fn style() -> StyleRun {
        StyleRun::new()
            .with_implied_size(16.0)
            .with_font("Arial")
            .with_color(RawColor::black())
    }
}

impl StyleStrategy for Fallback {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn extract(&self, _text: &TextData) -> Option<StyleRun> {
        Some(Self::style())
    }
}

/// Ordered list of style strategies; the first result wins.
pub struct StyleChain {
    strategies: Vec<Box<dyn StyleStrategy>>,
}

impl StyleChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Append a strategy.
    pub fn with_strategy<S: StyleStrategy + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Number of strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if the chain has no strategies.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Select the style of a type layer.
    ///
    /// Returns the style and the name of the strategy that produced it. An
    /// exhausted chain yields the [`Fallback`] style.
    pub fn select(&self, text: &TextData) -> (StyleRun, &'static str) {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.extract(text).map(|style| (style, strategy.name())))
            .unwrap_or_else(|| (Fallback::style(), Fallback.name()))
    }
}

impl Default for StyleChain {
    fn default() -> Self {
        Self::new()
            .with_strategy(FirstRun)
            .with_strategy(LayerDefault)
            .with_strategy(Fallback)
    }
}

impl std::fmt::Debug for StyleChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

/// Color channels as bytes.
///
/// When every channel is at most 1.0 the color is read as 0-1 floats.
pub fn color_to_rgb(color: &RawColor) -> [u8; 3] {
    let unit = color.r <= 1.0 && color.g <= 1.0 && color.b <= 1.0;
    let scale = if unit { 255.0 } else { 1.0 };
    let channel = |v: f64| {
        let v = (v * scale).round();
        if v.is_nan() {
            0
        } else {
            v.clamp(0.0, 255.0) as u8
        }
    };
    [channel(color.r), channel(color.g), channel(color.b)]
}

/// Color as a CSS `rgb(r,g,b)` string.
pub fn normalize_color(color: &RawColor) -> String {
    let [r, g, b] = color_to_rgb(color);
    format!("rgb({},{},{})", r, g, b)
}

/// Alignment table. Unrecognized values are left aligned.
pub fn map_alignment(alignment: Option<&RawAlignment>) -> Alignment {
    match alignment {
        Some(RawAlignment::Code(code)) => match code {
            0 => Alignment::Left,
            1 => Alignment::Center,
            2 => Alignment::Right,
            3 => Alignment::Justify,
            _ => Alignment::Left,
        },
        Some(RawAlignment::Named(name)) => match name.trim().to_ascii_lowercase().as_str() {
            "left" => Alignment::Left,
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            "justify" => Alignment::Justify,
            _ => Alignment::Left,
        },
        None => Alignment::Left,
    }
}

/// Weight and slant hints found in font names.
#[derive(Debug, Clone)]
pub struct FontNameHints {
    bold: Regex,
    italic: Regex,
}

impl FontNameHints {
    pub fn new() -> Self {
        Self {
            bold: Regex::new(r"(?i)(bold|black|heavy|semibold|demibold)").unwrap(),
            italic: Regex::new(r"(?i)(italic|oblique)").unwrap(),
        }
    }

    /// Bold and italic flags of a style.
    ///
    /// Explicit flags win; otherwise the font name is searched for a weight or
    /// slant word.
    pub fn resolve(&self, style: &StyleRun) -> (bool, bool) {
        let name = style.font_name.as_deref().unwrap_or("");
        let bold = style.faux_bold.unwrap_or(false) || self.bold.is_match(name);
        let italic = style.faux_italic.unwrap_or(false) || self.italic.is_match(name);
        (bold, italic)
    }
}

impl Default for FontNameHints {
    fn default() -> Self {
        Self::new()
    }
}

/// CSS family stack for a style's font.
pub fn font_family_stack(style: &StyleRun) -> FontFamily {
    FontFamily::from_document_name(style.font_name.as_deref().unwrap_or("Arial"))
}
