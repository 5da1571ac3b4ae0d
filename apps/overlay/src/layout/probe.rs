//! Measurement targets for the fit search.
//!
//! The search never talks to a renderer directly. It sees a `Container`
//! (something with a content box) and a `MeasurementProbe` (something that
//! carries the display text, accepts inline style changes, and reports the
//! intrinsic size of its content). `MetricProbe` is the in-process probe
//! backed by the static font tables.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{get_metrics, FontFamily};

/// Font size a probe falls back to when no inline size is set.
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Pixel box, used both for container content boxes and intrinsic sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when `inner` fits in `self` along both axes.
    pub fn contains(&self, inner: Size) -> bool {
        inner.width <= self.width && inner.height <= self.height
    }
}

/// Anything that exposes a content box the text must fit into.
pub trait Container {
    fn content_box(&self) -> Size;
}

impl Container for Size {
    fn content_box(&self) -> Size {
        *self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    #[default]
    Normal,
    Nowrap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

/// Inline style of a probe. `None` font size means "inherit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStyle {
    pub font_size: Option<u32>,
    pub white_space: WhiteSpace,
    pub overflow: Overflow,
}

/// A measurement target sharing text and font with the real display element.
pub trait MeasurementProbe {
    fn text(&self) -> &str;

    fn style(&self) -> ProbeStyle;

    fn set_style(&mut self, style: ProbeStyle);

    /// Intrinsic (scroll) size of the content under the current style when
    /// laid out inside `available`.
    fn scroll_size(&self, available: Size) -> Size;
}

// ────────────────────────────────────────────────────────────────────────────
// MetricProbe
// ────────────────────────────────────────────────────────────────────────────

/// Probe that lays text out with the static font tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricProbe {
    text: String,
    font: FontFamily,
    style: ProbeStyle,
}

impl MetricProbe {
    pub fn new(text: impl Into<String>, font: FontFamily) -> Self {
        Self {
            text: text.into(),
            font,
            style: ProbeStyle::default(),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn font(&self) -> FontFamily {
        self.font
    }

    pub fn set_font(&mut self, font: FontFamily) {
        self.font = font;
    }

    fn effective_font_size(&self) -> u32 {
        self.style.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }
}

impl MeasurementProbe for MetricProbe {
    fn text(&self) -> &str {
        &self.text
    }

    fn style(&self) -> ProbeStyle {
        self.style
    }

    fn set_style(&mut self, style: ProbeStyle) {
        self.style = style;
    }

    fn scroll_size(&self, available: Size) -> Size {
        let metrics = get_metrics(self.font);
        let font_size = self.effective_font_size();

        if self.text.is_empty() {
            return Size::default();
        }

        match self.style.white_space {
            WhiteSpace::Nowrap => Size {
                width: metrics.line_width_px(&self.text, font_size),
                height: metrics.block_height_px(1, font_size),
            },
            WhiteSpace::Normal => {
                let lines = metrics.wrap_lines(&self.text, font_size, available.width);
                // Whitespace-only text still occupies one line box.
                let line_count = lines.len().max(1) as u32;
                let widest = lines.iter().copied().max().unwrap_or(0);
                Size {
                    width: widest.max(available.width),
                    height: metrics.block_height_px(line_count, font_size),
                }
            }
        }
    }
}
