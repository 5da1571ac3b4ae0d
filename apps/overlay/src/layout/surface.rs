//! FitSurface: one display element, its container and its fit engine.

use serde::Serialize;
use tracing::debug;

use crate::layout::autofit::{AutoFit, FitBounds, FitError, FitResult};
use crate::layout::font_metrics::FontFamily;
use crate::layout::probe::{MeasurementProbe, MetricProbe, Size};

/// What display clients render: the text and the size to render it at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
    pub text: String,
    pub font_size: u32,
    pub font_family: FontFamily,
    pub container: Option<Size>,
    pub bounds: FitBounds,
}

#[derive(Debug, Clone)]
pub struct FitSurface {
    probe: MetricProbe,
    container: Option<Size>,
    engine: AutoFit,
}

impl FitSurface {
    pub fn new(font: FontFamily, engine: AutoFit) -> Self {
        Self {
            probe: MetricProbe::new("", font),
            container: None,
            engine,
        }
    }

    pub fn text(&self) -> &str {
        self.probe.text()
    }

    pub fn font_size(&self) -> u32 {
        self.engine.font_size()
    }

    /// Replaces the text and refits right away when it changed. Text changes
    /// are not debounced: a ticking timer must never render at a stale size.
    pub fn set_text(&mut self, text: &str) -> Option<FitResult> {
        if self.probe.text() == text {
            return None;
        }
        self.probe.set_text(text);
        self.refit().ok()
    }

    pub fn set_container(&mut self, size: Size) {
        self.container = Some(size);
    }

    pub fn detach_container(&mut self) {
        self.container = None;
    }

    pub fn font(&self) -> FontFamily {
        self.probe.font()
    }

    /// Swaps the font. Returns the element's new intrinsic size at the current
    /// font size so the caller can publish it as an element resize.
    pub fn set_font(&mut self, font: FontFamily) -> Option<Size> {
        if self.probe.font() == font {
            return None;
        }
        self.probe.set_font(font);
        let mut measuring = self.probe.clone();
        let mut style = measuring.style();
        style.font_size = Some(self.font_size());
        measuring.set_style(style);
        Some(measuring.scroll_size(self.container.unwrap_or_default()))
    }

    pub fn set_bounds(&mut self, bounds: FitBounds) -> Result<Option<FitResult>, FitError> {
        self.engine.set_bounds(bounds)?;
        Ok(self.refit().ok())
    }

    pub fn refit(&mut self) -> Result<FitResult, FitError> {
        let result = self
            .engine
            .refit(Some(&mut self.probe), self.container.as_ref())?;
        debug!(
            text = %self.probe.text(),
            font_size = result.font_size,
            "surface refit"
        );
        Ok(result)
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            text: self.probe.text().to_string(),
            font_size: self.engine.font_size(),
            font_family: self.probe.font(),
            container: self.container,
            bounds: self.engine.bounds(),
        }
    }
}
