//! AutoFit: finds the largest integer font size at which a text fits its container.
//!
//! # Search
//! Integer binary search over `[min_size, max_size]`. `low` is the largest size
//! known to fit (starts at `min_size`, assumed acceptable even when it overflows),
//! `high` the largest size still worth testing. Each step probes the upper mid
//! so the search converges on the maximum. One layout read per step, so the
//! cost is O(log(max - min)) measurements.
//!
//! The search relies on fit being monotonic in font size: a larger font never
//! produces a smaller bounding box.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::probe::{Container, MeasurementProbe, Overflow, ProbeStyle, Size, WhiteSpace};

pub const DEFAULT_MIN_FONT_SIZE: u32 = 10;
pub const DEFAULT_MAX_FONT_SIZE: u32 = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("Missing measurement target: {0}")]
    MissingMeasurementTarget(&'static str),

    #[error("Invalid font size bounds: min {min}, max {max}")]
    InvalidBounds { min: u32, max: u32 },
}

/// Closed font size range in px. Construct through `FitBounds::new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitBounds {
    pub min_size: u32,
    pub max_size: u32,
}

impl FitBounds {
    pub fn new(min_size: u32, max_size: u32) -> Result<Self, FitError> {
        let bounds = Self { min_size, max_size };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.min_size == 0 || self.min_size > self.max_size {
            return Err(FitError::InvalidBounds {
                min: self.min_size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    pub fn clamp(&self, size: u32) -> u32 {
        size.clamp(self.min_size, self.max_size)
    }
}

impl Default for FitBounds {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_FONT_SIZE,
            max_size: DEFAULT_MAX_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitResult {
    pub font_size: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Core search
// ────────────────────────────────────────────────────────────────────────────

/// Computes the largest font size in `bounds` at which the probe's text fits
/// the container's content box.
///
/// The probe is measured with wrapping disabled and overflow clipped; its
/// original inline style is restored before returning.
pub fn compute_fit<P, C>(probe: &mut P, container: &C, bounds: FitBounds) -> Result<u32, FitError>
where
    P: MeasurementProbe + ?Sized,
    C: Container + ?Sized,
{
    bounds.validate()?;

    if probe.text().is_empty() {
        return Ok(bounds.max_size);
    }

    let available = container.content_box();
    let original = probe.style();
    let mut measuring = ProbeStyle {
        white_space: WhiteSpace::Nowrap,
        overflow: Overflow::Hidden,
        ..original
    };

    let mut low = bounds.min_size;
    let mut high = bounds.max_size;
    let mut probes = 0u32;

    while low < high {
        let mid = low + (high - low + 1) / 2;
        measuring.font_size = Some(mid);
        probe.set_style(measuring);
        probes += 1;

        if fits(probe.scroll_size(available), available) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    probe.set_style(original);

    debug!(
        font_size = low,
        probes,
        width = available.width,
        height = available.height,
        "fit search converged"
    );
    Ok(low)
}

fn fits(content: Size, available: Size) -> bool {
    available.contains(content)
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Owns the bounds, the optional post-processing offset and the last good fit
/// for one display element.
#[derive(Debug, Clone)]
pub struct AutoFit {
    bounds: FitBounds,
    offset_px: u32,
    last: Option<FitResult>,
}

impl AutoFit {
    pub fn new(bounds: FitBounds) -> Self {
        Self {
            bounds,
            offset_px: 0,
            last: None,
        }
    }

    /// Subtracts `offset_px` from every search result, never going below `min_size`.
    pub fn with_offset(mut self, offset_px: u32) -> Self {
        self.offset_px = offset_px;
        self
    }

    pub fn bounds(&self) -> FitBounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: FitBounds) -> Result<(), FitError> {
        bounds.validate()?;
        self.bounds = bounds;
        Ok(())
    }

    pub fn last(&self) -> Option<FitResult> {
        self.last
    }

    /// Font size to render with: the last fit, or `max_size` before any fit.
    pub fn font_size(&self) -> u32 {
        self.last
            .map(|r| r.font_size)
            .unwrap_or(self.bounds.max_size)
    }

    /// Recomputes the fit. A missing probe or container skips the cycle and
    /// keeps the cached result.
    pub fn refit<P, C>(
        &mut self,
        probe: Option<&mut P>,
        container: Option<&C>,
    ) -> Result<FitResult, FitError>
    where
        P: MeasurementProbe + ?Sized,
        C: Container + ?Sized,
    {
        let (probe, container) = match (probe, container) {
            (Some(p), Some(c)) => (p, c),
            (None, _) => return Err(self.skip("element")),
            (_, None) => return Err(self.skip("container")),
        };

        let raw = compute_fit(probe, container, self.bounds)?;
        let result = FitResult {
            font_size: self.bounds.clamp(raw.saturating_sub(self.offset_px)),
        };
        self.last = Some(result);
        Ok(result)
    }

    fn skip(&self, missing: &'static str) -> FitError {
        warn!(
            missing,
            font_size = self.font_size(),
            "AutoFit: measurement target absent, keeping last font size"
        );
        FitError::MissingMeasurementTarget(missing)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::layout::font_metrics::FontFamily;
    use crate::layout::probe::MetricProbe;

    /// Probe with a fixed aspect: width = size × w_per_px, height = size × h_per_px.
    struct LinearProbe {
        text: String,
        style: ProbeStyle,
        w_per_px: u32,
        h_per_px: u32,
        reads: Cell<u32>,
    }

    impl LinearProbe {
        fn new(text: &str, w_per_px: u32, h_per_px: u32) -> Self {
            Self {
                text: text.to_string(),
                style: ProbeStyle::default(),
                w_per_px,
                h_per_px,
                reads: Cell::new(0),
            }
        }
    }

    impl MeasurementProbe for LinearProbe {
        fn text(&self) -> &str {
            &self.text
        }
        fn style(&self) -> ProbeStyle {
            self.style
        }
        fn set_style(&mut self, style: ProbeStyle) {
            self.style = style;
        }
        fn scroll_size(&self, _available: Size) -> Size {
            self.reads.set(self.reads.get() + 1);
            let size = self.style.font_size.unwrap_or(16);
            Size::new(size * self.w_per_px, size * self.h_per_px)
        }
    }

    fn bounds(min: u32, max: u32) -> FitBounds {
        FitBounds::new(min, max).unwrap()
    }

    #[test]
    fn test_clock_text_in_300_by_100() {
        let mut probe = MetricProbe::new("12:34", FontFamily::Inter);
        let container = Size::new(300, 100);
        let size = compute_fit(&mut probe, &container, bounds(10, 1000)).unwrap();

        // Height-bound: 1.21 × 82 = 99.22 fits, 1.21 × 83 = 100.43 does not.
        assert_eq!(size, 82);

        let mut check = |font_size: u32| {
            probe.set_style(ProbeStyle {
                font_size: Some(font_size),
                white_space: WhiteSpace::Nowrap,
                overflow: Overflow::Hidden,
            });
            container.contains(probe.scroll_size(container))
        };
        assert!(check(size));
        assert!(!check(size + 1));
    }

    #[test]
    fn test_result_within_bounds() {
        let texts = ["", "0", "00:00:00", "-12:59:59", "A much longer session title"];
        let containers = [Size::new(1, 1), Size::new(40, 900), Size::new(1920, 1080)];
        for text in texts {
            for container in containers {
                let mut probe = MetricProbe::new(text, FontFamily::Oswald);
                let size = compute_fit(&mut probe, &container, bounds(12, 400)).unwrap();
                assert!((12..=400).contains(&size), "{text:?} in {container:?} gave {size}");
            }
        }
    }

    #[test]
    fn test_larger_container_never_shrinks_font() {
        let mut previous = 0;
        for step in 1..40u32 {
            let container = Size::new(step * 25, step * 9);
            let mut probe = MetricProbe::new("-01:02:03", FontFamily::Inter);
            let size = compute_fit(&mut probe, &container, bounds(1, 2000)).unwrap();
            assert!(size >= previous, "step {step}: {size} < {previous}");
            previous = size;
        }
    }

    #[test]
    fn test_idempotent() {
        let mut probe = MetricProbe::new("45:00", FontFamily::JetbrainsMono);
        let container = Size::new(640, 360);
        let first = compute_fit(&mut probe, &container, bounds(10, 1000)).unwrap();
        let second = compute_fit(&mut probe, &container, bounds(10, 1000)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_overflowing_minimum_returns_minimum() {
        let mut probe = LinearProbe::new("wide", 50, 1);
        let size = compute_fit(&mut probe, &Size::new(100, 100), bounds(10, 500)).unwrap();
        assert_eq!(size, 10);
    }

    #[test]
    fn test_empty_text_returns_maximum_without_measuring() {
        let mut probe = LinearProbe::new("", 1, 1);
        let size = compute_fit(&mut probe, &Size::new(1, 1), bounds(10, 500)).unwrap();
        assert_eq!(size, 500);
        assert_eq!(probe.reads.get(), 0);
    }

    #[test]
    fn test_exact_boundary_is_inclusive() {
        // width = 3 × size; 300 wide container fits exactly 100.
        let mut probe = LinearProbe::new("x", 3, 1);
        let size = compute_fit(&mut probe, &Size::new(300, 1000), bounds(1, 1000)).unwrap();
        assert_eq!(size, 100);
    }

    #[test]
    fn test_equal_bounds_short_circuit() {
        let mut probe = LinearProbe::new("x", 1000, 1000);
        let size = compute_fit(&mut probe, &Size::new(1, 1), bounds(42, 42)).unwrap();
        assert_eq!(size, 42);
    }

    #[test]
    fn test_style_restored_after_search() {
        let original = ProbeStyle {
            font_size: Some(33),
            white_space: WhiteSpace::Normal,
            overflow: Overflow::Visible,
        };
        let mut probe = MetricProbe::new("10:00", FontFamily::Inter);
        probe.set_style(original);
        compute_fit(&mut probe, &Size::new(500, 200), bounds(10, 1000)).unwrap();
        assert_eq!(probe.style(), original);
    }

    #[test]
    fn test_invalid_bounds_fail_fast() {
        assert_eq!(
            FitBounds::new(20, 10),
            Err(FitError::InvalidBounds { min: 20, max: 10 })
        );
        assert!(FitBounds::new(0, 10).is_err());

        let mut probe = LinearProbe::new("x", 1, 1);
        let bad = FitBounds {
            min_size: 50,
            max_size: 5,
        };
        assert!(matches!(
            compute_fit(&mut probe, &Size::new(10, 10), bad),
            Err(FitError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_engine_caches_and_exposes_result() {
        let mut engine = AutoFit::new(bounds(10, 1000));
        assert_eq!(engine.font_size(), 1000);
        assert!(engine.last().is_none());

        let mut probe = MetricProbe::new("12:34", FontFamily::Inter);
        let result = engine
            .refit(Some(&mut probe), Some(&Size::new(300, 100)))
            .unwrap();
        assert_eq!(result.font_size, 82);
        assert_eq!(engine.font_size(), 82);
    }

    #[test]
    fn test_engine_missing_target_keeps_last() {
        let mut engine = AutoFit::new(bounds(10, 1000));
        let mut probe = MetricProbe::new("12:34", FontFamily::Inter);
        engine
            .refit(Some(&mut probe), Some(&Size::new(300, 100)))
            .unwrap();

        let err = engine
            .refit::<MetricProbe, Size>(Some(&mut probe), None)
            .unwrap_err();
        assert_eq!(err, FitError::MissingMeasurementTarget("container"));

        let err = engine
            .refit::<MetricProbe, Size>(None, Some(&Size::new(1, 1)))
            .unwrap_err();
        assert_eq!(err, FitError::MissingMeasurementTarget("element"));
        assert_eq!(engine.font_size(), 82);
    }

    #[test]
    fn test_engine_offset_is_clamped_to_minimum() {
        let mut probe = LinearProbe::new("x", 1, 1);
        let mut engine = AutoFit::new(bounds(10, 100)).with_offset(15);
        let result = engine
            .refit(Some(&mut probe), Some(&Size::new(50, 50)))
            .unwrap();
        assert_eq!(result.font_size, 35);

        let result = engine
            .refit(Some(&mut probe), Some(&Size::new(12, 12)))
            .unwrap();
        assert_eq!(result.font_size, 10);
    }

    #[test]
    fn test_engine_rejects_invalid_bounds_update() {
        let mut engine = AutoFit::new(FitBounds::default());
        let bad = FitBounds {
            min_size: 9,
            max_size: 3,
        };
        assert!(engine.set_bounds(bad).is_err());
        assert_eq!(engine.bounds(), FitBounds::default());
    }
}
