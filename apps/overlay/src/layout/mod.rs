// Auto-fit text layout: font metrics, the binary-search fit engine, and the
// resize/debounce plumbing that keeps a display's font size current.
// The search itself is synchronous and bounded to O(log range) measurements.

pub mod autofit;
pub mod debounce;
pub mod font_metrics;
pub mod observer;
pub mod probe;
pub mod surface;

pub use autofit::{AutoFit, FitBounds, FitError};
pub use debounce::Debouncer;
pub use font_metrics::FontFamily;
pub use observer::{observe_and_refit, FitObservation, ResizeBus, ResizeTarget};
pub use probe::Size;
pub use surface::{FitSurface, SurfaceSnapshot};
