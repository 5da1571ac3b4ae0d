//! Timer display: keeps the latest value of every feed timer and pushes the
//! selected one, formatted, into the timer's fit surface.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::display::time::{format_time_with, timer_placeholder};
use crate::feed::EventHandler;
use crate::layout::{FitSurface, Size, SurfaceSnapshot};
use crate::settings::TimerSettings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerName {
    #[default]
    Main,
    Auxtimer1,
    Auxtimer2,
    Auxtimer3,
}

impl TimerName {
    pub const ALL: [TimerName; 4] = [
        TimerName::Main,
        TimerName::Auxtimer1,
        TimerName::Auxtimer2,
        TimerName::Auxtimer3,
    ];

    /// Feed event that carries this timer. The main timer arrives as `timer`.
    pub fn event_name(self) -> &'static str {
        match self {
            TimerName::Main => "timer",
            TimerName::Auxtimer1 => "auxtimer1",
            TimerName::Auxtimer2 => "auxtimer2",
            TimerName::Auxtimer3 => "auxtimer3",
        }
    }

    pub fn from_event(event: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.event_name() == event)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerName::Main => "Main Timer",
            TimerName::Auxtimer1 => "Aux Timer 1",
            TimerName::Auxtimer2 => "Aux Timer 2",
            TimerName::Auxtimer3 => "Aux Timer 3",
        }
    }
}

/// Remaining milliseconds per timer; `None` until the feed reports a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimersMap {
    pub main: Option<i64>,
    pub auxtimer1: Option<i64>,
    pub auxtimer2: Option<i64>,
    pub auxtimer3: Option<i64>,
}

impl TimersMap {
    pub fn get(&self, name: TimerName) -> Option<i64> {
        match name {
            TimerName::Main => self.main,
            TimerName::Auxtimer1 => self.auxtimer1,
            TimerName::Auxtimer2 => self.auxtimer2,
            TimerName::Auxtimer3 => self.auxtimer3,
        }
    }

    pub fn set(&mut self, name: TimerName, value: Option<i64>) {
        let slot = match name {
            TimerName::Main => &mut self.main,
            TimerName::Auxtimer1 => &mut self.auxtimer1,
            TimerName::Auxtimer2 => &mut self.auxtimer2,
            TimerName::Auxtimer3 => &mut self.auxtimer3,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub surface: SurfaceSnapshot,
    pub selected_timer: TimerName,
    pub label: &'static str,
    pub timers: TimersMap,
}

struct TimerState {
    timers: TimersMap,
    settings: TimerSettings,
}

impl TimerState {
    fn text(&self) -> String {
        match self.timers.get(self.settings.selected_timer) {
            Some(ms) => format_time_with(ms, self.settings.show_hours, self.settings.rounding_mode),
            None => timer_placeholder(self.settings.show_hours).to_string(),
        }
    }
}

pub struct TimerDisplay {
    state: Mutex<TimerState>,
    surface: Arc<Mutex<FitSurface>>,
}

impl TimerDisplay {
    pub fn new(settings: TimerSettings, surface: Arc<Mutex<FitSurface>>) -> Self {
        let state = TimerState {
            timers: TimersMap::default(),
            settings,
        };
        surface.lock().set_font(state.settings.font_family);
        surface.lock().set_text(&state.text());
        Self {
            state: Mutex::new(state),
            surface,
        }
    }

    pub fn surface(&self) -> Arc<Mutex<FitSurface>> {
        Arc::clone(&self.surface)
    }

    pub fn text(&self) -> String {
        self.state.lock().text()
    }

    pub fn timers(&self) -> TimersMap {
        self.state.lock().timers
    }

    pub fn set_timer(&self, name: TimerName, value: Option<i64>) {
        let mut state = self.state.lock();
        state.timers.set(name, value);
        if name == state.settings.selected_timer {
            let text = state.text();
            self.surface.lock().set_text(&text);
        }
    }

    /// Applies new settings. When the font changed, returns the element's new
    /// intrinsic size so the caller can announce the element resize.
    pub fn apply_settings(&self, settings: TimerSettings) -> Option<Size> {
        let mut state = self.state.lock();
        state.settings = settings;
        let text = state.text();
        let mut surface = self.surface.lock();
        let resized = surface.set_font(state.settings.font_family);
        surface.set_text(&text);
        resized
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let state = self.state.lock();
        let selected = state.settings.selected_timer;
        TimerSnapshot {
            surface: self.surface.lock().snapshot(),
            selected_timer: selected,
            label: selected.label(),
            timers: state.timers,
        }
    }
}

impl EventHandler for TimerDisplay {
    fn handle(&self, event: &str, data: &Value) -> bool {
        let Some(name) = TimerName::from_event(event) else {
            return false;
        };
        let Some(payload) = data.as_object() else {
            return false;
        };
        let current = payload
            .get("current")
            .and_then(Value::as_f64)
            .map(|ms| ms.round() as i64);
        debug!(timer = ?name, ?current, "timer update");
        self.set_timer(name, current);
        true
    }
}
