use std::sync::Arc;

use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::Config;
use crate::display::{CardDisplay, Countdown, CountdownController, TimerDisplay};
use crate::feed::{ConnectionState, DispatchOptions, Dispatcher, FeedClient, MessageLog};
use crate::layout::{
    observe_and_refit, AutoFit, Debouncer, FitObservation, FitSurface, ResizeBus, ResizeTarget,
    Size,
};
use crate::settings::{CardSettings, SettingStore, TimerSettings};

pub const TIMER_SURFACE: &str = "timer";

pub fn timer_container() -> ResizeTarget {
    ResizeTarget::Container(TIMER_SURFACE.to_string())
}

pub fn timer_element() -> ResizeTarget {
    ResizeTarget::Element(TIMER_SURFACE.to_string())
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub timer: Arc<TimerDisplay>,
    pub card: Arc<CardDisplay>,
    pub countdown: Arc<CountdownController>,
    pub log: Arc<MessageLog>,
    /// Viewport, container and element sizes reported by display clients.
    pub resize_bus: ResizeBus,
    pub timer_settings: Arc<Mutex<SettingStore<TimerSettings>>>,
    pub card_settings: Arc<Mutex<SettingStore<CardSettings>>>,
    /// Publishing a new URL makes the feed client reconnect.
    pub feed_url: Arc<watch::Sender<String>>,
    pub feed_state: Arc<RwLock<ConnectionState>>,
}

/// Everything `main` has to keep alive or drive besides the router state.
pub struct Overlay {
    pub state: AppState,
    pub feed: FeedClient,
    pub observation: FitObservation,
}

impl AppState {
    pub fn build(config: Config, runtime: Handle) -> Result<Overlay> {
        let timer_defaults = TimerSettings {
            websocket_path: config.feed_url.clone(),
            ..TimerSettings::default()
        };
        let card_defaults = CardSettings {
            websocket_path: config.feed_url.clone(),
            ..CardSettings::default()
        };
        let timer_settings = SettingStore::new(&timer_defaults)?;
        let card_settings = SettingStore::new(&card_defaults)?;

        let engine = AutoFit::new(config.fit_bounds).with_offset(config.fit_offset_px);
        let surface = Arc::new(Mutex::new(FitSurface::new(timer_defaults.font_family, engine)));
        let timer = Arc::new(TimerDisplay::new(timer_defaults, Arc::clone(&surface)));
        let card = Arc::new(CardDisplay::new());

        // The timer container fills the viewport until a client reports otherwise.
        let resize_bus = ResizeBus::new();
        resize_bus.resize(ResizeTarget::Viewport, config.viewport);
        resize_bus.resize(timer_container(), config.viewport);

        let observation = {
            let bus = resize_bus.clone();
            observe_and_refit(
                &resize_bus,
                timer_container(),
                timer_element(),
                Debouncer::new(config.fit_debounce, runtime.clone()),
                move || {
                    let container = bus.size(&timer_container());
                    let mut surface = surface.lock();
                    match container {
                        Some(size) => surface.set_container(size),
                        None => surface.detach_container(),
                    }
                    if let Err(e) = surface.refit() {
                        debug!(error = %e, "timer refit skipped");
                    }
                },
            )
        };

        let log = Arc::new(MessageLog::default());
        let dispatcher = Dispatcher::new(DispatchOptions::default(), Arc::clone(&log))
            .with_handler(timer.clone())
            .with_handler(card.clone());

        let (feed_url, feed_rx) = watch::channel(config.feed_url.clone());
        let feed = FeedClient::new(feed_rx, Arc::new(dispatcher), config.feed_reconnect);

        let state = AppState {
            timer,
            card,
            countdown: Arc::new(CountdownController::new(Countdown::default(), runtime)),
            log,
            resize_bus,
            timer_settings: Arc::new(Mutex::new(timer_settings)),
            card_settings: Arc::new(Mutex::new(card_settings)),
            feed_url: Arc::new(feed_url),
            feed_state: feed.state(),
            config,
        };

        Ok(Overlay {
            state,
            feed,
            observation,
        })
    }

    /// Pushes timer settings into the display. A font change is announced as
    /// an element resize so the observer refits.
    pub fn apply_timer_settings(&self, settings: &TimerSettings) {
        if let Some(size) = self.timer.apply_settings(settings.clone()) {
            self.resize_bus.resize(timer_element(), size);
        }
        self.switch_feed(&settings.websocket_path);
    }

    pub fn apply_card_settings(&self, settings: &CardSettings) {
        self.switch_feed(&settings.websocket_path);
    }

    /// Points the feed at `url`; a no-op when it is already connected there.
    pub fn switch_feed(&self, url: &str) {
        let changed = self.feed_url.send_if_modified(|current| {
            if current == url {
                return false;
            }
            *current = url.to_string();
            true
        });
        if changed {
            info!(url, "feed url updated");
        }
    }

    pub fn feed_url(&self) -> String {
        self.feed_url.borrow().clone()
    }

    /// The timer container fills the viewport.
    pub fn resize_viewport(&self, size: Size) {
        self.resize_bus.resize(ResizeTarget::Viewport, size);
        self.resize_bus.resize(timer_container(), size);
    }

    pub fn resize_timer_container(&self, size: Size) {
        self.resize_bus.resize(timer_container(), size);
    }
}
