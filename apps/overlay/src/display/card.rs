//! Session card: the "now playing" event delivered as `eventNow`.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::display::time::format_event_time;
use crate::feed::EventHandler;

pub const EVENT_NOW: &str = "eventNow";

/// Free-form fields the rundown attaches to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventCustomData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, rename = "slideURL", skip_serializing_if = "Option::is_none")]
    pub slide_url: Option<String>,
    #[serde(default, rename = "hackmdURL", skip_serializing_if = "Option::is_none")]
    pub hackmd_url: Option<String>,
    #[serde(default, rename = "slidoID", skip_serializing_if = "Option::is_none")]
    pub slido_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rundown entry. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventData {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub flag: bool,
    pub title: String,
    /// Milliseconds since midnight.
    pub time_start: i64,
    pub time_end: i64,
    pub duration: i64,
    pub time_strategy: String,
    pub link_start: bool,
    pub end_action: String,
    pub timer_type: String,
    pub count_to_end: bool,
    pub skip: bool,
    pub note: String,
    pub colour: String,
    pub delay: i64,
    pub day_offset: i64,
    pub gap: i64,
    pub cue: String,
    pub parent: Option<String>,
    pub revision: i64,
    pub time_warning: i64,
    pub time_danger: i64,
    pub custom: EventCustomData,
    pub triggers: Vec<Value>,
}

/// What the card renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub event_id: String,
    pub kind: Option<String>,
    /// `HH:MM - HH:MM`
    pub time_range: String,
    pub title: String,
    pub speaker: Option<String>,
    pub slido_id: Option<String>,
    pub slide_url: Option<String>,
    pub hackmd_url: Option<String>,
}

impl From<&EventData> for CardView {
    fn from(event: &EventData) -> Self {
        Self {
            event_id: event.id.clone(),
            kind: event.custom.kind.clone(),
            time_range: format!(
                "{} - {}",
                format_event_time(event.time_start),
                format_event_time(event.time_end)
            ),
            title: event.title.clone(),
            speaker: event.custom.speaker.clone(),
            slido_id: event.custom.slido_id.clone(),
            slide_url: event.custom.slide_url.clone(),
            hackmd_url: event.custom.hackmd_url.clone(),
        }
    }
}

#[derive(Default)]
pub struct CardDisplay {
    event: RwLock<Option<EventData>>,
}

impl CardDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(&self) -> Option<EventData> {
        self.event.read().clone()
    }

    /// `None` while waiting for event data.
    pub fn view(&self) -> Option<CardView> {
        self.event.read().as_ref().map(CardView::from)
    }
}

impl EventHandler for CardDisplay {
    fn handle(&self, event: &str, data: &Value) -> bool {
        if event != EVENT_NOW {
            return false;
        }
        if data.is_null() {
            debug!("no event running, card cleared");
            *self.event.write() = None;
            return true;
        }
        match serde_json::from_value::<EventData>(data.clone()) {
            Ok(parsed) => {
                debug!(id = %parsed.id, title = %parsed.title, "card event updated");
                *self.event.write() = Some(parsed);
                true
            }
            Err(e) => {
                warn!(error = %e, "eventNow payload is not an event");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keynote() -> Value {
        json!({
            "id": "a1b2",
            "type": "event",
            "title": "Rust at the edge",
            "timeStart": 34_200_000,
            "timeEnd": 36_000_000,
            "duration": 1_800_000,
            "parent": null,
            "custom": {
                "speaker": "Ada",
                "type": "Keynote",
                "slideURL": "https://slides.example/rust",
                "slidoID": "#rust",
                "room": "R0"
            },
            "triggers": []
        })
    }

    #[test]
    fn test_waiting_until_first_event() {
        let card = CardDisplay::new();
        assert!(card.view().is_none());
    }

    #[test]
    fn test_event_now_builds_card() {
        let card = CardDisplay::new();
        assert!(card.handle(EVENT_NOW, &keynote()));

        let view = card.view().unwrap();
        assert_eq!(view.time_range, "09:30 - 10:00");
        assert_eq!(view.title, "Rust at the edge");
        assert_eq!(view.kind.as_deref(), Some("Keynote"));
        assert_eq!(view.speaker.as_deref(), Some("Ada"));
        assert_eq!(view.slido_id.as_deref(), Some("#rust"));
        assert_eq!(view.hackmd_url, None);

        let event = card.event().unwrap();
        assert_eq!(event.custom.extra.get("room"), Some(&json!("R0")));
    }

    #[test]
    fn test_null_clears_card() {
        let card = CardDisplay::new();
        card.handle(EVENT_NOW, &keynote());
        assert!(card.handle(EVENT_NOW, &Value::Null));
        assert!(card.view().is_none());
    }

    #[test]
    fn test_other_events_and_bad_payloads_unhandled() {
        let card = CardDisplay::new();
        assert!(!card.handle("eventNext", &keynote()));
        assert!(!card.handle(EVENT_NOW, &json!("not an event")));
        assert!(!card.handle(EVENT_NOW, &json!({ "timeStart": "nine" })));
        assert!(card.view().is_none());
    }
}
