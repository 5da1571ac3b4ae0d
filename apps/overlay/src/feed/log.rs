use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Tag,
    Event,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub name: String,
    pub data: Value,
}

/// Bounded record of received tags and events, oldest first.
#[derive(Debug)]
pub struct MessageLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, kind: LogKind, name: &str, data: &Value) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(LogEntry {
            timestamp: Utc::now(),
            kind,
            name: name.to_string(),
            data: data.clone(),
        });
    }

    pub fn entries(&self, kind: Option<LogKind>) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| kind.map_or(true, |k| entry.kind == k))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(MAX_LOGS)
    }
}
