//! Settings mirrored to URL query parameters.
//!
//! A settings object is addressed by dotted leaf paths (`textShadow.color`).
//! Only values that differ from the defaults are written to the query string,
//! each as JSON text; values equal to the default have their parameter removed.
//! On load every recognized path is read back, parsed as JSON first and taken
//! as a raw string when that fails.

pub mod models;

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use models::{CardSettings, TimerSettings};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings must serialize to a JSON object")]
    NotAnObject,

    #[error("Invalid value for setting '{path}': {source}")]
    InvalidValue {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Path helpers
// ────────────────────────────────────────────────────────────────────────────

/// Every leaf path of `value`. Objects recurse; arrays and scalars are leaves.
pub fn all_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    if let Value::Object(map) = value {
        collect_paths(map, "", &mut paths);
    }
    paths
}

fn collect_paths(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(child) => collect_paths(child, &path, out),
            _ => out.push(path),
        }
    }
}

pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

/// Sets `path` to `new_value`, creating (or replacing non-object) intermediate nodes.
pub fn set_path(value: &mut Value, path: &str, new_value: Value) {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let Value::Object(map) = value else {
        return;
    };
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), new_value);
        }
        Some((head, rest)) => {
            let child = map.entry(head.to_string()).or_insert(Value::Null);
            set_path(child, rest, new_value);
        }
    }
}

pub fn serialize_value(value: &Value) -> String {
    value.to_string()
}

pub fn deserialize_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// SettingStore
// ────────────────────────────────────────────────────────────────────────────

/// Typed settings object plus the defaults it is diffed against.
#[derive(Debug)]
pub struct SettingStore<T> {
    defaults: Value,
    paths: Vec<String>,
    current: Value,
    _marker: PhantomData<T>,
}

// Manual impl: `PhantomData<T>` needs no `T: Clone`.
impl<T> Clone for SettingStore<T> {
    fn clone(&self) -> Self {
        Self {
            defaults: self.defaults.clone(),
            paths: self.paths.clone(),
            current: self.current.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> SettingStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(defaults: &T) -> Result<Self, SettingsError> {
        let defaults = serde_json::to_value(defaults)?;
        if !defaults.is_object() {
            return Err(SettingsError::NotAnObject);
        }
        Ok(Self {
            paths: all_paths(&defaults),
            current: defaults.clone(),
            defaults,
            _marker: PhantomData,
        })
    }

    /// Recognized query parameters, sorted by path.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn current(&self) -> Result<T, SettingsError> {
        Ok(serde_json::from_value(self.current.clone())?)
    }

    /// Applies recognized parameters from `pairs`. Unknown keys are ignored;
    /// a value that does not fit the settings type is dropped with a warning.
    /// Returns the number of applied parameters.
    pub fn load_query<I, K, V>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut applied = 0;
        for (key, raw) in pairs {
            let key = key.as_ref();
            if !self.paths.iter().any(|p| p == key) {
                continue;
            }
            let mut candidate = self.current.clone();
            set_path(&mut candidate, key, deserialize_value(raw.as_ref()));
            match serde_json::from_value::<T>(candidate.clone()) {
                Ok(_) => {
                    self.current = candidate;
                    applied += 1;
                }
                Err(e) => warn!(path = key, error = %e, "ignoring invalid setting from query"),
            }
        }
        debug!(applied, "settings loaded from query");
        applied
    }

    pub fn load_url(&mut self, url: &Url) -> usize {
        self.load_query(url.query_pairs())
    }

    /// Applies an update map. Dotted keys set a nested value; plain keys
    /// replace the top-level value. All-or-nothing: an update that would not
    /// deserialize leaves the store untouched.
    pub fn update(&mut self, updates: &Map<String, Value>) -> Result<T, SettingsError> {
        let mut candidate = self.current.clone();
        for (key, value) in updates {
            if key.contains('.') {
                set_path(&mut candidate, key, value.clone());
            } else if let Value::Object(map) = &mut candidate {
                map.insert(key.clone(), value.clone());
            }
        }
        let typed = serde_json::from_value::<T>(candidate.clone()).map_err(|source| {
            SettingsError::InvalidValue {
                path: updates.keys().cloned().collect::<Vec<_>>().join(","),
                source,
            }
        })?;
        self.current = candidate;
        Ok(typed)
    }

    pub fn reset(&mut self) {
        self.current = self.defaults.clone();
    }

    /// `(path, json)` for every setting that differs from its default.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.paths
            .iter()
            .filter_map(|path| {
                let current = get_path(&self.current, path);
                if current == get_path(&self.defaults, path) {
                    return None;
                }
                let value = current.cloned().unwrap_or(Value::Null);
                Some((path.clone(), serialize_value(&value)))
            })
            .collect()
    }

    /// URL-encoded query string of the non-default settings.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    /// Rewrites `url` so recognized parameters mirror the store. Parameters
    /// the store does not own are kept in their original order.
    pub fn sync_url(&self, url: &mut Url) {
        let foreign: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !self.paths.iter().any(|p| p == key.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let owned = self.query_pairs();

        if foreign.is_empty() && owned.is_empty() {
            url.set_query(None);
            return;
        }
        url.query_pairs_mut()
            .clear()
            .extend_pairs(foreign)
            .extend_pairs(owned);
    }
}
