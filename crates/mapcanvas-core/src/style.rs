//! Style descriptors ("symbols").
//!
//! A symbol is a flat mapping from style key to a number, string or null.
//! Symbolizers never mutate the descriptor they were built from; they merge
//! it over their own defaults once and keep the result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Malformed style descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Style key '{0}' must be a number, string or null")]
    UnsupportedValue(String),
}

/// A single style value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    String(String),
    Null,
}

impl StyleValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StyleValue::Null)
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::String(s.to_string())
    }
}

/// A mapping from style key to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol {
    values: BTreeMap<String, StyleValue>,
}

impl Symbol {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<StyleValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<StyleValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.values.get(key)
    }

    /// A finite number stored under `key`; anything else reads as absent.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(StyleValue::as_number)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(StyleValue::as_str)
    }

    /// True when `key` is missing or explicitly null.
    pub fn is_nil(&self, key: &str) -> bool {
        self.get(key).map_or(true, StyleValue::is_null)
    }

    /// Returns `defaults` overridden by every key of `self`, explicit nulls included.
    pub fn merged_over(&self, defaults: &Symbol) -> Symbol {
        let mut merged = defaults.clone();
        for (key, value) in &self.values {
            merged.values.insert(key.clone(), value.clone());
        }
        merged
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        Self::from_json_map(raw)
    }

    fn from_json_map(raw: BTreeMap<String, serde_json::Value>) -> Result<Self, StyleError> {
        raw.into_iter()
            .map(|(key, value)| value_from_json(&key, value).map(|v| (key, v)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(|values| Self { values })
    }
}

fn value_from_json(key: &str, value: serde_json::Value) -> Result<StyleValue, StyleError> {
    match value {
        serde_json::Value::Null => Ok(StyleValue::Null),
        serde_json::Value::String(s) => Ok(StyleValue::String(s)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(StyleValue::Number)
            .ok_or_else(|| StyleError::UnsupportedValue(key.to_string())),
        _ => Err(StyleError::UnsupportedValue(key.to_string())),
    }
}

/// The style attached to a geometry: one symbol, or a sequence rendered in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleDescriptor {
    Single(Symbol),
    Multi(Vec<Symbol>),
}

impl StyleDescriptor {
    pub fn entries(&self) -> &[Symbol] {
        match self {
            StyleDescriptor::Single(symbol) => std::slice::from_ref(symbol),
            StyleDescriptor::Multi(symbols) => symbols,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| Symbol::from_json_map(serde_json::from_value(item)?))
                .collect::<Result<Vec<_>, _>>()
                .map(StyleDescriptor::Multi),
            other => Symbol::from_json_map(serde_json::from_value(other)?)
                .map(StyleDescriptor::Single),
        }
    }
}

impl From<Symbol> for StyleDescriptor {
    fn from(symbol: Symbol) -> Self {
        StyleDescriptor::Single(symbol)
    }
}
