//! Element fingerprints and probe match counts.
//!
//! A fingerprint is the attribute snapshot of one DOM node at one point in
//! time, produced by the in-page walker and consumed by the resolver. It is
//! discarded after the resolution call that consumes it and never persisted
//! across snapshots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Test-automation id attributes, scanned in this order.
pub const TEST_ID_ATTRIBUTES: &[&str] = &[
    "data-testid",
    "data-test-id",
    "data-test",
    "data-qa",
    "data-cy",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Captured attribute snapshot of one DOM element.
///
/// `id` is the walker-assigned reference, unique within one snapshot.
/// `parent` points at the nearest *captured* ancestor; non-captured nodes
/// are transparent to the parent chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementFingerprint {
    pub id: u32,
    pub tag: String,
    /// Explicit `role` attribute, not the computed one.
    #[serde(default)]
    pub role: Option<String>,
    /// Trimmed visible text, capped by the walker.
    #[serde(default)]
    pub text: Option<String>,
    /// Shorter form of the text used for matching.
    #[serde(default)]
    pub short_text: Option<String>,
    /// Computed accessible label (first non-empty of aria-label,
    /// placeholder, title, alt, short text).
    #[serde(default)]
    pub label: Option<String>,
    /// Text of the associated `<label>` element, for form controls.
    #[serde(default)]
    pub control_label: Option<String>,
    /// Raw attributes: id, name, class, href, placeholder, aria-label,
    /// title, alt, test-id variants.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// 0-based sibling index among same-tag, same-role nodes.
    #[serde(default)]
    pub nth_index: u32,
    /// Reference id of the nearest captured ancestor.
    #[serde(default)]
    pub parent: Option<u32>,
}

fn default_visible() -> bool {
    true
}

impl ElementFingerprint {
    /// Raw attribute lookup, treating empty values as absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First test-id variant present, as `(attribute, value)`.
    pub fn test_id(&self) -> Option<(&'static str, &str)> {
        TEST_ID_ATTRIBUTES
            .iter()
            .find_map(|name| self.attr(name).map(|v| (*name, v)))
    }

    /// Computed accessible name: first non-empty of the walker's label,
    /// aria-label, associated `<label>` text, placeholder, title, alt,
    /// and short text.
    pub fn accessible_name(&self) -> Option<&str> {
        non_empty(self.label.as_deref())
            .or_else(|| self.attr("aria-label"))
            .or_else(|| non_empty(self.control_label.as_deref()))
            .or_else(|| self.attr("placeholder"))
            .or_else(|| self.attr("title"))
            .or_else(|| self.attr("alt"))
            .or_else(|| non_empty(self.short_text.as_deref()))
    }

    /// Visible text preferred for matching: the short form when present.
    pub fn matching_text(&self) -> Option<&str> {
        non_empty(self.short_text.as_deref()).or_else(|| non_empty(self.text.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Observed live match counts keyed by selector string.
///
/// The probe script keys by CSS text; callers with a locator-capable bridge
/// may additionally key by locator expression. A count of `-1` means the
/// selector failed to parse and is treated as non-unique, never as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchCounts(HashMap<String, i32>);

impl MatchCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, selector: &str) -> Option<i32> {
        self.0.get(selector).copied()
    }

    pub fn insert(&mut self, selector: impl Into<String>, count: i32) {
        self.0.insert(selector.into(), count);
    }

    /// Fold another round of probe results in, for iterative callers.
    pub fn merge(&mut self, other: MatchCounts) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, i32>> for MatchCounts {
    fn from(counts: HashMap<String, i32>) -> Self {
        Self(counts)
    }
}

/// Errors from decoding a walker payload.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot payload must be a JSON array of fingerprints")]
    NotAnArray,
}

/// Decode the walker's JSON payload into fingerprints.
///
/// Accepts either a bare array or an object wrapping it under `elements`.
pub fn decode_snapshot(payload: &str) -> Result<Vec<ElementFingerprint>, SnapshotError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let array = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => {
            map.remove("elements").ok_or(SnapshotError::NotAnArray)?
        }
        _ => return Err(SnapshotError::NotAnArray),
    };
    if !array.is_array() {
        return Err(SnapshotError::NotAnArray);
    }
    Ok(serde_json::from_value(array)?)
}
