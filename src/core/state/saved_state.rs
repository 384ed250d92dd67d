//=========================================================================
// SavedState
//=========================================================================
//
// Ordered string-keyed map of heterogeneous values (primitives, nested
// maps, null). Serializable with serde so hosts can persist it in any
// format; the navigators only rely on the key-value semantics.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::keys;
use crate::error::{NavigatorError, Result};

//=== StateValue ==========================================================

/// A single value stored in a [`SavedState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    State(SavedState),
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<SavedState> for StateValue {
    fn from(value: SavedState) -> Self {
        Self::State(value)
    }
}

impl<T: Into<StateValue>> From<Option<T>> for StateValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

//=== SavedState ==========================================================

/// Key-value snapshot of a navigator or scene.
///
/// Keys iterate in sorted order, which keeps serialized output stable.
///
/// # Example
///
/// ```rust
/// # use aetheric_navigation::prelude::*;
/// let mut state = SavedState::new();
/// state.insert("title", "Inbox");
/// state.insert("unread", 3_i64);
///
/// assert_eq!(state.text("title"), Some("Inbox"));
/// assert_eq!(state.int("unread"), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedState {
    entries: BTreeMap<String, StateValue>,
}

/// Saved state produced by a navigator.
pub type NavigatorState = SavedState;

/// Saved state produced by a scene.
pub type SceneState = SavedState;

impl SavedState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Mutation ---------------------------------------------------------

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Option<StateValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.entries.remove(key)
    }

    //--- Untyped Queries --------------------------------------------------

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    //--- Typed Queries ----------------------------------------------------
    //
    // Lenient accessors: a missing key and a value of another kind both
    // yield `None`.
    //

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.entries.get(key) {
            Some(StateValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key) {
            Some(StateValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        match self.entries.get(key) {
            Some(StateValue::Float(value)) => Some(*value),
            Some(StateValue::Int(value)) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(StateValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn state(&self, key: &str) -> Option<&SavedState> {
        match self.entries.get(key) {
            Some(StateValue::State(value)) => Some(value),
            _ => None,
        }
    }

    //--- Strict Queries (restoration) -------------------------------------
    //
    // Used while rebuilding navigators, where a wrong kind means the
    // persisted data is corrupt.
    //

    pub(crate) fn require_text(&self, key: &str) -> Result<&str> {
        match self.entries.get(key) {
            Some(StateValue::Text(value)) => Ok(value.as_str()),
            Some(_) => Err(NavigatorError::InvalidValue {
                key: key.to_owned(),
                expected: "a class identifier",
            }),
            None => Err(NavigatorError::MissingKey { key: key.to_owned() }),
        }
    }

    pub(crate) fn optional_state(&self, key: &str) -> Result<Option<&SavedState>> {
        match self.entries.get(key) {
            Some(StateValue::State(value)) => Ok(Some(value)),
            Some(StateValue::Null) | None => Ok(None),
            Some(_) => Err(NavigatorError::InvalidValue {
                key: key.to_owned(),
                expected: "a nested state",
            }),
        }
    }

    pub(crate) fn optional_int(&self, key: &str) -> Result<Option<i64>> {
        match self.entries.get(key) {
            Some(StateValue::Int(value)) => Ok(Some(*value)),
            Some(StateValue::Null) | None => Ok(None),
            Some(_) => Err(NavigatorError::InvalidValue {
                key: key.to_owned(),
                expected: "an integer",
            }),
        }
    }

    //--- Collection Layout ------------------------------------------------

    /// Writes one `{i}_class` / `{i}_state` pair. A `None` state is omitted.
    pub(crate) fn insert_indexed(&mut self, index: usize, class_name: &str, state: Option<SavedState>) {
        self.insert(keys::class_at(index), class_name);
        if let Some(state) = state {
            self.insert(keys::state_at(index), state);
        }
    }

    /// Reads the `(class, state)` pairs of a collection navigator.
    ///
    /// A missing `size` reads as an empty collection.
    pub(crate) fn indexed_entries(&self) -> Result<Vec<(&str, Option<&SavedState>)>> {
        let size = match self.optional_int(keys::SIZE)? {
            None => return Ok(Vec::new()),
            Some(size) => usize::try_from(size).map_err(|_| NavigatorError::InvalidValue {
                key: keys::SIZE.to_owned(),
                expected: "a non-negative size",
            })?,
        };

        (0..size)
            .map(|index| {
                let class_name = self.require_text(&keys::class_at(index))?;
                let state = self.optional_state(&keys::state_at(index))?;
                Ok((class_name, state))
            })
            .collect()
    }
}

impl FromIterator<(String, StateValue)> for SavedState {
    fn from_iter<I: IntoIterator<Item = (String, StateValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
