//=========================================================================
// Navigator Errors
//=========================================================================
//
// Failures surfaced while rebuilding navigators from saved state.
//
// Lifecycle commands never fail: commands on a destroyed navigator are
// absorbed and logged. Only restoration can report corrupted or
// unmappable persisted data.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== NavigatorError ======================================================

/// Errors raised while restoring a navigator from a [`SavedState`].
///
/// [`SavedState`]: crate::core::state::SavedState
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigatorError {
    /// The factory does not know how to build the saved class identifier.
    #[error("unknown class `{class_name}` in saved state")]
    UnknownClass { class_name: String },

    /// A key required by the persisted layout is absent.
    #[error("saved state is missing key `{key}`")]
    MissingKey { key: String },

    /// A key is present but holds a value of the wrong kind.
    #[error("saved state key `{key}` does not hold {expected}")]
    InvalidValue { key: String, expected: &'static str },

    /// A saved index points outside the restored collection.
    #[error("saved index {index} is out of range for {size} element(s)")]
    IndexOutOfRange { index: i64, size: usize },
}

impl NavigatorError {
    /// Convenience constructor for factories rejecting a class identifier.
    pub fn unknown_class(class_name: impl Into<String>) -> Self {
        Self::UnknownClass {
            class_name: class_name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NavigatorError>;

//=========================================================================
// Unit Tests
//=========================================================================
