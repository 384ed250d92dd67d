//=========================================================================
// Transition Data
//=========================================================================
//
// Directionality metadata attached to scene-change notifications.
//
// Renderers use it to pick an enter/exit animation; navigators only
// produce it. Notifications caused by a plain start carry no data.
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== TransitionData ======================================================

/// Describes whether a navigation moved forwards or backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TransitionData {
    /// `true` when the navigation returned to an earlier scene.
    pub is_backwards: bool,
}

impl TransitionData {
    /// Transition towards a newly added scene.
    pub const FORWARDS: Self = Self {
        is_backwards: false,
    };

    /// Transition back to a previously shown scene.
    pub const BACKWARDS: Self = Self { is_backwards: true };

    #[inline]
    pub const fn forwards() -> Self {
        Self::FORWARDS
    }

    #[inline]
    pub const fn backwards() -> Self {
        Self::BACKWARDS
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
