//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_navigation::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Scenes
pub use crate::core::scene::{Scene, TransitionData};

// Navigators
pub use crate::core::navigator::{
    CompositeReplacingNavigator, CompositeStackNavigator, Navigator, ReplacingNavigator,
    SingleSceneNavigator, StackNavigator, WizardNavigator,
};

// Listeners
pub use crate::core::events::{
    event_channel, DisposableHandle, EventReceiver, EventSender, NavigatorEvent, NavigatorEvents,
};

// Saved state
pub use crate::core::state::{NavigatorFactory, NavigatorState, SavedState, SceneFactory, SceneState, StateValue};

// Errors
pub use crate::error::NavigatorError;
