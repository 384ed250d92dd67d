//=========================================================================
// Core Systems
//=========================================================================
//
// The navigation lifecycle engine.
//
// Architecture:
//   Driver (platform lifecycle, back button)
//     ↓ on_start / on_stop / on_destroy / on_back_pressed
//   Navigator ──→ Scene lifecycle hooks
//     ↓ NavigatorEvents (scene changed, finished)
//   Listeners / EventReceiver (rendering layer)
//
// Subsystems:
//   scene       Scene trait and TransitionData
//   navigator   Navigator trait and the navigator kinds
//   events      listener registry, handles, event channel
//   state       SavedState and restore factories
//
//=========================================================================

//=== Module Declarations =================================================

pub mod events;
pub mod navigator;
pub mod scene;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
