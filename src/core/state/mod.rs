//=========================================================================
// Saved State
//=========================================================================
//
// Key-value snapshots that let a navigator tree be torn down and rebuilt.
//
// Architecture:
//   Navigator::save_instance_state() → SavedState ──(host storage)──┐
//                                                                  ↓
//   XNavigator::restore(saved, factory) ← SceneFactory / NavigatorFactory
//
// Class identifiers are opaque tokens: the core writes what elements
// report through `class_name()` and hands them back to the factory
// supplied by the embedding application.
//
//=========================================================================

//=== Module Declarations =================================================

mod factory;
pub mod keys;
mod saved_state;

//=== Public API ==========================================================

pub use factory::{NavigatorFactory, SceneFactory};
pub use saved_state::{NavigatorState, SavedState, SceneState, StateValue};
