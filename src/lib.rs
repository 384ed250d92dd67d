//=========================================================================
// Aetheric Navigation — Library Root
//
// Navigation lifecycle engine for presentation layers.
//
// Responsibilities:
// - Drive start/stop/destroy lifecycles of scenes and child navigators
// - Apply navigation commands (push, pop, replace, next, previous, finish)
// - Notify listeners of scene changes with forwards/backwards direction
// - Save and restore whole navigator trees as key-value state
//
// Typical usage:
// ```
// use std::rc::Rc;
// use aetheric_navigation::prelude::*;
//
// struct Home;
// impl Scene for Home {}
//
// let navigator: StackNavigator = StackNavigator::new(vec![Rc::new(Home) as Rc<dyn Scene>]);
// navigator.on_start();
// navigator.on_back_pressed();
// assert!(navigator.is_destroyed());
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the navigation subsystems. Most applications only need the
// prelude.
//
pub mod core;
pub mod error;
pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use crate::core::navigator::Navigator;
pub use crate::core::scene::Scene;
pub use crate::error::{NavigatorError, Result};
