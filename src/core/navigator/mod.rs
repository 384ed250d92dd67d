//=========================================================================
// Navigators
//=========================================================================
//
// State machines orchestrating the lifecycle of scenes (or of child
// navigators) in response to navigation commands.
//
// Architecture:
//   command ─→ state.take() ─→ transition(state) ─→ (new state, actions)
//                                    │
//               commit new state ←───┘
//                     ↓
//               dispatch actions: Scene/child lifecycle calls, listener
//               notifications (on listener snapshots)
//
// Kinds:
//   SingleSceneNavigator           one scene, no collection
//   StackNavigator                 push / pop / replace, top is live
//   WizardNavigator                lazily created pages, next / previous
//   ReplacingNavigator             one swappable slot, no history
//   CompositeStackNavigator        stack of child navigators
//   CompositeReplacingNavigator    one swappable child navigator
//
// Every kind shares the same lifecycle table:
//
//   state      start()      stop()       destroy()            commands
//   Inactive   → Active     no-op        destroy all          mutate, destroy-only
//   Active     no-op        → Inactive   stop top, destroy    stop, mutate, start, notify
//   Destroyed  no-op(warn)  no-op        no-op                no-op(warn)
//
//=========================================================================

//=== Module Declarations =================================================

mod actions;
mod child;
mod composite_replacing;
mod composite_stack;
mod replacing;
mod single;
mod stack;
mod wizard;

//=== Public API ==========================================================

pub use composite_replacing::CompositeReplacingNavigator;
pub use composite_stack::CompositeStackNavigator;
pub use replacing::ReplacingNavigator;
pub use single::SingleSceneNavigator;
pub use stack::StackNavigator;
pub use wizard::WizardNavigator;

use std::rc::Rc;

use crate::core::events::{DisposableHandle, NavigatorEvents};
use crate::core::scene::Scene;
use crate::core::state::SavedState;

//=== Navigator Trait =====================================================

/// Common surface of every navigator, used by drivers and by composite
/// navigators managing children.
///
/// All methods take `&self`: navigators keep their state in a cell so that
/// listeners and scenes may call back into them while a command is being
/// dispatched.
///
/// # Example
///
/// ```rust
/// # use std::rc::Rc;
/// # use aetheric_navigation::prelude::*;
/// struct Home;
/// impl Scene for Home {}
///
/// let navigator: StackNavigator = StackNavigator::new(vec![Rc::new(Home) as Rc<dyn Scene>]);
/// let (listener, events) = event_channel::<dyn Scene>();
/// navigator.add_navigator_events_listener(listener);
///
/// navigator.on_start();
/// assert_eq!(events.drain().len(), 1);
///
/// assert!(navigator.on_back_pressed());
/// assert!(navigator.is_destroyed());
/// ```
pub trait Navigator<S: ?Sized = dyn Scene> {
    /// Makes the navigator's live scene visible.
    fn on_start(&self);

    /// Hides the live scene, keeping every scene alive.
    fn on_stop(&self);

    /// Tears everything down. Idempotent.
    fn on_destroy(&self);

    /// Handles a back press.
    ///
    /// Returns `false` only when there was nothing left to handle, i.e.
    /// the navigator was already destroyed.
    fn on_back_pressed(&self) -> bool;

    /// Registers a listener for scene changes and completion.
    ///
    /// A started navigator immediately reports its live scene to the new
    /// listener (with no transition data).
    fn add_navigator_events_listener(&self, listener: Rc<dyn NavigatorEvents<S>>) -> DisposableHandle;

    fn is_destroyed(&self) -> bool;

    /// Snapshot of the current collection, reflecting every committed
    /// transition (including one whose notifications are still running).
    fn save_instance_state(&self) -> SavedState;

    /// Identifier a parent's [`NavigatorFactory`] uses to rebuild this
    /// navigator.
    ///
    /// [`NavigatorFactory`]: crate::core::state::NavigatorFactory
    fn class_name(&self) -> &str;
}
