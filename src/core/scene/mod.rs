//=========================================================================
// Scene System
//=========================================================================
//
// The leaf content navigators manage.
//
// Architecture:
//   Navigator
//     ├─ Rc<S: Scene>           (stack / wizard / replacing / single)
//     └─ TransitionData         (attached to scene-change notifications)
//
// Scenes only react to lifecycle calls. They never drive navigation
// themselves; the owning navigator decides which scene is live.
//
//=========================================================================

//=== Module Declarations =================================================

mod transition;

//=== Public API ==========================================================

pub use transition::TransitionData;

use crate::core::state::SavedState;

//=== Scene Trait =========================================================

/// A presentable unit with start/stop/destroy lifecycle hooks.
///
/// Navigators share scenes as `Rc<S>` and call the hooks through `&self`,
/// so implementations keep their mutable state behind `Cell`/`RefCell`.
/// A scene may issue navigation commands from inside a hook; the owning
/// navigator has already committed its new state by then.
///
/// # Minimal Implementation
///
/// Every method has a default, so a marker scene is a one-liner:
///
/// ```rust
/// # use aetheric_navigation::prelude::*;
/// struct Splash;
///
/// impl Scene for Splash {}
/// ```
///
/// # Lifecycle
///
/// A navigator guarantees `on_start` and `on_stop` alternate, that
/// `on_stop` precedes `on_destroy` for a started scene, and that
/// `on_destroy` is called at most once.
pub trait Scene {
    /// Called when the scene becomes the live scene of a started navigator.
    fn on_start(&self) {}

    /// Called when the scene stops being live.
    fn on_stop(&self) {}

    /// Called exactly once, when the scene is discarded.
    fn on_destroy(&self) {}

    /// Captures the scene's state for later restoration.
    ///
    /// Returns `None` for scenes without state worth saving; the saved
    /// layout then omits the state entry.
    fn save_state(&self) -> Option<SavedState> {
        None
    }

    /// Identifier a factory uses to rebuild this scene.
    ///
    /// Defaults to the Rust type name. Override it when the type name is
    /// not stable enough to persist.
    fn class_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
