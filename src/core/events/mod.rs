//=========================================================================
// Navigator Events
//=========================================================================
//
// Observer side of the navigators: who gets told about scene changes.
//
// Architecture:
//   Navigator ── ListenerRegistry ──snapshot()──→ NavigatorEvents::scene()
//                   ↑        ↑                   NavigatorEvents::finished()
//   DisposableHandle ┘        └─ EventSender (crossbeam) → EventReceiver::drain()
//
// Notifications always iterate a snapshot of the registry, so a listener
// may add or dispose listeners from inside its own callback.
//
//=========================================================================

//=== Module Declarations =================================================

mod event_channel;
mod listener_registry;

//=== Public API ==========================================================

pub use event_channel::{event_channel, EventReceiver, EventSender, NavigatorEvent, MAX_EVENTS_PER_DRAIN};
pub use listener_registry::DisposableHandle;

pub(crate) use listener_registry::ListenerRegistry;

use std::rc::Rc;

use crate::core::scene::{Scene, TransitionData};

//=== NavigatorEvents =====================================================

/// Observer of a navigator's active scene and completion.
///
/// Callbacks run synchronously inside the navigator command that caused
/// them. The navigator's new state is already committed, so a listener may
/// query it, save it, or issue further commands.
pub trait NavigatorEvents<S: ?Sized = dyn Scene> {
    /// The live scene changed to `scene`.
    ///
    /// `data` is `None` when the scene became live because the navigator
    /// started (or the listener was just registered on a started navigator).
    fn scene(&self, scene: &Rc<S>, data: Option<TransitionData>);

    /// The navigator finished and is now destroyed.
    fn finished(&self);
}
