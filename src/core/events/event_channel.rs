//=========================================================================
// Event Channel
//=========================================================================
//
// Queues navigator notifications for a driver to process later.
//
// Architecture:
//   Navigator → EventSender (NavigatorEvents) → crossbeam unbounded
//                                                     ↓
//   Driver (after the command returns) ← EventReceiver::drain()
//
// Draining is bounded so a runaway listener loop cannot starve the
// driver; leftovers stay queued for the next drain.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::rc::Rc;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::NavigatorEvents;
use crate::core::scene::{Scene, TransitionData};

/// Upper bound on events returned by a single [`EventReceiver::drain`].
pub const MAX_EVENTS_PER_DRAIN: usize = 256;

//=== NavigatorEvent ======================================================

/// A queued navigator notification.
pub enum NavigatorEvent<S: ?Sized = dyn Scene> {
    /// Mirrors [`NavigatorEvents::scene`].
    Scene {
        scene: Rc<S>,
        data: Option<TransitionData>,
    },

    /// Mirrors [`NavigatorEvents::finished`].
    Finished,
}

impl<S: ?Sized> NavigatorEvent<S> {
    /// The scene carried by a `Scene` event.
    pub fn scene(&self) -> Option<&Rc<S>> {
        match self {
            Self::Scene { scene, .. } => Some(scene),
            Self::Finished => None,
        }
    }

    /// The transition data carried by a `Scene` event.
    pub fn data(&self) -> Option<TransitionData> {
        match self {
            Self::Scene { data, .. } => *data,
            Self::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl<S: ?Sized> Clone for NavigatorEvent<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Scene { scene, data } => Self::Scene {
                scene: Rc::clone(scene),
                data: *data,
            },
            Self::Finished => Self::Finished,
        }
    }
}

impl<S: ?Sized> fmt::Debug for NavigatorEvent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scene { scene, data } => f
                .debug_struct("Scene")
                .field("scene", &Rc::as_ptr(scene).cast::<()>())
                .field("data", data)
                .finish(),
            Self::Finished => f.write_str("Finished"),
        }
    }
}

//=== Construction ========================================================

/// Creates a connected sender/receiver pair.
///
/// Register the sender with [`Navigator::add_navigator_events_listener`]
/// and drain the receiver from the driver loop.
///
/// [`Navigator::add_navigator_events_listener`]: crate::core::navigator::Navigator::add_navigator_events_listener
pub fn event_channel<S: ?Sized>() -> (Rc<EventSender<S>>, EventReceiver<S>) {
    let (sender, receiver) = unbounded();
    (Rc::new(EventSender { sender }), EventReceiver { receiver })
}

//=== EventSender =========================================================

/// Listener that enqueues every notification.
pub struct EventSender<S: ?Sized = dyn Scene> {
    sender: Sender<NavigatorEvent<S>>,
}

impl<S: ?Sized> EventSender<S> {
    fn send(&self, event: NavigatorEvent<S>) {
        if self.sender.send(event).is_err() {
            warn!("Navigator event dropped: receiver disconnected");
        }
    }
}

impl<S: ?Sized> NavigatorEvents<S> for EventSender<S> {
    fn scene(&self, scene: &Rc<S>, data: Option<TransitionData>) {
        self.send(NavigatorEvent::Scene {
            scene: Rc::clone(scene),
            data,
        });
    }

    fn finished(&self) {
        self.send(NavigatorEvent::Finished);
    }
}

//=== EventReceiver =======================================================

/// Driver side of an [`event_channel`].
pub struct EventReceiver<S: ?Sized = dyn Scene> {
    receiver: Receiver<NavigatorEvent<S>>,
}

impl<S: ?Sized> EventReceiver<S> {
    /// Takes queued events in arrival order, at most [`MAX_EVENTS_PER_DRAIN`].
    pub fn drain(&self) -> Vec<NavigatorEvent<S>> {
        let mut events = Vec::new();

        while events.len() < MAX_EVENTS_PER_DRAIN {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if events.len() >= MAX_EVENTS_PER_DRAIN {
            warn!(
                "Navigator event backlog: drained {} events, {} still queued",
                events.len(),
                self.receiver.len()
            );
        }

        events
    }

    /// Takes the oldest queued event, if any.
    pub fn try_next(&self) -> Option<NavigatorEvent<S>> {
        self.receiver.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
