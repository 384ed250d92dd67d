//=========================================================================
// Child Navigators
//=========================================================================
//
// Plumbing shared by the composite navigators.
//
// Architecture:
//   child navigator ── ChildListener ──(Weak)──→ ChildHost (composite)
//                                                   │
//                          ChildRelay::forward_scene ┘──→ composite listeners
//
// A composite owns its children; children only reach the composite through
// a weak listener, so dropping the composite breaks the link.
//
// Direction propagation: `ChildAction::Start` records the direction of the
// composite's own move while the child starts. The child reports its scene
// without data (it merely started), and the relay fills in the recorded
// direction. Moves inside the child carry their own data and pass through
// unchanged.
//
// The relay caches the scene last forwarded together with the id of the
// child that reported it. Stopping, destroying or releasing that child
// drops the cache until the next live child reports in.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{trace, warn};

//=== Internal Dependencies ===============================================

use super::Navigator;
use crate::core::events::{DisposableHandle, ListenerRegistry, NavigatorEvents};
use crate::core::scene::TransitionData;

//=== ChildHost ===========================================================

/// Receives notifications from the children of a composite navigator.
pub(crate) trait ChildHost<S: ?Sized> {
    fn child_scene(&self, child_id: u64, scene: &Rc<S>, data: Option<TransitionData>);
    fn child_finished(&self, child_id: u64);
}

//=== ChildListener =======================================================

struct ChildListener<S: ?Sized> {
    child_id: u64,
    host: Weak<dyn ChildHost<S>>,
}

impl<S: ?Sized> NavigatorEvents<S> for ChildListener<S> {
    fn scene(&self, scene: &Rc<S>, data: Option<TransitionData>) {
        if let Some(host) = self.host.upgrade() {
            host.child_scene(self.child_id, scene, data);
        }
    }

    fn finished(&self) {
        if let Some(host) = self.host.upgrade() {
            host.child_finished(self.child_id);
        }
    }
}

//=== ChildNavigator ======================================================

/// A child navigator together with its registration on the composite.
pub(crate) struct ChildNavigator<S: ?Sized> {
    pub(crate) id: u64,
    pub(crate) navigator: Rc<dyn Navigator<S>>,
    handle: DisposableHandle,
}

impl<S: ?Sized> Clone for ChildNavigator<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            navigator: Rc::clone(&self.navigator),
            handle: self.handle.clone(),
        }
    }
}

//=== ChildAction =========================================================

/// Side effect of a composite navigator transition.
pub(crate) enum ChildAction<S: ?Sized> {
    /// Starts the child; its first scene is forwarded with `data`.
    Start {
        navigator: Rc<dyn Navigator<S>>,
        data: Option<TransitionData>,
    },
    Stop(Rc<dyn Navigator<S>>),
    /// Detaches and destroys the child.
    Destroy(ChildNavigator<S>),
    /// Detaches a child that already finished on its own.
    Release(ChildNavigator<S>),
    NotifyFinished {
        listeners: Vec<Rc<dyn NavigatorEvents<S>>>,
    },
}

impl<S: ?Sized + 'static> ChildAction<S> {
    /// `Destroy` for every child, last (top) first.
    pub(crate) fn destroy_all(children: &[ChildNavigator<S>]) -> impl Iterator<Item = Self> + '_ {
        children.iter().rev().cloned().map(Self::Destroy)
    }

    fn run(self, relay: &ChildRelay<S>) {
        match self {
            Self::Start { navigator, data } => {
                let outer = relay.pending.replace(data);
                navigator.on_start();
                relay.pending.set(outer);
            }
            // Only the live child is ever stopped.
            Self::Stop(navigator) => {
                relay.live_scene.borrow_mut().take();
                navigator.on_stop();
            }
            Self::Destroy(child) => {
                relay.forget(child.id);
                child.handle.dispose();
                child.navigator.on_destroy();
            }
            Self::Release(child) => {
                relay.forget(child.id);
                child.handle.dispose();
            }
            Self::NotifyFinished { listeners } => {
                for listener in &listeners {
                    listener.finished();
                }
            }
        }
    }
}

//=== ChildRelay ==========================================================

/// Listener bookkeeping of a composite navigator.
///
/// Holds the composite's own listeners, the scene last forwarded to them
/// and the direction of an in-flight child start.
pub(crate) struct ChildRelay<S: ?Sized> {
    listeners: ListenerRegistry<S>,
    live_scene: RefCell<Option<(u64, Rc<S>)>>,
    pending: Cell<Option<TransitionData>>,
    next_child_id: Cell<u64>,
}

impl<S: ?Sized + 'static> ChildRelay<S> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: ListenerRegistry::new(),
            live_scene: RefCell::new(None),
            pending: Cell::new(None),
            next_child_id: Cell::new(0),
        }
    }

    /// Registers the composite on `navigator` and wraps it as a child.
    ///
    /// Must not be called while the composite's state is borrowed: the
    /// child may report its scene immediately.
    pub(crate) fn attach(&self, host: Weak<dyn ChildHost<S>>, navigator: Rc<dyn Navigator<S>>) -> ChildNavigator<S> {
        let id = self.next_child_id.get();
        self.next_child_id.set(id + 1);
        self.register(host, id, navigator)
    }

    /// Moves `child` over to `host`, keeping its id.
    pub(crate) fn reattach(&self, host: Weak<dyn ChildHost<S>>, child: ChildNavigator<S>) -> ChildNavigator<S> {
        child.handle.dispose();
        self.register(host, child.id, child.navigator)
    }

    fn register(&self, host: Weak<dyn ChildHost<S>>, id: u64, navigator: Rc<dyn Navigator<S>>) -> ChildNavigator<S> {
        let handle = navigator.add_navigator_events_listener(Rc::new(ChildListener { child_id: id, host }));
        trace!("Child navigator {} ({}) attached", id, navigator.class_name());

        ChildNavigator { id, navigator, handle }
    }

    pub(crate) fn notify_finished(&self) -> ChildAction<S> {
        ChildAction::NotifyFinished {
            listeners: self.listeners.snapshot(),
        }
    }

    /// Passes a scene reported by the live child on to the composite's
    /// listeners.
    pub(crate) fn forward_scene(&self, child_id: u64, scene: &Rc<S>, data: Option<TransitionData>) {
        *self.live_scene.borrow_mut() = Some((child_id, Rc::clone(scene)));

        let data = data.or(self.pending.get());
        for listener in self.listeners.snapshot() {
            listener.scene(scene, data);
        }
    }

    /// Registers a composite listener, telling it the live scene if the
    /// composite is started.
    ///
    /// `started` is `None` once the composite is destroyed.
    pub(crate) fn add_listener(
        &self,
        class_name: &str,
        listener: Rc<dyn NavigatorEvents<S>>,
        started: Option<bool>,
    ) -> DisposableHandle {
        let Some(active) = started else {
            warn!("{}: listener added while destroyed, ignoring", class_name);
            return DisposableHandle::disposed();
        };

        let (handle, added) = self.listeners.add(Rc::clone(&listener));
        let live = match &*self.live_scene.borrow() {
            Some((_, scene)) if active => Some(Rc::clone(scene)),
            _ => None,
        };
        if let (true, Some(scene)) = (added, live) {
            listener.scene(&scene, None);
        }
        handle
    }

    /// Runs composite actions in order.
    pub(crate) fn run(&self, actions: Vec<ChildAction<S>>) {
        for action in actions {
            action.run(self);
        }
    }

    /// Drops the cached scene if `child_id` reported it.
    fn forget(&self, child_id: u64) {
        let mut live = self.live_scene.borrow_mut();
        if live.as_ref().is_some_and(|(id, _)| *id == child_id) {
            live.take();
        }
    }

    /// Releases listeners and the cached scene once the composite is
    /// destroyed.
    pub(crate) fn reset(&self) {
        self.listeners.clear();
        self.live_scene.borrow_mut().take();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
