//=========================================================================
// Listener Registry
//=========================================================================
//
// Ordered set of distinct listeners plus the handles that remove them.
//
// The registry lives behind `Rc<RefCell<..>>`; handles only keep a weak,
// type-erased reference to it so they do not depend on the scene type
// and never keep a navigator's listeners alive.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::trace;

//=== Internal Dependencies ===============================================

use super::NavigatorEvents;

//=== Registration (type-erased) ==========================================

/// Scene-type-agnostic view of a listener set, used by handles.
trait Registration {
    fn remove(&self, id: u64);
    fn contains(&self, id: u64) -> bool;
}

//=== ListenerSet =========================================================

struct ListenerSet<S: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Rc<dyn NavigatorEvents<S>>)>,
}

impl<S: ?Sized> Registration for RefCell<ListenerSet<S>> {
    fn remove(&self, id: u64) {
        let mut set = self.borrow_mut();
        let before = set.entries.len();
        set.entries.retain(|(entry_id, _)| *entry_id != id);
        if set.entries.len() != before {
            trace!("Listener {} removed", id);
        }
    }

    fn contains(&self, id: u64) -> bool {
        self.borrow().entries.iter().any(|(entry_id, _)| *entry_id == id)
    }
}

//=== ListenerRegistry ====================================================

/// Listener storage owned by a single navigator.
pub(crate) struct ListenerRegistry<S: ?Sized> {
    set: Rc<RefCell<ListenerSet<S>>>,
}

impl<S: ?Sized + 'static> ListenerRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            set: Rc::new(RefCell::new(ListenerSet {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Adds `listener` unless the same instance is already registered.
    ///
    /// Returns `true` when the listener was newly added.
    pub(crate) fn add(&self, listener: Rc<dyn NavigatorEvents<S>>) -> (DisposableHandle, bool) {
        let mut set = self.set.borrow_mut();

        let existing = set
            .entries
            .iter()
            .find(|(_, registered)| same_listener(registered, &listener))
            .map(|(id, _)| *id);

        if let Some(id) = existing {
            drop(set);
            return (self.handle(id), false);
        }

        let id = set.next_id;
        set.next_id += 1;
        set.entries.push((id, listener));
        drop(set);

        trace!("Listener {} registered", id);
        (self.handle(id), true)
    }

    /// Copy of the current listeners, in registration order.
    pub(crate) fn snapshot(&self) -> Vec<Rc<dyn NavigatorEvents<S>>> {
        self.set
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    /// Drops every listener; outstanding handles report disposed.
    pub(crate) fn clear(&self) {
        self.set.borrow_mut().entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.set.borrow().entries.len()
    }

    fn handle(&self, id: u64) -> DisposableHandle {
        let weak: Weak<RefCell<ListenerSet<S>>> = Rc::downgrade(&self.set);
        DisposableHandle {
            id,
            registration: weak,
        }
    }
}

fn same_listener<S: ?Sized>(a: &Rc<dyn NavigatorEvents<S>>, b: &Rc<dyn NavigatorEvents<S>>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

//=== DisposableHandle ====================================================

/// Handle returned when registering a listener.
///
/// Dropping the handle does not unregister; call [`dispose`](Self::dispose).
/// Clones refer to the same registration.
#[derive(Clone)]
pub struct DisposableHandle {
    id: u64,
    registration: Weak<dyn Registration>,
}

impl DisposableHandle {
    /// A handle that was never attached to a live registry.
    ///
    /// Returned when registering on a destroyed navigator.
    pub fn disposed() -> Self {
        let weak: Weak<RefCell<ListenerSet<()>>> = Weak::new();
        Self {
            id: 0,
            registration: weak,
        }
    }

    /// Removes the listener. Calling it again has no effect.
    pub fn dispose(&self) {
        if let Some(registration) = self.registration.upgrade() {
            registration.remove(self.id);
        }
    }

    /// Returns `true` once the listener is no longer registered.
    pub fn is_disposed(&self) -> bool {
        self.registration
            .upgrade()
            .map_or(true, |registration| !registration.contains(self.id))
    }
}

impl fmt::Debug for DisposableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableHandle")
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::TransitionData;
    use std::cell::Cell;

    struct Counting {
        scenes: Cell<usize>,
    }

    impl NavigatorEvents<str> for Counting {
        fn scene(&self, _scene: &Rc<str>, _data: Option<TransitionData>) {
            self.scenes.set(self.scenes.get() + 1);
        }

        fn finished(&self) {}
    }

    fn counting() -> Rc<Counting> {
        Rc::new(Counting { scenes: Cell::new(0) })
    }

    #[test]
    fn add_returns_live_handle() {
        let registry = ListenerRegistry::<str>::new();
        let (handle, added) = registry.add(counting());

        assert!(added);
        assert!(!handle.is_disposed());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_instance_is_registered_once() {
        let registry = ListenerRegistry::<str>::new();
        let listener = counting();

        let (first, _) = registry.add(listener.clone());
        let (second, added) = registry.add(listener);

        assert!(!added);
        assert_eq!(registry.len(), 1);

        second.dispose();
        assert!(first.is_disposed());
    }

    #[test]
    fn dispose_is_idempotent() {
        let registry = ListenerRegistry::<str>::new();
        let (handle, _) = registry.add(counting());
        let (other, _) = registry.add(counting());

        handle.dispose();
        handle.dispose();

        assert!(handle.is_disposed());
        assert!(!other.is_disposed());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_disposes_every_handle() {
        let registry = ListenerRegistry::<str>::new();
        let (a, _) = registry.add(counting());
        let (b, _) = registry.add(counting());

        registry.clear();

        assert!(a.is_disposed());
        assert!(b.is_disposed());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_removal() {
        let registry = ListenerRegistry::<str>::new();
        let listener = counting();
        let (handle, _) = registry.add(listener.clone());

        let snapshot = registry.snapshot();
        handle.dispose();

        let scene: Rc<str> = Rc::from("home");
        for l in &snapshot {
            l.scene(&scene, None);
        }
        assert_eq!(listener.scenes.get(), 1);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn handle_outliving_registry_reports_disposed() {
        let registry = ListenerRegistry::<str>::new();
        let (handle, _) = registry.add(counting());
        drop(registry);

        assert!(handle.is_disposed());
        handle.dispose();
    }

    #[test]
    fn detached_handle_is_disposed() {
        assert!(DisposableHandle::disposed().is_disposed());
    }
}
