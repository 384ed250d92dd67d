//=========================================================================
// Composite Replacing Navigator
//=========================================================================
//
// One swappable child navigator, no history. The child's scenes are
// reported as the composite's own; when the child finishes, so does the
// composite.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{trace, warn};

//=== Internal Dependencies ===============================================

use super::actions::{apply, ignore_destroyed, LifecycleState, Phase, StateTransition};
use super::child::{ChildAction, ChildHost, ChildNavigator, ChildRelay};
use super::Navigator;
use crate::core::events::{DisposableHandle, NavigatorEvents};
use crate::core::scene::{Scene, TransitionData};
use crate::core::state::{keys, NavigatorFactory, SavedState};
use crate::error::Result;

//=== State ===============================================================

enum CompositeReplacingState<S: ?Sized> {
    Inactive { child: ChildNavigator<S> },
    Active { child: ChildNavigator<S> },
    Destroyed,
}

impl<S: ?Sized> LifecycleState for CompositeReplacingState<S> {
    fn destroyed() -> Self {
        Self::Destroyed
    }

    fn phase(&self) -> Phase {
        match self {
            Self::Inactive { .. } => Phase::Inactive,
            Self::Active { .. } => Phase::Active,
            Self::Destroyed => Phase::Destroyed,
        }
    }
}

impl<S: ?Sized> CompositeReplacingState<S> {
    fn child(&self) -> Option<&ChildNavigator<S>> {
        match self {
            Self::Inactive { child } | Self::Active { child } => Some(child),
            Self::Destroyed => None,
        }
    }
}

type Transition<S> = StateTransition<CompositeReplacingState<S>, ChildAction<S>>;

fn teardown<S: ?Sized + 'static>(state: CompositeReplacingState<S>) -> Vec<ChildAction<S>> {
    match state {
        CompositeReplacingState::Inactive { child } => vec![ChildAction::Destroy(child)],
        CompositeReplacingState::Active { child } => vec![
            ChildAction::Stop(Rc::clone(&child.navigator)),
            ChildAction::Destroy(child),
        ],
        CompositeReplacingState::Destroyed => Vec::new(),
    }
}

//=== Shared ==============================================================

struct Shared<S: ?Sized + 'static> {
    class_name: Cow<'static, str>,
    state: RefCell<CompositeReplacingState<S>>,
    relay: ChildRelay<S>,
}

impl<S: ?Sized + 'static> Shared<S> {
    fn host(self: &Rc<Self>) -> Weak<dyn ChildHost<S>> {
        let weak: Weak<Self> = Rc::downgrade(self);
        weak
    }

    fn attach(self: &Rc<Self>, navigator: Rc<dyn Navigator<S>>) -> ChildNavigator<S> {
        self.relay.attach(self.host(), navigator)
    }

    /// Wraps `shared` in a new `Rc`, moving the child's listener over to
    /// the new allocation.
    fn rehome(shared: Self) -> Rc<Self> {
        let shared = Rc::new(shared);
        let state = match shared.state.replace(CompositeReplacingState::Destroyed) {
            CompositeReplacingState::Inactive { child } => CompositeReplacingState::Inactive {
                child: shared.relay.reattach(shared.host(), child),
            },
            CompositeReplacingState::Active { child } => CompositeReplacingState::Active {
                child: shared.relay.reattach(shared.host(), child),
            },
            CompositeReplacingState::Destroyed => CompositeReplacingState::Destroyed,
        };
        *shared.state.borrow_mut() = state;
        shared
    }

    fn transition(&self, command: &str, f: impl FnOnce(CompositeReplacingState<S>) -> Transition<S>) {
        let (phase, actions) = apply(&self.state, &self.class_name, command, f);
        if phase == Phase::Destroyed {
            self.relay.reset();
        }
        self.relay.run(actions);
    }

    fn ignore(&self, command: &str) -> Transition<S> {
        ignore_destroyed(CompositeReplacingState::Destroyed, &self.class_name, command)
    }

    fn current(&self) -> Option<Rc<dyn Navigator<S>>> {
        self.state
            .borrow()
            .child()
            .map(|child| Rc::clone(&child.navigator))
    }

    //--- Commands ---------------------------------------------------------

    fn replace(self: &Rc<Self>, navigator: Rc<dyn Navigator<S>>, data: Option<TransitionData>) {
        let child = self.attach(navigator);

        self.transition("replace", |state| match state {
            CompositeReplacingState::Inactive { child: old } => Transition::new(
                CompositeReplacingState::Inactive { child },
                vec![ChildAction::Destroy(old)],
            ),
            CompositeReplacingState::Active { child: old } => {
                let actions = vec![
                    ChildAction::Stop(Rc::clone(&old.navigator)),
                    ChildAction::Destroy(old),
                    ChildAction::Start {
                        navigator: Rc::clone(&child.navigator),
                        data,
                    },
                ];
                Transition::new(CompositeReplacingState::Active { child }, actions)
            }
            CompositeReplacingState::Destroyed => {
                let mut ignored = self.ignore("replace");
                ignored.actions.push(ChildAction::Release(child));
                ignored
            }
        });
    }

    fn finish(&self) {
        self.transition("finish", |state| match state {
            CompositeReplacingState::Destroyed => self.ignore("finish"),
            live => {
                let mut actions = teardown(live);
                actions.push(self.relay.notify_finished());
                Transition::new(CompositeReplacingState::Destroyed, actions)
            }
        });
    }
}

//--- Child Notifications -------------------------------------------------

impl<S: ?Sized + 'static> ChildHost<S> for Shared<S> {
    fn child_scene(&self, child_id: u64, scene: &Rc<S>, data: Option<TransitionData>) {
        let live = match &*self.state.borrow() {
            CompositeReplacingState::Active { child } => child.id == child_id,
            _ => false,
        };

        if live {
            self.relay.forward_scene(child_id, scene, data);
        } else {
            trace!("{}: scene from detached child {} dropped", self.class_name, child_id);
        }
    }

    fn child_finished(&self, child_id: u64) {
        self.transition("child finished", |state| match state {
            CompositeReplacingState::Inactive { child } | CompositeReplacingState::Active { child }
                if child.id == child_id =>
            {
                let actions = vec![ChildAction::Release(child), self.relay.notify_finished()];
                Transition::new(CompositeReplacingState::Destroyed, actions)
            }
            other => Transition::idle(other),
        });
    }
}

//=== CompositeReplacingNavigator =========================================

/// Navigator hosting one child navigator that can be swapped out.
///
/// Typical root of an app whose flows (onboarding, main) are themselves
/// navigators.
pub struct CompositeReplacingNavigator<S: Scene + ?Sized + 'static = dyn Scene> {
    shared: Rc<Shared<S>>,
}

impl<S: Scene + ?Sized + 'static> CompositeReplacingNavigator<S> {
    //--- Construction -----------------------------------------------------

    pub fn new(initial_navigator: Rc<dyn Navigator<S>>) -> Self {
        let shared = Rc::new(Shared {
            class_name: Cow::Borrowed("CompositeReplacingNavigator"),
            state: RefCell::new(CompositeReplacingState::Destroyed),
            relay: ChildRelay::new(),
        });

        let child = shared.attach(initial_navigator);
        *shared.state.borrow_mut() = CompositeReplacingState::Inactive { child };

        Self { shared }
    }

    /// Rebuilds a navigator from `navigator:class` / `navigator:state`,
    /// falling back to `initial_navigator` when no child was saved.
    pub fn restore(
        saved: Option<&SavedState>,
        factory: &impl NavigatorFactory<S>,
        initial_navigator: impl FnOnce() -> Rc<dyn Navigator<S>>,
    ) -> Result<Self> {
        let Some(saved) = saved.filter(|saved| saved.contains_key(keys::NAVIGATOR_CLASS)) else {
            return Ok(Self::new(initial_navigator()));
        };

        let class_name = saved.require_text(keys::NAVIGATOR_CLASS)?;
        let state = saved.optional_state(keys::NAVIGATOR_STATE)?;
        Ok(Self::new(factory.instantiate_navigator(class_name, state)?))
    }

    /// Sets the identifier reported through [`Navigator::class_name`].
    pub fn with_class_name(self, class_name: impl Into<Cow<'static, str>>) -> Self {
        match Rc::try_unwrap(self.shared) {
            Ok(mut shared) => {
                shared.class_name = class_name.into();
                Self {
                    shared: Shared::rehome(shared),
                }
            }
            Err(shared) => {
                warn!("{}: class name fixed while shared, keeping it", shared.class_name);
                Self { shared }
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn current_navigator(&self) -> Option<Rc<dyn Navigator<S>>> {
        self.shared.current()
    }

    pub fn is_active(&self) -> bool {
        self.shared.state.borrow().phase() == Phase::Active
    }

    //--- Commands ---------------------------------------------------------

    /// Replaces the child; its first scene is reported without transition
    /// data.
    pub fn replace(&self, navigator: Rc<dyn Navigator<S>>) {
        self.shared.replace(navigator, None);
    }

    /// Replaces the child; its first scene is reported with `data`.
    pub fn replace_with(&self, navigator: Rc<dyn Navigator<S>>, data: TransitionData) {
        self.shared.replace(navigator, Some(data));
    }

    /// Destroys the child and notifies listeners that the navigator finished.
    pub fn finish(&self) {
        self.shared.finish();
    }
}

//=== Navigator ===========================================================

impl<S: Scene + ?Sized + 'static> Navigator<S> for CompositeReplacingNavigator<S> {
    fn on_start(&self) {
        let shared = &self.shared;
        shared.transition("start", |state| match state {
            CompositeReplacingState::Inactive { child } => {
                let actions = vec![ChildAction::Start {
                    navigator: Rc::clone(&child.navigator),
                    data: None,
                }];
                Transition::new(CompositeReplacingState::Active { child }, actions)
            }
            active @ CompositeReplacingState::Active { .. } => Transition::idle(active),
            CompositeReplacingState::Destroyed => shared.ignore("start"),
        });
    }

    fn on_stop(&self) {
        self.shared.transition("stop", |state| match state {
            CompositeReplacingState::Active { child } => {
                let actions = vec![ChildAction::Stop(Rc::clone(&child.navigator))];
                Transition::new(CompositeReplacingState::Inactive { child }, actions)
            }
            other => Transition::idle(other),
        });
    }

    fn on_destroy(&self) {
        self.shared.transition("destroy", |state| match state {
            CompositeReplacingState::Destroyed => Transition::idle(CompositeReplacingState::Destroyed),
            live => Transition::new(CompositeReplacingState::Destroyed, teardown(live)),
        });
    }

    fn on_back_pressed(&self) -> bool {
        let Some(current) = self.shared.current() else {
            return false;
        };
        if !current.on_back_pressed() {
            self.shared.finish();
        }
        true
    }

    fn add_navigator_events_listener(&self, listener: Rc<dyn NavigatorEvents<S>>) -> DisposableHandle {
        let started = match self.shared.state.borrow().phase() {
            Phase::Inactive => Some(false),
            Phase::Active => Some(true),
            Phase::Destroyed => None,
        };
        self.shared.relay.add_listener(&self.shared.class_name, listener, started)
    }

    fn is_destroyed(&self) -> bool {
        self.shared.state.borrow().phase() == Phase::Destroyed
    }

    fn save_instance_state(&self) -> SavedState {
        let mut saved = SavedState::new();
        if let Some(navigator) = self.current_navigator() {
            saved.insert(keys::NAVIGATOR_CLASS, navigator.class_name());
            saved.insert(keys::NAVIGATOR_STATE, navigator.save_instance_state());
        }
        saved
    }

    fn class_name(&self) -> &str {
        &self.shared.class_name
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
