//=========================================================================
// Transitions & Actions
//=========================================================================
//
// Shared machinery behind every navigator command.
//
// A command never touches scenes while the state cell is borrowed:
//
//   1. take the current state out of its cell
//   2. compute StateTransition { state, actions } (pure, no user code)
//   3. commit the new state and release the borrow
//   4. run the actions in order
//
// Reentrant calls made from step 4 (a listener restarting the navigator,
// saving it, pushing another scene) observe the committed state.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::events::{ListenerRegistry, NavigatorEvents};
use crate::core::scene::{Scene, TransitionData};

//=== Phase ===============================================================

/// Coarse lifecycle phase shared by every navigator state enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Inactive,
    Active,
    Destroyed,
}

/// Implemented by each navigator's private state enum.
pub(crate) trait LifecycleState: Sized {
    /// The terminal state, also used as a placeholder while a transition
    /// is being computed.
    fn destroyed() -> Self;

    fn phase(&self) -> Phase;
}

//=== StateTransition =====================================================

/// Result of a command: the state to commit and the effects to run after.
pub(crate) struct StateTransition<T, A> {
    pub(crate) state: T,
    pub(crate) actions: Vec<A>,
}

impl<T, A> StateTransition<T, A> {
    pub(crate) fn new(state: T, actions: Vec<A>) -> Self {
        Self { state, actions }
    }

    /// Keeps `state` without side effects.
    pub(crate) fn idle(state: T) -> Self {
        Self {
            state,
            actions: Vec::new(),
        }
    }
}

//--- apply() -------------------------------------------------------------
//
// Runs steps 1-3. Returns the committed phase and the actions to run.
//
pub(crate) fn apply<T, A>(
    cell: &RefCell<T>,
    class_name: &str,
    command: &str,
    transition: impl FnOnce(T) -> StateTransition<T, A>,
) -> (Phase, Vec<A>)
where
    T: LifecycleState,
{
    let mut slot = cell.borrow_mut();
    let current = std::mem::replace(&mut *slot, T::destroyed());
    let before = current.phase();

    let StateTransition { state, actions } = transition(current);
    let after = state.phase();
    *slot = state;
    drop(slot);

    if before != after || !actions.is_empty() {
        debug!(
            "{}: {} ({:?} -> {:?}, {} action(s))",
            class_name,
            command,
            before,
            after,
            actions.len()
        );
    }

    (after, actions)
}

/// Transition for a command received after destruction.
pub(crate) fn ignore_destroyed<T, A>(state: T, class_name: &str, command: &str) -> StateTransition<T, A> {
    warn!("{}: received {} while destroyed, ignoring", class_name, command);
    StateTransition::idle(state)
}

//=== SceneAction =========================================================

/// Side effect of a scene-based navigator transition.
///
/// Notifications carry the listener snapshot taken when the transition
/// was computed.
pub(crate) enum SceneAction<S: ?Sized> {
    Start(Rc<S>),
    Stop(Rc<S>),
    Destroy(Rc<S>),
    NotifyScene {
        listeners: Vec<Rc<dyn NavigatorEvents<S>>>,
        scene: Rc<S>,
        data: Option<TransitionData>,
    },
    NotifyFinished {
        listeners: Vec<Rc<dyn NavigatorEvents<S>>>,
    },
}

impl<S: Scene + ?Sized + 'static> SceneAction<S> {
    pub(crate) fn notify_scene(
        listeners: &ListenerRegistry<S>,
        scene: &Rc<S>,
        data: Option<TransitionData>,
    ) -> Self {
        Self::NotifyScene {
            listeners: listeners.snapshot(),
            scene: Rc::clone(scene),
            data,
        }
    }

    pub(crate) fn notify_finished(listeners: &ListenerRegistry<S>) -> Self {
        Self::NotifyFinished {
            listeners: listeners.snapshot(),
        }
    }

    /// `Destroy` for every scene, last (top) first.
    pub(crate) fn destroy_all(scenes: &[Rc<S>]) -> impl Iterator<Item = Self> + '_ {
        scenes.iter().rev().map(|scene| Self::Destroy(Rc::clone(scene)))
    }

    fn run(self) {
        match self {
            Self::Start(scene) => scene.on_start(),
            Self::Stop(scene) => scene.on_stop(),
            Self::Destroy(scene) => scene.on_destroy(),
            Self::NotifyScene {
                listeners,
                scene,
                data,
            } => {
                for listener in &listeners {
                    listener.scene(&scene, data);
                }
            }
            Self::NotifyFinished { listeners } => {
                for listener in &listeners {
                    listener.finished();
                }
            }
        }
    }
}

/// Step 4 for scene-based navigators.
pub(crate) fn run_scene_actions<S: Scene + ?Sized + 'static>(actions: Vec<SceneAction<S>>) {
    for action in actions {
        action.run();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
