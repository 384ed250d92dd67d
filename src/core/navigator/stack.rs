//=========================================================================
// Stack Navigator
//=========================================================================
//
// Ordered stack of scenes; the top (last) scene is the live one.
//
// Architecture:
//   push(C)       [A, B]  →  [A, B, C]     stop B, start C, notify(C, fwd)
//   pop()         [A, B]  →  [A]           stop B, destroy B, start A, notify(A, back)
//   replace(C)    [A, B]  →  [A, C]        stop B, destroy B, start C, notify(C, fwd)
//   pop()         [A]     →  Destroyed     stop A, destroy A, finished
//
// Lower scenes are only started once they become the top again. While
// inactive, mutations only destroy what they remove; the new top is
// started by the next `on_start`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use log::warn;

//=== Internal Dependencies ===============================================

use super::actions::{
    apply, ignore_destroyed, run_scene_actions, LifecycleState, Phase, SceneAction, StateTransition,
};
use super::Navigator;
use crate::core::events::{DisposableHandle, ListenerRegistry, NavigatorEvents};
use crate::core::scene::{Scene, TransitionData};
use crate::core::state::{keys, SavedState, SceneFactory};
use crate::error::Result;

//=== State ===============================================================

enum StackState<S: ?Sized> {
    Inactive { scenes: Vec<Rc<S>> },
    Active { scenes: Vec<Rc<S>> },
    Destroyed,
}

impl<S: ?Sized> LifecycleState for StackState<S> {
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

impl<S: ?Sized> StackState<S> {
    fn scenes(&self) -> &[Rc<S>] {
        match self {
            Self::Inactive { scenes } | Self::Active { scenes } => scenes,
            Self::Destroyed => &[],
        }
    }
}

type Transition<S> = StateTransition<StackState<S>, SceneAction<S>>;

//=== StackNavigator ======================================================

/// Navigator keeping a history of scenes.
///
/// # Example
///
/// ```rust
/// # use std::rc::Rc;
/// # use aetheric_navigation::prelude::*;
/// struct Inbox;
/// impl Scene for Inbox {}
/// struct Message;
/// impl Scene for Message {}
///
/// let stack: StackNavigator = StackNavigator::new(vec![Rc::new(Inbox) as Rc<dyn Scene>]);
/// stack.on_start();
///
/// stack.push(Rc::new(Message));
/// assert_eq!(stack.scenes().len(), 2);
///
/// assert!(stack.on_back_pressed());
/// assert_eq!(stack.scenes().len(), 1);
/// ```
pub struct StackNavigator<S: Scene + ?Sized + 'static = dyn Scene> {
    class_name: Cow<'static, str>,
    state: RefCell<StackState<S>>,
    listeners: ListenerRegistry<S>,
}

impl<S: Scene + ?Sized + 'static> StackNavigator<S> {
    //--- Construction -----------------------------------------------------

    /// Creates an inactive navigator over `initial_stack` (bottom first).
    ///
    /// # Panics
    ///
    /// Panics if `initial_stack` is empty.
    pub fn new(initial_stack: Vec<Rc<S>>) -> Self {
        assert!(!initial_stack.is_empty(), "StackNavigator needs at least one initial scene");

        Self {
            class_name: Cow::Borrowed("StackNavigator"),
            state: RefCell::new(StackState::Inactive { scenes: initial_stack }),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Rebuilds a navigator from [`save_instance_state`] output.
    ///
    /// Falls back to `initial_stack` when nothing (or an empty stack) was
    /// saved.
    ///
    /// [`save_instance_state`]: Navigator::save_instance_state
    pub fn restore(
        saved: Option<&SavedState>,
        factory: &impl SceneFactory<S>,
        initial_stack: impl FnOnce() -> Vec<Rc<S>>,
    ) -> Result<Self> {
        let entries = match saved {
            Some(saved) => saved.indexed_entries()?,
            None => Vec::new(),
        };
        if entries.is_empty() {
            return Ok(Self::new(initial_stack()));
        }

        let scenes = entries
            .into_iter()
            .map(|(class_name, state)| factory.instantiate_scene(class_name, state))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(scenes))
    }

    /// Sets the identifier reported through [`Navigator::class_name`].
    pub fn with_class_name(mut self, class_name: impl Into<Cow<'static, str>>) -> Self {
        self.class_name = class_name.into();
        self
    }

    //--- Queries ----------------------------------------------------------

    /// The stack, bottom first. Empty once destroyed.
    pub fn scenes(&self) -> Vec<Rc<S>> {
        self.state.borrow().scenes().to_vec()
    }

    /// The top of the stack.
    pub fn active_scene(&self) -> Option<Rc<S>> {
        self.state.borrow().scenes().last().cloned()
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().phase() == Phase::Active
    }

    //--- Commands ---------------------------------------------------------

    /// Pushes `scene` with forwards transition data.
    pub fn push(&self, scene: Rc<S>) {
        self.push_with(scene, TransitionData::FORWARDS);
    }

    /// Pushes `scene` on top of the stack.
    pub fn push_with(&self, scene: Rc<S>, data: TransitionData) {
        self.transition("push", |state| match state {
            StackState::Inactive { mut scenes } => {
                scenes.push(scene);
                Transition::idle(StackState::Inactive { scenes })
            }
            StackState::Active { mut scenes } => {
                let mut actions = Vec::with_capacity(3);
                if let Some(top) = scenes.last() {
                    actions.push(SceneAction::Stop(Rc::clone(top)));
                }
                actions.push(SceneAction::Start(Rc::clone(&scene)));
                actions.push(SceneAction::notify_scene(&self.listeners, &scene, Some(data)));
                scenes.push(scene);
                Transition::new(StackState::Active { scenes }, actions)
            }
            StackState::Destroyed => ignore_destroyed(StackState::Destroyed, &self.class_name, "push"),
        });
    }

    /// Removes the top scene, finishing the navigator when it was the last.
    pub fn pop(&self) {
        self.transition("pop", |state| match state {
            StackState::Inactive { mut scenes } => {
                let mut actions = Vec::with_capacity(2);
                actions.extend(scenes.pop().map(SceneAction::Destroy));
                if scenes.is_empty() {
                    actions.push(SceneAction::notify_finished(&self.listeners));
                    Transition::new(StackState::Destroyed, actions)
                } else {
                    Transition::new(StackState::Inactive { scenes }, actions)
                }
            }
            StackState::Active { mut scenes } => {
                let mut actions = Vec::with_capacity(4);
                if let Some(top) = scenes.pop() {
                    actions.push(SceneAction::Stop(Rc::clone(&top)));
                    actions.push(SceneAction::Destroy(top));
                }
                match scenes.last() {
                    None => {
                        actions.push(SceneAction::notify_finished(&self.listeners));
                        Transition::new(StackState::Destroyed, actions)
                    }
                    Some(new_top) => {
                        actions.push(SceneAction::Start(Rc::clone(new_top)));
                        actions.push(SceneAction::notify_scene(
                            &self.listeners,
                            new_top,
                            Some(TransitionData::BACKWARDS),
                        ));
                        Transition::new(StackState::Active { scenes }, actions)
                    }
                }
            }
            StackState::Destroyed => ignore_destroyed(StackState::Destroyed, &self.class_name, "pop"),
        });
    }

    /// Replaces the top scene with forwards transition data.
    pub fn replace(&self, scene: Rc<S>) {
        self.replace_with(scene, TransitionData::FORWARDS);
    }

    /// Swaps the top scene for `scene`, keeping the stack size.
    pub fn replace_with(&self, scene: Rc<S>, data: TransitionData) {
        self.transition("replace", |state| match state {
            StackState::Inactive { mut scenes } => {
                let actions: Vec<_> = scenes.pop().map(SceneAction::Destroy).into_iter().collect();
                scenes.push(scene);
                Transition::new(StackState::Inactive { scenes }, actions)
            }
            StackState::Active { mut scenes } => {
                let mut actions = Vec::with_capacity(4);
                if let Some(top) = scenes.pop() {
                    actions.push(SceneAction::Stop(Rc::clone(&top)));
                    actions.push(SceneAction::Destroy(top));
                }
                actions.push(SceneAction::Start(Rc::clone(&scene)));
                actions.push(SceneAction::notify_scene(&self.listeners, &scene, Some(data)));
                scenes.push(scene);
                Transition::new(StackState::Active { scenes }, actions)
            }
            StackState::Destroyed => ignore_destroyed(StackState::Destroyed, &self.class_name, "replace"),
        });
    }

    /// Destroys every scene (top first) and notifies listeners once.
    pub fn finish(&self) {
        self.transition("finish", |state| match state {
            StackState::Destroyed => ignore_destroyed(StackState::Destroyed, &self.class_name, "finish"),
            live => {
                let mut actions = teardown(live);
                actions.push(SceneAction::notify_finished(&self.listeners));
                Transition::new(StackState::Destroyed, actions)
            }
        });
    }

    //--- Internal Helpers -------------------------------------------------

    fn transition(&self, command: &str, f: impl FnOnce(StackState<S>) -> Transition<S>) {
        let (phase, actions) = apply(&self.state, &self.class_name, command, f);
        if phase == Phase::Destroyed {
            self.listeners.clear();
        }
        run_scene_actions(actions);
    }
}

//--- teardown() ----------------------------------------------------------
//
// Stops the top if active, then destroys every scene top-down.
//
fn teardown<S: Scene + ?Sized + 'static>(state: StackState<S>) -> Vec<SceneAction<S>> {
    match state {
        StackState::Inactive { scenes } => SceneAction::destroy_all(&scenes).collect(),
        StackState::Active { scenes } => {
            let mut actions: Vec<_> = scenes.last().cloned().map(SceneAction::Stop).into_iter().collect();
            actions.extend(SceneAction::destroy_all(&scenes));
            actions
        }
        StackState::Destroyed => Vec::new(),
    }
}

//=== Navigator ===========================================================

impl<S: Scene + ?Sized + 'static> Navigator<S> for StackNavigator<S> {
    fn on_start(&self) {
        self.transition("start", |state| match state {
            StackState::Inactive { scenes } => {
                let actions = match scenes.last() {
                    Some(top) => vec![
                        SceneAction::Start(Rc::clone(top)),
                        SceneAction::notify_scene(&self.listeners, top, None),
                    ],
                    None => Vec::new(),
                };
                Transition::new(StackState::Active { scenes }, actions)
            }
            active @ StackState::Active { .. } => Transition::idle(active),
            StackState::Destroyed => ignore_destroyed(StackState::Destroyed, &self.class_name, "start"),
        });
    }

    fn on_stop(&self) {
        self.transition("stop", |state| match state {
            StackState::Active { scenes } => {
                let actions: Vec<_> = scenes.last().cloned().map(SceneAction::Stop).into_iter().collect();
                Transition::new(StackState::Inactive { scenes }, actions)
            }
            other => Transition::idle(other),
        });
    }

    fn on_destroy(&self) {
        self.transition("destroy", |state| match state {
            StackState::Destroyed => Transition::idle(StackState::Destroyed),
            live => Transition::new(StackState::Destroyed, teardown(live)),
        });
    }

    fn on_back_pressed(&self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.pop();
        true
    }

    fn add_navigator_events_listener(&self, listener: Rc<dyn NavigatorEvents<S>>) -> DisposableHandle {
        let live = match &*self.state.borrow() {
            StackState::Inactive { .. } => None,
            StackState::Active { scenes } => scenes.last().cloned(),
            StackState::Destroyed => {
                warn!("{}: listener added while destroyed, ignoring", self.class_name);
                return DisposableHandle::disposed();
            }
        };

        let (handle, added) = self.listeners.add(Rc::clone(&listener));
        if let (true, Some(scene)) = (added, live) {
            listener.scene(&scene, None);
        }
        handle
    }

    fn is_destroyed(&self) -> bool {
        self.state.borrow().phase() == Phase::Destroyed
    }

    fn save_instance_state(&self) -> SavedState {
        let scenes = self.scenes();

        let mut saved = SavedState::new();
        saved.insert(keys::SIZE, scenes.len() as i64);
        for (index, scene) in scenes.iter().enumerate() {
            saved.insert_indexed(index, scene.class_name(), scene.save_state());
        }
        saved
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
