//=========================================================================
// Replacing Navigator
//=========================================================================
//
// One slot, no history. Replacing the scene discards the old one right
// away, even while inactive: there is nowhere to keep it dormant.
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

enum ReplacingState<S: ?Sized> {
    Inactive { scene: Rc<S> },
    Active { scene: Rc<S> },
    Destroyed,
}

impl<S: ?Sized> LifecycleState for ReplacingState<S> {
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

type Transition<S> = StateTransition<ReplacingState<S>, SceneAction<S>>;

//=== ReplacingNavigator ==================================================

/// Navigator whose single scene can be swapped out.
pub struct ReplacingNavigator<S: Scene + ?Sized + 'static = dyn Scene> {
    class_name: Cow<'static, str>,
    state: RefCell<ReplacingState<S>>,
    listeners: ListenerRegistry<S>,
}

impl<S: Scene + ?Sized + 'static> ReplacingNavigator<S> {
    //--- Construction -----------------------------------------------------

    pub fn new(initial_scene: Rc<S>) -> Self {
        Self {
            class_name: Cow::Borrowed("ReplacingNavigator"),
            state: RefCell::new(ReplacingState::Inactive { scene: initial_scene }),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Rebuilds a navigator from `scene:class` / `scene:state`, falling back
    /// to `initial_scene` when no scene was saved.
    pub fn restore(
        saved: Option<&SavedState>,
        factory: &impl SceneFactory<S>,
        initial_scene: impl FnOnce() -> Rc<S>,
    ) -> Result<Self> {
        let Some(saved) = saved.filter(|saved| saved.contains_key(keys::SCENE_CLASS)) else {
            return Ok(Self::new(initial_scene()));
        };

        let class_name = saved.require_text(keys::SCENE_CLASS)?;
        let state = saved.optional_state(keys::SCENE_STATE)?;
        Ok(Self::new(factory.instantiate_scene(class_name, state)?))
    }

    /// Sets the identifier reported through [`Navigator::class_name`].
    pub fn with_class_name(mut self, class_name: impl Into<Cow<'static, str>>) -> Self {
        self.class_name = class_name.into();
        self
    }

    //--- Queries ----------------------------------------------------------

    pub fn current_scene(&self) -> Option<Rc<S>> {
        match &*self.state.borrow() {
            ReplacingState::Inactive { scene } | ReplacingState::Active { scene } => Some(Rc::clone(scene)),
            ReplacingState::Destroyed => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().phase() == Phase::Active
    }

    //--- Commands ---------------------------------------------------------

    /// Replaces the scene, notifying listeners without transition data.
    pub fn replace(&self, scene: Rc<S>) {
        self.transition_to(scene, None);
    }

    /// Replaces the scene, notifying listeners with `data`.
    pub fn replace_with(&self, scene: Rc<S>, data: TransitionData) {
        self.transition_to(scene, Some(data));
    }

    /// Destroys the scene and notifies listeners that the navigator finished.
    pub fn finish(&self) {
        self.transition("finish", |state| match state {
            ReplacingState::Destroyed => {
                ignore_destroyed(ReplacingState::Destroyed, &self.class_name, "finish")
            }
            live => {
                let mut actions = teardown(live);
                actions.push(SceneAction::notify_finished(&self.listeners));
                Transition::new(ReplacingState::Destroyed, actions)
            }
        });
    }

    //--- Internal Helpers -------------------------------------------------

    fn transition_to(&self, scene: Rc<S>, data: Option<TransitionData>) {
        self.transition("replace", |state| match state {
            ReplacingState::Inactive { scene: old } => Transition::new(
                ReplacingState::Inactive { scene },
                vec![SceneAction::Destroy(old)],
            ),
            ReplacingState::Active { scene: old } => {
                let actions = vec![
                    SceneAction::Stop(Rc::clone(&old)),
                    SceneAction::Destroy(old),
                    SceneAction::Start(Rc::clone(&scene)),
                    SceneAction::notify_scene(&self.listeners, &scene, data),
                ];
                Transition::new(ReplacingState::Active { scene }, actions)
            }
            ReplacingState::Destroyed => {
                ignore_destroyed(ReplacingState::Destroyed, &self.class_name, "replace")
            }
        });
    }

    fn transition(&self, command: &str, f: impl FnOnce(ReplacingState<S>) -> Transition<S>) {
        let (phase, actions) = apply(&self.state, &self.class_name, command, f);
        if phase == Phase::Destroyed {
            self.listeners.clear();
        }
        run_scene_actions(actions);
    }
}

fn teardown<S: Scene + ?Sized + 'static>(state: ReplacingState<S>) -> Vec<SceneAction<S>> {
    match state {
        ReplacingState::Inactive { scene } => vec![SceneAction::Destroy(scene)],
        ReplacingState::Active { scene } => {
            vec![SceneAction::Stop(Rc::clone(&scene)), SceneAction::Destroy(scene)]
        }
        ReplacingState::Destroyed => Vec::new(),
    }
}

//=== Navigator ===========================================================

impl<S: Scene + ?Sized + 'static> Navigator<S> for ReplacingNavigator<S> {
    fn on_start(&self) {
        self.transition("start", |state| match state {
            ReplacingState::Inactive { scene } => {
                let actions = vec![
                    SceneAction::Start(Rc::clone(&scene)),
                    SceneAction::notify_scene(&self.listeners, &scene, None),
                ];
                Transition::new(ReplacingState::Active { scene }, actions)
            }
            active @ ReplacingState::Active { .. } => Transition::idle(active),
            ReplacingState::Destroyed => {
                ignore_destroyed(ReplacingState::Destroyed, &self.class_name, "start")
            }
        });
    }

    fn on_stop(&self) {
        self.transition("stop", |state| match state {
            ReplacingState::Active { scene } => {
                let actions = vec![SceneAction::Stop(Rc::clone(&scene))];
                Transition::new(ReplacingState::Inactive { scene }, actions)
            }
            other => Transition::idle(other),
        });
    }

    fn on_destroy(&self) {
        self.transition("destroy", |state| match state {
            ReplacingState::Destroyed => Transition::idle(ReplacingState::Destroyed),
            live => Transition::new(ReplacingState::Destroyed, teardown(live)),
        });
    }

    fn on_back_pressed(&self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.finish();
        true
    }

    fn add_navigator_events_listener(&self, listener: Rc<dyn NavigatorEvents<S>>) -> DisposableHandle {
        let live = match &*self.state.borrow() {
            ReplacingState::Inactive { .. } => None,
            ReplacingState::Active { scene } => Some(Rc::clone(scene)),
            ReplacingState::Destroyed => {
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
        let mut saved = SavedState::new();
        if let Some(scene) = self.current_scene() {
            saved.insert(keys::SCENE_CLASS, scene.class_name());
            if let Some(state) = scene.save_state() {
                saved.insert(keys::SCENE_STATE, state);
            }
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
