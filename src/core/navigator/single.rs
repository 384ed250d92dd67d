//=========================================================================
// Single Scene Navigator
//=========================================================================
//
// Hosts exactly one scene for its whole life.
//
//   Inactive(scene) ──start──→ Active(scene) ──stop──→ Inactive(scene)
//         └──────── destroy / finish / back ────────→ Destroyed
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
use crate::core::scene::Scene;
use crate::core::state::{keys, SavedState};
use crate::error::Result;

//=== State ===============================================================

enum SingleState<S: ?Sized> {
    Inactive { scene: Rc<S> },
    Active { scene: Rc<S> },
    Destroyed,
}

impl<S: ?Sized> LifecycleState for SingleState<S> {
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

type Transition<S> = StateTransition<SingleState<S>, SceneAction<S>>;

//=== SingleSceneNavigator ================================================

/// Navigator hosting a single scene.
///
/// A back press finishes it.
pub struct SingleSceneNavigator<S: Scene + ?Sized + 'static = dyn Scene> {
    class_name: Cow<'static, str>,
    state: RefCell<SingleState<S>>,
    listeners: ListenerRegistry<S>,
}

impl<S: Scene + ?Sized + 'static> SingleSceneNavigator<S> {
    //--- Construction -----------------------------------------------------

    pub fn new(scene: Rc<S>) -> Self {
        Self {
            class_name: Cow::Borrowed("SingleSceneNavigator"),
            state: RefCell::new(SingleState::Inactive { scene }),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Rebuilds the navigator, handing the scene's saved state (if any)
    /// to `create_scene`.
    pub fn restore(
        saved: Option<&SavedState>,
        create_scene: impl FnOnce(Option<&SavedState>) -> Rc<S>,
    ) -> Result<Self> {
        let scene_state = match saved {
            Some(saved) => saved.optional_state(keys::SCENE_STATE)?,
            None => None,
        };
        Ok(Self::new(create_scene(scene_state)))
    }

    /// Sets the identifier reported through [`Navigator::class_name`].
    pub fn with_class_name(mut self, class_name: impl Into<Cow<'static, str>>) -> Self {
        self.class_name = class_name.into();
        self
    }

    //--- Queries ----------------------------------------------------------

    /// The hosted scene, until the navigator is destroyed.
    pub fn scene(&self) -> Option<Rc<S>> {
        match &*self.state.borrow() {
            SingleState::Inactive { scene } | SingleState::Active { scene } => Some(Rc::clone(scene)),
            SingleState::Destroyed => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().phase() == Phase::Active
    }

    //--- Commands ---------------------------------------------------------

    /// Destroys the scene and notifies listeners that the navigator finished.
    pub fn finish(&self) {
        self.transition("finish", |state| match state {
            SingleState::Inactive { scene } => Transition::new(
                SingleState::Destroyed,
                vec![
                    SceneAction::Destroy(scene),
                    SceneAction::notify_finished(&self.listeners),
                ],
            ),
            SingleState::Active { scene } => Transition::new(
                SingleState::Destroyed,
                vec![
                    SceneAction::Stop(Rc::clone(&scene)),
                    SceneAction::Destroy(scene),
                    SceneAction::notify_finished(&self.listeners),
                ],
            ),
            SingleState::Destroyed => ignore_destroyed(SingleState::Destroyed, &self.class_name, "finish"),
        });
    }

    //--- Internal Helpers -------------------------------------------------

    fn transition(&self, command: &str, f: impl FnOnce(SingleState<S>) -> Transition<S>) {
        let (phase, actions) = apply(&self.state, &self.class_name, command, f);
        if phase == Phase::Destroyed {
            self.listeners.clear();
        }
        run_scene_actions(actions);
    }
}

//=== Navigator ===========================================================

impl<S: Scene + ?Sized + 'static> Navigator<S> for SingleSceneNavigator<S> {
    fn on_start(&self) {
        self.transition("start", |state| match state {
            SingleState::Inactive { scene } => Transition::new(
                SingleState::Active {
                    scene: Rc::clone(&scene),
                },
                vec![
                    SceneAction::Start(Rc::clone(&scene)),
                    SceneAction::notify_scene(&self.listeners, &scene, None),
                ],
            ),
            active @ SingleState::Active { .. } => Transition::idle(active),
            SingleState::Destroyed => ignore_destroyed(SingleState::Destroyed, &self.class_name, "start"),
        });
    }

    fn on_stop(&self) {
        self.transition("stop", |state| match state {
            SingleState::Active { scene } => Transition::new(
                SingleState::Inactive {
                    scene: Rc::clone(&scene),
                },
                vec![SceneAction::Stop(scene)],
            ),
            other => Transition::idle(other),
        });
    }

    fn on_destroy(&self) {
        self.transition("destroy", |state| match state {
            SingleState::Inactive { scene } => {
                Transition::new(SingleState::Destroyed, vec![SceneAction::Destroy(scene)])
            }
            SingleState::Active { scene } => Transition::new(
                SingleState::Destroyed,
                vec![SceneAction::Stop(Rc::clone(&scene)), SceneAction::Destroy(scene)],
            ),
            SingleState::Destroyed => Transition::idle(SingleState::Destroyed),
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
            SingleState::Inactive { .. } => None,
            SingleState::Active { scene } => Some(Rc::clone(scene)),
            SingleState::Destroyed => {
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
        if let Some(state) = self.scene().and_then(|scene| scene.save_state()) {
            saved.insert(keys::SCENE_STATE, state);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::TransitionData;
    use crate::core::testing::{listen, CallLog, JoinOnScene, TestScene};
    use std::rc::Weak;

    fn navigator(log: &CallLog) -> (SingleSceneNavigator<TestScene>, Rc<TestScene>) {
        let scene = TestScene::new("a", log);
        (SingleSceneNavigator::new(Rc::clone(&scene)), scene)
    }

    #[test]
    fn start_starts_scene_and_notifies() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);
        listen(&navigator, &log);

        navigator.on_start();

        assert_eq!(log.take(), ["a.start", "listener.scene(a, none)"]);
        assert!(navigator.is_active());
    }

    #[test]
    fn second_start_is_noop() {
        let log = CallLog::new();
        let (navigator, scene) = navigator(&log);
        listen(&navigator, &log);

        navigator.on_start();
        navigator.on_start();

        assert_eq!(scene.starts(), 1);
        assert_eq!(log.count("listener.scene(a, none)"), 1);
    }

    #[test]
    fn stop_only_applies_when_active() {
        let log = CallLog::new();
        let (navigator, scene) = navigator(&log);

        navigator.on_stop();
        assert_eq!(scene.stops(), 0);

        navigator.on_start();
        navigator.on_stop();
        navigator.on_stop();
        assert_eq!(scene.stops(), 1);
        assert!(!navigator.is_active());
    }

    #[test]
    fn destroy_while_active_stops_first() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);
        navigator.on_start();
        log.take();

        navigator.on_destroy();

        assert_eq!(log.take(), ["a.stop", "a.destroy"]);
        assert!(navigator.is_destroyed());
    }

    #[test]
    fn destroy_while_inactive_only_destroys() {
        let log = CallLog::new();
        let (navigator, scene) = navigator(&log);

        navigator.on_destroy();

        assert_eq!(scene.stops(), 0);
        assert_eq!(scene.destroys(), 1);
    }

    #[test]
    fn destroy_twice_destroys_scene_once() {
        let log = CallLog::new();
        let (navigator, scene) = navigator(&log);

        navigator.on_destroy();
        navigator.on_destroy();

        assert_eq!(scene.destroys(), 1);
    }

    #[test]
    fn destroy_does_not_report_finished() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);
        listen(&navigator, &log);

        navigator.on_destroy();

        assert_eq!(log.count("listener.finished"), 0);
    }

    #[test]
    fn back_press_finishes_then_reports_unhandled() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);
        navigator.on_start();
        listen(&navigator, &log);
        log.take();

        assert!(navigator.on_back_pressed());
        assert_eq!(log.take(), ["a.stop", "a.destroy", "listener.finished"]);

        assert!(!navigator.on_back_pressed());
        assert!(log.take().is_empty());
    }

    #[test]
    fn commands_after_destroy_are_ignored() {
        let log = CallLog::new();
        let (navigator, scene) = navigator(&log);
        navigator.on_destroy();

        navigator.on_start();
        navigator.finish();
        navigator.on_stop();

        assert_eq!(scene.starts(), 0);
        assert!(navigator.is_destroyed());
        assert!(navigator.scene().is_none());
    }

    #[test]
    fn listener_added_while_active_is_told_current_scene() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);
        navigator.on_start();
        log.take();

        listen(&navigator, &log);

        assert_eq!(log.take(), ["listener.scene(a, none)"]);
    }

    #[test]
    fn listener_added_after_destroy_is_disposed() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);
        navigator.on_destroy();

        let handle = navigator.add_navigator_events_listener(crate::core::testing::LogListener::new(&log));

        assert!(handle.is_disposed());
    }

    #[test]
    fn disposed_listener_is_not_notified() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);
        let handle = navigator.add_navigator_events_listener(crate::core::testing::LogListener::new(&log));

        handle.dispose();
        navigator.on_start();

        assert_eq!(log.take(), ["a.start"]);
        assert!(handle.is_disposed());
    }

    struct Restarter {
        navigator: RefCell<Weak<SingleSceneNavigator<TestScene>>>,
        calls: std::cell::Cell<usize>,
    }

    impl NavigatorEvents<TestScene> for Restarter {
        fn scene(&self, _scene: &Rc<TestScene>, _data: Option<TransitionData>) {
            self.calls.set(self.calls.get() + 1);
            if let Some(navigator) = self.navigator.borrow().upgrade() {
                navigator.on_start();
            }
        }

        fn finished(&self) {}
    }

    #[test]
    fn reentrant_start_from_listener_is_idempotent() {
        let log = CallLog::new();
        let scene = TestScene::new("a", &log);
        let navigator = Rc::new(SingleSceneNavigator::new(Rc::clone(&scene)));
        let restarter = Rc::new(Restarter {
            navigator: RefCell::new(Rc::downgrade(&navigator)),
            calls: std::cell::Cell::new(0),
        });
        navigator.add_navigator_events_listener(restarter.clone());

        navigator.on_start();

        assert_eq!(scene.starts(), 1);
        assert_eq!(restarter.calls.get(), 1);
    }

    #[test]
    fn saves_and_restores_scene_state() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);

        let saved = navigator.save_instance_state();
        assert_eq!(
            saved.state(keys::SCENE_STATE).and_then(|s| s.text("name")),
            Some("a")
        );

        let restored = SingleSceneNavigator::restore(Some(&saved), |state| {
            TestScene::new(state.and_then(|s| s.text("name")).unwrap_or("fresh"), &log)
        })
        .unwrap();
        assert_eq!(restored.scene().unwrap().name(), "a");
    }

    #[test]
    fn stateless_scene_saves_nothing() {
        let log = CallLog::new();
        let navigator = SingleSceneNavigator::new(TestScene::stateless("a", &log));

        assert!(navigator.save_instance_state().is_empty());

        let restored = SingleSceneNavigator::restore(None, |state| {
            assert!(state.is_none());
            TestScene::new("fresh", &log)
        })
        .unwrap();
        assert_eq!(restored.scene().unwrap().name(), "fresh");
    }

    #[test]
    fn class_name_is_configurable() {
        let log = CallLog::new();
        let (navigator, _) = navigator(&log);
        assert_eq!(navigator.class_name(), "SingleSceneNavigator");

        let navigator = navigator.with_class_name("splash");
        assert_eq!(Navigator::class_name(&navigator), "splash");
    }

    #[test]
    fn listener_added_during_notification_hears_scene_once() {
        let log = CallLog::new();
        let (navigator, _scene) = navigator(&log);
        let navigator = Rc::new(navigator);
        let joiner = JoinOnScene::new("a", &log);
        joiner.join(&navigator);
        navigator.add_navigator_events_listener(joiner);

        navigator.on_start();
        navigator.on_stop();
        navigator.on_start();

        assert_eq!(
            log.take(),
            ["a.start", "listener.scene(a, none)", "a.stop", "a.start", "listener.scene(a, none)"]
        );
    }
}
