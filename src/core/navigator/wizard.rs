//=========================================================================
// Wizard Navigator
//=========================================================================
//
// Linear sequence of pages created on demand by a factory.
//
// Architecture:
//   create_scene(index) → Some(scene)   page exists, becomes live on next()
//                       → None          past the end: next() finishes
//
//   [A, B, C]  active_index = 1
//     next()      → C live (created once, kept afterwards)
//     previous()  → A live (B is kept, never destroyed by going back)
//
// Every created page lives until the navigator is destroyed. The page
// factory is dropped along with them.
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
use crate::error::{NavigatorError, Result};

//=== State ===============================================================

enum WizardState<S: ?Sized> {
    Inactive { scenes: Vec<Rc<S>>, active_index: usize },
    Active { scenes: Vec<Rc<S>>, active_index: usize },
    Destroyed,
}

impl<S: ?Sized> LifecycleState for WizardState<S> {
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

impl<S: ?Sized> WizardState<S> {
    fn pages(&self) -> Option<(&[Rc<S>], usize)> {
        match self {
            Self::Inactive { scenes, active_index } | Self::Active { scenes, active_index } => {
                Some((scenes, *active_index))
            }
            Self::Destroyed => None,
        }
    }
}

type Transition<S> = StateTransition<WizardState<S>, SceneAction<S>>;

type CreateScene<S> = Rc<dyn Fn(usize) -> Option<Rc<S>>>;

//=== WizardNavigator =====================================================

/// Navigator stepping through lazily created pages.
///
/// # Example
///
/// ```rust
/// # use std::rc::Rc;
/// # use aetheric_navigation::prelude::*;
/// struct Step(usize);
/// impl Scene for Step {}
///
/// let wizard: WizardNavigator = WizardNavigator::new(|index| {
///     (index < 3).then(|| Rc::new(Step(index)) as Rc<dyn Scene>)
/// });
/// wizard.on_start();
///
/// wizard.next();
/// wizard.next();
/// assert_eq!(wizard.active_index(), Some(2));
///
/// wizard.next();
/// assert!(wizard.is_destroyed());
/// ```
pub struct WizardNavigator<S: Scene + ?Sized + 'static = dyn Scene> {
    class_name: Cow<'static, str>,
    state: RefCell<WizardState<S>>,
    listeners: ListenerRegistry<S>,
    create_scene: RefCell<Option<CreateScene<S>>>,
}

impl<S: Scene + ?Sized + 'static> WizardNavigator<S> {
    //--- Construction -----------------------------------------------------

    /// Creates an inactive wizard showing `create_scene(0)`.
    ///
    /// # Panics
    ///
    /// Panics if `create_scene(0)` returns `None`.
    pub fn new(create_scene: impl Fn(usize) -> Option<Rc<S>> + 'static) -> Self {
        let first = create_scene(0);
        assert!(first.is_some(), "WizardNavigator needs a scene at index 0");

        Self::with_pages(first.into_iter().collect(), 0, Rc::new(create_scene))
    }

    /// Rebuilds a wizard from [`save_instance_state`] output.
    ///
    /// Restored pages come from `factory`; pages past the restored ones are
    /// still created by `create_scene`. Without saved pages this is
    /// [`new`](Self::new).
    ///
    /// [`save_instance_state`]: Navigator::save_instance_state
    pub fn restore(
        saved: Option<&SavedState>,
        factory: &impl SceneFactory<S>,
        create_scene: impl Fn(usize) -> Option<Rc<S>> + 'static,
    ) -> Result<Self> {
        let Some(saved) = saved else {
            return Ok(Self::new(create_scene));
        };

        let entries = saved.indexed_entries()?;
        if entries.is_empty() {
            return Ok(Self::new(create_scene));
        }

        let size = entries.len();
        let index = saved.optional_int(keys::ACTIVE_INDEX)?.unwrap_or(0);
        let active_index = usize::try_from(index)
            .ok()
            .filter(|index| *index < size)
            .ok_or(NavigatorError::IndexOutOfRange { index, size })?;

        let scenes = entries
            .into_iter()
            .map(|(class_name, state)| factory.instantiate_scene(class_name, state))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_pages(scenes, active_index, Rc::new(create_scene)))
    }

    fn with_pages(scenes: Vec<Rc<S>>, active_index: usize, create_scene: CreateScene<S>) -> Self {
        Self {
            class_name: Cow::Borrowed("WizardNavigator"),
            state: RefCell::new(WizardState::Inactive { scenes, active_index }),
            listeners: ListenerRegistry::new(),
            create_scene: RefCell::new(Some(create_scene)),
        }
    }

    /// Sets the identifier reported through [`Navigator::class_name`].
    pub fn with_class_name(mut self, class_name: impl Into<Cow<'static, str>>) -> Self {
        self.class_name = class_name.into();
        self
    }

    //--- Queries ----------------------------------------------------------

    /// Index of the live page, until the wizard is destroyed.
    pub fn active_index(&self) -> Option<usize> {
        self.state.borrow().pages().map(|(_, index)| index)
    }

    /// Every page created so far, in order.
    pub fn scenes(&self) -> Vec<Rc<S>> {
        self.state
            .borrow()
            .pages()
            .map(|(scenes, _)| scenes.to_vec())
            .unwrap_or_default()
    }

    pub fn active_scene(&self) -> Option<Rc<S>> {
        self.state
            .borrow()
            .pages()
            .and_then(|(scenes, index)| scenes.get(index).cloned())
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().phase() == Phase::Active
    }

    //--- Commands ---------------------------------------------------------

    /// Moves to the following page, creating it if needed.
    ///
    /// When there is no following page the wizard finishes.
    pub fn next(&self) {
        let wanted = self
            .state
            .borrow()
            .pages()
            .and_then(|(scenes, index)| (index + 1 == scenes.len()).then_some(index + 1));
        let create_scene = self.create_scene.borrow().clone();
        let created = wanted
            .zip(create_scene)
            .and_then(|(index, create_scene)| create_scene(index));

        self.transition("next", |state| match state {
            WizardState::Inactive { mut scenes, active_index } => {
                let next = active_index + 1;
                if next < scenes.len() || adopt(&mut scenes, next, created) {
                    Transition::idle(WizardState::Inactive {
                        scenes,
                        active_index: next,
                    })
                } else {
                    let mut actions: Vec<_> = SceneAction::destroy_all(&scenes).collect();
                    actions.push(SceneAction::notify_finished(&self.listeners));
                    Transition::new(WizardState::Destroyed, actions)
                }
            }
            WizardState::Active { mut scenes, active_index } => {
                let next = active_index + 1;
                let current = Rc::clone(&scenes[active_index]);
                if next < scenes.len() || adopt(&mut scenes, next, created) {
                    let scene = Rc::clone(&scenes[next]);
                    let actions = vec![
                        SceneAction::Stop(current),
                        SceneAction::Start(Rc::clone(&scene)),
                        SceneAction::notify_scene(&self.listeners, &scene, Some(TransitionData::FORWARDS)),
                    ];
                    Transition::new(
                        WizardState::Active {
                            scenes,
                            active_index: next,
                        },
                        actions,
                    )
                } else {
                    let mut actions = vec![SceneAction::Stop(current)];
                    actions.extend(SceneAction::destroy_all(&scenes));
                    actions.push(SceneAction::notify_finished(&self.listeners));
                    Transition::new(WizardState::Destroyed, actions)
                }
            }
            WizardState::Destroyed => ignore_destroyed(WizardState::Destroyed, &self.class_name, "next"),
        });
    }

    /// Moves back one page. Does nothing on the first page.
    pub fn previous(&self) {
        self.transition("previous", |state| match state {
            WizardState::Inactive { scenes, active_index } => Transition::idle(WizardState::Inactive {
                scenes,
                active_index: active_index.saturating_sub(1),
            }),
            WizardState::Active { scenes, active_index } if active_index > 0 => {
                let previous = active_index - 1;
                let scene = Rc::clone(&scenes[previous]);
                let actions = vec![
                    SceneAction::Stop(Rc::clone(&scenes[active_index])),
                    SceneAction::Start(Rc::clone(&scene)),
                    SceneAction::notify_scene(&self.listeners, &scene, Some(TransitionData::BACKWARDS)),
                ];
                Transition::new(
                    WizardState::Active {
                        scenes,
                        active_index: previous,
                    },
                    actions,
                )
            }
            first @ WizardState::Active { .. } => Transition::idle(first),
            WizardState::Destroyed => ignore_destroyed(WizardState::Destroyed, &self.class_name, "previous"),
        });
    }

    /// Destroys every created page (last first) and notifies listeners.
    pub fn finish(&self) {
        self.transition("finish", |state| match state {
            WizardState::Destroyed => ignore_destroyed(WizardState::Destroyed, &self.class_name, "finish"),
            live => {
                let mut actions = teardown(live);
                actions.push(SceneAction::notify_finished(&self.listeners));
                Transition::new(WizardState::Destroyed, actions)
            }
        });
    }

    //--- Internal Helpers -------------------------------------------------

    fn transition(&self, command: &str, f: impl FnOnce(WizardState<S>) -> Transition<S>) {
        let (phase, actions) = apply(&self.state, &self.class_name, command, f);
        if phase == Phase::Destroyed {
            self.listeners.clear();
            self.create_scene.borrow_mut().take();
        }
        run_scene_actions(actions);
    }
}

/// Appends `created` when it is the page at `index`.
fn adopt<S: ?Sized>(scenes: &mut Vec<Rc<S>>, index: usize, created: Option<Rc<S>>) -> bool {
    match created {
        Some(scene) if index == scenes.len() => {
            scenes.push(scene);
            true
        }
        _ => false,
    }
}

fn teardown<S: Scene + ?Sized + 'static>(state: WizardState<S>) -> Vec<SceneAction<S>> {
    match state {
        WizardState::Inactive { scenes, .. } => SceneAction::destroy_all(&scenes).collect(),
        WizardState::Active { scenes, active_index } => {
            let mut actions = vec![SceneAction::Stop(Rc::clone(&scenes[active_index]))];
            actions.extend(SceneAction::destroy_all(&scenes));
            actions
        }
        WizardState::Destroyed => Vec::new(),
    }
}

//=== Navigator ===========================================================

impl<S: Scene + ?Sized + 'static> Navigator<S> for WizardNavigator<S> {
    fn on_start(&self) {
        self.transition("start", |state| match state {
            WizardState::Inactive { scenes, active_index } => {
                let scene = Rc::clone(&scenes[active_index]);
                let actions = vec![
                    SceneAction::Start(Rc::clone(&scene)),
                    SceneAction::notify_scene(&self.listeners, &scene, None),
                ];
                Transition::new(WizardState::Active { scenes, active_index }, actions)
            }
            active @ WizardState::Active { .. } => Transition::idle(active),
            WizardState::Destroyed => ignore_destroyed(WizardState::Destroyed, &self.class_name, "start"),
        });
    }

    fn on_stop(&self) {
        self.transition("stop", |state| match state {
            WizardState::Active { scenes, active_index } => {
                let actions = vec![SceneAction::Stop(Rc::clone(&scenes[active_index]))];
                Transition::new(WizardState::Inactive { scenes, active_index }, actions)
            }
            other => Transition::idle(other),
        });
    }

    fn on_destroy(&self) {
        self.transition("destroy", |state| match state {
            WizardState::Destroyed => Transition::idle(WizardState::Destroyed),
            live => Transition::new(WizardState::Destroyed, teardown(live)),
        });
    }

    fn on_back_pressed(&self) -> bool {
        match self.active_index() {
            None => false,
            Some(0) => {
                self.finish();
                true
            }
            Some(_) => {
                self.previous();
                true
            }
        }
    }

    fn add_navigator_events_listener(&self, listener: Rc<dyn NavigatorEvents<S>>) -> DisposableHandle {
        let live = match &*self.state.borrow() {
            WizardState::Inactive { .. } => None,
            WizardState::Active { scenes, active_index } => Some(Rc::clone(&scenes[*active_index])),
            WizardState::Destroyed => {
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
        saved.insert(keys::ACTIVE_INDEX, self.active_index().unwrap_or(0) as i64);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{listen, scene_factory, CallLog, TestScene};
    use std::cell::Cell;

    const NAMES: [&str; 4] = ["a", "b", "c", "d"];

    /// Wizard over the first `pages` names; counts factory calls.
    fn wizard(log: &CallLog, pages: usize) -> (WizardNavigator<TestScene>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let log = log.clone();
        let navigator = WizardNavigator::new(move |index| {
            counter.set(counter.get() + 1);
            (index < pages).then(|| TestScene::new(NAMES[index], &log))
        });
        (navigator, calls)
    }

    #[test]
    #[should_panic(expected = "scene at index 0")]
    fn wizard_without_first_page_panics() {
        let _ = WizardNavigator::<TestScene>::new(|_| None);
    }

    #[test]
    fn next_twice_past_the_end_destroys_everything() {
        let log = CallLog::new();
        let (navigator, _) = wizard(&log, 2);
        navigator.on_start();
        listen(&navigator, &log);
        log.take();

        navigator.next();
        assert_eq!(log.take(), ["a.stop", "b.start", "listener.scene(b, fwd)"]);

        navigator.next();
        assert_eq!(
            log.take(),
            ["b.stop", "b.destroy", "a.destroy", "listener.finished"]
        );
        assert!(navigator.is_destroyed());
    }

    #[test]
    fn previous_keeps_later_pages() {
        let log = CallLog::new();
        let (navigator, calls) = wizard(&log, 3);
        navigator.on_start();
        navigator.next();
        listen(&navigator, &log);
        log.take();

        navigator.previous();
        assert_eq!(log.take(), ["b.stop", "a.start", "listener.scene(a, back)"]);
        assert_eq!(navigator.scenes().len(), 2);

        navigator.next();
        assert_eq!(log.take(), ["a.stop", "b.start", "listener.scene(b, fwd)"]);
        // a and b, nothing re-created
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn previous_on_first_page_is_noop() {
        let log = CallLog::new();
        let (navigator, _) = wizard(&log, 2);
        navigator.on_start();
        log.take();

        navigator.previous();

        assert!(log.take().is_empty());
        assert_eq!(navigator.active_index(), Some(0));
    }

    #[test]
    fn back_press_steps_back_then_finishes() {
        let log = CallLog::new();
        let (navigator, _) = wizard(&log, 3);
        navigator.on_start();
        navigator.next();
        listen(&navigator, &log);
        log.take();

        assert!(navigator.on_back_pressed());
        assert_eq!(navigator.active_index(), Some(0));

        assert!(navigator.on_back_pressed());
        assert!(navigator.is_destroyed());
        assert_eq!(log.count("listener.finished"), 1);

        assert!(!navigator.on_back_pressed());
    }

    #[test]
    fn destroy_covers_pages_beyond_active_index() {
        let log = CallLog::new();
        let (navigator, _) = wizard(&log, 3);
        navigator.on_start();
        navigator.next();
        navigator.next();
        navigator.previous();
        navigator.previous();
        log.take();

        navigator.on_destroy();
        navigator.on_destroy();

        assert_eq!(log.take(), ["a.stop", "c.destroy", "b.destroy", "a.destroy"]);
    }

    #[test]
    fn destroyed_wizard_ignores_every_command() {
        let log = CallLog::new();
        let (navigator, calls) = wizard(&log, 3);
        navigator.on_start();
        listen(&navigator, &log);
        navigator.on_destroy();
        log.take();
        let created = calls.get();

        navigator.next();
        navigator.previous();
        navigator.on_start();
        navigator.on_stop();
        navigator.finish();
        navigator.on_destroy();

        assert!(log.take().is_empty());
        assert_eq!(calls.get(), created);
        assert_eq!(navigator.active_index(), None);
        assert!(navigator.scenes().is_empty());
    }

    #[test]
    fn page_factory_is_dropped_on_destroy() {
        let log = CallLog::new();
        let token = Rc::new(());
        let held = Rc::clone(&token);
        let creator = log.clone();
        let navigator = WizardNavigator::new(move |index| {
            let _token = Rc::clone(&held);
            (index < 2).then(|| TestScene::new(NAMES[index], &creator))
        });
        assert_eq!(Rc::strong_count(&token), 2);

        navigator.finish();

        assert_eq!(Rc::strong_count(&token), 1);
    }

    #[test]
    fn inactive_next_moves_without_lifecycle_calls() {
        let log = CallLog::new();
        let (navigator, _) = wizard(&log, 2);
        listen(&navigator, &log);

        navigator.next();
        assert!(log.take().is_empty());
        assert_eq!(navigator.active_index(), Some(1));

        navigator.on_start();
        assert_eq!(log.take(), ["b.start", "listener.scene(b, none)"]);
    }

    #[test]
    fn inactive_next_past_the_end_finishes_without_stop() {
        let log = CallLog::new();
        let (navigator, _) = wizard(&log, 1);
        listen(&navigator, &log);

        navigator.next();

        assert_eq!(log.take(), ["a.destroy", "listener.finished"]);
    }

    #[test]
    fn saved_state_round_trips_active_index() {
        let log = CallLog::new();
        let (navigator, _) = wizard(&log, 4);
        navigator.next();
        navigator.next();
        navigator.previous();

        let saved = navigator.save_instance_state();
        assert_eq!(saved.int(keys::SIZE), Some(3));
        assert_eq!(saved.int(keys::ACTIVE_INDEX), Some(1));

        let creator = log.clone();
        let restored = WizardNavigator::restore(Some(&saved), &scene_factory(&log), move |index| {
            (index < 4).then(|| TestScene::new(NAMES[index], &creator))
        })
        .unwrap();
        assert_eq!(restored.active_index(), Some(1));
        assert_eq!(restored.active_scene().unwrap().name(), "b");

        restored.next();
        restored.next();
        assert_eq!(restored.active_scene().unwrap().name(), "d");
    }

    #[test]
    fn restore_rejects_out_of_range_index() {
        let log = CallLog::new();
        let mut saved = SavedState::new();
        saved.insert(keys::SIZE, 1_i64);
        saved.insert(keys::ACTIVE_INDEX, 3_i64);
        saved.insert_indexed(0, "TestScene", None);

        let creator = log.clone();
        let result = WizardNavigator::restore(Some(&saved), &scene_factory(&log), move |_| {
            Some(TestScene::new("x", &creator))
        });

        assert_eq!(
            result.err(),
            Some(NavigatorError::IndexOutOfRange { index: 3, size: 1 })
        );
    }
}
