//=========================================================================
// Composite Stack Navigator
//=========================================================================
//
// Stack of child navigators. The top child is live; its scenes are
// reported as the composite's own.
//
// Architecture:
//   CompositeStackNavigator ── Rc<Shared> ── state: [child, child, top]
//                                  ↑                               │
//                                  └──── ChildListener (Weak) ─────┘
//
//   back press   → offered to the top child first; popped only when the
//                  child has nothing left to handle
//   child finish → child removed; the next child down is started with
//                  backwards data, or the composite finishes when empty
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

enum CompositeStackState<S: ?Sized> {
    Inactive { children: Vec<ChildNavigator<S>> },
    Active { children: Vec<ChildNavigator<S>> },
    Destroyed,
}

impl<S: ?Sized> LifecycleState for CompositeStackState<S> {
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

impl<S: ?Sized> CompositeStackState<S> {
    fn children(&self) -> &[ChildNavigator<S>] {
        match self {
            Self::Inactive { children } | Self::Active { children } => children,
            Self::Destroyed => &[],
        }
    }
}

type Transition<S> = StateTransition<CompositeStackState<S>, ChildAction<S>>;

//--- teardown() ----------------------------------------------------------
//
// Stops the top child if active, then destroys every child top-down.
//
fn teardown<S: ?Sized + 'static>(state: CompositeStackState<S>) -> Vec<ChildAction<S>> {
    match state {
        CompositeStackState::Inactive { children } => ChildAction::destroy_all(&children).collect(),
        CompositeStackState::Active { children } => {
            let mut actions: Vec<_> = children
                .last()
                .map(|top| ChildAction::Stop(Rc::clone(&top.navigator)))
                .into_iter()
                .collect();
            actions.extend(ChildAction::destroy_all(&children));
            actions
        }
        CompositeStackState::Destroyed => Vec::new(),
    }
}

//=== Shared ==============================================================
//
// Everything children must reach through their weak listener.
//
struct Shared<S: ?Sized + 'static> {
    class_name: Cow<'static, str>,
    state: RefCell<CompositeStackState<S>>,
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

    /// Wraps `shared` in a new `Rc`, moving its children's listeners over to
    /// the new allocation.
    fn rehome(shared: Self) -> Rc<Self> {
        let shared = Rc::new(shared);
        let reattach = |children: Vec<ChildNavigator<S>>| -> Vec<ChildNavigator<S>> {
            children
                .into_iter()
                .map(|child| shared.relay.reattach(shared.host(), child))
                .collect()
        };

        let state = match shared.state.replace(CompositeStackState::Destroyed) {
            CompositeStackState::Inactive { children } => CompositeStackState::Inactive {
                children: reattach(children),
            },
            CompositeStackState::Active { children } => CompositeStackState::Active {
                children: reattach(children),
            },
            CompositeStackState::Destroyed => CompositeStackState::Destroyed,
        };
        *shared.state.borrow_mut() = state;
        shared
    }

    fn transition(&self, command: &str, f: impl FnOnce(CompositeStackState<S>) -> Transition<S>) {
        let (phase, actions) = apply(&self.state, &self.class_name, command, f);
        if phase == Phase::Destroyed {
            self.relay.reset();
        }
        self.relay.run(actions);
    }

    fn ignore(&self, command: &str) -> Transition<S> {
        ignore_destroyed(CompositeStackState::Destroyed, &self.class_name, command)
    }

    fn top(&self) -> Option<Rc<dyn Navigator<S>>> {
        self.state
            .borrow()
            .children()
            .last()
            .map(|child| Rc::clone(&child.navigator))
    }

    //--- Commands ---------------------------------------------------------

    fn push(self: &Rc<Self>, navigator: Rc<dyn Navigator<S>>, data: TransitionData) {
        let child = self.attach(navigator);

        self.transition("push", |state| match state {
            CompositeStackState::Inactive { mut children } => {
                children.push(child);
                Transition::idle(CompositeStackState::Inactive { children })
            }
            CompositeStackState::Active { mut children } => {
                let mut actions = Vec::with_capacity(2);
                if let Some(top) = children.last() {
                    actions.push(ChildAction::Stop(Rc::clone(&top.navigator)));
                }
                actions.push(ChildAction::Start {
                    navigator: Rc::clone(&child.navigator),
                    data: Some(data),
                });
                children.push(child);
                Transition::new(CompositeStackState::Active { children }, actions)
            }
            CompositeStackState::Destroyed => {
                let mut ignored = self.ignore("push");
                ignored.actions.push(ChildAction::Release(child));
                ignored
            }
        });
    }

    fn pop(&self) {
        self.transition("pop", |state| match state {
            CompositeStackState::Inactive { mut children } => {
                let mut actions = Vec::with_capacity(2);
                actions.extend(children.pop().map(ChildAction::Destroy));
                if children.is_empty() {
                    actions.push(self.relay.notify_finished());
                    Transition::new(CompositeStackState::Destroyed, actions)
                } else {
                    Transition::new(CompositeStackState::Inactive { children }, actions)
                }
            }
            CompositeStackState::Active { mut children } => {
                let mut actions = Vec::with_capacity(3);
                if let Some(top) = children.pop() {
                    actions.push(ChildAction::Stop(Rc::clone(&top.navigator)));
                    actions.push(ChildAction::Destroy(top));
                }
                match children.last() {
                    None => {
                        actions.push(self.relay.notify_finished());
                        Transition::new(CompositeStackState::Destroyed, actions)
                    }
                    Some(new_top) => {
                        actions.push(ChildAction::Start {
                            navigator: Rc::clone(&new_top.navigator),
                            data: Some(TransitionData::BACKWARDS),
                        });
                        Transition::new(CompositeStackState::Active { children }, actions)
                    }
                }
            }
            CompositeStackState::Destroyed => self.ignore("pop"),
        });
    }

    fn replace(self: &Rc<Self>, navigator: Rc<dyn Navigator<S>>, data: TransitionData) {
        let child = self.attach(navigator);

        self.transition("replace", |state| match state {
            CompositeStackState::Inactive { mut children } => {
                let actions: Vec<_> = children.pop().map(ChildAction::Destroy).into_iter().collect();
                children.push(child);
                Transition::new(CompositeStackState::Inactive { children }, actions)
            }
            CompositeStackState::Active { mut children } => {
                let mut actions = Vec::with_capacity(3);
                if let Some(top) = children.pop() {
                    actions.push(ChildAction::Stop(Rc::clone(&top.navigator)));
                    actions.push(ChildAction::Destroy(top));
                }
                actions.push(ChildAction::Start {
                    navigator: Rc::clone(&child.navigator),
                    data: Some(data),
                });
                children.push(child);
                Transition::new(CompositeStackState::Active { children }, actions)
            }
            CompositeStackState::Destroyed => {
                let mut ignored = self.ignore("replace");
                ignored.actions.push(ChildAction::Release(child));
                ignored
            }
        });
    }

    fn finish(&self) {
        self.transition("finish", |state| match state {
            CompositeStackState::Destroyed => self.ignore("finish"),
            live => {
                let mut actions = teardown(live);
                actions.push(self.relay.notify_finished());
                Transition::new(CompositeStackState::Destroyed, actions)
            }
        });
    }
}

//--- Child Notifications -------------------------------------------------

impl<S: ?Sized + 'static> ChildHost<S> for Shared<S> {
    fn child_scene(&self, child_id: u64, scene: &Rc<S>, data: Option<TransitionData>) {
        let live = match &*self.state.borrow() {
            CompositeStackState::Active { children } => children.last().map(|top| top.id) == Some(child_id),
            _ => false,
        };

        if live {
            self.relay.forward_scene(child_id, scene, data);
        } else {
            trace!("{}: scene from background child {} dropped", self.class_name, child_id);
        }
    }

    fn child_finished(&self, child_id: u64) {
        self.transition("child finished", |state| {
            let (mut children, active) = match state {
                CompositeStackState::Inactive { children } => (children, false),
                CompositeStackState::Active { children } => (children, true),
                CompositeStackState::Destroyed => return Transition::idle(CompositeStackState::Destroyed),
            };

            let position = children.iter().position(|child| child.id == child_id);
            let Some(position) = position else {
                let state = if active {
                    CompositeStackState::Active { children }
                } else {
                    CompositeStackState::Inactive { children }
                };
                return Transition::idle(state);
            };

            let was_top = position + 1 == children.len();
            let mut actions = vec![ChildAction::Release(children.remove(position))];

            match children.last() {
                None => {
                    actions.push(self.relay.notify_finished());
                    Transition::new(CompositeStackState::Destroyed, actions)
                }
                Some(new_top) if active => {
                    if was_top {
                        actions.push(ChildAction::Start {
                            navigator: Rc::clone(&new_top.navigator),
                            data: Some(TransitionData::BACKWARDS),
                        });
                    }
                    Transition::new(CompositeStackState::Active { children }, actions)
                }
                Some(_) => Transition::new(CompositeStackState::Inactive { children }, actions),
            }
        });
    }
}

//=== CompositeStackNavigator =============================================

/// Navigator keeping a history of child navigators.
///
/// # Example
///
/// ```rust
/// # use std::rc::Rc;
/// # use aetheric_navigation::prelude::*;
/// struct Page;
/// impl Scene for Page {}
///
/// let tabs = Rc::new(StackNavigator::new(vec![Rc::new(Page) as Rc<dyn Scene>]));
/// let root: CompositeStackNavigator = CompositeStackNavigator::new(vec![tabs.clone() as Rc<dyn Navigator>]);
/// root.on_start();
///
/// tabs.push(Rc::new(Page));
/// assert!(root.on_back_pressed());
/// assert_eq!(tabs.scenes().len(), 1);
/// ```
pub struct CompositeStackNavigator<S: Scene + ?Sized + 'static = dyn Scene> {
    shared: Rc<Shared<S>>,
}

impl<S: Scene + ?Sized + 'static> CompositeStackNavigator<S> {
    //--- Construction -----------------------------------------------------

    /// Creates an inactive navigator over `initial_stack` (bottom first).
    ///
    /// # Panics
    ///
    /// Panics if `initial_stack` is empty.
    pub fn new(initial_stack: Vec<Rc<dyn Navigator<S>>>) -> Self {
        assert!(
            !initial_stack.is_empty(),
            "CompositeStackNavigator needs at least one initial navigator"
        );

        let shared = Rc::new(Shared {
            class_name: Cow::Borrowed("CompositeStackNavigator"),
            state: RefCell::new(CompositeStackState::Inactive { children: Vec::new() }),
            relay: ChildRelay::new(),
        });

        let children = initial_stack
            .into_iter()
            .map(|navigator| shared.attach(navigator))
            .collect();
        *shared.state.borrow_mut() = CompositeStackState::Inactive { children };

        Self { shared }
    }

    /// Rebuilds a navigator from [`save_instance_state`] output, each child
    /// through `factory`.
    ///
    /// Falls back to `initial_stack` when nothing (or an empty stack) was
    /// saved.
    ///
    /// [`save_instance_state`]: Navigator::save_instance_state
    pub fn restore(
        saved: Option<&SavedState>,
        factory: &impl NavigatorFactory<S>,
        initial_stack: impl FnOnce() -> Vec<Rc<dyn Navigator<S>>>,
    ) -> Result<Self> {
        let entries = match saved {
            Some(saved) => saved.indexed_entries()?,
            None => Vec::new(),
        };
        if entries.is_empty() {
            return Ok(Self::new(initial_stack()));
        }

        let navigators = entries
            .into_iter()
            .map(|(class_name, state)| factory.instantiate_navigator(class_name, state))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(navigators))
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

    /// The child navigators, bottom first. Empty once destroyed.
    pub fn navigators(&self) -> Vec<Rc<dyn Navigator<S>>> {
        self.shared
            .state
            .borrow()
            .children()
            .iter()
            .map(|child| Rc::clone(&child.navigator))
            .collect()
    }

    /// The top child navigator.
    pub fn active_navigator(&self) -> Option<Rc<dyn Navigator<S>>> {
        self.shared.top()
    }

    pub fn is_active(&self) -> bool {
        self.shared.state.borrow().phase() == Phase::Active
    }

    //--- Commands ---------------------------------------------------------

    /// Pushes `navigator` with forwards transition data.
    pub fn push(&self, navigator: Rc<dyn Navigator<S>>) {
        self.shared.push(navigator, TransitionData::FORWARDS);
    }

    /// Pushes `navigator`; its first scene is reported with `data`.
    pub fn push_with(&self, navigator: Rc<dyn Navigator<S>>, data: TransitionData) {
        self.shared.push(navigator, data);
    }

    /// Destroys the top child, finishing the navigator when it was the last.
    pub fn pop(&self) {
        self.shared.pop();
    }

    /// Replaces the top child with forwards transition data.
    pub fn replace(&self, navigator: Rc<dyn Navigator<S>>) {
        self.shared.replace(navigator, TransitionData::FORWARDS);
    }

    /// Swaps the top child for `navigator`, keeping the stack size.
    pub fn replace_with(&self, navigator: Rc<dyn Navigator<S>>, data: TransitionData) {
        self.shared.replace(navigator, data);
    }

    /// Destroys every child (top first) and notifies listeners once.
    pub fn finish(&self) {
        self.shared.finish();
    }
}

//=== Navigator ===========================================================

impl<S: Scene + ?Sized + 'static> Navigator<S> for CompositeStackNavigator<S> {
    fn on_start(&self) {
        let shared = &self.shared;
        shared.transition("start", |state| match state {
            CompositeStackState::Inactive { children } => {
                let actions: Vec<_> = children
                    .last()
                    .map(|top| ChildAction::Start {
                        navigator: Rc::clone(&top.navigator),
                        data: None,
                    })
                    .into_iter()
                    .collect();
                Transition::new(CompositeStackState::Active { children }, actions)
            }
            active @ CompositeStackState::Active { .. } => Transition::idle(active),
            CompositeStackState::Destroyed => shared.ignore("start"),
        });
    }

    fn on_stop(&self) {
        self.shared.transition("stop", |state| match state {
            CompositeStackState::Active { children } => {
                let actions: Vec<_> = children
                    .last()
                    .map(|top| ChildAction::Stop(Rc::clone(&top.navigator)))
                    .into_iter()
                    .collect();
                Transition::new(CompositeStackState::Inactive { children }, actions)
            }
            other => Transition::idle(other),
        });
    }

    fn on_destroy(&self) {
        self.shared.transition("destroy", |state| match state {
            CompositeStackState::Destroyed => Transition::idle(CompositeStackState::Destroyed),
            live => Transition::new(CompositeStackState::Destroyed, teardown(live)),
        });
    }

    fn on_back_pressed(&self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if let Some(top) = self.shared.top() {
            if top.on_back_pressed() {
                return true;
            }
        }
        self.shared.pop();
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
        let navigators = self.navigators();

        let mut saved = SavedState::new();
        saved.insert(keys::SIZE, navigators.len() as i64);
        for (index, navigator) in navigators.iter().enumerate() {
            saved.insert_indexed(index, navigator.class_name(), Some(navigator.save_instance_state()));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::navigator::StackNavigator;
    use crate::core::testing::{listen, scene_factory, CallLog, JoinOnScene, TestScene};
    use crate::error::NavigatorError;

    fn child(log: &CallLog, names: &[&str]) -> Rc<StackNavigator<TestScene>> {
        Rc::new(StackNavigator::new(
            names.iter().map(|name| TestScene::new(name, log)).collect(),
        ))
    }

    fn root(children: Vec<Rc<StackNavigator<TestScene>>>) -> CompositeStackNavigator<TestScene> {
        CompositeStackNavigator::new(
            children
                .into_iter()
                .map(|child| child as Rc<dyn Navigator<TestScene>>)
                .collect(),
        )
    }

    #[test]
    #[should_panic(expected = "at least one initial navigator")]
    fn empty_initial_stack_panics() {
        let _ = CompositeStackNavigator::<TestScene>::new(Vec::new());
    }

    #[test]
    fn start_starts_top_child_only() {
        let log = CallLog::new();
        let root = root(vec![child(&log, &["a"]), child(&log, &["b"])]);
        listen(&root, &log);

        root.on_start();

        assert_eq!(log.take(), ["b.start", "listener.scene(b, none)"]);
        assert!(root.is_active());
    }

    #[test]
    fn nested_moves_surface_with_their_direction() {
        let log = CallLog::new();
        let first = child(&log, &["a"]);
        let root = root(vec![first]);
        root.on_start();
        listen(&root, &log);
        assert_eq!(log.take(), ["a.start", "listener.scene(a, none)"]);

        let second = child(&log, &["b"]);
        root.push(second.clone());
        assert_eq!(log.take(), ["a.stop", "b.start", "listener.scene(b, fwd)"]);

        second.push(TestScene::new("c", &log));
        assert_eq!(log.take(), ["b.stop", "c.start", "listener.scene(c, fwd)"]);

        assert!(root.on_back_pressed());
        assert_eq!(
            log.take(),
            ["c.stop", "c.destroy", "b.start", "listener.scene(b, back)"]
        );

        assert!(root.on_back_pressed());
        assert_eq!(
            log.take(),
            ["b.stop", "b.destroy", "a.start", "listener.scene(a, back)"]
        );
        assert_eq!(root.navigators().len(), 1);
        assert!(second.is_destroyed());
    }

    #[test]
    fn back_press_on_last_scene_finishes_root() {
        let log = CallLog::new();
        let root = root(vec![child(&log, &["a"])]);
        root.on_start();
        listen(&root, &log);
        log.take();

        assert!(root.on_back_pressed());

        assert_eq!(log.take(), ["a.stop", "a.destroy", "listener.finished"]);
        assert!(root.is_destroyed());
        assert!(!root.on_back_pressed());
    }

    #[test]
    fn background_child_does_not_reach_listeners() {
        let log = CallLog::new();
        let below = child(&log, &["a"]);
        let root = root(vec![below.clone(), child(&log, &["b"])]);
        root.on_start();
        listen(&root, &log);
        log.take();

        below.on_start();

        assert_eq!(log.take(), ["a.start"]);
    }

    #[test]
    fn child_finishing_on_its_own_restarts_the_one_below() {
        let log = CallLog::new();
        let top = child(&log, &["b"]);
        let root = root(vec![child(&log, &["a"]), top.clone()]);
        root.on_start();
        listen(&root, &log);
        log.take();

        top.finish();

        assert_eq!(
            log.take(),
            ["b.stop", "b.destroy", "a.start", "listener.scene(a, back)"]
        );
        assert_eq!(root.navigators().len(), 1);
    }

    #[test]
    fn child_finishing_while_inactive_is_removed_quietly() {
        let log = CallLog::new();
        let top = child(&log, &["b"]);
        let root = root(vec![child(&log, &["a"]), top.clone()]);
        listen(&root, &log);

        top.finish();

        assert_eq!(log.take(), ["b.destroy"]);
        root.on_start();
        assert_eq!(log.take(), ["a.start", "listener.scene(a, none)"]);
    }

    #[test]
    fn destroy_stops_top_then_destroys_children_top_down() {
        let log = CallLog::new();
        let root = root(vec![child(&log, &["a"]), child(&log, &["b"]), child(&log, &["c"])]);
        root.on_start();
        log.take();

        root.on_destroy();
        root.on_destroy();

        assert_eq!(log.take(), ["c.stop", "c.destroy", "b.destroy", "a.destroy"]);
    }

    #[test]
    fn replace_swaps_top_child() {
        let log = CallLog::new();
        let root = root(vec![child(&log, &["a"])]);
        root.on_start();
        listen(&root, &log);
        log.take();

        root.replace(child(&log, &["b"]));

        assert_eq!(
            log.take(),
            ["a.stop", "a.destroy", "b.start", "listener.scene(b, fwd)"]
        );
        assert_eq!(root.navigators().len(), 1);
    }

    #[test]
    fn pop_while_inactive_destroys_top_child_only() {
        let log = CallLog::new();
        let root = root(vec![child(&log, &["a"]), child(&log, &["b", "c"])]);

        root.pop();

        assert_eq!(log.take(), ["c.destroy", "b.destroy"]);
        assert_eq!(root.navigators().len(), 1);
    }

    #[test]
    fn late_listener_is_told_current_scene() {
        let log = CallLog::new();
        let root = root(vec![child(&log, &["a"])]);
        root.on_start();
        root.push(child(&log, &["b"]));
        log.take();

        listen(&root, &log);

        assert_eq!(log.take(), ["listener.scene(b, none)"]);
    }

    #[test]
    fn listener_joining_during_pop_hears_only_the_new_top() {
        let log = CallLog::new();
        let below = child(&log, &["a"]);
        let joiner = JoinOnScene::new("a", &log);
        below.add_navigator_events_listener(joiner.clone());
        let root = Rc::new(root(vec![below, child(&log, &["b"])]));
        joiner.join(&root);
        root.on_start();
        log.take();

        root.pop();

        assert_eq!(
            log.take(),
            ["b.stop", "b.destroy", "a.start", "listener.scene(a, back)"]
        );
    }

    #[test]
    fn listener_joining_after_top_child_finished_hears_only_the_new_top() {
        let log = CallLog::new();
        let below = child(&log, &["a"]);
        let top = child(&log, &["b"]);
        let joiner = JoinOnScene::new("a", &log);
        below.add_navigator_events_listener(joiner.clone());
        let root = Rc::new(root(vec![below, top.clone()]));
        joiner.join(&root);
        root.on_start();
        log.take();

        top.finish();

        assert_eq!(
            log.take(),
            ["b.stop", "b.destroy", "a.start", "listener.scene(a, back)"]
        );
    }

    #[test]
    fn renamed_root_keeps_its_children_attached() {
        let log = CallLog::new();
        let top = child(&log, &["a"]);
        let root = root(vec![top.clone()]).with_class_name("tabs");
        assert_eq!(root.class_name(), "tabs");
        root.on_start();
        listen(&root, &log);
        log.take();

        top.push(TestScene::new("b", &log));
        top.finish();

        assert_eq!(
            log.take(),
            [
                "a.stop",
                "b.start",
                "listener.scene(b, fwd)",
                "b.stop",
                "b.destroy",
                "a.destroy",
                "listener.finished",
            ]
        );
        assert_eq!(root.save_instance_state().int(keys::SIZE), Some(0));
    }

    #[test]
    fn destroyed_root_ignores_commands_and_leaves_pushed_child_alone() {
        let log = CallLog::new();
        let root = root(vec![child(&log, &["a"])]);
        root.finish();
        log.take();

        let late = child(&log, &["late"]);
        root.push(late.clone());
        root.on_start();

        assert!(log.take().is_empty());
        assert!(!late.is_destroyed());
        assert!(root.navigators().is_empty());
        assert!(root.add_navigator_events_listener(crate::core::testing::LogListener::new(&log)).is_disposed());
    }

    fn navigator_factory(
        log: &CallLog,
    ) -> impl Fn(&str, Option<&SavedState>) -> Result<Rc<dyn Navigator<TestScene>>> {
        let log = log.clone();
        move |class_name: &str, state: Option<&SavedState>| match class_name {
            "StackNavigator" => {
                let stack = StackNavigator::restore(state, &scene_factory(&log), Vec::new)?;
                Ok(Rc::new(stack) as Rc<dyn Navigator<TestScene>>)
            }
            other => Err(NavigatorError::unknown_class(other)),
        }
    }

    #[test]
    fn saved_state_round_trips_nested_stacks() {
        let log = CallLog::new();
        let root = root(vec![child(&log, &["a"]), child(&log, &["b", "c"])]);

        let saved = root.save_instance_state();
        assert_eq!(saved.int(keys::SIZE), Some(2));
        assert_eq!(saved.text("1_class"), Some("StackNavigator"));
        assert_eq!(
            saved.state("1_state").and_then(|s| s.int(keys::SIZE)),
            Some(2)
        );

        let restored = CompositeStackNavigator::restore(Some(&saved), &navigator_factory(&log), Vec::new).unwrap();
        assert_eq!(restored.navigators().len(), 2);
        assert_eq!(restored.save_instance_state(), saved);

        listen(&restored, &log);
        log.take();
        restored.on_start();
        assert_eq!(log.take(), ["c.start", "listener.scene(c, none)"]);
    }

    #[test]
    fn restore_reports_unknown_child_class() {
        let log = CallLog::new();
        let mut saved = SavedState::new();
        saved.insert(keys::SIZE, 1_i64);
        saved.insert_indexed(0, "TabNavigator", None);

        let result = CompositeStackNavigator::restore(Some(&saved), &navigator_factory(&log), Vec::new);

        assert_eq!(result.err(), Some(NavigatorError::unknown_class("TabNavigator")));
    }
}
