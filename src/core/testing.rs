//=========================================================================
// Test Doubles
//=========================================================================
//
// Recording scenes and listeners shared by the navigator test suites.
//
// Every double writes into one `CallLog`, so a test can assert the exact
// interleaving of scene lifecycle calls and listener notifications.
//
//=========================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::events::NavigatorEvents;
use crate::core::navigator::Navigator;
use crate::core::scene::{Scene, TransitionData};
use crate::core::state::SavedState;
use crate::error::{NavigatorError, Result};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

//=== CallLog =============================================================

#[derive(Clone, Default)]
pub(crate) struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub(crate) fn new() -> Self {
        init_logging();
        Self::default()
    }

    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    /// Returns and clears the recorded entries.
    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }
}

//=== TestScene ===========================================================

pub(crate) struct TestScene {
    name: String,
    log: CallLog,
    starts: Cell<usize>,
    stops: Cell<usize>,
    destroys: Cell<usize>,
    saves: bool,
}

impl TestScene {
    /// Scene whose saved state records its name.
    pub(crate) fn new(name: &str, log: &CallLog) -> Rc<Self> {
        Self::build(name, log, true)
    }

    /// Scene that has nothing to save.
    pub(crate) fn stateless(name: &str, log: &CallLog) -> Rc<Self> {
        Self::build(name, log, false)
    }

    fn build(name: &str, log: &CallLog, saves: bool) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_owned(),
            log: log.clone(),
            starts: Cell::new(0),
            stops: Cell::new(0),
            destroys: Cell::new(0),
            saves,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn starts(&self) -> usize {
        self.starts.get()
    }

    pub(crate) fn stops(&self) -> usize {
        self.stops.get()
    }

    pub(crate) fn destroys(&self) -> usize {
        self.destroys.get()
    }
}

impl Scene for TestScene {
    fn on_start(&self) {
        self.starts.set(self.starts.get() + 1);
        self.log.push(format!("{}.start", self.name));
    }

    fn on_stop(&self) {
        self.stops.set(self.stops.get() + 1);
        self.log.push(format!("{}.stop", self.name));
    }

    fn on_destroy(&self) {
        self.destroys.set(self.destroys.get() + 1);
        self.log.push(format!("{}.destroy", self.name));
    }

    fn save_state(&self) -> Option<SavedState> {
        self.saves.then(|| {
            let mut state = SavedState::new();
            state.insert("name", self.name.as_str());
            state
        })
    }

    fn class_name(&self) -> &str {
        "TestScene"
    }
}

/// Factory rebuilding `TestScene`s from their saved name.
pub(crate) fn scene_factory(log: &CallLog) -> impl Fn(&str, Option<&SavedState>) -> Result<Rc<TestScene>> {
    let log = log.clone();
    move |class_name: &str, state: Option<&SavedState>| match class_name {
        "TestScene" => {
            let name = state.and_then(|s| s.text("name")).unwrap_or("restored");
            Ok(TestScene::new(name, &log))
        }
        other => Err(NavigatorError::unknown_class(other)),
    }
}

//=== LogListener =========================================================

/// Listener writing notifications into the shared log as
/// `listener.scene(<name>, <fwd|back|none>)` and `listener.finished`.
pub(crate) struct LogListener {
    log: CallLog,
}

impl LogListener {
    pub(crate) fn new(log: &CallLog) -> Rc<Self> {
        Rc::new(Self { log: log.clone() })
    }
}

pub(crate) fn direction(data: Option<TransitionData>) -> &'static str {
    match data {
        None => "none",
        Some(data) if data.is_backwards => "back",
        Some(_) => "fwd",
    }
}

impl NavigatorEvents<TestScene> for LogListener {
    fn scene(&self, scene: &Rc<TestScene>, data: Option<TransitionData>) {
        self.log
            .push(format!("listener.scene({}, {})", scene.name(), direction(data)));
    }

    fn finished(&self) {
        self.log.push("listener.finished");
    }
}

//=== JoinOnScene =========================================================

/// Listener that registers a [`LogListener`] on its target the first time
/// it sees the scene named `trigger`.
pub(crate) struct JoinOnScene {
    trigger: String,
    target: RefCell<Option<Weak<dyn Navigator<TestScene>>>>,
    log: CallLog,
    joined: Cell<bool>,
}

impl JoinOnScene {
    pub(crate) fn new(trigger: &str, log: &CallLog) -> Rc<Self> {
        Rc::new(Self {
            trigger: trigger.to_owned(),
            target: RefCell::new(None),
            log: log.clone(),
            joined: Cell::new(false),
        })
    }

    pub(crate) fn join<N: Navigator<TestScene> + 'static>(&self, target: &Rc<N>) {
        let weak: Weak<dyn Navigator<TestScene>> = Rc::downgrade(target) as Weak<N>;
        *self.target.borrow_mut() = Some(weak);
    }
}

impl NavigatorEvents<TestScene> for JoinOnScene {
    fn scene(&self, scene: &Rc<TestScene>, _data: Option<TransitionData>) {
        if scene.name() != self.trigger || self.joined.get() {
            return;
        }
        let target = self.target.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(target) = target {
            self.joined.set(true);
            listen(&*target, &self.log);
        }
    }

    fn finished(&self) {}
}

/// Registers a [`LogListener`] on `navigator`.
pub(crate) fn listen<N>(navigator: &N, log: &CallLog)
where
    N: Navigator<TestScene> + ?Sized,
{
    navigator.add_navigator_events_listener(LogListener::new(log));
}
