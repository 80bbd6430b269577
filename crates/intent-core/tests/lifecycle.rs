use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use intent_core::{
    Action, Behavior, Event, EventReply, Priority, TickContext, Transition, WorldMut, WorldView,
};

type Journal = Rc<RefCell<Vec<String>>>;

#[derive(Default)]
struct TestWorld;

impl WorldView for TestWorld {
    type Actor = u64;
    type Entity = u32;
    type Position = (f32, f32);
}

impl WorldMut for TestWorld {}

fn ctx(tick: u64) -> TickContext {
    TickContext {
        tick,
        dt_seconds: 0.1,
    }
}

struct Probe {
    name: &'static str,
    journal: Journal,
    updates: VecDeque<Transition<TestWorld>>,
    resume_result: Option<Transition<TestWorld>>,
    stuck_reply: Option<EventReply<TestWorld>>,
}

impl Probe {
    fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            updates: VecDeque::new(),
            resume_result: None,
            stuck_reply: None,
        }
    }

    fn boxed(self) -> Box<dyn Action<TestWorld>> {
        Box::new(self)
    }

    fn note(&self, entry: String) {
        self.journal.borrow_mut().push(entry);
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.journal.borrow_mut().push(format!("drop:{}", self.name));
    }
}

impl Action<TestWorld> for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn update(
        &mut self,
        _ctx: &TickContext,
        _actor: u64,
        _world: &mut TestWorld,
    ) -> Transition<TestWorld> {
        self.updates.pop_front().unwrap_or(Transition::Continue)
    }

    fn on_end(
        &mut self,
        _ctx: &TickContext,
        _actor: u64,
        _world: &mut TestWorld,
        _next: Option<&dyn Action<TestWorld>>,
    ) {
        self.note(format!("end:{}", self.name));
    }

    fn on_resume(
        &mut self,
        _ctx: &TickContext,
        _actor: u64,
        _world: &mut TestWorld,
        interrupter: Option<&dyn Action<TestWorld>>,
    ) -> Transition<TestWorld> {
        match interrupter {
            Some(i) => self.note(format!("resume:{}<-{}", self.name, i.name())),
            None => self.note(format!("resume:{}", self.name)),
        }
        self.resume_result.take().unwrap_or(Transition::Continue)
    }

    fn on_stuck(
        &mut self,
        _ctx: &TickContext,
        _actor: u64,
        _world: &mut TestWorld,
    ) -> EventReply<TestWorld> {
        self.stuck_reply.take().unwrap_or_else(EventReply::pass)
    }
}

fn drops(journal: &Journal) -> Vec<String> {
    journal
        .borrow()
        .iter()
        .filter(|e| e.starts_with("drop:"))
        .cloned()
        .collect()
}

/// Build a four-deep burial stack: D covers C covers B covers A.
fn deep_stack(journal: &Journal) -> (Behavior<TestWorld>, TestWorld) {
    let d = Probe::new("D", journal);
    let mut c = Probe::new("C", journal);
    c.updates
        .push_back(Transition::suspend_for(d.boxed(), "deeper"));
    let mut b = Probe::new("B", journal);
    b.updates
        .push_back(Transition::suspend_for(c.boxed(), "deeper"));
    let mut a = Probe::new("A", journal);
    a.updates
        .push_back(Transition::suspend_for(b.boxed(), "deeper"));

    let mut world = TestWorld;
    let mut behavior = Behavior::new(a.boxed(), "test");
    for tick in 0..4 {
        behavior.update(&ctx(tick), 1, &mut world);
    }
    assert_eq!(behavior.live_actions(), 4);
    (behavior, world)
}

#[test]
fn dropping_a_behavior_drops_every_buried_action() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let (behavior, _world) = deep_stack(&journal);

    drop(behavior);

    let mut dropped = drops(&journal);
    dropped.sort();
    assert_eq!(dropped, vec!["drop:A", "drop:B", "drop:C", "drop:D"]);
}

#[test]
fn reset_drops_the_entire_stack_before_installing_the_new_root() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let (mut behavior, _world) = deep_stack(&journal);

    behavior.reset(Probe::new("Fresh", &journal).boxed());

    let mut dropped = drops(&journal);
    dropped.sort();
    assert_eq!(dropped, vec!["drop:A", "drop:B", "drop:C", "drop:D"]);
    assert_eq!(behavior.live_actions(), 1);
    assert_eq!(behavior.name_of(behavior.top().unwrap()), Some("Fresh"));

    // no dangling burial links on the fresh root
    let top = behavior.top().unwrap();
    assert_eq!(behavior.buried_under(top), None);
    assert_eq!(behavior.covering(top), None);
}

#[test]
fn uncommitted_pending_event_action_is_dropped_with_its_node() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut root = Probe::new("Root", &journal);
    root.stuck_reply = Some(EventReply::try_suspend_for(
        Probe::new("Never", &journal).boxed(),
        Priority::Try,
        "never committed",
    ));

    let mut world = TestWorld;
    let mut behavior = Behavior::new(root.boxed(), "test");
    behavior.update(&ctx(0), 1, &mut world);
    behavior.dispatch(&ctx(0), 1, &mut world, &Event::Stuck);

    // tear down before the pending result is committed
    drop(behavior);

    let dropped = drops(&journal);
    assert_eq!(
        dropped.iter().filter(|e| *e == "drop:Never").count(),
        1
    );
}

#[test]
fn host_resume_reaches_the_active_action() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut root = Probe::new("Root", &journal);
    root.resume_result = Some(Transition::change_to(
        Probe::new("Recovered", &journal).boxed(),
        "stale state",
    ));

    let mut world = TestWorld;
    let mut behavior = Behavior::new(root.boxed(), "test");
    behavior.update(&ctx(0), 1, &mut world);

    behavior.resume(&ctx(100), 1, &mut world);

    assert!(journal.borrow().iter().any(|e| e == "resume:Root"));
    assert_eq!(
        behavior.name_of(behavior.top().unwrap()),
        Some("Recovered")
    );
}

#[test]
fn resume_on_an_empty_behavior_is_a_no_op() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut root = Probe::new("Root", &journal);
    root.updates.push_back(Transition::done());

    let mut world = TestWorld;
    let mut behavior = Behavior::new(root.boxed(), "test");
    behavior.update(&ctx(0), 1, &mut world);
    behavior.update(&ctx(1), 1, &mut world);
    assert!(behavior.is_empty());

    behavior.resume(&ctx(2), 1, &mut world);
    assert!(behavior.is_empty());
}
