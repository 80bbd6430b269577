use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use intent_core::{Action, Behavior, TickContext, Transition, WorldMut, WorldView};

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

/// Scripted action that records every lifecycle callback and its own drop.
struct Probe {
    name: &'static str,
    journal: Journal,
    start_result: Option<Transition<TestWorld>>,
    updates: VecDeque<Transition<TestWorld>>,
}

impl Probe {
    fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            start_result: None,
            updates: VecDeque::new(),
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

    fn on_start(
        &mut self,
        _ctx: &TickContext,
        _actor: u64,
        _world: &mut TestWorld,
        prior: Option<&dyn Action<TestWorld>>,
    ) -> Transition<TestWorld> {
        match prior {
            Some(p) => self.note(format!("start:{}<-{}", self.name, p.name())),
            None => self.note(format!("start:{}", self.name)),
        }
        self.start_result.take().unwrap_or(Transition::Continue)
    }

    fn update(
        &mut self,
        _ctx: &TickContext,
        _actor: u64,
        _world: &mut TestWorld,
    ) -> Transition<TestWorld> {
        self.note(format!("update:{}", self.name));
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
}

#[test]
fn root_starts_on_first_update_and_updates_next_tick() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let root = Probe::new("Root", &journal);

    let mut world = TestWorld;
    let mut behavior = Behavior::new(root.boxed(), "test");
    assert!(!behavior.is_started(behavior.top().unwrap()));

    behavior.update(&ctx(0), 1, &mut world);
    assert_eq!(*journal.borrow(), vec!["start:Root"]);
    assert!(behavior.is_started(behavior.top().unwrap()));

    behavior.update(&ctx(1), 1, &mut world);
    assert_eq!(*journal.borrow(), vec!["start:Root", "update:Root"]);
}

#[test]
fn change_to_ends_prior_before_start_and_drops_it_after_the_chain() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let c = Probe::new("C", &journal);
    let mut b = Probe::new("B", &journal);
    b.start_result = Some(Transition::change_to(c.boxed(), "immediately after"));
    let mut a = Probe::new("A", &journal);
    a.updates
        .push_back(Transition::change_to(b.boxed(), "scripted"));

    let mut world = TestWorld;
    let mut behavior = Behavior::new(a.boxed(), "test");
    behavior.update(&ctx(0), 1, &mut world);
    behavior.update(&ctx(1), 1, &mut world);

    // A must be ended before B starts, and discarded only after B's own
    // chained start has fully resolved.
    assert_eq!(
        *journal.borrow(),
        vec![
            "start:A",
            "update:A",
            "end:A",
            "start:B<-A",
            "end:B",
            "start:C<-B",
            "drop:B",
            "drop:A",
        ]
    );
    assert_eq!(behavior.name_of(behavior.top().unwrap()), Some("C"));
    assert_eq!(behavior.live_actions(), 1);
}

#[test]
fn done_with_nothing_beneath_empties_the_behavior() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut a = Probe::new("A", &journal);
    a.updates.push_back(Transition::done_because("finished"));

    let mut world = TestWorld;
    let mut behavior = Behavior::new(a.boxed(), "test");
    behavior.update(&ctx(0), 1, &mut world);
    behavior.update(&ctx(1), 1, &mut world);

    assert!(behavior.is_empty());
    assert_eq!(behavior.live_actions(), 0);
    assert_eq!(
        *journal.borrow(),
        vec!["start:A", "update:A", "end:A", "drop:A"]
    );

    // idle behaviors are a valid state, not an error
    behavior.update(&ctx(2), 1, &mut world);
    assert!(behavior.is_empty());
}

#[test]
fn reset_round_trip_leaves_one_unstarted_node() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let root = Probe::new("Root", &journal);
    let a = Probe::new("A", &journal);
    let b = Probe::new("B", &journal);

    let mut world = TestWorld;
    let mut behavior = Behavior::new(root.boxed(), "test");
    behavior.update(&ctx(0), 1, &mut world);

    behavior.reset(a.boxed());
    behavior.reset(b.boxed());

    assert_eq!(behavior.live_actions(), 1);
    let top = behavior.top().unwrap();
    assert_eq!(behavior.name_of(top), Some("B"));
    assert!(!behavior.is_started(top));

    let drops: Vec<_> = journal
        .borrow()
        .iter()
        .filter(|e| e.starts_with("drop:"))
        .cloned()
        .collect();
    assert_eq!(drops, vec!["drop:Root", "drop:A"]);
}

#[test]
fn initial_child_starts_before_its_parent() {
    struct Parent {
        journal: Journal,
    }

    impl Action<TestWorld> for Parent {
        fn name(&self) -> &str {
            "Parent"
        }

        fn on_start(
            &mut self,
            _ctx: &TickContext,
            _actor: u64,
            _world: &mut TestWorld,
            _prior: Option<&dyn Action<TestWorld>>,
        ) -> Transition<TestWorld> {
            self.journal.borrow_mut().push("start:Parent".into());
            Transition::Continue
        }

        fn initial_action(
            &mut self,
            _ctx: &TickContext,
            _actor: u64,
            _world: &mut TestWorld,
        ) -> Option<Box<dyn Action<TestWorld>>> {
            Some(Probe::new("Child", &self.journal).boxed())
        }
    }

    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut world = TestWorld;
    let mut behavior = Behavior::new(
        Box::new(Parent {
            journal: journal.clone(),
        }),
        "test",
    );
    behavior.update(&ctx(0), 1, &mut world);

    assert_eq!(*journal.borrow(), vec!["start:Child", "start:Parent"]);
    let leaf = behavior.active_leaf().unwrap();
    assert_eq!(behavior.name_of(leaf), Some("Child"));
    assert_eq!(behavior.parent_of(leaf), behavior.top());

    // the child's update runs before the parent's
    behavior.update(&ctx(1), 1, &mut world);
    assert_eq!(journal.borrow().last().unwrap(), "update:Child");
}
