use std::mem;

use tracing::{trace, warn};

use crate::{Action, ActorId, Event, EventReply, Priority, TickContext, Transition, WorldMut};

/// Stable handle to a live action node.
///
/// Handles are generational: once a node is removed, handles to it go stale
/// and resolve to nothing instead of aliasing a recycled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId {
    index: u32,
    generation: u32,
}

/// One unit of behavior wired into the stack.
///
/// `child` always points at the TOP of the child level's burial stack;
/// suspended entries are reached through `buried_under`. `buried_under` and
/// `covering` are mutual inverses: exactly one node per level is uncovered.
pub(crate) struct ActionNode<W>
where
    W: WorldMut + 'static,
{
    /// Taken out of the slot for the duration of a callback so the arena
    /// stays borrowable while user code runs.
    pub(crate) action: Option<Box<dyn Action<W>>>,
    pub(crate) parent: Option<ActionId>,
    pub(crate) child: Option<ActionId>,
    pub(crate) buried_under: Option<ActionId>,
    pub(crate) covering: Option<ActionId>,
    pub(crate) started: bool,
    pub(crate) suspended: bool,
    /// Highest-priority desired result proposed by event handlers since the
    /// last commit.
    pub(crate) pending: EventReply<W>,
}

struct Slot<W>
where
    W: WorldMut + 'static,
{
    generation: u32,
    node: Option<ActionNode<W>>,
}

/// What `invoke_update` asks the caller to commit. `StartSelf` is the
/// deferred first start of a node installed by `new`/`reset`.
pub(crate) enum Step<W>
where
    W: WorldMut + 'static,
{
    Transition(Transition<W>),
    StartSelf,
}

/// Arena owning every action node of one behavior.
///
/// All structural mutation happens here, in terms of handles; no node owns
/// another through pointers, so teardown in any order can neither leak nor
/// double-free.
pub(crate) struct ActionStack<W>
where
    W: WorldMut + 'static,
{
    slots: Vec<Slot<W>>,
    free: Vec<u32>,
    live: usize,
}

impl<W> ActionStack<W>
where
    W: WorldMut + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn insert(&mut self, action: Box<dyn Action<W>>) -> ActionId {
        let node = ActionNode {
            action: Some(action),
            parent: None,
            child: None,
            buried_under: None,
            covering: None,
            started: false,
            suspended: false,
            pending: EventReply::none(),
        };
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                ActionId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                ActionId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    fn remove(&mut self, id: ActionId) -> ActionNode<W> {
        let slot = &mut self.slots[id.index as usize];
        if slot.generation != id.generation {
            panic!("removing stale action handle {id:?}");
        }
        let node = match slot.node.take() {
            Some(node) => node,
            None => panic!("removing dead action handle {id:?}"),
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        node
    }

    pub(crate) fn try_node(&self, id: ActionId) -> Option<&ActionNode<W>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node(&self, id: ActionId) -> &ActionNode<W> {
        match self.try_node(id) {
            Some(node) => node,
            None => panic!("stale action handle {id:?}"),
        }
    }

    fn node_mut(&mut self, id: ActionId) -> &mut ActionNode<W> {
        let slot = &mut self.slots[id.index as usize];
        match slot.node.as_mut() {
            Some(node) if slot.generation == id.generation => node,
            _ => panic!("stale action handle {id:?}"),
        }
    }

    fn take_action(&mut self, id: ActionId) -> Box<dyn Action<W>> {
        match self.node_mut(id).action.take() {
            Some(action) => action,
            None => panic!("action {id:?} is already mid-callback"),
        }
    }

    fn put_action(&mut self, id: ActionId, action: Box<dyn Action<W>>) {
        self.node_mut(id).action = Some(action);
    }

    pub(crate) fn action_name(&self, id: ActionId) -> &str {
        self.try_node(id)
            .and_then(|n| n.action.as_deref())
            .map(|a| a.name())
            .unwrap_or("?")
    }

    /// An action that suspends itself abandons whatever its event handlers
    /// proposed; otherwise the fresh suspension would immediately be judged
    /// out of scope by the pending result beneath it.
    fn note_result(&mut self, id: ActionId, result: &Transition<W>) {
        if matches!(result, Transition::SuspendFor { .. }) {
            self.node_mut(id).pending = EventReply::none();
        }
    }

    /// True when a buried ancestor has exited or is changing to a different
    /// action: this node must yield before that result can be honored.
    fn is_out_of_scope(&self, id: ActionId) -> bool {
        let mut below = self.node(id).buried_under;
        while let Some(b) = below {
            let node = self.node(b);
            if matches!(
                node.pending.transition,
                Transition::ChangeTo { .. } | Transition::Done { .. }
            ) {
                return true;
            }
            below = node.buried_under;
        }
        false
    }

    /// Consume the highest-priority pending result reachable from the top
    /// of the stack: our own slot first, then the nearest buried
    /// `SuspendFor` (a deeply buried action may still interrupt the stack).
    fn drain_pending(&mut self, id: ActionId) -> Option<Transition<W>> {
        if self.node(id).pending.is_requesting_change() {
            let reply = mem::replace(&mut self.node_mut(id).pending, EventReply::none());
            return Some(reply.transition);
        }
        let mut below = self.node(id).buried_under;
        while let Some(b) = below {
            if matches!(self.node(b).pending.transition, Transition::SuspendFor { .. }) {
                let reply = mem::replace(&mut self.node_mut(b).pending, EventReply::none());
                return Some(reply.transition);
            }
            below = self.node(b).buried_under;
        }
        None
    }

    /// Arbitrate a desired event result into the node's pending slot.
    ///
    /// A newcomer wins on strictly greater priority, or on equal priority
    /// when the stored result is `Sustain` (sustain never blocks an
    /// equal-priority override). The loser is dropped on the spot, which
    /// drops its attached action. First proposal wins an equal-priority,
    /// non-sustain tie.
    pub(crate) fn store_pending(&mut self, id: ActionId, reply: EventReply<W>, event: &'static str) {
        if reply.is_pass() {
            return;
        }
        let slot = &mut self.node_mut(id).pending;
        let replace = reply.priority > slot.priority
            || (reply.priority == slot.priority
                && matches!(slot.transition, Transition::Sustain));
        if replace {
            if slot.priority == Priority::Critical {
                warn!(event, "critical event result overridden before commit");
            }
            *slot = reply;
        } else if reply.priority == Priority::Critical {
            warn!(event, "critical event result discarded by arbitration");
        }
    }

    /// Broadcast an event through the live tree. At each nesting level the
    /// active node gets first refusal, then the walk descends the burial
    /// stack; the first non-pass reply is stored at that node. The level's
    /// active child is visited next, so every level can hold its own
    /// pending result.
    pub(crate) fn dispatch(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        top: ActionId,
        event: &Event<W>,
    ) {
        let mut level = Some(top);
        while let Some(level_top) = level {
            if !self.node(level_top).started {
                return;
            }
            let mut current = Some(level_top);
            let mut reply = EventReply::pass();
            while let Some(c) = current {
                let mut action = self.take_action(c);
                reply = event.deliver(action.as_mut(), ctx, actor, world);
                self.put_action(c, action);
                if !reply.is_pass() {
                    break;
                }
                current = self.node(c).buried_under;
            }
            if let Some(c) = current {
                self.store_pending(c, reply, event.name());
            }
            level = self.node(level_top).child;
        }
    }

    /// Run one tick for the node at the top of the stack.
    pub(crate) fn invoke_update(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        id: ActionId,
    ) -> Step<W> {
        // a lingering out-of-scope action would shadow the buried result
        if self.is_out_of_scope(id) {
            return Step::Transition(Transition::done_because("out of scope"));
        }
        if !self.node(id).started {
            return Step::StartSelf;
        }
        if let Some(transition) = self.drain_pending(id) {
            return Step::Transition(transition);
        }
        // the child has the most specific behavior; run it first
        if let Some(child) = self.node(id).child {
            let step = self.invoke_update(ctx, actor, world, child);
            let top = self.apply_step(ctx, actor, world, child, step);
            self.node_mut(id).child = top;
        }
        let mut action = self.take_action(id);
        let result = action.update(ctx, actor, world);
        self.put_action(id, action);
        self.note_result(id, &result);
        Step::Transition(result)
    }

    pub(crate) fn apply_step(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        id: ActionId,
        step: Step<W>,
    ) -> Option<ActionId> {
        match step {
            Step::Transition(transition) => self.apply(ctx, actor, world, id, transition),
            Step::StartSelf => {
                let buried = self.node(id).buried_under;
                let start = self.invoke_on_start(ctx, actor, world, id, None, buried);
                self.apply(ctx, actor, world, id, start)
            }
        }
    }

    /// Commit a transition, returning the new top of this stack position.
    ///
    /// Chains of immediate transitions (a start result requesting another
    /// change, and so on) resolve fully before this returns; nothing is
    /// ever left half-applied across ticks.
    pub(crate) fn apply(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        id: ActionId,
        transition: Transition<W>,
    ) -> Option<ActionId> {
        match transition {
            Transition::Continue | Transition::Sustain => Some(id),

            Transition::ChangeTo { action, reason } => {
                trace!(
                    actor = actor.stable_id(),
                    from = self.action_name(id),
                    to = action.name(),
                    reason = reason.as_deref().unwrap_or(""),
                    "change action"
                );
                let buried = self.node(id).buried_under;
                self.invoke_on_end(ctx, actor, world, id, Some(action.as_ref()));
                let new_id = self.insert(action);
                let start = self.invoke_on_start(ctx, actor, world, new_id, Some(id), buried);
                let top = self.apply(ctx, actor, world, new_id, start);
                // the superseded node is removed only once the start chain
                // has fully resolved
                self.remove_subtree(id);
                top
            }

            Transition::SuspendFor { action, reason } => {
                // the interrupter always lands on the true top of the stack
                let mut top = id;
                while let Some(covering) = self.node(top).covering {
                    top = covering;
                }
                trace!(
                    actor = actor.stable_id(),
                    suspended = self.action_name(top),
                    interrupter = action.name(),
                    reason = reason.as_deref().unwrap_or(""),
                    "suspend for action"
                );
                let uncovered = self.invoke_on_suspend(ctx, actor, world, top, action.as_ref());
                let new_id = self.insert(action);
                let start = self.invoke_on_start(ctx, actor, world, new_id, uncovered, uncovered);
                self.apply(ctx, actor, world, new_id, start)
            }

            Transition::Done { reason } => {
                trace!(
                    actor = actor.stable_id(),
                    action = self.action_name(id),
                    reason = reason.as_deref().unwrap_or(""),
                    "action done"
                );
                let resumed = self.node(id).buried_under;
                match resumed {
                    None => {
                        self.invoke_on_end(ctx, actor, world, id, None);
                        self.remove_subtree(id);
                        None
                    }
                    Some(r) => {
                        let resumed_action = self.take_action(r);
                        self.invoke_on_end(ctx, actor, world, id, Some(resumed_action.as_ref()));
                        self.put_action(r, resumed_action);
                        let ending = self.take_action(id);
                        let resume =
                            self.invoke_on_resume(ctx, actor, world, r, Some(ending.as_ref()));
                        self.put_action(id, ending);
                        self.remove_subtree(id);
                        self.apply(ctx, actor, world, r, resume)
                    }
                }
            }
        }
    }

    /// Start the node: wire it into the tree, spawn its optional child,
    /// then run `on_start`. The flags are set before any callback so a
    /// suspend arriving mid-start sees a started node.
    pub(crate) fn invoke_on_start(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        id: ActionId,
        prior: Option<ActionId>,
        buried: Option<ActionId>,
    ) -> Transition<W> {
        self.node_mut(id).started = true;

        // a same-level replacement runs inside the same container
        if let Some(p) = prior {
            let parent = self.node(p).parent;
            self.node_mut(id).parent = parent;
        }
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).child = Some(id);
        }
        self.node_mut(id).buried_under = buried;
        if let Some(b) = buried {
            self.node_mut(b).covering = Some(id);
        }
        self.node_mut(id).covering = None;

        let mut action = self.take_action(id);
        let spawned = action.initial_action(ctx, actor, world);
        self.put_action(id, action);
        if let Some(child_action) = spawned {
            let child = self.insert(child_action);
            self.node_mut(child).parent = Some(id);
            self.node_mut(id).child = Some(child);
            let start = self.invoke_on_start(ctx, actor, world, child, None, None);
            let top = self.apply(ctx, actor, world, child, start);
            self.node_mut(id).child = top;
        }

        let mut action = self.take_action(id);
        let prior_ref = prior
            .and_then(|p| self.try_node(p))
            .and_then(|n| n.action.as_deref());
        let result = action.on_start(ctx, actor, world, prior_ref);
        self.put_action(id, action);
        self.note_result(id, &result);
        result
    }

    /// End the node, its children, and anything stacked on top of it,
    /// without disturbing the links: the node must stay intact while it is
    /// handed to the next action's callbacks. The `started` flag guards
    /// against ending anything twice.
    pub(crate) fn invoke_on_end(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        id: ActionId,
        next: Option<&dyn Action<W>>,
    ) {
        if !self.node(id).started {
            return;
        }
        self.node_mut(id).started = false;

        let mut child = self.node(id).child;
        while let Some(c) = child {
            let below = self.node(c).buried_under;
            self.invoke_on_end(ctx, actor, world, c, next);
            child = below;
        }

        let mut action = self.take_action(id);
        action.on_end(ctx, actor, world, next);
        self.put_action(id, action);

        if let Some(covering) = self.node(id).covering {
            self.invoke_on_end(ctx, actor, world, covering, next);
        }
    }

    /// Suspend the node (children first). `on_suspend` answering `Done`
    /// collapses the node instead of burying it; the return value is the
    /// node left on top of this level, if any.
    pub(crate) fn invoke_on_suspend(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        id: ActionId,
        interrupter: &dyn Action<W>,
    ) -> Option<ActionId> {
        if let Some(child) = self.node(id).child {
            let top = self.invoke_on_suspend(ctx, actor, world, child, interrupter);
            self.node_mut(id).child = top;
        }
        self.node_mut(id).suspended = true;
        let mut action = self.take_action(id);
        let result = action.on_suspend(ctx, actor, world, interrupter);
        self.put_action(id, action);
        self.note_result(id, &result);
        if result.is_done() {
            self.invoke_on_end(ctx, actor, world, id, None);
            let below = self.node(id).buried_under;
            self.remove_subtree(id);
            below
        } else {
            // any other result means "stay suspended"
            Some(id)
        }
    }

    /// Resume a suspended node and its children. A node with a pending
    /// change from an earlier event is not actually coming back: it stays
    /// suspended and the pending result is honored on the next update.
    pub(crate) fn invoke_on_resume(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        id: ActionId,
        interrupter: Option<&dyn Action<W>>,
    ) -> Transition<W> {
        if !self.node(id).suspended {
            return Transition::Continue;
        }
        if self.node(id).pending.is_requesting_change() {
            return Transition::Continue;
        }

        {
            let node = self.node_mut(id);
            node.suspended = false;
            node.covering = None;
        }
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).child = Some(id);
        }

        if let Some(child) = self.node(id).child {
            let resume = self.invoke_on_resume(ctx, actor, world, child, interrupter);
            let top = self.apply(ctx, actor, world, child, resume);
            self.node_mut(id).child = top;
        }

        let mut action = self.take_action(id);
        let result = action.on_resume(ctx, actor, world, interrupter);
        self.put_action(id, action);
        self.note_result(id, &result);
        result
    }

    /// Host-level resume after a long gap: re-invoke the handler directly,
    /// with no interrupter and no stack surgery.
    pub(crate) fn invoke_host_resume(
        &mut self,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
        id: ActionId,
    ) -> Transition<W> {
        let mut action = self.take_action(id);
        let result = action.on_resume(ctx, actor, world, None);
        self.put_action(id, action);
        self.note_result(id, &result);
        result
    }

    /// Remove the node, its child stack, and everything stacked on top of
    /// it. The node beneath is left in place with its `covering` link
    /// severed. An uncommitted critical pending result does not disappear
    /// silently.
    pub(crate) fn remove_subtree(&mut self, id: ActionId) {
        // parent's active-child pointer falls back to whatever I buried
        if let Some(parent) = self.node(id).parent {
            if self.node(parent).child == Some(id) {
                let below = self.node(id).buried_under;
                self.node_mut(parent).child = below;
            }
        }

        let mut child = self.node(id).child;
        while let Some(c) = child {
            let below = self.node(c).buried_under;
            self.remove_subtree(c);
            child = below;
        }

        if let Some(below) = self.node(id).buried_under {
            if self.node(below).covering == Some(id) {
                self.node_mut(below).covering = None;
            }
        }
        if let Some(covering) = self.node(id).covering {
            if self.node(covering).buried_under == Some(id) {
                self.node_mut(covering).buried_under = None;
            }
            self.remove_subtree(covering);
        }

        let node = self.remove(id);
        if node.pending.priority == Priority::Critical && node.pending.is_requesting_change() {
            warn!(
                action = node.action.as_deref().map(|a| a.name()).unwrap_or("?"),
                "critical event result dropped in teardown"
            );
        }
    }

    /// Walk the live tree for the first defined answer: innermost active
    /// child outward, and at each containing level down the burial chain.
    /// The most specific, currently active behavior has the first say.
    pub(crate) fn query<R>(
        &self,
        top: ActionId,
        undefined: R,
        defined: impl Fn(&R) -> bool,
        eval: impl Fn(&dyn Action<W>) -> R,
    ) -> R {
        let mut innermost = top;
        while let Some(child) = self.node(innermost).child {
            innermost = child;
        }

        let mut result = undefined;
        let mut level = Some(innermost);
        while let Some(start) = level {
            if defined(&result) {
                break;
            }
            let containing = self.node(start).parent;
            let mut current = Some(start);
            while let Some(c) = current {
                if defined(&result) {
                    break;
                }
                if let Some(action) = self.try_node(c).and_then(|n| n.action.as_deref()) {
                    result = eval(action);
                }
                current = self.node(c).buried_under;
            }
            level = containing;
        }
        result
    }
}
