use std::borrow::Cow;

use crate::stack::ActionStack;
use crate::{Action, ActionId, Event, QueryResponse, TickContext, WorldMut};

/// The root of an action hierarchy and its container.
///
/// A behavior owns one action stack for one actor: instantiate it with the
/// root action and call [`update`](Behavior::update) once per tick to drive
/// it. Host events go in through [`dispatch`](Behavior::dispatch), host
/// polls come back out through the query methods.
///
/// Stacks are fully independent between behaviors; nothing is shared, so
/// separate actors may be updated concurrently.
pub struct Behavior<W>
where
    W: WorldMut + 'static,
{
    name: Cow<'static, str>,
    pub(crate) stack: ActionStack<W>,
    pub(crate) top: Option<ActionId>,
}

impl<W> Behavior<W>
where
    W: WorldMut + 'static,
{
    /// Create a behavior with the given root action. The root starts on the
    /// first update.
    pub fn new(initial: Box<dyn Action<W>>, name: impl Into<Cow<'static, str>>) -> Self {
        let mut stack = ActionStack::new();
        let top = stack.insert(initial);
        Self {
            name: name.into(),
            stack,
            top: Some(top),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once every action has finished.
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Drive the stack for one tick, committing whatever transition the
    /// active action produces.
    pub fn update(&mut self, ctx: &TickContext, actor: W::Actor, world: &mut W) {
        let Some(top) = self.top else { return };
        let step = self.stack.invoke_update(ctx, actor, world, top);
        self.top = self.stack.apply_step(ctx, actor, world, top, step);
    }

    /// Tell the stack its cached internal state may be stale, e.g. after
    /// the actor was inactive for a long gap. Re-invokes `on_resume` on the
    /// active action with no interrupter.
    pub fn resume(&mut self, ctx: &TickContext, actor: W::Actor, world: &mut W) {
        let Some(top) = self.top else { return };
        let result = self.stack.invoke_host_resume(ctx, actor, world, top);
        self.top = self.stack.apply(ctx, actor, world, top, result);
    }

    /// Tear down the whole current stack and restart with a fresh root.
    pub fn reset(&mut self, initial: Box<dyn Action<W>>) {
        if let Some(top) = self.top.take() {
            // removal cascades up from the bottom of the burial chain
            let mut bottom = top;
            while let Some(below) = self.buried_under(bottom) {
                bottom = below;
            }
            self.stack.remove_subtree(bottom);
        }
        self.top = Some(self.stack.insert(initial));
    }

    /// Feed a host event into the active stack. The event only records
    /// desired results; nothing structural happens until the next update.
    pub fn dispatch(&mut self, ctx: &TickContext, actor: W::Actor, world: &mut W, event: &Event<W>) {
        let Some(top) = self.top else { return };
        self.stack.dispatch(ctx, actor, world, top, event);
    }

    // Stack introspection -------------------------------------------------

    /// The active (uncovered) action at the root level.
    pub fn top(&self) -> Option<ActionId> {
        self.top
    }

    /// The innermost active action: the one whose `update` runs first.
    pub fn active_leaf(&self) -> Option<ActionId> {
        let mut id = self.top?;
        while let Some(child) = self.stack.try_node(id)?.child {
            id = child;
        }
        Some(id)
    }

    /// Number of live action nodes, buried and pending included.
    pub fn live_actions(&self) -> usize {
        self.stack.len()
    }

    pub fn name_of(&self, id: ActionId) -> Option<&str> {
        self.stack.try_node(id)?.action.as_deref().map(|a| a.name())
    }

    pub fn parent_of(&self, id: ActionId) -> Option<ActionId> {
        self.stack.try_node(id)?.parent
    }

    pub fn active_child_of(&self, id: ActionId) -> Option<ActionId> {
        self.stack.try_node(id)?.child
    }

    /// The action this one will resume to when it finishes.
    pub fn buried_under(&self, id: ActionId) -> Option<ActionId> {
        self.stack.try_node(id)?.buried_under
    }

    /// The action that suspended this one.
    pub fn covering(&self, id: ActionId) -> Option<ActionId> {
        self.stack.try_node(id)?.covering
    }

    pub fn is_started(&self, id: ActionId) -> bool {
        self.stack.try_node(id).is_some_and(|n| n.started)
    }

    pub fn is_suspended(&self, id: ActionId) -> bool {
        self.stack.try_node(id).is_some_and(|n| n.suspended)
    }

    // Contextual queries --------------------------------------------------
    //
    // Each walks from the innermost active child outward, and at each
    // containing level down the burial chain, returning the first defined
    // answer.

    pub fn should_pick_up(&self, actor: W::Actor, world: &W, item: W::Entity) -> QueryResponse {
        let Some(top) = self.top else {
            return QueryResponse::Undefined;
        };
        self.stack.query(
            top,
            QueryResponse::Undefined,
            |r| r.is_defined(),
            |a| a.should_pick_up(actor, world, item),
        )
    }

    pub fn should_hurry(&self, actor: W::Actor, world: &W) -> QueryResponse {
        let Some(top) = self.top else {
            return QueryResponse::Undefined;
        };
        self.stack.query(
            top,
            QueryResponse::Undefined,
            |r| r.is_defined(),
            |a| a.should_hurry(actor, world),
        )
    }

    pub fn should_retreat(&self, actor: W::Actor, world: &W) -> QueryResponse {
        let Some(top) = self.top else {
            return QueryResponse::Undefined;
        };
        self.stack.query(
            top,
            QueryResponse::Undefined,
            |r| r.is_defined(),
            |a| a.should_retreat(actor, world),
        )
    }

    pub fn should_attack(&self, actor: W::Actor, world: &W, threat: W::Entity) -> QueryResponse {
        let Some(top) = self.top else {
            return QueryResponse::Undefined;
        };
        self.stack.query(
            top,
            QueryResponse::Undefined,
            |r| r.is_defined(),
            |a| a.should_attack(actor, world, threat),
        )
    }

    pub fn is_hindrance(&self, actor: W::Actor, world: &W, blocker: W::Entity) -> QueryResponse {
        let Some(top) = self.top else {
            return QueryResponse::Undefined;
        };
        self.stack.query(
            top,
            QueryResponse::Undefined,
            |r| r.is_defined(),
            |a| a.is_hindrance(actor, world, blocker),
        )
    }

    pub fn select_target_point(
        &self,
        actor: W::Actor,
        world: &W,
        subject: W::Entity,
    ) -> Option<W::Position> {
        let top = self.top?;
        self.stack.query(
            top,
            None,
            |r| r.is_some(),
            |a| a.select_target_point(actor, world, subject),
        )
    }

    pub fn is_position_allowed(
        &self,
        actor: W::Actor,
        world: &W,
        position: W::Position,
    ) -> QueryResponse {
        let Some(top) = self.top else {
            return QueryResponse::Undefined;
        };
        self.stack.query(
            top,
            QueryResponse::Undefined,
            |r| r.is_defined(),
            |a| a.is_position_allowed(actor, world, position),
        )
    }

    pub fn select_more_dangerous_threat(
        &self,
        actor: W::Actor,
        world: &W,
        subject: W::Entity,
        threat1: W::Entity,
        threat2: W::Entity,
    ) -> Option<W::Entity> {
        let top = self.top?;
        self.stack.query(
            top,
            None,
            |r| r.is_some(),
            |a| a.select_more_dangerous_threat(actor, world, subject, threat1, threat2),
        )
    }
}
