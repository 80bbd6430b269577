use crate::event::PathFailure;
use crate::{EventReply, QueryResponse, TickContext, Transition, WorldMut};

/// Something an actor does.
///
/// Actions can contain actions (an active child with more specific
/// behavior), and can be stacked: suspending an action buries it under the
/// interrupter until the interrupter finishes. A system of actions lives
/// inside a [`Behavior`](crate::Behavior), which drives it once per tick.
///
/// All state changes are requested by returning a [`Transition`] and are
/// committed by the engine between callbacks; an action never observes the
/// stack mutating under its own code.
///
/// Implementations override only what they need: every callback except
/// `name` has a default body (continue / pass / no opinion).
pub trait Action<W>: 'static
where
    W: WorldMut + 'static,
{
    /// Stable name for debugging and lineage paths; not required to be
    /// unique across the tree.
    fn name(&self) -> &str;

    fn is_named(&self, name: &str) -> bool {
        self.name() == name
    }

    /// Called once when this action becomes active. `prior` is the action
    /// being replaced, if any. The returned transition is applied
    /// immediately and may chain further transitions.
    fn on_start(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _prior: Option<&dyn Action<W>>,
    ) -> Transition<W> {
        Transition::Continue
    }

    /// Do the work of the action. Not guaranteed to run between a given
    /// start/end pair: an immediate transition can end the action first.
    fn update(&mut self, _ctx: &TickContext, _actor: W::Actor, _world: &mut W) -> Transition<W> {
        Transition::Continue
    }

    /// Invoked exactly once when this action ends, for any reason. `next`
    /// is the action taking over, if any.
    fn on_end(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _next: Option<&dyn Action<W>>,
    ) {
    }

    /// Called when a new action is pushed on top of this one. Only
    /// `Done` is meaningful here ("collapse me instead of burying me");
    /// every other result is treated as `Continue`.
    fn on_suspend(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _interrupter: &dyn Action<W>,
    ) -> Transition<W> {
        Transition::Continue
    }

    /// Called when the action covering this one finishes and control
    /// returns here. `interrupter` is absent when the host resumes a whole
    /// behavior after a long gap.
    fn on_resume(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _interrupter: Option<&dyn Action<W>>,
    ) -> Transition<W> {
        Transition::Continue
    }

    /// Optional factory for a nested child action, invoked once when this
    /// action starts. The child runs before its parent each tick.
    fn initial_action(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> Option<Box<dyn Action<W>>> {
        None
    }

    // Event handlers ------------------------------------------------------
    //
    // Handlers return DESIRED results; the engine arbitrates by priority
    // and commits the survivor at the next update. Returning
    // `EventReply::pass()` hands the event to the action buried beneath
    // this one.

    fn on_leave_ground(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _ground: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_land_on_ground(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _ground: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_contact(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _other: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_move_to_success(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_move_to_failure(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _reason: PathFailure,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_stuck(&mut self, _ctx: &TickContext, _actor: W::Actor, _world: &mut W) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_unstuck(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_posture_changed(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_animation_activity_complete(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _activity: i32,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_animation_activity_interrupted(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _activity: i32,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_animation_event(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _event: i32,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_ignited(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_injured(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _attacker: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_killed(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _attacker: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_other_killed(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _victim: W::Entity,
        _attacker: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_sight(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _subject: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_lost_sight(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _subject: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_threat_changed(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _subject: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_sound(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _source: W::Entity,
        _position: W::Position,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_nav_area_changed(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_model_changed(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_picked_up(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _item: W::Entity,
        _giver: Option<W::Entity>,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_dropped(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _item: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_shoved(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _pusher: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_blinded(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _blinder: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_command_attack(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _victim: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_command_assault(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_command_approach(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _position: W::Position,
        _range: f32,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_command_approach_entity(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _goal: W::Entity,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_command_retreat(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _threat: W::Entity,
        _range: f32,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_command_pause(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _duration: f32,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_command_resume(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    fn on_command_string(
        &mut self,
        _ctx: &TickContext,
        _actor: W::Actor,
        _world: &mut W,
        _command: &str,
    ) -> EventReply<W> {
        EventReply::pass()
    }

    // Contextual queries --------------------------------------------------
    //
    // Polled by the host through the behavior; the innermost active action
    // gets the first say, falling back outward and down the burial stack.

    /// If the given item were available right now, should we pick it up?
    fn should_pick_up(&self, _actor: W::Actor, _world: &W, _item: W::Entity) -> QueryResponse {
        QueryResponse::Undefined
    }

    /// Are we in a hurry?
    fn should_hurry(&self, _actor: W::Actor, _world: &W) -> QueryResponse {
        QueryResponse::Undefined
    }

    /// Should we retreat from the current fight?
    fn should_retreat(&self, _actor: W::Actor, _world: &W) -> QueryResponse {
        QueryResponse::Undefined
    }

    /// Should we attack the given threat?
    fn should_attack(&self, _actor: W::Actor, _world: &W, _threat: W::Entity) -> QueryResponse {
        QueryResponse::Undefined
    }

    /// Should we wait for a blocker that is across our path?
    fn is_hindrance(&self, _actor: W::Actor, _world: &W, _blocker: W::Entity) -> QueryResponse {
        QueryResponse::Undefined
    }

    /// Given a subject, return the world-space position we should aim at.
    fn select_target_point(
        &self,
        _actor: W::Actor,
        _world: &W,
        _subject: W::Entity,
    ) -> Option<W::Position> {
        None
    }

    /// Allow the actor to approve of positions the host wants to move it
    /// into.
    fn is_position_allowed(
        &self,
        _actor: W::Actor,
        _world: &W,
        _position: W::Position,
    ) -> QueryResponse {
        QueryResponse::Undefined
    }

    /// Return the more dangerous of the two threats, or `None` for no
    /// opinion.
    fn select_more_dangerous_threat(
        &self,
        _actor: W::Actor,
        _world: &W,
        _subject: W::Entity,
        _threat1: W::Entity,
        _threat2: W::Entity,
    ) -> Option<W::Entity> {
        None
    }
}
