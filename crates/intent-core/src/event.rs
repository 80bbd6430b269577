use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Action, EventReply, TickContext, WorldMut, WorldView};

/// Why a movement request could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathFailure {
    NoPathExists,
    Stuck,
    FellOff,
}

/// The fixed catalog of events the host can dispatch into a behavior:
/// movement, damage, perception, animation and command notifications, with
/// payloads typed over the host's world.
///
/// Adding a kind here (plus its handler on [`Action`] and its arm in
/// `deliver`) is the whole cost of a new event; the propagation walk never
/// changes.
#[derive(Debug)]
pub enum Event<W>
where
    W: WorldView,
{
    LeaveGround { ground: W::Entity },
    LandOnGround { ground: W::Entity },
    Contact { other: W::Entity },
    MoveToSuccess,
    MoveToFailure { reason: PathFailure },
    Stuck,
    Unstuck,
    PostureChanged,
    AnimationActivityComplete { activity: i32 },
    AnimationActivityInterrupted { activity: i32 },
    AnimationEvent { event: i32 },
    Ignited,
    Injured { attacker: W::Entity },
    Killed { attacker: W::Entity },
    OtherKilled { victim: W::Entity, attacker: W::Entity },
    Sight { subject: W::Entity },
    LostSight { subject: W::Entity },
    ThreatChanged { subject: W::Entity },
    Sound { source: W::Entity, position: W::Position },
    NavAreaChanged,
    ModelChanged,
    PickedUp { item: W::Entity, giver: Option<W::Entity> },
    Dropped { item: W::Entity },
    Shoved { pusher: W::Entity },
    Blinded { blinder: W::Entity },
    CommandAttack { victim: W::Entity },
    CommandAssault,
    CommandApproach { position: W::Position, range: f32 },
    CommandApproachEntity { goal: W::Entity },
    CommandRetreat { threat: W::Entity, range: f32 },
    CommandPause { duration: f32 },
    CommandResume,
    CommandString { command: Cow<'static, str> },
}

impl<W> Event<W>
where
    W: WorldMut + 'static,
{
    /// Stable kind name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Event::LeaveGround { .. } => "leave_ground",
            Event::LandOnGround { .. } => "land_on_ground",
            Event::Contact { .. } => "contact",
            Event::MoveToSuccess => "move_to_success",
            Event::MoveToFailure { .. } => "move_to_failure",
            Event::Stuck => "stuck",
            Event::Unstuck => "unstuck",
            Event::PostureChanged => "posture_changed",
            Event::AnimationActivityComplete { .. } => "animation_activity_complete",
            Event::AnimationActivityInterrupted { .. } => "animation_activity_interrupted",
            Event::AnimationEvent { .. } => "animation_event",
            Event::Ignited => "ignited",
            Event::Injured { .. } => "injured",
            Event::Killed { .. } => "killed",
            Event::OtherKilled { .. } => "other_killed",
            Event::Sight { .. } => "sight",
            Event::LostSight { .. } => "lost_sight",
            Event::ThreatChanged { .. } => "threat_changed",
            Event::Sound { .. } => "sound",
            Event::NavAreaChanged => "nav_area_changed",
            Event::ModelChanged => "model_changed",
            Event::PickedUp { .. } => "picked_up",
            Event::Dropped { .. } => "dropped",
            Event::Shoved { .. } => "shoved",
            Event::Blinded { .. } => "blinded",
            Event::CommandAttack { .. } => "command_attack",
            Event::CommandAssault => "command_assault",
            Event::CommandApproach { .. } => "command_approach",
            Event::CommandApproachEntity { .. } => "command_approach_entity",
            Event::CommandRetreat { .. } => "command_retreat",
            Event::CommandPause { .. } => "command_pause",
            Event::CommandResume => "command_resume",
            Event::CommandString { .. } => "command_string",
        }
    }

    /// Route this event to the matching handler on `action`.
    pub(crate) fn deliver(
        &self,
        action: &mut dyn Action<W>,
        ctx: &TickContext,
        actor: W::Actor,
        world: &mut W,
    ) -> EventReply<W> {
        match self {
            Event::LeaveGround { ground } => action.on_leave_ground(ctx, actor, world, *ground),
            Event::LandOnGround { ground } => action.on_land_on_ground(ctx, actor, world, *ground),
            Event::Contact { other } => action.on_contact(ctx, actor, world, *other),
            Event::MoveToSuccess => action.on_move_to_success(ctx, actor, world),
            Event::MoveToFailure { reason } => {
                action.on_move_to_failure(ctx, actor, world, *reason)
            }
            Event::Stuck => action.on_stuck(ctx, actor, world),
            Event::Unstuck => action.on_unstuck(ctx, actor, world),
            Event::PostureChanged => action.on_posture_changed(ctx, actor, world),
            Event::AnimationActivityComplete { activity } => {
                action.on_animation_activity_complete(ctx, actor, world, *activity)
            }
            Event::AnimationActivityInterrupted { activity } => {
                action.on_animation_activity_interrupted(ctx, actor, world, *activity)
            }
            Event::AnimationEvent { event } => {
                action.on_animation_event(ctx, actor, world, *event)
            }
            Event::Ignited => action.on_ignited(ctx, actor, world),
            Event::Injured { attacker } => action.on_injured(ctx, actor, world, *attacker),
            Event::Killed { attacker } => action.on_killed(ctx, actor, world, *attacker),
            Event::OtherKilled { victim, attacker } => {
                action.on_other_killed(ctx, actor, world, *victim, *attacker)
            }
            Event::Sight { subject } => action.on_sight(ctx, actor, world, *subject),
            Event::LostSight { subject } => action.on_lost_sight(ctx, actor, world, *subject),
            Event::ThreatChanged { subject } => {
                action.on_threat_changed(ctx, actor, world, *subject)
            }
            Event::Sound { source, position } => {
                action.on_sound(ctx, actor, world, *source, *position)
            }
            Event::NavAreaChanged => action.on_nav_area_changed(ctx, actor, world),
            Event::ModelChanged => action.on_model_changed(ctx, actor, world),
            Event::PickedUp { item, giver } => {
                action.on_picked_up(ctx, actor, world, *item, *giver)
            }
            Event::Dropped { item } => action.on_dropped(ctx, actor, world, *item),
            Event::Shoved { pusher } => action.on_shoved(ctx, actor, world, *pusher),
            Event::Blinded { blinder } => action.on_blinded(ctx, actor, world, *blinder),
            Event::CommandAttack { victim } => {
                action.on_command_attack(ctx, actor, world, *victim)
            }
            Event::CommandAssault => action.on_command_assault(ctx, actor, world),
            Event::CommandApproach { position, range } => {
                action.on_command_approach(ctx, actor, world, *position, *range)
            }
            Event::CommandApproachEntity { goal } => {
                action.on_command_approach_entity(ctx, actor, world, *goal)
            }
            Event::CommandRetreat { threat, range } => {
                action.on_command_retreat(ctx, actor, world, *threat, *range)
            }
            Event::CommandPause { duration } => {
                action.on_command_pause(ctx, actor, world, *duration)
            }
            Event::CommandResume => action.on_command_resume(ctx, actor, world),
            Event::CommandString { command } => {
                action.on_command_string(ctx, actor, world, command)
            }
        }
    }
}
