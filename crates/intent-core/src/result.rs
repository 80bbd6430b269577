use std::borrow::Cow;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Action, WorldMut};

/// How an action wants the stack to change, returned from `on_start`,
/// `update`, `on_suspend` and `on_resume`.
///
/// Returning a transition instead of mutating the stack in place is what
/// keeps transitions atomic: an action can never observe itself being
/// replaced while its own code is still running. Target actions are owned
/// by the transition value; a transition that is never committed simply
/// drops its target.
pub enum Transition<W>
where
    W: WorldMut + 'static,
{
    /// Keep running this action next tick; nothing has changed.
    Continue,
    /// Replace this action with a new one at the same stack position.
    ChangeTo {
        action: Box<dyn Action<W>>,
        reason: Option<Cow<'static, str>>,
    },
    /// Put this action on hold and run the new one on top of it.
    SuspendFor {
        action: Box<dyn Action<W>>,
        reason: Option<Cow<'static, str>>,
    },
    /// This action has finished; resume whatever it was covering.
    Done { reason: Option<Cow<'static, str>> },
    /// Event-handler only: "keep doing what I'm doing". Structurally
    /// identical to `Continue`, but participates in pending-result
    /// arbitration (an equal-priority proposal may override a stored
    /// `Sustain`).
    Sustain,
}

impl<W> Transition<W>
where
    W: WorldMut + 'static,
{
    pub fn change_to(action: Box<dyn Action<W>>, reason: impl Into<Cow<'static, str>>) -> Self {
        Transition::ChangeTo {
            action,
            reason: Some(reason.into()),
        }
    }

    pub fn suspend_for(action: Box<dyn Action<W>>, reason: impl Into<Cow<'static, str>>) -> Self {
        Transition::SuspendFor {
            action,
            reason: Some(reason.into()),
        }
    }

    pub fn done() -> Self {
        Transition::Done { reason: None }
    }

    pub fn done_because(reason: impl Into<Cow<'static, str>>) -> Self {
        Transition::Done {
            reason: Some(reason.into()),
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Transition::Continue)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Transition::Done { .. })
    }

    /// True for the kinds that request an actual stack mutation.
    pub fn is_requesting_change(&self) -> bool {
        matches!(
            self,
            Transition::ChangeTo { .. } | Transition::SuspendFor { .. } | Transition::Done { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Transition::Continue => "continue",
            Transition::ChangeTo { .. } => "change_to",
            Transition::SuspendFor { .. } => "suspend_for",
            Transition::Done { .. } => "done",
            Transition::Sustain => "sustain",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Transition::ChangeTo { reason, .. }
            | Transition::SuspendFor { reason, .. }
            | Transition::Done { reason } => reason.as_deref(),
            _ => None,
        }
    }
}

impl<W> fmt::Debug for Transition<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.kind_name());
        match self {
            Transition::ChangeTo { action, reason } | Transition::SuspendFor { action, reason } => {
                s.field("action", &action.name()).field("reason", reason);
            }
            Transition::Done { reason } => {
                s.field("reason", reason);
            }
            _ => {}
        }
        s.finish()
    }
}

/// How hard the engine should try to honor a desired event result.
///
/// `Critical` results are never silently dropped: losing one to arbitration
/// or teardown is surfaced as a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Priority {
    None,
    Try,
    Important,
    Critical,
}

/// The DESIRED result of an event handler, which may or may not be honored
/// depending on other event results proposed before the next commit.
///
/// Desired results are stored per node and arbitrated by priority; the
/// surviving proposal is committed at the next update. This is distinct
/// from [`Transition`] on purpose: the two must not be silently converted.
pub struct EventReply<W>
where
    W: WorldMut + 'static,
{
    pub(crate) transition: Transition<W>,
    pub(crate) priority: Priority,
}

impl<W> EventReply<W>
where
    W: WorldMut + 'static,
{
    /// Decline the event; the next action down the burial stack gets it.
    pub fn pass() -> Self {
        Self {
            transition: Transition::Continue,
            priority: Priority::Try,
        }
    }

    /// Empty pending-result slot.
    pub(crate) fn none() -> Self {
        Self {
            transition: Transition::Continue,
            priority: Priority::None,
        }
    }

    pub fn try_change_to(
        action: Box<dyn Action<W>>,
        priority: Priority,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            transition: Transition::change_to(action, reason),
            priority,
        }
    }

    pub fn try_suspend_for(
        action: Box<dyn Action<W>>,
        priority: Priority,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            transition: Transition::suspend_for(action, reason),
            priority,
        }
    }

    pub fn try_done(priority: Priority, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            transition: Transition::done_because(reason),
            priority,
        }
    }

    pub fn sustain(priority: Priority) -> Self {
        Self {
            transition: Transition::Sustain,
            priority,
        }
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_pass(&self) -> bool {
        self.transition.is_continue()
    }

    pub(crate) fn is_requesting_change(&self) -> bool {
        self.transition.is_requesting_change()
    }
}

impl<W> fmt::Debug for EventReply<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventReply")
            .field("transition", &self.transition)
            .field("priority", &self.priority)
            .finish()
    }
}
