//! Deterministic, engine-agnostic suspend-stack behavior engine.
//!
//! Behavior is composed from [`Action`]s: an action can nest a child with
//! more specific behavior, and can suspend for an interrupter, burying
//! itself until the interrupter finishes. A [`Behavior`] owns one such
//! stack per actor and drives it one tick at a time.
//!
//! Transitions are atomic by construction: actions request changes by
//! returning [`Transition`] values, and event handlers propose desired
//! results that are arbitrated by priority and committed at the next
//! update. An action's code never observes the stack mutating beneath it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod actor;
pub mod behavior;
pub mod debug;
pub mod event;
pub mod query;
pub mod result;
pub mod stack;
pub mod tick;
pub mod world;

pub use action::Action;
pub use actor::ActorId;
pub use behavior::Behavior;
pub use event::{Event, PathFailure};
pub use query::QueryResponse;
pub use result::{EventReply, Priority, Transition};
pub use stack::ActionId;
pub use tick::TickContext;
pub use world::{WorldMut, WorldView};
