use core::fmt::Debug;

use crate::ActorId;

/// Read-only world access.
///
/// The core crate intentionally does not prescribe which state a world must
/// expose; specific subsystems (locomotion, vision, etc.) should define
/// extension traits. The associated types keep event payloads and query
/// results host-defined: `Entity` is whatever the host uses to refer to
/// other things in the world, `Position` is its world-space point type.
pub trait WorldView {
    type Actor: ActorId;
    type Entity: Copy + PartialEq + Debug + 'static;
    type Position: Copy + Debug + 'static;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}
