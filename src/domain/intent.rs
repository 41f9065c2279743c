/// Intents: tick-scoped user actions derived from raw input.
/// Produced by the input translator, consumed by the simulation step, never stored.

use super::entity::MoveDir;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Move(MoveDir),
    TillSoil,
    Quit,
}
