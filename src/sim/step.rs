/// The step function: applies one tick's intents to the game state.
///
/// Intents are applied strictly in order:
///   - Move     → player moves one cell, or stays put at the grid edge
///   - TillSoil → grass under the player becomes tilled soil (one-way)
///   - Quit     → run state becomes Terminated; later intents still apply
///
/// Returns the events produced, in order. Events are an observability hook
/// only. The only error is an out-of-bounds grid access, which means the
/// player's in-bounds invariant is already broken.

use crate::domain::entity::MoveDir;
use crate::domain::intent::Intent;
use crate::domain::tile::TileState;
use crate::error::GameError;
use super::event::GameEvent;
use super::world::GameState;

pub fn step(state: &mut GameState, intents: &[Intent]) -> Result<Vec<GameEvent>, GameError> {
    let mut events = Vec::with_capacity(intents.len());

    for &intent in intents {
        match intent {
            Intent::Move(dir) => resolve_move(state, dir, &mut events),
            Intent::TillSoil => resolve_till(state, &mut events)?,
            Intent::Quit => resolve_quit(state, &mut events),
        }
    }

    Ok(events)
}

fn resolve_move(state: &mut GameState, dir: MoveDir, events: &mut Vec<GameEvent>) {
    let (w, h) = (state.grid.width(), state.grid.height());
    let moved = state.player.try_move(dir, w, h);
    let (x, y) = state.player.position();
    if moved {
        events.push(GameEvent::PlayerMoved { x, y });
    } else {
        events.push(GameEvent::MoveBlocked { x, y, direction: dir });
    }
}

fn resolve_till(state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let (x, y) = state.player.position();
    if state.grid.tile_at(x, y)?.is_tillable() {
        state.grid.set_tile(x, y, TileState::TilledSoil)?;
        events.push(GameEvent::SoilTilled { x, y });
    } else {
        events.push(GameEvent::AlreadyTilled { x, y });
    }
    Ok(())
}

fn resolve_quit(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.terminate();
    events.push(GameEvent::QuitRequested);
}
