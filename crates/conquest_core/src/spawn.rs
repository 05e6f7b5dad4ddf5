//! Unit production: fractional spawn accumulators deposited into depot
//! armies.
//!
//! Military units land at the player's rally tile; covert agents land at
//! the player's capital. Both use the same accumulate-floor-deposit shape.

use crate::{
    ArmyId, ArmyState, Constants, Event, EventEnvelope, GameState, PlayerId, TileCoord, TileKind,
    UnitKind,
};

/// The canonical depot at `(owner, tile, kind)`: stationary, no movement
/// descriptor, lowest id. The common path never creates duplicates, but if
/// more than one exists the lowest id wins so deposits stay deterministic.
pub(crate) fn depot_army_id(
    state: &GameState,
    owner: &PlayerId,
    tile: TileCoord,
    kind: UnitKind,
) -> Option<ArmyId> {
    state
        .armies
        .values()
        .filter(|army| {
            army.owner == *owner
                && army.kind == kind
                && army.tile == tile
                && army.movement.is_none()
        })
        .map(|army| army.id.clone())
        .min_by(|a, b| a.0.cmp(&b.0))
}

/// Add `count` units to the depot at `tile`, creating it if absent.
/// Returns the receiving army's id.
fn deposit(
    state: &mut GameState,
    owner: &PlayerId,
    tile: TileCoord,
    kind: UnitKind,
    count: u32,
) -> ArmyId {
    if let Some(depot_id) = depot_army_id(state, owner, tile, kind) {
        if let Some(depot) = state.armies.get_mut(&depot_id) {
            depot.units += count;
        }
        return depot_id;
    }
    let army_id = ArmyId(format!("army_{:06}", state.counters.next_army_id));
    state.counters.next_army_id += 1;
    state.armies.insert(
        army_id.clone(),
        ArmyState {
            id: army_id.clone(),
            owner: owner.clone(),
            kind,
            tile,
            units: count,
            movement: None,
        },
    );
    army_id
}

/// The player's owned capital, lowest coordinate first if map generation
/// ever hands out more than one.
fn owned_capital(state: &GameState, player_id: &PlayerId) -> Option<TileCoord> {
    state
        .tiles
        .values()
        .filter(|tile| tile.kind == TileKind::Capital && tile.owner.as_ref() == Some(player_id))
        .map(|tile| tile.coord)
        .min()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn accumulate_whole_units(accumulator: &mut f64, rate_per_tick: f64) -> u32 {
    *accumulator += rate_per_tick;
    if *accumulator < 1.0 {
        return 0;
    }
    let whole = accumulator.floor();
    *accumulator -= whole;
    whole as u32
}

pub(crate) fn spawn_units(
    state: &mut GameState,
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.current_tick;

    let mut player_ids: Vec<PlayerId> = state
        .players
        .values()
        .filter(|player| player.is_active())
        .map(|player| player.id.clone())
        .collect();
    player_ids.sort_by(|a, b| a.0.cmp(&b.0));

    for player_id in player_ids {
        let Some(player) = state.players.get(&player_id) else {
            continue;
        };
        // Unconfigured players sit out spawn exactly as they sit out
        // economy accrual.
        if player.labour_ratio.is_none() {
            continue;
        }
        let Some(population) = player.population else {
            continue;
        };
        let military_pop = (f64::from(population) * player.military_ratio / 100.0).floor();
        let spy_pop = (f64::from(population) * player.spy_ratio / 100.0).floor();
        let rally_tile = player.rally_tile;

        // Military production needs assigned population and a rally point.
        if military_pop > 0.0 {
            if let Some(rally) = rally_tile {
                let rate = military_pop / constants.spawn_ticks_per_unit;
                let count = {
                    let Some(player) = state.players.get_mut(&player_id) else {
                        continue;
                    };
                    accumulate_whole_units(&mut player.military_accumulator, rate)
                };
                if count > 0 {
                    let army = deposit(state, &player_id, rally, UnitKind::Military, count);
                    events.push(crate::emit(
                        &mut state.counters,
                        current_tick,
                        Event::UnitsSpawned {
                            player: player_id.clone(),
                            army,
                            kind: UnitKind::Military,
                            count,
                            tile: rally,
                        },
                    ));
                }
            }
        }

        // Covert agents mirror the military path, anchored at the capital.
        if spy_pop > 0.0 {
            if let Some(capital) = owned_capital(state, &player_id) {
                let rate = spy_pop / constants.spawn_ticks_per_unit;
                let count = {
                    let Some(player) = state.players.get_mut(&player_id) else {
                        continue;
                    };
                    accumulate_whole_units(&mut player.spy_accumulator, rate)
                };
                if count > 0 {
                    let army = deposit(state, &player_id, capital, UnitKind::Spy, count);
                    events.push(crate::emit(
                        &mut state.counters,
                        current_tick,
                        Event::UnitsSpawned {
                            player: player_id.clone(),
                            army,
                            kind: UnitKind::Spy,
                            count,
                            tile: capital,
                        },
                    ));
                }
            }
        }
    }
}
