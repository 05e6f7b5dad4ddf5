//! Arrival resolution: tile capture and army merging.
//!
//! Every decision in this pass reads the tile/army snapshot taken at pass
//! start; only the writes touch live state. Armies arriving in the same
//! tick therefore never see each other's captures — simultaneous arrivals
//! race on the start-of-tick world, by contract.

use crate::movement::is_complete;
use crate::{
    ArmyId, ArmyState, Event, EventEnvelope, GameState, Map, PlayerId, TileCoord, TileKind,
    TileState, UnitKind,
};

/// Advance every army whose arrival time has elapsed. Returns the owners of
/// captured capitals, flagged for elimination (deduplicated, in resolution
/// order).
pub(crate) fn resolve_arrivals(
    state: &mut GameState,
    now_ms: i64,
    events: &mut Vec<EventEnvelope>,
) -> Vec<PlayerId> {
    let current_tick = state.meta.current_tick;
    let mut flagged: Vec<PlayerId> = Vec::new();

    // Start-of-pass snapshot; all reads below go through these.
    let tiles_at_start: Map<TileCoord, TileState> = state.tiles.clone();
    let armies_at_start: Map<ArmyId, ArmyState> = state.armies.clone();

    let mut arriving: Vec<ArmyId> = armies_at_start
        .values()
        .filter(|army| {
            matches!(&army.movement, Some(m) if is_complete(now_ms, m.arrives_at_ms))
        })
        .map(|army| army.id.clone())
        .collect();
    arriving.sort_by(|a, b| a.0.cmp(&b.0));

    for army_id in arriving {
        let Some(army) = armies_at_start.get(&army_id) else {
            continue;
        };
        let Some(movement) = &army.movement else {
            continue;
        };

        // Zero-length paths and unknown tiles are dangling descriptors:
        // clear in place, skip, never abort the pass.
        let destination = movement.destination();
        let Some(destination) = destination.filter(|d| tiles_at_start.contains_key(d)) else {
            if let Some(live) = state.armies.get_mut(&army_id) {
                live.movement = None;
            }
            continue;
        };

        events.push(crate::emit(
            &mut state.counters,
            current_tick,
            Event::ArmyArrived {
                army: army_id.clone(),
                tile: destination,
            },
        ));

        // Covert agents share the arrival/merge machinery but never take
        // territory; only military arrivals capture.
        if army.kind == UnitKind::Military {
            capture_tile(state, &tiles_at_start, army, destination, &mut flagged, events);
        }

        // Merge into the canonical stationary depot from the snapshot, or
        // relocate in place. Unit additions land on live armies, so two
        // arrivals merging into one depot this tick sum correctly.
        let depot = armies_at_start
            .values()
            .filter(|other| {
                other.id != army_id
                    && other.owner == army.owner
                    && other.kind == army.kind
                    && other.tile == destination
                    && other.movement.is_none()
            })
            .map(|other| other.id.clone())
            .min_by(|a, b| a.0.cmp(&b.0));

        match depot {
            Some(depot_id) if state.armies.contains_key(&depot_id) => {
                state.armies.remove(&army_id);
                if let Some(live_depot) = state.armies.get_mut(&depot_id) {
                    live_depot.units += army.units;
                }
                events.push(crate::emit(
                    &mut state.counters,
                    current_tick,
                    Event::ArmiesMerged {
                        into: depot_id,
                        from: army_id,
                        units: army.units,
                    },
                ));
            }
            _ => {
                if let Some(live) = state.armies.get_mut(&army_id) {
                    live.tile = destination;
                    live.movement = None;
                }
            }
        }
    }

    flagged
}

/// Transfer ownership of the destination tile if the mover does not already
/// hold it, flagging the previous owner when a capital falls.
fn capture_tile(
    state: &mut GameState,
    tiles_at_start: &Map<TileCoord, TileState>,
    army: &ArmyState,
    destination: TileCoord,
    flagged: &mut Vec<PlayerId>,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.current_tick;
    let Some(snapshot_tile) = tiles_at_start.get(&destination) else {
        return;
    };
    if snapshot_tile.owner.as_ref() == Some(&army.owner) {
        return;
    }

    let previous = snapshot_tile.owner.clone();
    if let Some(live_tile) = state.tiles.get_mut(&destination) {
        live_tile.owner = Some(army.owner.clone());
    }
    events.push(crate::emit(
        &mut state.counters,
        current_tick,
        Event::TileCaptured {
            tile: destination,
            by: army.owner.clone(),
            previous: previous.clone(),
        },
    ));

    // Losing an owned capital to another player is the elimination trigger;
    // unowned capitals eliminate nobody.
    if snapshot_tile.kind == TileKind::Capital {
        if let Some(previous_owner) = previous {
            if !flagged.contains(&previous_owner) {
                flagged.push(previous_owner);
            }
        }
    }
}
