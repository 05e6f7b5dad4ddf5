//! Per-player gold accrual and population growth.

use crate::{Constants, Event, EventEnvelope, EventLevel, GameState, PlayerId};

/// Snapshot of the territory-derived numbers one player's accrual needs.
struct Holdings {
    labourers: f64,
    city_count: u32,
    has_capital: bool,
    upkeep_units: u32,
}

fn holdings(state: &GameState, player_id: &PlayerId, labour_ratio: f64, population: u32) -> Holdings {
    let mut city_count = 0;
    let mut has_capital = false;
    for tile in state.tiles.values() {
        if tile.owner.as_ref() != Some(player_id) {
            continue;
        }
        match tile.kind {
            crate::TileKind::City => city_count += 1,
            crate::TileKind::Capital => has_capital = true,
            crate::TileKind::Empty | crate::TileKind::Mountain => {}
        }
    }
    let upkeep_units = state
        .armies
        .values()
        .filter(|army| army.owner == *player_id)
        .map(|army| army.units)
        .sum();
    Holdings {
        labourers: (f64::from(population) * labour_ratio / 100.0).floor(),
        city_count,
        has_capital,
        upkeep_units,
    }
}

/// Accrue gold and population growth for every active, configured player.
///
/// Players with `population` or `labour_ratio` unset are skipped — they are
/// "inactive until configured", not an error.
pub(crate) fn accrue_economy(
    state: &mut GameState,
    constants: &Constants,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.current_tick;

    // Sorted for a deterministic pass; accrual per player is independent.
    let mut player_ids: Vec<PlayerId> = state
        .players
        .values()
        .filter(|player| player.is_active())
        .map(|player| player.id.clone())
        .collect();
    player_ids.sort_by(|a, b| a.0.cmp(&b.0));

    for player_id in player_ids {
        let Some((population, labour_ratio)) = state
            .players
            .get(&player_id)
            .and_then(|player| Some((player.population?, player.labour_ratio?)))
        else {
            continue;
        };

        let held = holdings(state, &player_id, labour_ratio, population);
        let upkeep = constants.upkeep_gold_per_unit * f64::from(held.upkeep_units);
        let gold_delta = held.labourers / constants.labourer_gold_divisor - upkeep;
        let population_cap = if held.has_capital {
            constants.capital_population_cap
        } else {
            0
        } + constants.city_population_cap * held.city_count;

        let Some(player) = state.players.get_mut(&player_id) else {
            continue;
        };

        // Applied unconditionally — balances may go negative.
        player.gold += gold_delta;
        let balance = player.gold;

        let mut grown = 0;
        if population < population_cap {
            player.growth_accumulator += (held.labourers / constants.growth_labourer_divisor
                + constants.growth_city_bonus * f64::from(held.city_count))
                / constants.growth_ticks_per_unit;
            if player.growth_accumulator >= 1.0 {
                let whole = player.growth_accumulator.floor();
                player.growth_accumulator -= whole;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let new_population = (population + whole as u32).min(population_cap);
                grown = new_population - population;
                player.population = Some(new_population);
            }
        } else {
            // Growth potential does not bank while capped.
            player.growth_accumulator = 0.0;
        }

        if event_level == EventLevel::Debug {
            events.push(crate::emit(
                &mut state.counters,
                current_tick,
                Event::GoldAccrued {
                    player: player_id.clone(),
                    delta: gold_delta,
                    balance,
                },
            ));
        }
        if grown > 0 {
            let population_now = population + grown;
            events.push(crate::emit(
                &mut state.counters,
                current_tick,
                Event::PopulationGrown {
                    player: player_id,
                    amount: grown,
                    population: population_now,
                },
            ));
        }
    }
}
