use crate::{capture, economy, elimination, spawn};
use crate::{Constants, EventLevel, GameState, GameStatus, TickOutcome};

/// Advance one game by one tick.
///
/// Order of operations:
/// 1. Economy accrual (gold, population growth) per active player.
/// 2. Unit spawning into depot armies.
/// 3. Arrival resolution: tile capture and army merging, reading the
///    start-of-tick snapshot.
/// 4. Elimination of flagged players and victory detection.
/// 5. Increment the tick counter and stamp the tick time.
///
/// A game that is not `InProgress` is a silent no-op — duplicate or
/// late-delivered scheduler callbacks land here harmlessly. Callers pass
/// `now_ms` (epoch milliseconds); the engine never reads a clock.
pub fn tick(
    state: &mut GameState,
    now_ms: i64,
    constants: &Constants,
    event_level: EventLevel,
) -> TickOutcome {
    if state.meta.status != GameStatus::InProgress {
        return TickOutcome::halted();
    }

    let mut events = Vec::new();

    economy::accrue_economy(state, constants, event_level, &mut events);
    spawn::spawn_units(state, constants, &mut events);
    let flagged = capture::resolve_arrivals(state, now_ms, &mut events);
    let (user_stat_deltas, finished) =
        elimination::resolve_eliminations(state, &flagged, now_ms, &mut events);

    state.meta.current_tick += 1;
    state.meta.last_tick_at_ms = Some(now_ms);

    TickOutcome {
        events,
        user_stat_deltas,
        reschedule: !finished,
    }
}
