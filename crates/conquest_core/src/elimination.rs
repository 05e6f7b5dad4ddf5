//! Player elimination and match victory.

use crate::{
    EliminationReason, Event, EventEnvelope, GameState, GameStatus, PlayerId, UserStatDelta,
};

/// Eliminate every flagged player, then check for a single survivor.
///
/// Returns the lifetime-stat deltas to apply to user records and whether
/// the game finished this tick. Flags for players eliminated by an earlier
/// pass (or duplicated within this tick) are skipped, keeping the pass
/// idempotent per player.
pub(crate) fn resolve_eliminations(
    state: &mut GameState,
    flagged: &[PlayerId],
    now_ms: i64,
    events: &mut Vec<EventEnvelope>,
) -> (Vec<UserStatDelta>, bool) {
    let current_tick = state.meta.current_tick;
    let started_at_ms = state.meta.started_at_ms;
    let mut deltas: Vec<UserStatDelta> = Vec::new();
    let mut processed: u32 = 0;

    for player_id in flagged {
        let Some(player) = state.players.get(player_id) else {
            continue;
        };
        if !player.is_active() {
            continue;
        }

        // The player being processed still counts as active here, so two
        // players falling in the same tick share a finish position.
        #[allow(clippy::cast_possible_truncation)]
        let remaining_active =
            state.players.values().filter(|p| p.is_active()).count() as u32;
        let finish_position = remaining_active + processed;
        let lasted_ms = started_at_ms.map_or(0, |started| now_ms - started);

        let user = player.user.clone();
        if let Some(player) = state.players.get_mut(player_id) {
            player.eliminated_at_ms = Some(now_ms);
            player.elimination_reason = Some(EliminationReason::CapitalCaptured);
            player.finish_position = Some(finish_position);
            player.lasted_ms = Some(lasted_ms);
            player.rally_tile = None;
        }

        // Eliminated players hold no armies.
        state.armies.retain(|_, army| army.owner != *player_id);

        deltas.push(UserStatDelta {
            user,
            games_played: 1,
            wins: 0,
            time_played_ms: lasted_ms,
        });
        events.push(crate::emit(
            &mut state.counters,
            current_tick,
            Event::PlayerEliminated {
                player: player_id.clone(),
                finish_position,
            },
        ));
        processed += 1;
    }

    detect_victory(state, now_ms, &mut deltas, events)
}

/// Finish the game when at most one active player remains.
fn detect_victory(
    state: &mut GameState,
    now_ms: i64,
    deltas: &mut Vec<UserStatDelta>,
    events: &mut Vec<EventEnvelope>,
) -> (Vec<UserStatDelta>, bool) {
    let current_tick = state.meta.current_tick;
    let active: Vec<PlayerId> = state
        .players
        .values()
        .filter(|player| player.is_active())
        .map(|player| player.id.clone())
        .collect();

    if active.len() > 1 {
        return (std::mem::take(deltas), false);
    }

    let winner = if active.len() == 1 {
        let winner_id = active[0].clone();
        let lasted_ms = state.meta.started_at_ms.map_or(0, |started| now_ms - started);
        if let Some(player) = state.players.get_mut(&winner_id) {
            player.finish_position = Some(1);
            deltas.push(UserStatDelta {
                user: player.user.clone(),
                games_played: 1,
                wins: 1,
                time_played_ms: lasted_ms,
            });
        }
        Some(winner_id)
    } else {
        // Mutual simultaneous capital loss: nobody left standing. The game
        // still terminates rather than ticking forever.
        None
    };

    state.meta.status = GameStatus::Finished;
    state.meta.finished_at_ms = Some(now_ms);
    events.push(crate::emit(
        &mut state.counters,
        current_tick,
        Event::GameFinished { winner },
    ));

    (std::mem::take(deltas), true)
}
