use super::*;

fn add_third_player(state: &mut GameState) {
    let capital = coord(0, 5);
    state.tiles.insert(
        capital,
        TileState {
            coord: capital,
            kind: TileKind::Capital,
            owner: Some(pid("player_gamma")),
        },
    );
    let gamma = crate::test_fixtures::make_player("player_gamma", "user_carol", capital);
    state.players.insert(gamma.id.clone(), gamma);
}

#[test]
fn test_capital_capture_eliminates_owner() {
    let mut state = two_player_state();
    add_third_player(&mut state);
    // Beta marches on alpha's capital.
    send_army(&mut state, "army_000002", &[coord(0, 0)], 0);

    let outcome = run_tick(&mut state, 10_000);

    let alpha = &state.players[&pid(ALPHA)];
    assert_eq!(alpha.eliminated_at_ms, Some(10_000));
    assert_eq!(alpha.elimination_reason, Some(EliminationReason::CapitalCaptured));
    assert_eq!(alpha.finish_position, Some(3), "last of three placed third");
    assert_eq!(alpha.lasted_ms, Some(10_000));
    assert!(
        !state.armies.values().any(|a| a.owner == pid(ALPHA)),
        "eliminated players hold no armies"
    );
    assert_eq!(
        state.meta.status,
        GameStatus::InProgress,
        "two players remain, the game continues"
    );
    assert!(outcome.reschedule);
    assert_eq!(
        outcome.user_stat_deltas,
        vec![UserStatDelta {
            user: UserId("user_alice".to_string()),
            games_played: 1,
            wins: 0,
            time_played_ms: 10_000,
        }]
    );
}

#[test]
fn test_second_to_last_elimination_finishes_the_game() {
    // Testable property D end to end: capital falls, loser eliminated in
    // the same tick, winner stamped position 1, no reschedule.
    let mut state = two_player_state();
    send_army(&mut state, "army_000002", &[coord(0, 0)], 0);

    let outcome = run_tick(&mut state, 10_000);

    assert_eq!(state.meta.status, GameStatus::Finished);
    assert_eq!(state.meta.finished_at_ms, Some(10_000));
    assert!(!outcome.reschedule, "the scheduler chain halts");

    let alpha = &state.players[&pid(ALPHA)];
    assert_eq!(alpha.finish_position, Some(2));
    let beta = &state.players[&pid(BETA)];
    assert_eq!(beta.finish_position, Some(1));
    assert!(beta.is_active(), "the winner is not eliminated");

    let bob = outcome
        .user_stat_deltas
        .iter()
        .find(|d| d.user == UserId("user_bob".to_string()))
        .expect("winner delta");
    assert_eq!(bob.wins, 1);
    assert_eq!(bob.games_played, 1);
    assert!(outcome.events.iter().any(|e| matches!(
        &e.event,
        Event::GameFinished { winner: Some(w) } if *w == pid(BETA)
    )));
}

#[test]
fn test_duplicate_flags_eliminate_once() {
    let mut state = two_player_state();
    add_third_player(&mut state);
    // Two beta armies arrive at alpha's capital in the same tick; alpha is
    // flagged by each capture pass but eliminated at most once.
    let second = stationary_army("army_000009", BETA, coord(4, 0), 2);
    state.armies.insert(second.id.clone(), second);
    send_army(&mut state, "army_000002", &[coord(0, 0)], 0);
    send_army(&mut state, "army_000009", &[coord(0, 0)], 0);

    let outcome = run_tick(&mut state, 10_000);

    let eliminations = outcome
        .events
        .iter()
        .filter(|e| matches!(e.event, Event::PlayerEliminated { .. }))
        .count();
    assert_eq!(eliminations, 1);
    assert_eq!(outcome.user_stat_deltas.len(), 1);
}

#[test]
fn test_mutual_capital_loss_finishes_without_winner() {
    let mut state = two_player_state();
    send_army(&mut state, "army_000002", &[coord(0, 0)], 0);
    send_army(&mut state, "army_000001", &[coord(5, 0)], 0);

    let outcome = run_tick(&mut state, 10_000);

    assert_eq!(state.meta.status, GameStatus::Finished);
    assert!(!outcome.reschedule);
    assert!(state.players.values().all(|p| !p.is_active()));
    assert!(outcome
        .events
        .iter()
        .any(|e| matches!(e.event, Event::GameFinished { winner: None })));
    // Both fell in the same tick: tied finish position, no wins awarded.
    assert!(outcome.user_stat_deltas.iter().all(|d| d.wins == 0));
}

#[test]
fn test_winner_keeps_armies_and_tiles() {
    let mut state = two_player_state();
    send_army(&mut state, "army_000002", &[coord(0, 0)], 0);
    run_tick(&mut state, 10_000);
    assert!(state.armies.values().all(|a| a.owner == pid(BETA)));
    assert_eq!(state.tiles[&coord(0, 0)].owner, Some(pid(BETA)));
}
