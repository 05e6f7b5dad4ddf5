use super::*;

#[test]
fn test_finished_game_tick_is_a_noop() {
    let mut state = two_player_state();
    send_army(&mut state, "army_000002", &[coord(0, 0)], 0);
    run_tick(&mut state, 10_000);
    assert_eq!(state.meta.status, GameStatus::Finished);

    // A duplicate or late-delivered callback produces no state change.
    let before = serde_json::to_string(&state).unwrap();
    let outcome = run_tick(&mut state, 11_000);
    let after = serde_json::to_string(&state).unwrap();
    assert_eq!(before, after);
    assert!(outcome.events.is_empty());
    assert!(outcome.user_stat_deltas.is_empty());
    assert!(!outcome.reschedule);
}

#[test]
fn test_waiting_game_does_not_tick() {
    let mut state = two_player_state();
    state.meta.status = GameStatus::Waiting;
    let outcome = run_tick(&mut state, 1_000);
    assert_eq!(state.meta.current_tick, 0);
    assert!(!outcome.reschedule);
}

#[test]
fn test_events_carry_the_tick_they_occurred_in() {
    let mut state = two_player_state();
    state.meta.current_tick = 7;
    state
        .players
        .get_mut(&pid(ALPHA))
        .unwrap()
        .growth_accumulator = 0.99;
    let outcome = run_tick(&mut state, 8_000);
    assert!(!outcome.events.is_empty());
    assert!(outcome.events.iter().all(|e| e.tick == 7));
    assert_eq!(state.meta.current_tick, 8);
}

#[test]
fn test_event_ids_are_sequential_across_ticks() {
    let mut state = two_player_state();
    state
        .players
        .get_mut(&pid(ALPHA))
        .unwrap()
        .growth_accumulator = 1.99;
    let first = run_tick(&mut state, 1_000);
    assert_eq!(first.events[0].id, EventId("evt_000000".to_string()));

    state
        .players
        .get_mut(&pid(ALPHA))
        .unwrap()
        .growth_accumulator = 1.99;
    let second = run_tick(&mut state, 2_000);
    assert_eq!(
        second.events[0].id,
        EventId(format!("evt_{:06}", first.events.len())),
        "the event counter persists in game state"
    );
}

#[test]
fn test_components_run_in_fixed_order() {
    // Economy must see the world before movement mutates it: an army about
    // to capture alpha's second city still pays upkeep and counts toward
    // alpha's holdings this tick.
    let mut state = two_player_state();
    send_army(&mut state, "army_000002", &[coord(0, 1)], 0);
    run_tick(&mut state, 10_000);
    let alpha = &state.players[&pid(ALPHA)];
    // Alpha's growth this tick includes the city bonus ((10/10 + 0.5)/60);
    // the capture lands afterwards.
    assert!((alpha.growth_accumulator - 0.025).abs() < 1e-9);
    assert_eq!(state.tiles[&coord(0, 1)].owner, Some(pid(BETA)));
}
