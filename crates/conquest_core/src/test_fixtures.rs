//! Shared test fixtures for conquest_core and downstream crates.
//!
//! `two_player_state()` is a small but complete match: two configured
//! players with capitals, cities, rally points, and one starting depot army
//! each, plus a corridor of empty tiles between the capitals.

use crate::{
    ArmyId, ArmyState, Constants, Counters, GameId, GameMeta, GameState, GameStatus, Map,
    PlayerId, PlayerState, TileCoord, TileKind, TileState, UnitKind, UserId,
};

pub const ALPHA: &str = "player_alpha";
pub const BETA: &str = "player_beta";

pub fn coord(q: i32, r: i32) -> TileCoord {
    TileCoord { q, r }
}

pub fn base_constants() -> Constants {
    Constants::default()
}

pub fn make_player(id: &str, user: &str, capital: TileCoord) -> PlayerState {
    PlayerState {
        id: PlayerId(id.to_string()),
        user: UserId(user.to_string()),
        population: Some(20),
        labour_ratio: Some(50.0),
        military_ratio: 30.0,
        spy_ratio: 0.0,
        gold: 0.0,
        growth_accumulator: 0.0,
        military_accumulator: 0.0,
        spy_accumulator: 0.0,
        rally_tile: Some(capital),
        eliminated_at_ms: None,
        elimination_reason: None,
        finish_position: None,
        lasted_ms: None,
    }
}

fn tile(coord: TileCoord, kind: TileKind, owner: Option<&str>) -> TileState {
    TileState {
        coord,
        kind,
        owner: owner.map(|id| PlayerId(id.to_string())),
    }
}

pub fn stationary_army(id: &str, owner: &str, tile: TileCoord, units: u32) -> ArmyState {
    ArmyState {
        id: ArmyId(id.to_string()),
        owner: PlayerId(owner.to_string()),
        kind: UnitKind::Military,
        tile,
        units,
        movement: None,
    }
}

/// Two-player match, `InProgress`, started at t=0. Alpha's capital sits at
/// (0,0), Beta's at (5,0); each owns one city and fields a 5-unit depot
/// army at its capital, which is also the rally tile.
pub fn two_player_state() -> GameState {
    let alpha_capital = coord(0, 0);
    let beta_capital = coord(5, 0);

    let mut tiles: Map<TileCoord, TileState> = Map::default();
    for t in [
        tile(alpha_capital, TileKind::Capital, Some(ALPHA)),
        tile(coord(0, 1), TileKind::City, Some(ALPHA)),
        tile(coord(1, 0), TileKind::Empty, None),
        tile(coord(2, 0), TileKind::Empty, None),
        tile(coord(3, 0), TileKind::Empty, None),
        tile(coord(4, 0), TileKind::Empty, None),
        tile(coord(2, 2), TileKind::Mountain, None),
        tile(beta_capital, TileKind::Capital, Some(BETA)),
        tile(coord(5, 1), TileKind::City, Some(BETA)),
    ] {
        tiles.insert(t.coord, t);
    }

    let mut players: Map<PlayerId, PlayerState> = Map::default();
    let alpha = make_player(ALPHA, "user_alice", alpha_capital);
    let beta = make_player(BETA, "user_bob", beta_capital);
    players.insert(alpha.id.clone(), alpha);
    players.insert(beta.id.clone(), beta);

    let mut armies: Map<ArmyId, ArmyState> = Map::default();
    for army in [
        stationary_army("army_000001", ALPHA, alpha_capital, 5),
        stationary_army("army_000002", BETA, beta_capital, 5),
    ] {
        armies.insert(army.id.clone(), army);
    }

    GameState {
        meta: GameMeta {
            id: GameId("game_test".to_string()),
            status: GameStatus::InProgress,
            current_tick: 0,
            seed: 42,
            schema_version: 1,
            last_tick_at_ms: Some(0),
            started_at_ms: Some(0),
            finished_at_ms: None,
        },
        players,
        tiles,
        armies,
        counters: Counters {
            next_event_id: 0,
            next_army_id: 3,
        },
    }
}
