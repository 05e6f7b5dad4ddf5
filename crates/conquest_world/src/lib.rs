//! Map generation and match setup shared between the daemon and tests.
//!
//! The lobby collaborator owns when a match forms; this crate owns what a
//! freshly formed match looks like: a hex disc with scattered terrain, one
//! capital per player on the rim, a starting depot army, and rally points
//! defaulting to the capital.

use anyhow::{bail, Context, Result};
use conquest_core::{
    ArmyId, ArmyState, Constants, Counters, GameId, GameMeta, GameState, GameStatus, Map,
    PlayerId, PlayerState, TileCoord, TileKind, TileState, UnitKind, UserId,
};
use rand::Rng;
use std::collections::HashSet;
use std::path::Path;

pub fn load_constants(content_dir: &str) -> Result<Constants> {
    let path = Path::new(content_dir).join("constants.json");
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let constants: Constants = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(constants)
}

/// Generate a v4-format UUID from a seeded RNG, so world generation stays
/// reproducible per seed.
pub fn generate_uuid(rng: &mut impl Rng) -> uuid::Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

pub fn new_game_id(rng: &mut impl Rng) -> GameId {
    GameId(format!("game_{}", generate_uuid(rng)))
}

/// Capital anchor positions on a radius-`r` hex disc: the six corners, in a
/// fixed order. Callers take the first `player_count`.
fn capital_anchors(radius: i32) -> [TileCoord; 6] {
    let r = radius;
    [
        TileCoord { q: r, r: 0 },
        TileCoord { q: -r, r: r },
        TileCoord { q: 0, r: -r },
        TileCoord { q: -r, r: 0 },
        TileCoord { q: r, r: -r },
        TileCoord { q: 0, r: r },
    ]
}

/// Hex disc of the given radius with seeded mountain and city scatter.
/// Every tile starts unowned.
pub fn generate_map(
    radius: i32,
    constants: &Constants,
    rng: &mut impl Rng,
) -> Map<TileCoord, TileState> {
    let mut tiles: Map<TileCoord, TileState> = Map::default();
    for q in -radius..=radius {
        for r in -radius..=radius {
            if (q + r).abs() > radius {
                continue;
            }
            let roll: f64 = rng.gen();
            let kind = if roll < constants.map_mountain_frequency {
                TileKind::Mountain
            } else if roll < constants.map_mountain_frequency + constants.map_city_frequency {
                TileKind::City
            } else {
                TileKind::Empty
            };
            let coord = TileCoord { q, r };
            tiles.insert(
                coord,
                TileState {
                    coord,
                    kind,
                    owner: None,
                },
            );
        }
    }
    tiles
}

/// Build a complete `Waiting` match for the given roster. The scheduler's
/// `start_game_tick` flips it to `InProgress`.
pub fn build_initial_state(
    game_id: GameId,
    roster: &[UserId],
    radius: i32,
    seed: u64,
    constants: &Constants,
    rng: &mut impl Rng,
) -> Result<GameState> {
    if roster.is_empty() {
        bail!("a match needs at least one player");
    }
    let anchors = capital_anchors(radius);
    if roster.len() > anchors.len() {
        bail!(
            "map supports at most {} players, roster has {}",
            anchors.len(),
            roster.len()
        );
    }

    let mut tiles = generate_map(radius, constants, rng);
    let mut players: Map<PlayerId, PlayerState> = Map::default();
    let mut armies: Map<ArmyId, ArmyState> = Map::default();
    let mut counters = Counters {
        next_event_id: 0,
        next_army_id: 0,
    };

    for (index, user) in roster.iter().enumerate() {
        let player_id = PlayerId(format!("player_{index:02}"));
        let capital = anchors[index];

        // The anchor always becomes this player's capital, whatever the
        // terrain roll said.
        if let Some(tile) = tiles.get_mut(&capital) {
            tile.kind = TileKind::Capital;
            tile.owner = Some(player_id.clone());
        }

        let army_id = ArmyId(format!("army_{:06}", counters.next_army_id));
        counters.next_army_id += 1;
        armies.insert(
            army_id.clone(),
            ArmyState {
                id: army_id,
                owner: player_id.clone(),
                kind: UnitKind::Military,
                tile: capital,
                units: constants.starting_army_units,
                movement: None,
            },
        );

        players.insert(
            player_id.clone(),
            PlayerState {
                id: player_id,
                user: user.clone(),
                population: Some(constants.starting_population),
                labour_ratio: Some(constants.starting_labour_ratio),
                military_ratio: constants.starting_military_ratio,
                spy_ratio: constants.starting_spy_ratio,
                gold: 0.0,
                growth_accumulator: 0.0,
                military_accumulator: 0.0,
                spy_accumulator: 0.0,
                rally_tile: Some(capital),
                eliminated_at_ms: None,
                elimination_reason: None,
                finish_position: None,
                lasted_ms: None,
            },
        );
    }

    let state = GameState {
        meta: GameMeta {
            id: game_id,
            status: GameStatus::Waiting,
            current_tick: 0,
            seed,
            schema_version: 1,
            last_tick_at_ms: None,
            started_at_ms: None,
            finished_at_ms: None,
        },
        players,
        tiles,
        armies,
        counters,
    };
    validate_setup(&state);
    Ok(state)
}

/// Validates cross-references in a freshly built match, panicking on any
/// setup error. Catches mistakes like a tile owned by an unknown player, a
/// rally point off the map, or a player without exactly one capital.
pub fn validate_setup(state: &GameState) {
    let player_ids: HashSet<&str> = state.players.keys().map(|id| id.0.as_str()).collect();

    for tile in state.tiles.values() {
        if let Some(owner) = &tile.owner {
            assert!(
                player_ids.contains(owner.0.as_str()),
                "tile {} owned by unknown player '{}'",
                tile.coord,
                owner.0,
            );
        }
    }

    for player in state.players.values() {
        let capitals = state
            .tiles
            .values()
            .filter(|t| t.kind == TileKind::Capital && t.owner.as_ref() == Some(&player.id))
            .count();
        assert!(
            capitals == 1,
            "player '{}' owns {} capitals, expected exactly 1",
            player.id.0,
            capitals,
        );
        if let Some(rally) = player.rally_tile {
            assert!(
                state.tiles.contains_key(&rally),
                "player '{}' rally tile {} is off the map",
                player.id.0,
                rally,
            );
        }
    }

    for army in state.armies.values() {
        assert!(
            player_ids.contains(army.owner.0.as_str()),
            "army '{}' owned by unknown player '{}'",
            army.id.0,
            army.owner.0,
        );
        assert!(
            state.tiles.contains_key(&army.tile),
            "army '{}' sits on unknown tile {}",
            army.id.0,
            army.tile,
        );
    }
}
