//! Type definitions for `conquest_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the tick engine.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// Per-game collections use the ahash hasher; iteration order is never
/// relied on — mutating passes sort ids first.
pub type Map<K, V> = HashMap<K, V, ahash::RandomState>;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(GameId);
string_id!(PlayerId);
string_id!(UserId);
string_id!(ArmyId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Tile coordinates
// ---------------------------------------------------------------------------

/// Axial hex coordinate. Serializes as the string `"q,r"` so it can key
/// JSON maps directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub q: i32,
    pub r: i32,
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for TileCoord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| format!("tile coord '{s}' is not 'q,r'"))?;
        Ok(TileCoord {
            q: q.parse().map_err(|e| format!("bad q in '{s}': {e}"))?,
            r: r.parse().map_err(|e| format!("bad r in '{s}': {e}"))?,
        })
    }
}

impl Serialize for TileCoord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TileCoord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    Waiting,
    Starting,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileKind {
    Empty,
    City,
    Capital,
    Mountain,
}

/// Armies and covert agents share one record shape; the kind keeps their
/// depot pools separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    Military,
    Spy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EliminationReason {
    CapitalCaptured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: GameMeta,
    pub players: Map<PlayerId, PlayerState>,
    pub tiles: Map<TileCoord, TileState>,
    pub armies: Map<ArmyId, ArmyState>,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMeta {
    pub id: GameId,
    pub status: GameStatus,
    pub current_tick: u64,
    pub seed: u64,
    pub schema_version: u32,
    pub last_tick_at_ms: Option<i64>,
    pub started_at_ms: Option<i64>,
    pub finished_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_army_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub user: UserId,
    /// `None` until the lobby configures the player; unconfigured players
    /// are skipped by economy and spawn processing.
    pub population: Option<u32>,
    /// Percent of population assigned to labour. `None` = unconfigured.
    pub labour_ratio: Option<f64>,
    pub military_ratio: f64,
    pub spy_ratio: f64,
    /// May go negative transiently — upkeep has no gold floor.
    pub gold: f64,
    pub growth_accumulator: f64,
    pub military_accumulator: f64,
    pub spy_accumulator: f64,
    pub rally_tile: Option<TileCoord>,
    pub eliminated_at_ms: Option<i64>,
    pub elimination_reason: Option<EliminationReason>,
    pub finish_position: Option<u32>,
    pub lasted_ms: Option<i64>,
}

impl PlayerState {
    /// A player stops contributing to every tick pass once eliminated.
    pub fn is_active(&self) -> bool {
        self.eliminated_at_ms.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileState {
    pub coord: TileCoord,
    pub kind: TileKind,
    /// The only tick-mutable tile field.
    pub owner: Option<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmyState {
    pub id: ArmyId,
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub tile: TileCoord,
    pub units: u32,
    /// Fully present while in transit, fully absent while stationary —
    /// partial descriptors cannot be represented.
    pub movement: Option<MovementState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementState {
    /// Ordered tiles from the step after departure through the destination.
    pub path: SmallVec<[TileCoord; 8]>,
    pub departed_at_ms: i64,
    pub arrives_at_ms: i64,
}

impl MovementState {
    pub fn destination(&self) -> Option<TileCoord> {
        self.path.last().copied()
    }
}

// ---------------------------------------------------------------------------
// Balance constants
// ---------------------------------------------------------------------------

/// Tunable balance values. Loaded from content JSON by `conquest_world`;
/// `Default` carries the shipped balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub tick_interval_ms: i64,
    pub capital_population_cap: u32,
    pub city_population_cap: u32,
    /// Gold per tick = labourers / this divisor.
    pub labourer_gold_divisor: f64,
    pub upkeep_gold_per_unit: f64,
    /// Growth per tick = (labourers / divisor + bonus * cities) / ticks.
    pub growth_labourer_divisor: f64,
    pub growth_city_bonus: f64,
    pub growth_ticks_per_unit: f64,
    /// One unit per this many ticks for each point of military population.
    pub spawn_ticks_per_unit: f64,
    pub starting_population: u32,
    pub starting_army_units: u32,
    pub starting_labour_ratio: f64,
    pub starting_military_ratio: f64,
    pub starting_spy_ratio: f64,
    pub map_city_frequency: f64,
    pub map_mountain_frequency: f64,
}

impl Default for Constants {
    fn default() -> Self {
        Constants {
            tick_interval_ms: 1000,
            capital_population_cap: 50,
            city_population_cap: 20,
            labourer_gold_divisor: 5.0,
            upkeep_gold_per_unit: 0.1,
            growth_labourer_divisor: 10.0,
            growth_city_bonus: 0.5,
            growth_ticks_per_unit: 60.0,
            spawn_ticks_per_unit: 60.0,
            starting_population: 10,
            starting_army_units: 5,
            starting_labour_ratio: 60.0,
            starting_military_ratio: 30.0,
            starting_spy_ratio: 0.0,
            map_city_frequency: 0.08,
            map_mountain_frequency: 0.12,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Cross-game lifetime counters are only ever incremented; the engine emits
/// deltas and the store applies them atomically per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatDelta {
    pub user: UserId,
    pub games_played: u64,
    pub wins: u64,
    pub time_played_ms: i64,
}

#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub events: Vec<EventEnvelope>,
    pub user_stat_deltas: Vec<UserStatDelta>,
    /// False once the game finished (or was not in progress) — the
    /// scheduler chain halts instead of re-enqueueing.
    pub reschedule: bool,
}

impl TickOutcome {
    pub(crate) fn halted() -> Self {
        TickOutcome {
            events: Vec::new(),
            user_stat_deltas: Vec::new(),
            reschedule: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Only emitted at `EventLevel::Debug` — one per player per tick.
    GoldAccrued {
        player: PlayerId,
        delta: f64,
        balance: f64,
    },
    PopulationGrown {
        player: PlayerId,
        amount: u32,
        population: u32,
    },
    UnitsSpawned {
        player: PlayerId,
        army: ArmyId,
        kind: UnitKind,
        count: u32,
        tile: TileCoord,
    },
    ArmyArrived {
        army: ArmyId,
        tile: TileCoord,
    },
    TileCaptured {
        tile: TileCoord,
        by: PlayerId,
        previous: Option<PlayerId>,
    },
    ArmiesMerged {
        into: ArmyId,
        from: ArmyId,
        units: u32,
    },
    PlayerEliminated {
        player: PlayerId,
        finish_position: u32,
    },
    GameFinished {
        winner: Option<PlayerId>,
    },
}
