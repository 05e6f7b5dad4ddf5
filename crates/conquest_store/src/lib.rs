//! In-memory stand-in for the transactional document store the tick engine
//! runs against.
//!
//! Contract (the durable store must honor the same one): `load_game` hands
//! back one consistent snapshot of a game document; `commit_game` replaces
//! the document atomically; user lifetime counters are increment-only and
//! applied per record under the write lock, so concurrent games sharing a
//! user never lose updates.

use std::collections::HashMap;

use conquest_core::{GameId, GameState, UserId, UserStatDelta};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Cross-game lifetime aggregates. The elimination/victory pass is the only
/// writer, once per game per player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub display_name: String,
    pub games_played: u64,
    pub wins: u64,
    pub time_played_ms: i64,
}

impl UserRecord {
    pub fn new(id: UserId, display_name: &str) -> Self {
        UserRecord {
            id,
            display_name: display_name.to_string(),
            games_played: 0,
            wins: 0,
            time_played_ms: 0,
        }
    }
}

#[derive(Default)]
struct Documents {
    games: HashMap<String, GameState>,
    users: HashMap<String, UserRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One consistent snapshot of the game document, or `None` for unknown
    /// ids (a silent no-op for the caller, per the missing-game policy).
    pub fn load_game(&self, id: &GameId) -> Option<GameState> {
        self.inner.read().games.get(&id.0).cloned()
    }

    /// Replace the whole game document. The per-tick all-or-nothing write:
    /// either every mutation of the tick lands, or (if the caller dropped
    /// the staged state) none do.
    pub fn commit_game(&self, state: GameState) {
        self.inner
            .write()
            .games
            .insert(state.meta.id.0.clone(), state);
    }

    pub fn remove_game(&self, id: &GameId) -> Option<GameState> {
        self.inner.write().games.remove(&id.0)
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self
            .inner
            .read()
            .games
            .keys()
            .map(|id| GameId(id.clone()))
            .collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids
    }

    pub fn insert_user(&self, user: UserRecord) {
        self.inner.write().users.insert(user.id.0.clone(), user);
    }

    pub fn get_user(&self, id: &UserId) -> Option<UserRecord> {
        self.inner.read().users.get(&id.0).cloned()
    }

    /// Increment lifetime counters for each delta, atomically per record.
    /// Unknown users get a record minted on first touch rather than losing
    /// the increment.
    pub fn apply_user_deltas(&self, deltas: &[UserStatDelta]) {
        if deltas.is_empty() {
            return;
        }
        let mut inner = self.inner.write();
        for delta in deltas {
            let record = inner
                .users
                .entry(delta.user.0.clone())
                .or_insert_with(|| UserRecord::new(delta.user.clone(), &delta.user.0));
            record.games_played += delta.games_played;
            record.wins += delta.wins;
            record.time_played_ms += delta.time_played_ms;
        }
    }
}
