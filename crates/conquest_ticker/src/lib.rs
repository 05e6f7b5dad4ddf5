//! The tick scheduler: an explicit discrete-event queue plus the two entry
//! points the rest of the system calls.
//!
//! Each in-progress game owns a self-rescheduling chain: `process_tick`
//! runs the tick body and enqueues its own successor one interval later,
//! or enqueues nothing once the game finished (or went missing), which is
//! how a chain terminates. Time is always a parameter, so the whole chain
//! is drivable from tests without a runtime.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use conquest_core::{Constants, EventEnvelope, EventLevel, GameId, GameStatus};
use conquest_store::MemoryStore;
use parking_lot::Mutex;

/// Min-heap of `(fire_at_ms, game_id)` entries. Ties fire in id order.
#[derive(Default)]
pub struct TickQueue {
    heap: BinaryHeap<Reverse<(i64, String)>>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, fire_at_ms: i64, game_id: &GameId) {
        self.heap.push(Reverse((fire_at_ms, game_id.0.clone())));
    }

    /// Every entry due at or before `now_ms`, in firing order.
    pub fn pop_due(&mut self, now_ms: i64) -> Vec<GameId> {
        let mut due = Vec::new();
        while let Some(Reverse((fire_at_ms, _))) = self.heap.peek() {
            if *fire_at_ms > now_ms {
                break;
            }
            if let Some(Reverse((_, game_id))) = self.heap.pop() {
                due.push(GameId(game_id));
            }
        }
        due
    }

    pub fn next_fire_at_ms(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse((fire_at_ms, _))| *fire_at_ms)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

pub struct Ticker {
    store: Arc<MemoryStore>,
    queue: Mutex<TickQueue>,
    constants: Constants,
    event_level: EventLevel,
}

impl Ticker {
    pub fn new(store: Arc<MemoryStore>, constants: Constants, event_level: EventLevel) -> Self {
        Ticker {
            store,
            queue: Mutex::new(TickQueue::new()),
            constants,
            event_level,
        }
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// Begin a game's tick chain. Resets the tick counter, stamps the start
    /// time, moves the game to `InProgress`, and enqueues the first tick.
    ///
    /// Not idempotent: calling twice on one game forks the chain. The lobby
    /// collaborator calls this exactly once per game.
    pub fn start_game_tick(&self, game_id: &GameId, now_ms: i64) {
        let Some(mut state) = self.store.load_game(game_id) else {
            tracing::warn!(game = %game_id, "start requested for unknown game");
            return;
        };
        state.meta.status = GameStatus::InProgress;
        state.meta.current_tick = 0;
        state.meta.started_at_ms = Some(now_ms);
        state.meta.last_tick_at_ms = Some(now_ms);
        self.store.commit_game(state);

        self.queue
            .lock()
            .schedule(now_ms + self.constants.tick_interval_ms, game_id);
        tracing::info!(game = %game_id, "tick chain started");
    }

    /// Run one tick for one game and reschedule the chain.
    ///
    /// A missing or non-in-progress game silently terminates the chain —
    /// that is what makes duplicate and late-delivered callbacks safe.
    pub fn process_tick(&self, game_id: &GameId, now_ms: i64) -> Vec<EventEnvelope> {
        let Some(mut state) = self.store.load_game(game_id) else {
            tracing::debug!(game = %game_id, "tick for missing game dropped");
            return Vec::new();
        };
        if state.meta.status != GameStatus::InProgress {
            tracing::debug!(game = %game_id, status = ?state.meta.status, "tick for inactive game dropped");
            return Vec::new();
        }

        let outcome = conquest_core::tick(&mut state, now_ms, &self.constants, self.event_level);

        // Commit the staged document, then the cross-game increments.
        self.store.commit_game(state);
        self.store.apply_user_deltas(&outcome.user_stat_deltas);

        if outcome.reschedule {
            self.queue
                .lock()
                .schedule(now_ms + self.constants.tick_interval_ms, game_id);
        } else {
            tracing::info!(game = %game_id, "tick chain halted");
        }
        outcome.events
    }

    /// Drain the games due at `now_ms`. The driver loop processes each and
    /// lets `process_tick` re-enqueue survivors.
    pub fn take_due(&self, now_ms: i64) -> Vec<GameId> {
        self.queue.lock().pop_due(now_ms)
    }

    pub fn next_fire_at_ms(&self) -> Option<i64> {
        self.queue.lock().next_fire_at_ms()
    }
}
