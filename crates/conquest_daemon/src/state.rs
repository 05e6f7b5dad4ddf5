use conquest_core::EventEnvelope;
use conquest_store::MemoryStore;
use conquest_ticker::Ticker;
use parking_lot::Mutex;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tokio::sync::broadcast;

pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub ticker: Arc<Ticker>,
    pub event_tx: EventTx,
    /// Seeded generator for match ids, shared so concurrent creates stay unique.
    pub id_rng: Arc<Mutex<ChaCha8Rng>>,
    pub map_radius: i32,
}

/// Wall-clock milliseconds since the Unix epoch, the time base for tick
/// scheduling and movement arrival stamps.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
