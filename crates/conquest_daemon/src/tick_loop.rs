use crate::state::{now_ms, EventTx};
use conquest_ticker::Ticker;
use std::sync::Arc;
use std::time::Duration;

/// Ceiling on how long the driver sleeps between polls, so matches started
/// while the queue is empty are picked up within one interval.
const IDLE_POLL_MS: i64 = 250;

pub async fn run_tick_loop(ticker: Arc<Ticker>, event_tx: EventTx) {
    loop {
        let now = now_ms();
        for game_id in ticker.take_due(now) {
            let events = ticker.process_tick(&game_id, now);
            if !events.is_empty() {
                let _ = event_tx.send(events);
            }
        }

        let sleep_ms = match ticker.next_fire_at_ms() {
            Some(fire_at) => (fire_at - now_ms()).clamp(1, IDLE_POLL_MS),
            None => IDLE_POLL_MS,
        };
        tokio::time::sleep(Duration::from_millis(sleep_ms as u64)).await;
    }
}
