//! `conquest_core` — deterministic per-game simulation tick.
//!
//! No IO, no network, no ambient clock: callers pass `now_ms` in epoch
//! milliseconds and apply the returned writes themselves.

mod capture;
mod economy;
mod elimination;
mod engine;
pub mod movement;
mod spawn;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use engine::tick;
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
