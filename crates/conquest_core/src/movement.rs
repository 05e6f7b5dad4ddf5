//! Movement math shared by armies and covert agents.
//!
//! Pure total functions over epoch-millisecond timestamps — no state, safe
//! to call any number of times. The one sharp edge: `progress` divides by
//! the transit duration, so callers must treat a zero-length path as
//! "already arrived" instead of calling it (see `capture`).

/// Milliseconds to traverse one tile. Every mobile entity type shares this
/// value — a balance decision, not an incidental constant.
pub const TILE_TRAVEL_MS: i64 = 10_000;

/// Total transit duration for a path of `path_len` tiles.
pub fn travel_time_ms(path_len: usize) -> i64 {
    path_len as i64 * TILE_TRAVEL_MS
}

/// Fraction of the transit interval elapsed, clamped to `[0, 1]`.
///
/// Time-based, not distance-based. Degenerate when `arrival == departure`;
/// callers avoid that case rather than this function trapping it.
pub fn progress(departure_ms: i64, arrival_ms: i64, now_ms: i64) -> f64 {
    let fraction = (now_ms - departure_ms) as f64 / (arrival_ms - departure_ms) as f64;
    fraction.clamp(0.0, 1.0)
}

/// The path index the entity currently occupies while in transit.
///
/// Always a valid index into the path, even at `progress == 1.0` where it
/// pins to the last tile.
pub fn current_path_index(progress: f64, path_len: usize) -> usize {
    if path_len == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (progress * path_len as f64).floor() as usize;
    index.min(path_len - 1)
}

/// Path index for cancellation, deliberately unclamped at the upper bound.
///
/// May equal `path_len`, signaling "already arrived" — distinct from
/// [`current_path_index`], which always points at a traversable tile.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cancel_path_index(progress: f64, path_len: usize) -> usize {
    (progress * path_len as f64).floor() as usize
}

/// True once the arrival time has been reached, boundary inclusive.
pub fn is_complete(now_ms: i64, arrival_ms: i64) -> bool {
    now_ms >= arrival_ms
}

pub fn elapsed_ms(departure_ms: i64, now_ms: i64) -> i64 {
    now_ms - departure_ms
}

/// Time left in transit, floored at zero.
pub fn remaining_ms(now_ms: i64, arrival_ms: i64) -> i64 {
    (arrival_ms - now_ms).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_time_is_linear_in_path_length() {
        assert_eq!(travel_time_ms(0), 0);
        assert_eq!(travel_time_ms(1), 10_000);
        assert_eq!(travel_time_ms(5), 50_000);
        for n in 0..20 {
            assert_eq!(travel_time_ms(2 * n), 2 * travel_time_ms(n));
        }
    }

    #[test]
    fn progress_spans_zero_to_one_and_clamps_outside() {
        assert!((progress(0, 10_000, 0) - 0.0).abs() < 1e-12);
        assert!((progress(0, 10_000, 5_000) - 0.5).abs() < 1e-12);
        assert!((progress(0, 10_000, 10_000) - 1.0).abs() < 1e-12);
        // Before departure and far past arrival stay clamped.
        assert!((progress(0, 10_000, -5_000) - 0.0).abs() < 1e-12);
        assert!((progress(0, 10_000, 900_000) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn progress_is_monotonic_in_now() {
        let mut last = -1.0;
        for now in (0..=50_000).step_by(500) {
            let p = progress(0, 50_000, now);
            assert!(p >= last, "progress regressed at now={now}");
            last = p;
        }
    }

    #[test]
    fn current_index_stays_within_path_bounds() {
        for path_len in 1..=10 {
            assert_eq!(current_path_index(0.0, path_len), 0);
            assert_eq!(current_path_index(1.0, path_len), path_len - 1);
            let mut p = 0.0;
            while p <= 1.0 {
                let index = current_path_index(p, path_len);
                assert!(index < path_len);
                p += 0.01;
            }
        }
    }

    #[test]
    fn cancel_index_is_unclamped_at_arrival() {
        for path_len in 1..=10 {
            assert_eq!(cancel_path_index(0.0, path_len), 0);
            assert_eq!(cancel_path_index(1.0, path_len), path_len);
            // Anywhere strictly before arrival it stays below path_len.
            assert!(cancel_path_index(0.999, path_len) < path_len);
        }
    }

    #[test]
    fn completion_is_boundary_inclusive() {
        assert!(!is_complete(9_999, 10_000));
        assert!(is_complete(10_000, 10_000));
        assert!(is_complete(10_001, 10_000));
    }

    #[test]
    fn elapsed_and_remaining() {
        assert_eq!(elapsed_ms(1_000, 4_000), 3_000);
        assert_eq!(remaining_ms(4_000, 10_000), 6_000);
        assert_eq!(remaining_ms(10_000, 10_000), 0);
        assert_eq!(remaining_ms(12_000, 10_000), 0, "remaining never negative");
    }

    #[test]
    fn five_tile_path_at_midpoint() {
        // Path length 5, departure 0, arrival 50000; halfway through.
        let arrival = travel_time_ms(5);
        let p = progress(0, arrival, 25_000);
        assert!((p - 0.5).abs() < 1e-12);
        assert_eq!(current_path_index(p, 5), 2);
    }

    #[test]
    fn eight_tile_path_at_exact_arrival() {
        // Path length 8, departure 1000, arrival 81000; exactly at arrival
        // the current index is the last valid tile, not 8.
        let departure = 1_000;
        let arrival = departure + travel_time_ms(8);
        assert_eq!(arrival, 81_000);
        let p = progress(departure, arrival, arrival);
        assert!((p - 1.0).abs() < 1e-12);
        assert_eq!(current_path_index(p, 8), 7);
        assert_eq!(cancel_path_index(p, 8), 8);
        assert!(is_complete(arrival, arrival));
    }
}
