//! Time budget and cooperative stop checks.

use crate::board::types::Color;

use super::{Search, SearchLimits};

/// Safety margin subtracted from every deadline, in milliseconds.
const OVERHEAD_MS: f64 = 10.0;

impl Search {
    /// Called every `TIME_CHECK_INTERVAL` nodes from the make-move path.
    /// Requests a stop once the hard budget for this move is spent.
    pub(crate) fn check_time(&self) {
        if !self.limits.has_time_limit() {
            return;
        }

        let elapsed = self.start_time.elapsed().as_millis() as f64;

        if self.limits.move_time > 0 {
            if elapsed >= self.limits.move_time as f64 - OVERHEAD_MS {
                self.status.request_stop();
            }
            return;
        }

        // Never burn more than 70-80% of the remaining clock on one move.
        let color = self.root_color.index();
        let mut fraction = 0.7;
        if self.limits.inc[color] > 0 {
            fraction += 0.1;
        }
        if elapsed >= fraction * self.limits.time[color] as f64 - OVERHEAD_MS {
            self.status.request_stop();
        }
    }
}

/// Soft time target for one move. The driver stops starting new iterations
/// once this much time has passed, scaled down while the best move is stable.
#[must_use]
pub fn optimum_time(limits: &SearchLimits, color: Color) -> u64 {
    if limits.move_time > 0 {
        return limits.move_time;
    }
    let time = limits.time[color.index()];
    let inc = limits.inc[color.index()];
    if time == 0 {
        return u64::MAX;
    }
    // Spread the clock over a generic remaining-moves estimate, banking most
    // of the increment.
    let base = time / 25 + inc * 3 / 4;
    base.clamp(1, time * 8 / 10)
}
