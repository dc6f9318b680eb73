//! Iterative-deepening driver with aspiration windows.

use std::time::Instant;

use crate::board::types::{Move, MOVE_NONE};
use crate::eval::Accumulator;
use crate::uci::report;

use super::constants::{
    ASPIRATION_MIN_DEPTH, ASPIRATION_WINDOW, HISTORY_DECAY, MAX_PLY, STABILITY_MAX, STACK_OFFSET,
    VALUE_INFINITE, VALUE_MATE_IN_MAX_PLY,
};
use super::negamax::ROOT;
use super::time::optimum_time;
use super::{IterationResult, Search, SearchInfo, SearchLimits};

impl Search {
    /// Run a full search for the current position under `limits` and return
    /// the chosen move. Emits `info` lines per completed iteration and a
    /// final `bestmove` unless `silent` is set.
    pub fn start_search(&mut self, limits: SearchLimits) -> Move {
        self.start_time = Instant::now();
        self.limits = limits;
        self.root_color = self.position.side_to_move;
        self.ply = 0;
        self.nodes = 0;
        self.sel_depth = 0;

        let optimum = optimum_time(&limits, self.root_color);

        // Old history fades but is not forgotten between moves.
        for side in self.history.iter_mut() {
            for entry in side.iter_mut() {
                *entry /= HISTORY_DECAY;
            }
        }

        for info in self.stack.iter_mut() {
            *info = SearchInfo::default();
        }
        self.acc_stack[0] = Accumulator::from_position(&self.position);

        self.generate_root_moves();
        let ss = STACK_OFFSET;
        let mut root_moves = std::mem::take(&mut self.root_moves);
        self.score_moves(&mut root_moves, MOVE_NONE, ss);
        self.root_moves = root_moves;

        let max_depth = if self.limits.depth <= 0 {
            (MAX_PLY - 1) as i32
        } else {
            self.limits.depth.min((MAX_PLY - 1) as i32)
        };

        let mut iterations = vec![IterationResult::default(); MAX_PLY + 1];
        let mut best_move = MOVE_NONE;
        let mut stability: i32 = 0;

        'deepening: for root_depth in 1..=max_depth {
            self.root_depth = root_depth;

            if self.limits.nodes > 0 && self.nodes >= self.limits.nodes {
                break;
            }
            self.sel_depth = 0;

            let mut score;
            if root_depth >= ASPIRATION_MIN_DEPTH {
                let previous = iterations[(root_depth - 1) as usize].score;
                let mut window = ASPIRATION_WINDOW;
                let mut alpha = previous - window;
                let mut beta = previous + window;
                let mut failed_high: i32 = 0;

                loop {
                    // Fail-highs restart slightly shallower; the re-search is
                    // cheap and the verified move usually stands.
                    let adjusted_depth = (root_depth - failed_high).max(1);
                    score = self.negamax::<ROOT>(alpha, beta, adjusted_depth, false, ss);

                    if self.status.stop_pending() {
                        break 'deepening;
                    }
                    if self.limits.nodes > 0 && self.nodes >= self.limits.nodes {
                        // Report the partial iteration before stopping.
                        break;
                    }

                    if score >= VALUE_MATE_IN_MAX_PLY {
                        beta = VALUE_INFINITE;
                        failed_high = 0;
                    }

                    if score <= alpha {
                        beta = (alpha + beta) / 2;
                        alpha = (alpha - window).max(-VALUE_INFINITE);
                        failed_high = 0;
                    } else if score >= beta {
                        beta = (beta + window).min(VALUE_INFINITE);
                        failed_high += 1;
                    } else {
                        break;
                    }

                    window += window / 3;
                }
            } else {
                score = self.negamax::<ROOT>(-VALUE_INFINITE, VALUE_INFINITE, root_depth, false, ss);
            }

            // A stopped iteration may be arbitrarily wrong; keep the result
            // of the last completed one.
            if self.status.stop_pending() {
                break 'deepening;
            }

            best_move = self.stack[ss].pv[0];
            iterations[root_depth as usize] = IterationResult {
                score,
                best_move,
                sel_depth: self.sel_depth,
            };
            self.last_score = score;

            let elapsed = self.start_time.elapsed().as_millis() as u64;
            if !self.silent {
                report::print_info(
                    self.root_depth,
                    self.sel_depth,
                    score,
                    self.nodes,
                    elapsed,
                    &self.pv_string(ss),
                );
            }

            stability = if best_move == iterations[(root_depth - 1) as usize].best_move {
                (stability + 1).min(STABILITY_MAX)
            } else {
                0
            };

            // A forced mate for us is final. Keep searching while getting
            // mated; pruning may have hidden an escape.
            if score >= VALUE_MATE_IN_MAX_PLY {
                break;
            }

            if self.limits.has_time_limit() && root_depth >= 4 {
                if root_depth >= 40 && score.abs() < 5 {
                    break;
                }
                let scale = 1.0 - 0.05 * f64::from(stability);
                if elapsed as f64 > scale * optimum as f64 {
                    break;
                }
            }
        }

        if best_move == MOVE_NONE && !self.root_moves.is_empty() {
            best_move = self.root_moves.get(0);
        }
        self.last_best_move = best_move;

        if !self.silent {
            report::print_bestmove(best_move);
        }

        best_move
    }

    fn pv_string(&self, ss: usize) -> String {
        let info = &self.stack[ss];
        let mut out = String::new();
        for &mv in info.pv.iter().take(info.pv_len) {
            if mv == MOVE_NONE {
                break;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&mv.to_string());
        }
        out
    }

    /// Principal variation of the last completed iteration.
    #[must_use]
    pub fn pv_moves(&self) -> Vec<Move> {
        let info = &self.stack[STACK_OFFSET];
        info.pv
            .iter()
            .take(info.pv_len)
            .copied()
            .take_while(|&mv| mv != MOVE_NONE)
            .collect()
    }
}
