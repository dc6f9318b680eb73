//! Quiescence search: resolve tactical sequences before trusting the eval.

use crate::board::movegen;
use crate::board::types::{MoveList, MOVE_NONE};
use crate::eval;
use crate::tt::{flag_for, FLAG_EXACT, FLAG_LOWER, FLAG_UPPER, NO_FLAG};

use super::constants::{
    Value, MAX_PLY, QS_SEE_THRESHOLD, VALUE_INFINITE, VALUE_MATE, VALUE_NONE,
};
use super::{ordering, Search};

impl Search {
    /// Search only noisy moves (all moves while in check) until the position
    /// is quiet, standing pat on the static eval otherwise.
    pub(crate) fn qsearch<const PV_NODE: bool>(
        &mut self,
        mut alpha: Value,
        beta: Value,
        ss: usize,
    ) -> Value {
        if self.position.half_move_clock >= 100 {
            return self.draw_value();
        }

        let in_check = self.position.checkers.any();

        if self.ply >= MAX_PLY - 1 {
            return if in_check {
                self.draw_value()
            } else {
                eval::evaluate(&self.position, &self.acc_stack[self.ply])
            };
        }

        let key = self.position.key;
        let (tt_entry, tt_hit) = self.tt.probe(key);
        let tt_flag = if tt_hit { tt_entry.flag } else { NO_FLAG };
        let tt_value = if tt_hit { tt_entry.value() } else { VALUE_NONE };
        let tt_move = if tt_hit { tt_entry.mv } else { MOVE_NONE };

        if !PV_NODE && tt_flag.cuts(flag_for(tt_value >= beta)) {
            return tt_value;
        }

        let mut best_move = MOVE_NONE;
        let mut best_value;
        let eval_value;
        let old_alpha = alpha;

        if in_check {
            best_value = -VALUE_INFINITE;
            eval_value = VALUE_NONE;
        } else {
            eval_value = if tt_hit {
                tt_entry.static_eval()
            } else {
                eval::evaluate(&self.position, &self.acc_stack[self.ply])
            };
            best_value = eval_value;

            if tt_flag.cuts(flag_for(tt_value > best_value)) {
                best_value = tt_value;
            }

            // Stand pat.
            if best_value >= beta {
                return best_value;
            }
            if best_value > alpha {
                alpha = best_value;
            }
        }

        let mut moves = MoveList::new();
        if in_check {
            movegen::pseudo_legal_moves(&self.position, &mut moves);
        } else {
            movegen::aggressive_moves(&self.position, &mut moves);
        }
        self.score_moves(&mut moves, tt_move, ss);

        let mut found_legal = false;

        for idx in 0..moves.len() {
            let mv = ordering::next_best_move(&mut moves, idx);
            if !self.position.is_legal(mv) {
                continue;
            }
            found_legal = true;

            // Outside check, losing captures are not worth resolving.
            if !in_check && !self.position.see_ge(mv, QS_SEE_THRESHOLD) {
                continue;
            }

            self.play_move(mv, ss);
            let value = -self.qsearch::<PV_NODE>(-beta, -alpha, ss + 1);
            self.cancel_move();

            if value > best_value {
                best_value = value;

                if best_value > alpha {
                    best_move = mv;

                    // With a null window, value > alpha already means >= beta.
                    if !PV_NODE || best_value >= beta {
                        self.tt
                            .store(key, FLAG_LOWER, 0, best_move, best_value, eval_value);
                        return best_value;
                    }

                    alpha = best_value;
                }
            }
        }

        if in_check && !found_legal {
            return self.ply as Value - VALUE_MATE;
        }

        let flag = if alpha > old_alpha { FLAG_EXACT } else { FLAG_UPPER };
        self.tt
            .store(key, flag, 0, best_move, best_value, eval_value);

        best_value
    }
}
