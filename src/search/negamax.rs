//! Negamax alpha-beta with transposition table, pruning and reductions.

use crate::board::movegen;
use crate::board::types::{Move, MoveKind, MoveList, MAX_MOVES, MOVE_NONE};
use crate::eval;
use crate::tt::{flag_for, FLAG_EXACT, FLAG_LOWER, FLAG_UPPER, NO_FLAG};

use super::constants::{
    stat_bonus, Value, HISTORY_MAX, MAX_PLY, NULL_BASE_REDUCTION, NULL_EVAL_CAP,
    NULL_EVAL_DIVISOR, RAZOR_BASE, RAZOR_DEPTH_SCALE, RFP_DEPTH_MARGIN, RFP_IMPROVING_MARGIN,
    RFP_MAX_DEPTH, SEE_CAPTURE_SCALE, VALUE_DRAW, VALUE_INFINITE, VALUE_LOSS_IN_MAX_PLY,
    VALUE_MATE, VALUE_NONE, VALUE_WIN_IN_MAX_PLY,
};
use super::ordering::{self, from_to};
use super::{Search, LMR_TABLE};

/// Node kinds; the search is monomorphized over them so per-kind branches
/// fold away. Root nodes are PV nodes that also maintain `root_moves`.
pub(crate) const ROOT: usize = 0;
pub(crate) const PV: usize = 1;
pub(crate) const NON_PV: usize = 2;

impl Search {
    #[allow(clippy::too_many_lines)]
    pub(crate) fn negamax<const NT: usize>(
        &mut self,
        mut alpha: Value,
        mut beta: Value,
        mut depth: i32,
        cut_node: bool,
        ss: usize,
    ) -> Value {
        let pv_node = NT != NON_PV;
        let root_node = NT == ROOT;

        if pv_node {
            self.stack[ss].pv_len = self.ply;
            if self.ply > self.sel_depth {
                self.sel_depth = self.ply;
            }
        }

        if self.status.stop_pending() {
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

        self.stack[ss + 1].killers = [MOVE_NONE; 2];

        if !root_node {
            if self.is_two_fold_repetition() || self.position.half_move_clock >= 100 {
                return self.draw_value();
            }

            // Mate distance pruning: no line from here can beat an already
            // proven shorter mate.
            alpha = alpha.max(self.ply as Value - VALUE_MATE);
            beta = beta.min(VALUE_MATE - self.ply as Value - 1);
            if alpha >= beta {
                return alpha;
            }
        }

        let key = self.position.key;
        let (tt_entry, tt_hit) = self.tt.probe(key);
        let tt_flag = if tt_hit { tt_entry.flag } else { NO_FLAG };
        let tt_value = if tt_hit { tt_entry.value() } else { VALUE_NONE };
        let mut tt_move = if tt_hit { tt_entry.mv } else { MOVE_NONE };

        if root_node && tt_move == MOVE_NONE && !self.root_moves.is_empty() {
            tt_move = self.root_moves.get(0);
        }

        if in_check {
            depth = (depth + 1).max(1);
        }

        if !pv_node
            && tt_hit
            && i32::from(tt_entry.depth) >= depth
            && tt_flag.cuts(flag_for(tt_value >= beta))
        {
            return tt_value;
        }

        if depth <= 0 {
            return if pv_node {
                self.qsearch::<true>(alpha, beta, ss)
            } else {
                self.qsearch::<false>(alpha, beta, ss)
            };
        }

        let mut improving = false;
        let mut eval_value = VALUE_NONE;

        if in_check {
            // No usable eval in check; skip every pre-move pruning step.
            self.stack[ss].static_eval = VALUE_NONE;
        } else {
            eval_value = if tt_hit {
                tt_entry.static_eval()
            } else {
                eval::evaluate(&self.position, &self.acc_stack[self.ply])
            };
            self.stack[ss].static_eval = eval_value;

            if tt_flag.cuts(flag_for(tt_value > eval_value)) {
                eval_value = tt_value;
                self.stack[ss].static_eval = eval_value;
            }

            if self.stack[ss - 2].static_eval != VALUE_NONE {
                improving = self.stack[ss].static_eval > self.stack[ss - 2].static_eval;
            } else if self.stack[ss - 4].static_eval != VALUE_NONE {
                improving = self.stack[ss].static_eval > self.stack[ss - 4].static_eval;
            }

            // Razoring: eval is hopeless, verify with a quiescence probe.
            if eval_value < alpha - RAZOR_BASE - RAZOR_DEPTH_SCALE * depth {
                let value = self.qsearch::<false>(alpha - 1, alpha, ss);
                if value < alpha {
                    return value;
                }
            }

            // Reverse futility: eval is so far above beta that a real search
            // is unlikely to come back under it.
            if !pv_node
                && depth < RFP_MAX_DEPTH
                && eval_value.abs() < VALUE_WIN_IN_MAX_PLY
                && eval_value >= beta
                && eval_value + RFP_IMPROVING_MARGIN * Value::from(improving)
                    - RFP_DEPTH_MARGIN * depth
                    >= beta
            {
                return eval_value;
            }

            // Null-move pruning: hand over the move and search reduced.
            if !pv_node
                && self.stack[ss - 1].played_move != MOVE_NONE
                && eval_value >= beta
                && self.position.has_non_pawns(self.position.side_to_move)
                && beta > VALUE_LOSS_IN_MAX_PLY
            {
                let reduction = ((eval_value - beta) / NULL_EVAL_DIVISOR).min(NULL_EVAL_CAP)
                    + depth / 3
                    + NULL_BASE_REDUCTION;

                self.play_null_move(ss);
                let null_value =
                    -self.negamax::<NON_PV>(-beta, -beta + 1, depth - reduction, !cut_node, ss + 1);
                self.cancel_move();

                if null_value >= beta && null_value.abs() < VALUE_WIN_IN_MAX_PLY {
                    return null_value;
                }
            }

            // Internal iterative reduction: a cut node without a TT move is
            // not worth the full depth.
            if cut_node && depth >= 4 && tt_move == MOVE_NONE {
                depth -= 2;
            }
        }

        let was_in_check = in_check;

        let mut moves;
        if root_node {
            moves = self.root_moves.clone();
            for idx in 0..self.root_moves.len() {
                self.root_moves.set_score(idx, -VALUE_INFINITE);
            }
        } else {
            moves = MoveList::new();
            movegen::pseudo_legal_moves(&self.position, &mut moves);
            self.score_moves(&mut moves, tt_move, ss);
        }

        let mut found_legal = false;
        let mut played_moves: i32 = 0;
        let mut best_move = MOVE_NONE;
        let mut best_value = -VALUE_INFINITE;

        for idx in 0..moves.len() {
            let mv = ordering::next_best_move(&mut moves, idx);

            if !self.position.is_legal(mv) {
                continue;
            }
            found_legal = true;

            // SEE pruning of plainly losing captures, once any line is safe.
            if !root_node && best_value > VALUE_LOSS_IN_MAX_PLY {
                let capture = matches!(mv.kind(), MoveKind::Normal)
                    && self.position.piece_on(mv.dest()).is_some();
                if capture && !self.position.see_ge(mv, SEE_CAPTURE_SCALE * depth) {
                    continue;
                }
            }

            self.play_move(mv, ss);

            let mut value = VALUE_DRAW;
            let need_full_search;

            // Late move reductions: late, quietly-ordered moves get a
            // shallower zero-window look first.
            if !was_in_check && depth >= 3 && played_moves > 1 + 2 * Value::from(pv_node) {
                let depth_idx = (depth as usize).min(MAX_PLY - 1);
                let move_idx = ((played_moves + 1) as usize).min(MAX_MOVES - 1);
                let mut reduction = LMR_TABLE[depth_idx][move_idx];
                reduction += i32::from(!improving);
                reduction -= i32::from(pv_node);

                // Clamp so the child neither drops to quiescence nor extends.
                let reduced_depth = (depth - reduction).clamp(1, depth + 1);

                value = -self.negamax::<NON_PV>(-alpha - 1, -alpha, reduced_depth, true, ss + 1);
                need_full_search = value > alpha && reduced_depth < depth;
            } else {
                need_full_search = !pv_node || played_moves >= 1;
            }

            if need_full_search {
                value = -self.negamax::<NON_PV>(-alpha - 1, -alpha, depth - 1, !cut_node, ss + 1);
            }

            if pv_node && (played_moves == 0 || value > alpha) {
                value = -self.negamax::<PV>(-beta, -alpha, depth - 1, false, ss + 1);
            }

            self.cancel_move();

            played_moves += 1;

            if root_node {
                if let Some(root_idx) = self.root_moves.index_of(mv) {
                    self.root_moves.set_score(root_idx, value);
                }
            }

            if value > best_value {
                best_value = value;

                if best_value > alpha {
                    best_move = mv;

                    // Always taken on NonPV nodes.
                    if best_value >= beta {
                        break;
                    }

                    alpha = best_value;
                    self.update_pv(ss, best_move);
                }
            }
        }

        if !found_legal {
            return if was_in_check {
                self.ply as Value - VALUE_MATE
            } else {
                VALUE_DRAW
            };
        }

        if best_move != MOVE_NONE && self.position.is_quiet(best_move) {
            let bonus = if best_value > beta + 150 {
                stat_bonus(depth + 1)
            } else {
                stat_bonus(depth)
            };

            let stm = self.position.side_to_move.index();
            let entry = &mut self.history[stm][from_to(best_move)];
            *entry = (*entry + bonus).clamp(-HISTORY_MAX, HISTORY_MAX);

            if best_move != self.stack[ss].killers[0] {
                self.stack[ss].killers[1] = self.stack[ss].killers[0];
                self.stack[ss].killers[0] = best_move;
            }
        }

        let flag = if best_value >= beta {
            FLAG_LOWER
        } else if pv_node && best_move != MOVE_NONE {
            FLAG_EXACT
        } else {
            FLAG_UPPER
        };
        self.tt.store(
            key,
            flag,
            depth,
            best_move,
            best_value,
            self.stack[ss].static_eval,
        );

        best_value
    }

    /// Prepend `mv` to the child's principal variation.
    pub(crate) fn update_pv(&mut self, ss: usize, mv: Move) {
        let ply = self.ply;
        let (head, tail) = self.stack.split_at_mut(ss + 1);
        let parent = &mut head[ss];
        let child = &tail[0];

        parent.pv[ply] = mv;
        for idx in ply + 1..child.pv_len {
            parent.pv[idx] = child.pv[idx];
        }
        parent.pv_len = child.pv_len;
    }
}
