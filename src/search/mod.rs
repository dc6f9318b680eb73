//! Search: iterative-deepening alpha-beta with a transposition table.
//!
//! Features:
//! - Iterative deepening with aspiration windows
//! - Negamax alpha-beta over Root/PV/NonPV nodes
//! - Quiescence search with stand-pat and SEE pruning
//! - Move ordering (TT move, MVV, killers, history)
//! - Null-move pruning, reverse futility, razoring, LMR, IIR
//! - Repetition and fifty-move draw detection with a small draw jitter
//! - Cooperative stop via a shared tri-state flag

pub mod constants;
mod iterative;
mod negamax;
mod ordering;
mod perft;
mod quiescence;
mod time;


use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;

use crate::board::types::{Color, Move, MoveList, MAX_MOVES, MOVE_NONE};
use crate::board::{movegen, Position};
use crate::eval::Accumulator;
use crate::tt::TranspositionTable;
use constants::{Value, MAX_PLY, STACK_OFFSET, VALUE_NONE};

pub use time::optimum_time;

/// Lifecycle of the search worker, shared with the UCI thread.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum SearchStatus {
    Idle = 0,
    Running = 1,
    StopPending = 2,
}

/// Shared tri-state flag. Relaxed ordering is enough: the only requirement
/// is that a stop request eventually becomes visible to the polling worker.
#[derive(Clone, Default)]
pub struct StatusFlag(Arc<AtomicU8>);

impl StatusFlag {
    #[must_use]
    pub fn new() -> Self {
        StatusFlag(Arc::new(AtomicU8::new(SearchStatus::Idle as u8)))
    }

    pub fn set(&self, status: SearchStatus) {
        self.0.store(status as u8, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> SearchStatus {
        match self.0.load(Ordering::Relaxed) {
            1 => SearchStatus::Running,
            2 => SearchStatus::StopPending,
            _ => SearchStatus::Idle,
        }
    }

    #[must_use]
    pub fn stop_pending(&self) -> bool {
        self.0.load(Ordering::Relaxed) == SearchStatus::StopPending as u8
    }

    /// Ask a running search to unwind.
    pub fn request_stop(&self) {
        self.set(SearchStatus::StopPending);
    }
}

/// Limits for one `go` command.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchLimits {
    /// Maximum iterative-deepening depth; 0 means no depth limit.
    pub depth: i32,
    /// Node budget; 0 means unlimited.
    pub nodes: u64,
    /// Fixed time for this move in milliseconds; 0 means unset.
    pub move_time: u64,
    /// Remaining clock time per color in milliseconds.
    pub time: [u64; 2],
    /// Increment per color in milliseconds.
    pub inc: [u64; 2],
    /// `go infinite`: ignore the clock entirely.
    pub infinite: bool,
}

impl SearchLimits {
    #[must_use]
    pub fn depth(depth: i32) -> Self {
        SearchLimits {
            depth,
            ..SearchLimits::default()
        }
    }

    #[must_use]
    pub fn has_time_limit(&self) -> bool {
        !self.infinite && (self.move_time > 0 || self.time[0] > 0 || self.time[1] > 0)
    }
}

/// Per-ply scratch state.
#[derive(Clone)]
pub(crate) struct SearchInfo {
    pub static_eval: Value,
    pub played_move: Move,
    pub killers: [Move; 2],
    pub pv: [Move; MAX_PLY],
    pub pv_len: usize,
}

impl Default for SearchInfo {
    fn default() -> Self {
        SearchInfo {
            static_eval: VALUE_NONE,
            played_move: MOVE_NONE,
            killers: [MOVE_NONE; 2],
            pv: [MOVE_NONE; MAX_PLY],
            pv_len: 0,
        }
    }
}

/// Result of one completed root iteration.
#[derive(Clone, Copy, Default)]
pub(crate) struct IterationResult {
    pub score: Value,
    pub best_move: Move,
    pub sel_depth: usize,
}

/// Late-move-reduction table, indexed by depth and move number.
pub(crate) static LMR_TABLE: Lazy<Box<[[i32; MAX_MOVES]; MAX_PLY]>> = Lazy::new(|| {
    let mut table = Box::new([[0i32; MAX_MOVES]; MAX_PLY]);
    for depth in 1..MAX_PLY {
        for move_idx in 1..MAX_MOVES {
            let reduction = 0.75 + (depth as f64).ln() * (move_idx as f64).ln() / 2.25;
            table[depth][move_idx] = reduction.floor() as i32;
        }
    }
    table
});

/// The engine's search state. One value owns everything a single-threaded
/// search mutates: position, stacks, tables and counters.
pub struct Search {
    pub position: Position,
    /// Zobrist keys of positions before this search, newest last; the last
    /// entry is the current (root) position.
    pub seen_keys: Vec<u64>,
    pub silent: bool,
    pub(crate) tt: TranspositionTable,
    pub(crate) limits: SearchLimits,
    pub(crate) status: StatusFlag,
    pub(crate) ply: usize,
    pub(crate) nodes: u64,
    pub(crate) sel_depth: usize,
    pub(crate) root_depth: i32,
    pub(crate) root_color: Color,
    pub(crate) root_moves: MoveList,
    pub(crate) pos_stack: Box<[Position]>,
    pub(crate) acc_stack: Box<[Accumulator]>,
    pub(crate) stack: Box<[SearchInfo]>,
    pub(crate) history: Box<[[i32; 4096]; 2]>,
    pub(crate) start_time: Instant,
    pub(crate) last_best_move: Move,
    pub(crate) last_score: Value,
}

impl Search {
    #[must_use]
    pub fn new(hash_mib: usize, status: StatusFlag) -> Self {
        let position = Position::startpos();
        Search {
            position,
            seen_keys: vec![position.key],
            silent: false,
            tt: TranspositionTable::new(hash_mib),
            limits: SearchLimits::default(),
            status,
            ply: 0,
            nodes: 0,
            sel_depth: 0,
            root_depth: 0,
            root_color: Color::White,
            root_moves: MoveList::new(),
            pos_stack: vec![position; MAX_PLY].into_boxed_slice(),
            acc_stack: vec![Accumulator::default(); MAX_PLY + 1].into_boxed_slice(),
            stack: vec![SearchInfo::default(); MAX_PLY + STACK_OFFSET].into_boxed_slice(),
            history: Box::new([[0; 4096]; 2]),
            start_time: Instant::now(),
            last_best_move: MOVE_NONE,
            last_score: 0,
        }
    }

    /// Install a new root position together with its key history.
    pub fn set_position(&mut self, position: Position, seen_keys: Vec<u64>) {
        self.position = position;
        self.seen_keys = seen_keys;
    }

    /// Forget everything learned: TT and history. Used by `ucinewgame`.
    pub fn clear_tables(&mut self) {
        self.tt.clear();
        for side in self.history.iter_mut() {
            side.fill(0);
        }
    }

    pub fn resize_tt(&mut self, mib: usize) {
        self.tt.resize(mib);
    }

    #[must_use]
    pub fn last_best_move(&self) -> Move {
        self.last_best_move
    }

    #[must_use]
    pub fn last_score(&self) -> Value {
        self.last_score
    }

    #[must_use]
    pub fn nodes_searched(&self) -> u64 {
        self.nodes
    }

    // ------------------------------------------------------------------
    // Make/unmake through per-ply snapshots
    // ------------------------------------------------------------------

    /// Snapshot the position and accumulator, then step one ply down.
    #[inline]
    pub(crate) fn push_position(&mut self) {
        self.pos_stack[self.ply] = self.position;
        self.acc_stack[self.ply + 1] = self.acc_stack[self.ply];
        self.ply += 1;
    }

    /// Step back up one ply, restoring the snapshot.
    #[inline]
    pub(crate) fn pop_position(&mut self) {
        self.ply -= 1;
        self.position = self.pos_stack[self.ply];
    }

    #[inline]
    pub(crate) fn play_move(&mut self, mv: Move, ss: usize) {
        self.count_node();
        self.stack[ss].played_move = mv;
        self.push_position();
        let ply = self.ply;
        self.position.do_move(mv, &mut self.acc_stack[ply]);
    }

    #[inline]
    pub(crate) fn play_null_move(&mut self, ss: usize) {
        self.count_node();
        self.stack[ss].played_move = MOVE_NONE;
        self.push_position();
        self.position.do_null_move();
    }

    #[inline]
    pub(crate) fn cancel_move(&mut self) {
        self.pop_position();
    }

    #[inline]
    fn count_node(&mut self) {
        self.nodes += 1;
        if self.nodes % constants::TIME_CHECK_INTERVAL == 0 {
            self.check_time();
        }
    }

    // ------------------------------------------------------------------
    // Draw handling
    // ------------------------------------------------------------------

    /// Draw score with a +-1 jitter so the search prefers positions that
    /// make progress over shuffling.
    #[inline]
    pub(crate) fn draw_value(&self) -> Value {
        (self.nodes % 3) as Value - 1
    }

    /// Two-fold repetition against the search path and the game history.
    /// Must not be called at the root.
    pub(crate) fn is_two_fold_repetition(&self) -> bool {
        if self.position.half_move_clock < 4 {
            return false;
        }

        let key = self.position.key;
        let mut idx = self.ply as isize - 2;
        while idx >= 0 {
            if self.pos_stack[idx as usize].key == key {
                return true;
            }
            idx -= 2;
        }

        // The last seen key is the root position itself, already covered by
        // the stack scan above.
        let prior = self.seen_keys.len().saturating_sub(1);
        self.seen_keys[..prior].iter().rev().any(|&k| k == key)
    }

    /// Legal root moves for the current position.
    pub(crate) fn generate_root_moves(&mut self) {
        let mut pseudo = MoveList::new();
        movegen::pseudo_legal_moves(&self.position, &mut pseudo);
        self.root_moves = MoveList::new();
        for &mv in pseudo.iter() {
            if self.position.is_legal(mv) {
                self.root_moves.push(mv);
            }
        }
    }
}
