//! Static evaluation.
//!
//! The evaluator keeps an incrementally updated accumulator of material and
//! piece-square terms. `Position::do_move` updates the accumulator for the
//! next ply in place, so a full recomputation only happens at the root of a
//! search (or when a position is set up from scratch).

mod pst;

pub use pst::{MATERIAL_EG, MATERIAL_MG, PHASE_WEIGHTS};

use crate::board::position::Position;
use crate::board::types::{Color, Piece, Square};
use crate::search::constants::Value;

/// Side-to-move bonus.
const TEMPO: Value = 10;

/// Full middlegame phase; tapering interpolates down to 0 (pure endgame).
const PHASE_MAX: i32 = 24;

/// Incrementally maintained evaluation state, from White's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Accumulator {
    mg: i32,
    eg: i32,
    phase: i32,
}

impl Accumulator {
    /// Recompute from scratch for a position.
    #[must_use]
    pub fn from_position(pos: &Position) -> Self {
        let mut acc = Accumulator::default();
        for idx in 0..64 {
            let sq = Square::from_index(idx);
            if let Some(piece) = pos.piece_on(sq) {
                acc.add_piece(piece, sq);
            }
        }
        acc
    }

    #[inline]
    pub fn add_piece(&mut self, piece: Piece, sq: Square) {
        let sign = match piece.color {
            Color::White => 1,
            Color::Black => -1,
        };
        let kind = piece.kind.index();
        self.mg += sign * (MATERIAL_MG[kind] + pst::pst_mg(piece.kind, piece.color, sq));
        self.eg += sign * (MATERIAL_EG[kind] + pst::pst_eg(piece.kind, piece.color, sq));
        self.phase += PHASE_WEIGHTS[kind];
    }

    #[inline]
    pub fn remove_piece(&mut self, piece: Piece, sq: Square) {
        let sign = match piece.color {
            Color::White => 1,
            Color::Black => -1,
        };
        let kind = piece.kind.index();
        self.mg -= sign * (MATERIAL_MG[kind] + pst::pst_mg(piece.kind, piece.color, sq));
        self.eg -= sign * (MATERIAL_EG[kind] + pst::pst_eg(piece.kind, piece.color, sq));
        self.phase -= PHASE_WEIGHTS[kind];
    }
}

/// Static evaluation from the side to move's perspective.
#[must_use]
pub fn evaluate(pos: &Position, acc: &Accumulator) -> Value {
    let phase = acc.phase.clamp(0, PHASE_MAX);
    let white_score = (acc.mg * phase + acc.eg * (PHASE_MAX - phase)) / PHASE_MAX;
    let relative = match pos.side_to_move {
        Color::White => white_score,
        Color::Black => -white_score,
    };
    relative + TEMPO
}
