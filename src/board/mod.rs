//! Board representation: types, attacks, position state, move generation.

pub mod attacks;
pub mod fen;
pub mod movegen;
pub mod position;
mod see;
pub mod types;
pub mod zobrist;

#[cfg(test)]
mod tests;

pub use fen::FenError;
pub use position::Position;
pub use types::{
    Bitboard, Color, Move, MoveKind, MoveList, Piece, PieceType, Square, MAX_MOVES, MOVE_NONE,
};
