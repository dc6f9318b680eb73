//! Zobrist keys for position hashing.
//!
//! Keys come from a fixed-seed PRNG so hashes are stable across runs,
//! which keeps transposition-table behavior reproducible in tests.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{Piece, Square};

const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

struct Keys {
    pieces: [[[u64; 64]; 6]; 2],
    castling: [u64; 16],
    en_passant_file: [u64; 8],
    side: u64,
}

static KEYS: Lazy<Keys> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
    let mut keys = Keys {
        pieces: [[[0; 64]; 6]; 2],
        castling: [0; 16],
        en_passant_file: [0; 8],
        side: 0,
    };
    for color in &mut keys.pieces {
        for piece in color.iter_mut() {
            for sq in piece.iter_mut() {
                *sq = rng.gen();
            }
        }
    }
    for key in &mut keys.castling {
        *key = rng.gen();
    }
    for key in &mut keys.en_passant_file {
        *key = rng.gen();
    }
    keys.side = rng.gen();
    keys
});

#[inline]
#[must_use]
pub fn piece(piece: Piece, sq: Square) -> u64 {
    KEYS.pieces[piece.color.index()][piece.kind.index()][sq.index()]
}

#[inline]
#[must_use]
pub fn castling(rights: u8) -> u64 {
    KEYS.castling[(rights & 15) as usize]
}

#[inline]
#[must_use]
pub fn en_passant_file(file: usize) -> u64 {
    KEYS.en_passant_file[file & 7]
}

#[inline]
#[must_use]
pub fn side_to_move() -> u64 {
    KEYS.side
}
