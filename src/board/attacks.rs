//! Precomputed attack tables and classical sliding-attack lookups.
//!
//! Sliding attacks use blocker-truncated rays rather than magic bitboards:
//! the ray past the first blocker is masked away per direction.

use once_cell::sync::Lazy;

use super::types::{Bitboard, Color, Square};

/// Ray directions. The first four increase the square index, the rest decrease it.
const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),   // north
    (1, 1),   // north-east
    (1, 0),   // east
    (-1, 1),  // north-west
    (0, -1),  // south
    (-1, -1), // south-west
    (-1, 0),  // west
    (1, -1),  // south-east
];

const NORTH: usize = 0;
const NORTH_EAST: usize = 1;
const EAST: usize = 2;
const NORTH_WEST: usize = 3;
const SOUTH: usize = 4;
const SOUTH_WEST: usize = 5;
const WEST: usize = 6;
const SOUTH_EAST: usize = 7;

fn walk(sq: Square, df: i32, dr: i32) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    let mut file = sq.file() as i32 + df;
    let mut rank = sq.rank() as i32 + dr;
    while (0..8).contains(&file) && (0..8).contains(&rank) {
        bb.set(Square::new(file as usize, rank as usize));
        file += df;
        rank += dr;
    }
    bb
}

static RAYS: Lazy<Box<[[Bitboard; 64]; 8]>> = Lazy::new(|| {
    let mut rays = Box::new([[Bitboard::EMPTY; 64]; 8]);
    for (dir, &(df, dr)) in DIRECTIONS.iter().enumerate() {
        for idx in 0..64 {
            rays[dir][idx] = walk(Square::from_index(idx), df, dr);
        }
    }
    rays
});

pub static KNIGHT_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let jumps = [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
    let mut table = [Bitboard::EMPTY; 64];
    for (idx, entry) in table.iter_mut().enumerate() {
        let sq = Square::from_index(idx);
        for (df, dr) in jumps {
            let file = sq.file() as i32 + df;
            let rank = sq.rank() as i32 + dr;
            if (0..8).contains(&file) && (0..8).contains(&rank) {
                entry.set(Square::new(file as usize, rank as usize));
            }
        }
    }
    table
});

pub static KING_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut table = [Bitboard::EMPTY; 64];
    for (idx, entry) in table.iter_mut().enumerate() {
        let sq = Square::from_index(idx);
        for (df, dr) in DIRECTIONS {
            let file = sq.file() as i32 + df;
            let rank = sq.rank() as i32 + dr;
            if (0..8).contains(&file) && (0..8).contains(&rank) {
                entry.set(Square::new(file as usize, rank as usize));
            }
        }
    }
    table
});

/// Squares attacked by a pawn of the given color standing on the square.
pub static PAWN_ATTACKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        for (color, dr) in [(Color::White, 1), (Color::Black, -1)] {
            for df in [-1, 1] {
                let file = sq.file() as i32 + df;
                let rank = sq.rank() as i32 + dr;
                if (0..8).contains(&file) && (0..8).contains(&rank) {
                    table[color.index()][idx].set(Square::new(file as usize, rank as usize));
                }
            }
        }
    }
    table
});

#[inline]
fn ray_attack(dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir][sq.index()];
    let blockers = ray & occupied;
    if blockers.is_empty() {
        return ray;
    }
    // Nearest blocker: lowest bit for rising rays, highest for falling ones.
    let blocker = if dir < 4 { blockers.lsb() } else { blockers.msb() };
    ray & !RAYS[dir][blocker.index()]
}

#[inline]
#[must_use]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attack(NORTH_EAST, sq, occupied)
        | ray_attack(NORTH_WEST, sq, occupied)
        | ray_attack(SOUTH_EAST, sq, occupied)
        | ray_attack(SOUTH_WEST, sq, occupied)
}

#[inline]
#[must_use]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attack(NORTH, sq, occupied)
        | ray_attack(SOUTH, sq, occupied)
        | ray_attack(EAST, sq, occupied)
        | ray_attack(WEST, sq, occupied)
}

#[inline]
#[must_use]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}
