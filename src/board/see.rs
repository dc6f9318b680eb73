//! Static exchange evaluation in threshold form.
//!
//! `see_ge` plays out the capture sequence on the destination square with
//! both sides always recapturing with their least valuable attacker, adding
//! x-ray attackers as sliders are removed.

use super::attacks::{bishop_attacks, rook_attacks};
use super::position::Position;
use super::types::{Bitboard, Move, MoveKind, PieceType};
use crate::search::constants::Value;

impl Position {
    /// True if the static exchange outcome of `mv` is at least `threshold`
    /// centipawns for the side to move.
    #[must_use]
    pub fn see_ge(&self, mv: Move, threshold: Value) -> bool {
        // Castling, en passant and promotions get the neutral answer.
        if !matches!(mv.kind(), MoveKind::Normal) {
            return 0 >= threshold;
        }

        let from = mv.src();
        let to = mv.dest();

        let mut swap = self.piece_on(to).map_or(0, |p| p.kind.value()) - threshold;
        if swap < 0 {
            return false;
        }
        let Some(moving) = self.piece_on(from) else {
            return false;
        };
        swap = moving.kind.value() - swap;
        if swap <= 0 {
            return true;
        }

        let mut occ =
            self.occupied() ^ Bitboard::from_square(from) ^ Bitboard::from_square(to);
        let mut attackers = self.attackers_to(to, occ) & occ;
        let mut stm = self.side_to_move;
        let mut res = 1i32;

        let diag_sliders =
            self.kind_bb(PieceType::Bishop) | self.kind_bb(PieceType::Queen);
        let straight_sliders =
            self.kind_bb(PieceType::Rook) | self.kind_bb(PieceType::Queen);

        loop {
            stm = !stm;
            attackers &= occ;
            let stm_attackers = attackers & self.color_bb(stm);
            if stm_attackers.is_empty() {
                break;
            }
            res ^= 1;

            let (kind, attacker) = least_valuable(self, stm_attackers);
            if kind == PieceType::King {
                // The king may only recapture if nothing can recapture it.
                if (attackers & self.color_bb(!stm)).any() {
                    return (res ^ 1) != 0;
                }
                return res != 0;
            }

            swap = kind.value() - swap;
            if swap < res {
                break;
            }

            occ ^= Bitboard::from_square(attacker);
            match kind {
                PieceType::Pawn | PieceType::Bishop => {
                    attackers |= bishop_attacks(to, occ) & diag_sliders;
                }
                PieceType::Rook => {
                    attackers |= rook_attacks(to, occ) & straight_sliders;
                }
                PieceType::Queen => {
                    attackers |= (bishop_attacks(to, occ) & diag_sliders)
                        | (rook_attacks(to, occ) & straight_sliders);
                }
                _ => {}
            }
        }

        res != 0
    }
}

fn least_valuable(pos: &Position, attackers: Bitboard) -> (PieceType, super::types::Square) {
    for kind in PieceType::ALL {
        let candidates = attackers & pos.kind_bb(kind);
        if candidates.any() {
            return (kind, candidates.lsb());
        }
    }
    // Unreachable for a non-empty attacker set.
    (PieceType::King, attackers.lsb())
}
