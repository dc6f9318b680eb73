//! Perft: exhaustive legal-move counting through the search's own
//! make/unmake machinery, so it doubles as a snapshot-stack test.

use crate::board::movegen;
use crate::board::types::MoveList;
use crate::eval::Accumulator;

impl super::Search {
    /// Number of leaf nodes at the given depth from the current position.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        self.perft_inner(depth)
    }

    /// Perft with per-root-move counts printed, as GUIs expect.
    pub fn perft_divide(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let mut moves = MoveList::new();
        movegen::pseudo_legal_moves(&self.position, &mut moves);

        let mut total = 0;
        for &mv in moves.iter() {
            if !self.position.is_legal(mv) {
                continue;
            }
            let nodes = if depth == 1 {
                1
            } else {
                self.push_position();
                let mut scratch = Accumulator::default();
                self.position.do_move(mv, &mut scratch);
                let nodes = self.perft_inner(depth - 1);
                self.pop_position();
                nodes
            };
            println!("{mv} -> {nodes}");
            total += nodes;
        }
        println!("total: {total}");
        total
    }

    fn perft_inner(&mut self, depth: u32) -> u64 {
        let mut moves = MoveList::new();
        movegen::pseudo_legal_moves(&self.position, &mut moves);

        if depth == 1 {
            return moves
                .iter()
                .filter(|&&mv| self.position.is_legal(mv))
                .count() as u64;
        }

        let mut total = 0;
        for &mv in moves.iter() {
            if !self.position.is_legal(mv) {
                continue;
            }
            self.push_position();
            let mut scratch = Accumulator::default();
            self.position.do_move(mv, &mut scratch);
            total += self.perft_inner(depth - 1);
            self.pop_position();
        }
        total
    }
}
