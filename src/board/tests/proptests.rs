//! Property tests: random legal walks keep every incrementally maintained
//! piece of state consistent, and snapshot unmake is a perfect inverse.

use proptest::prelude::*;

use crate::board::movegen::pseudo_legal_moves;
use crate::board::types::{Move, MoveList};
use crate::board::Position;
use crate::search::constants::STACK_OFFSET;
use crate::search::{Search, StatusFlag};

fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut list = MoveList::new();
    pseudo_legal_moves(pos, &mut list);
    list.iter().copied().filter(|&mv| pos.is_legal(mv)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_walks_restore_through_snapshots(choices in prop::collection::vec(0usize..1024, 1..60)) {
        let mut search = Search::new(1, StatusFlag::new());
        search.silent = true;
        let start = search.position;
        let mut played = 0usize;

        for &choice in &choices {
            let moves = legal_moves(&search.position);
            if moves.is_empty() {
                break;
            }
            let mv = moves[choice % moves.len()];
            search.play_move(mv, STACK_OFFSET + played);
            played += 1;

            // Incremental key must agree with a from-scratch recomputation.
            let reparsed: Position = search.position.to_fen().parse().unwrap();
            prop_assert_eq!(reparsed.key, search.position.key);
            prop_assert_eq!(reparsed.checkers, search.position.checkers);
        }

        for _ in 0..played {
            search.cancel_move();
        }
        prop_assert_eq!(search.position, start, "unmake must restore the root bitwise");
    }

    #[test]
    fn quiet_and_capture_classification_agree(choices in prop::collection::vec(0usize..1024, 1..20)) {
        let mut pos = Position::startpos();
        for &choice in &choices {
            let moves = legal_moves(&pos);
            if moves.is_empty() {
                break;
            }
            for &mv in &moves {
                // A move is never both quiet and a capture.
                prop_assert!(!(pos.is_quiet(mv) && pos.is_capture(mv)));
            }
            let mv = moves[choice % moves.len()];
            let mut scratch = crate::eval::Accumulator::default();
            pos.do_move(mv, &mut scratch);
        }
    }
}
