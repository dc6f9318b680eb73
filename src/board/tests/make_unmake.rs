//! Make/unmake identity through snapshots, and incremental-state consistency.

use crate::board::movegen::pseudo_legal_moves;
use crate::board::types::MoveList;
use crate::board::Position;
use crate::eval::Accumulator;

/// After `do_move`, the incrementally maintained key, checkers and
/// accumulator must agree with a from-scratch recomputation.
fn assert_consistent(pos: &Position, acc: &Accumulator) {
    let reparsed: Position = pos.to_fen().parse().expect("engine-produced FEN parses");
    assert_eq!(reparsed.key, pos.key, "incremental key drifted");
    assert_eq!(reparsed.checkers, pos.checkers, "checkers drifted");
    assert_eq!(reparsed, *pos, "position fields drifted");
    assert_eq!(
        Accumulator::from_position(pos),
        *acc,
        "incremental accumulator drifted"
    );
}

fn walk_all_moves(fen: &str) {
    let pos: Position = fen.parse().unwrap();
    let mut moves = MoveList::new();
    pseudo_legal_moves(&pos, &mut moves);

    for &mv in moves.iter() {
        if !pos.is_legal(mv) {
            continue;
        }
        // Snapshot-restore identity: a byte copy is the unmake.
        let snapshot = pos;
        let mut acc = Accumulator::from_position(&pos);
        let mut next = pos;
        next.do_move(mv, &mut acc);

        assert_ne!(next.key, snapshot.key, "{mv} must change the key");
        assert_consistent(&next, &acc);
        assert_eq!(snapshot, pos, "original position untouched by value copy");
    }
}

#[test]
fn all_move_kinds_stay_consistent() {
    // Positions chosen so the walk covers captures, promotions (with and
    // without capture), both castlings, en passant and checks.
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 0 1",
    ] {
        walk_all_moves(fen);
    }
}

#[test]
fn null_move_flips_side_and_key() {
    let pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    let snapshot = pos;
    let mut null = pos;
    null.do_null_move();

    assert_ne!(null.side_to_move, pos.side_to_move);
    assert_ne!(null.key, pos.key);
    assert_eq!(null.half_move_clock, pos.half_move_clock + 1);

    // Restore by snapshot, as the search does.
    let restored = snapshot;
    assert_eq!(restored, pos);
}

#[test]
fn en_passant_key_cleared_after_any_reply() {
    let mut pos: Position = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        .parse()
        .unwrap();
    let mut acc = Accumulator::from_position(&pos);

    let e2e4 = crate::uci::parse_move(&pos, "e2e4").unwrap();
    pos.do_move(e2e4, &mut acc);
    assert!(pos.ep_square.is_some());

    let g8f6 = crate::uci::parse_move(&pos, "g8f6").unwrap();
    pos.do_move(g8f6, &mut acc);
    assert!(pos.ep_square.is_none());
    assert_consistent(&pos, &acc);
}

#[test]
fn castling_rights_update_on_rook_capture() {
    // Rook takes the a8 rook: black loses queenside castling, and white's
    // own queenside right goes with the rook that left a1.
    let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
    let mut acc = Accumulator::from_position(&pos);
    let capture = crate::uci::parse_move(&pos, "a1a8").unwrap();
    pos.do_move(capture, &mut acc);
    assert_eq!(pos.castling & crate::board::types::CASTLE_BLACK_Q, 0);
    assert_eq!(pos.castling & crate::board::types::CASTLE_WHITE_Q, 0);
    assert_consistent(&pos, &acc);
}

#[test]
fn fifty_move_clock_resets_on_pawn_moves_and_captures() {
    let mut pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 11 20"
        .parse()
        .unwrap();
    let mut acc = Accumulator::from_position(&pos);

    let quiet = crate::uci::parse_move(&pos, "a1b1").unwrap();
    pos.do_move(quiet, &mut acc);
    assert_eq!(pos.half_move_clock, 12);

    let pawn_push = crate::uci::parse_move(&pos, "b4b3").unwrap();
    pos.do_move(pawn_push, &mut acc);
    assert_eq!(pos.half_move_clock, 0);
}
