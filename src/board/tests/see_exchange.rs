//! Static exchange evaluation tests.

use crate::board::Position;
use crate::uci::parse_move;

fn see_bounds(fen: &str, mv: &str, exact: i32) {
    let pos: Position = fen.parse().unwrap();
    let mv = parse_move(&pos, mv).expect("legal move");
    assert!(pos.see_ge(mv, exact), "exchange should be worth >= {exact}");
    assert!(
        !pos.see_ge(mv, exact + 1),
        "exchange should not be worth > {exact}"
    );
}

#[test]
fn undefended_pawn_capture_wins_a_pawn() {
    see_bounds("7k/8/8/3p4/4P3/8/8/7K w - - 0 1", "e4d5", 100);
}

#[test]
fn defended_pawn_capture_is_even() {
    see_bounds("7k/8/2p5/3p4/4P3/8/8/7K w - - 0 1", "e4d5", 0);
}

#[test]
fn knight_takes_defended_pawn_loses_material() {
    see_bounds("7k/8/2p5/3p4/4N3/8/8/7K w - - 0 1", "e4d5", 100 - 320);
}

#[test]
fn queen_takes_defended_pawn_is_disastrous() {
    see_bounds("7k/8/2p5/3p4/4Q3/8/8/7K w - - 0 1", "e4d5", 100 - 900);
}

#[test]
fn xray_recapture_is_seen() {
    // Rxd8 Rxd8 Rxd8: white wins rook, loses rook, wins rook.
    see_bounds("3r3k/3r4/8/8/8/8/8/3RR2K w - - 0 1", "d1d8", 500);
}

#[test]
fn battery_behind_attacker_counts() {
    // Pawn takes pawn; recapture is met by the queen behind our pawn.
    let pos: Position = "7k/8/2p5/3p4/4P3/5Q2/8/7K w - - 0 1".parse().unwrap();
    let mv = parse_move(&pos, "e4d5").unwrap();
    assert!(pos.see_ge(mv, 100), "pawn is won: cxd5 is answered by Qxd5");
}

#[test]
fn king_cannot_recapture_into_attackers() {
    // Kxd5 would leave the king capturable by the c6 pawn's defense chain;
    // the exchange stops before the king dies.
    let pos: Position = "7k/8/2p5/3p4/3K4/8/8/8 w - - 0 1".parse().unwrap();
    let mv = parse_move(&pos, "d4d5");
    // Kxd5 is illegal (defended pawn); is_legal filters it before SEE ever runs.
    assert!(mv.is_none());
}

#[test]
fn non_normal_moves_get_neutral_see() {
    let pos: Position = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3"
        .parse()
        .unwrap();
    let ep = parse_move(&pos, "e5f6").unwrap();
    assert!(pos.see_ge(ep, 0));
    assert!(!pos.see_ge(ep, 1));
}

#[test]
fn threshold_is_monotone() {
    let pos: Position = "3r3k/3r4/8/8/8/8/8/3RR2K w - - 0 1".parse().unwrap();
    let mv = parse_move(&pos, "d1d8").unwrap();
    let mut previous = true;
    for threshold in (-1000..=1000).step_by(100) {
        let current = pos.see_ge(mv, threshold);
        assert!(previous || !current, "see_ge must be monotone in threshold");
        previous = current;
    }
}
