//! End-to-end search tests through the public API.

use nocturne::board::Position;
use nocturne::search::constants::{VALUE_MATE, VALUE_MATE_IN_MAX_PLY};
use nocturne::search::{Search, SearchLimits, StatusFlag};
use nocturne::uci;

fn searcher(fen: &str) -> Search {
    let mut search = Search::new(16, StatusFlag::new());
    search.silent = true;
    let position: Position = fen.parse().unwrap();
    search.set_position(position, vec![position.key]);
    search
}

#[test]
fn mate_in_one_from_the_spec_position() {
    let mut search = searcher("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1");
    let best = search.start_search(SearchLimits::depth(3));
    assert_eq!(best.to_string(), "a1a8");
    assert_eq!(search.last_score(), VALUE_MATE - 1);
}

#[test]
fn mate_score_survives_deeper_iterations() {
    // The driver stops as soon as a forced mate for us is proven.
    let mut search = searcher("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1");
    let best = search.start_search(SearchLimits::depth(30));
    assert_eq!(best.to_string(), "a1a8");
    assert!(search.last_score() >= VALUE_MATE_IN_MAX_PLY);
}

#[test]
fn uci_position_round_trip_drives_search() {
    let parts = ["position", "startpos", "moves", "e2e4", "e7e5", "g1f3"];
    let (position, seen_keys) = uci::parse_position(&parts).unwrap();

    let mut search = Search::new(16, StatusFlag::new());
    search.silent = true;
    search.set_position(position, seen_keys);

    let best = search.start_search(SearchLimits::depth(5));
    assert!(search.position.is_legal(best));
}

#[test]
fn go_with_movetime_finishes_promptly() {
    let mut search = searcher("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    let limits = SearchLimits {
        move_time: 150,
        ..SearchLimits::default()
    };

    let start = std::time::Instant::now();
    let best = search.start_search(limits);
    let elapsed = start.elapsed();

    assert!(search.position.is_legal(best));
    assert!(
        elapsed.as_millis() < 2000,
        "movetime 150ms took {elapsed:?}"
    );
}

#[test]
fn single_search_value_is_reproducible_across_engines() {
    // Same build, same position, fresh state: identical move and score.
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

    let mut first = searcher(fen);
    let first_best = first.start_search(SearchLimits::depth(6));
    let first_score = first.last_score();

    let mut second = searcher(fen);
    let second_best = second.start_search(SearchLimits::depth(6));

    assert_eq!(first_best, second_best);
    assert_eq!(first_score, second.last_score());
}
