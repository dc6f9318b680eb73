//! Stop coordination: a running search must unwind promptly and still
//! deliver a usable move.

use std::thread;
use std::time::{Duration, Instant};

use nocturne::board::Position;
use nocturne::engine::{Command, Engine};
use nocturne::search::{Search, SearchLimits, SearchStatus, StatusFlag};

#[test]
fn infinite_search_unwinds_after_stop() {
    let status = StatusFlag::new();
    let mut search = Search::new(16, status.clone());
    search.silent = true;
    let position = Position::startpos();
    search.set_position(position, vec![position.key]);

    let stopper = thread::spawn({
        let status = status.clone();
        move || {
            thread::sleep(Duration::from_millis(200));
            status.request_stop();
        }
    });

    let start = Instant::now();
    let limits = SearchLimits {
        infinite: true,
        ..SearchLimits::default()
    };
    let best = search.start_search(limits);
    let elapsed = start.elapsed();
    stopper.join().unwrap();

    assert!(
        elapsed < Duration::from_secs(3),
        "stop took {elapsed:?} to be honored"
    );
    assert!(!best.is_none(), "a completed iteration's move must survive");
    assert!(search.position.is_legal(best));
}

#[test]
fn status_flag_transitions() {
    let status = StatusFlag::new();
    assert_eq!(status.get(), SearchStatus::Idle);

    status.set(SearchStatus::Running);
    assert_eq!(status.get(), SearchStatus::Running);
    assert!(!status.stop_pending());

    status.request_stop();
    assert_eq!(status.get(), SearchStatus::StopPending);
    assert!(status.stop_pending());
}

#[test]
fn engine_worker_runs_and_stops() {
    let engine = Engine::new(8);
    let position = Position::startpos();

    engine.submit(Command::Go {
        position,
        seen_keys: vec![position.key],
        limits: SearchLimits {
            infinite: true,
            ..SearchLimits::default()
        },
    });

    assert!(engine.is_searching());
    thread::sleep(Duration::from_millis(200));
    engine.stop();

    let deadline = Instant::now() + Duration::from_secs(3);
    while engine.is_searching() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert!(!engine.is_searching(), "worker did not go idle after stop");

    engine.quit();
}

#[test]
fn engine_depth_search_goes_idle_on_its_own() {
    let engine = Engine::new(8);
    let position = Position::startpos();

    engine.submit(Command::Go {
        position,
        seen_keys: vec![position.key],
        limits: SearchLimits::depth(4),
    });
    engine.wait_until_idle();
    assert!(!engine.is_searching());

    engine.quit();
}
