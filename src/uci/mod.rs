//! Universal Chess Interface front end.
//!
//! The UCI loop runs on the main thread and never blocks on a search: `go`
//! hands the position to the engine worker, `stop` flips the shared status
//! flag, and the worker prints `info`/`bestmove` lines itself.

pub mod report;

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::board::movegen;
use crate::board::types::{Color, Move, MoveList};
use crate::board::{FenError, Position};
use crate::engine::{Command, Engine};
use crate::eval::Accumulator;
use crate::search::SearchLimits;

/// Default transposition table size in MiB.
pub const DEFAULT_HASH_MIB: usize = 16;
const HASH_MIN_MIB: usize = 1;
const HASH_MAX_MIB: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    InvalidFen(FenError),
    InvalidMove(String),
    MissingParts,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "invalid fen: {e}"),
            UciError::InvalidMove(mv) => write!(f, "invalid move '{mv}'"),
            UciError::MissingParts => write!(f, "incomplete position command"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}

/// Find the legal move matching a UCI move string in this position.
#[must_use]
pub fn parse_move(pos: &Position, text: &str) -> Option<Move> {
    let mut moves = MoveList::new();
    movegen::pseudo_legal_moves(pos, &mut moves);
    moves
        .iter()
        .copied()
        .find(|mv| mv.to_string() == text && pos.is_legal(*mv))
}

/// Parse `position [startpos | fen ...] [moves ...]`.
///
/// Returns the resulting position together with the Zobrist keys of every
/// position along the way, the current one last. The search uses that
/// history for repetition detection.
pub fn parse_position(parts: &[&str]) -> Result<(Position, Vec<u64>), UciError> {
    let mut idx = 1;
    let mut position = match parts.get(idx) {
        Some(&"startpos") => {
            idx += 1;
            Position::startpos()
        }
        Some(&"fen") => {
            idx += 1;
            let end = parts[idx..]
                .iter()
                .position(|&p| p == "moves")
                .map_or(parts.len(), |offset| idx + offset);
            let fen = parts[idx..end].join(" ");
            idx = end;
            fen.parse::<Position>()?
        }
        _ => return Err(UciError::MissingParts),
    };

    let mut seen_keys = vec![position.key];

    if parts.get(idx) == Some(&"moves") {
        for text in &parts[idx + 1..] {
            let mv = parse_move(&position, text)
                .ok_or_else(|| UciError::InvalidMove((*text).to_string()))?;
            let mut scratch = Accumulator::default();
            position.do_move(mv, &mut scratch);
            seen_keys.push(position.key);
        }
    }

    Ok((position, seen_keys))
}

/// Parse the search limits of a `go` command.
#[must_use]
pub fn parse_go(parts: &[&str], side_to_move: Color) -> SearchLimits {
    let mut limits = SearchLimits::default();
    let mut idx = 1;

    let mut next_number = |idx: &mut usize, parts: &[&str]| -> u64 {
        *idx += 1;
        let value = parts.get(*idx).and_then(|t| t.parse().ok()).unwrap_or(0);
        *idx += 1;
        value
    };

    while idx < parts.len() {
        match parts[idx] {
            "depth" => limits.depth = next_number(&mut idx, parts) as i32,
            "nodes" => limits.nodes = next_number(&mut idx, parts),
            "movetime" => limits.move_time = next_number(&mut idx, parts),
            "wtime" => limits.time[Color::White.index()] = next_number(&mut idx, parts),
            "btime" => limits.time[Color::Black.index()] = next_number(&mut idx, parts),
            "winc" => limits.inc[Color::White.index()] = next_number(&mut idx, parts),
            "binc" => limits.inc[Color::Black.index()] = next_number(&mut idx, parts),
            "infinite" => {
                limits.infinite = true;
                idx += 1;
            }
            _ => idx += 1,
        }
    }

    // Ignore the opponent's clock.
    let them = (!side_to_move).index();
    limits.time[them] = 0;
    limits.inc[them] = 0;

    limits
}

fn parse_setoption(parts: &[&str]) -> Option<(String, String)> {
    let name_at = parts.iter().position(|&p| p == "name")? + 1;
    let value_at = parts.iter().position(|&p| p == "value")?;
    let name = parts[name_at..value_at].join(" ");
    let value = parts[value_at + 1..].join(" ");
    Some((name, value))
}

/// Run the UCI loop until `quit` or end of input.
pub fn run() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let engine = Engine::new(DEFAULT_HASH_MIB);
    let mut position = Position::startpos();
    let mut seen_keys = vec![position.key];

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "uci" => {
                println!("id name nocturne {}", env!("CARGO_PKG_VERSION"));
                println!("id author the nocturne authors");
                println!(
                    "option name Hash type spin default {DEFAULT_HASH_MIB} min {HASH_MIN_MIB} max {HASH_MAX_MIB}"
                );
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                engine.submit(Command::NewGame);
                position = Position::startpos();
                seen_keys = vec![position.key];
            }
            "setoption" => {
                if let Some((name, value)) = parse_setoption(&parts) {
                    if name.eq_ignore_ascii_case("hash") {
                        if let Ok(mib) = value.parse::<usize>() {
                            engine.submit(Command::SetHash(mib.clamp(HASH_MIN_MIB, HASH_MAX_MIB)));
                        }
                    }
                }
            }
            "position" => match parse_position(&parts) {
                Ok((pos, keys)) => {
                    position = pos;
                    seen_keys = keys;
                }
                Err(e) => eprintln!("info string {e}"),
            },
            "go" if parts.get(1) == Some(&"perft") => {
                let depth = parts.get(2).and_then(|t| t.parse().ok()).unwrap_or(1);
                engine.submit(Command::Perft { position, depth });
            }
            "go" => {
                let limits = parse_go(&parts, position.side_to_move);
                engine.submit(Command::Go {
                    position,
                    seen_keys: seen_keys.clone(),
                    limits,
                });
            }
            "perft" => {
                let depth = parts.get(1).and_then(|t| t.parse().ok()).unwrap_or(1);
                engine.submit(Command::Perft { position, depth });
            }
            "stop" => engine.stop(),
            "quit" => break,
            _ => {}
        }

        let _ = stdout.flush();
    }

    engine.quit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_move_accepts_legal_uci() {
        let pos = Position::startpos();
        let mv = parse_move(&pos, "e2e4").unwrap();
        assert_eq!(mv.to_string(), "e2e4");
        assert!(parse_move(&pos, "e2e5").is_none());
        assert!(parse_move(&pos, "xyz").is_none());
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        let parts = ["position", "startpos", "moves", "e2e4", "e7e5"];
        let (pos, keys) = parse_position(&parts).unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(*keys.last().unwrap(), pos.key);
        assert_eq!(pos.side_to_move, Color::White);
    }

    #[test]
    fn parse_position_fen() {
        let parts = [
            "position", "fen", "6k1/5ppp/8/8/8/8/5PPP/R5K1", "w", "-", "-", "0", "1",
        ];
        let (pos, keys) = parse_position(&parts).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(pos.side_to_move, Color::White);
    }

    #[test]
    fn parse_position_rejects_bad_moves() {
        let parts = ["position", "startpos", "moves", "e2e5"];
        assert!(matches!(
            parse_position(&parts),
            Err(UciError::InvalidMove(_))
        ));
    }

    #[test]
    fn parse_go_reads_clock_for_side_to_move() {
        let limits = parse_go(
            &["go", "wtime", "60000", "btime", "50000", "winc", "1000", "binc", "900"],
            Color::White,
        );
        assert_eq!(limits.time[0], 60000);
        assert_eq!(limits.inc[0], 1000);
        assert_eq!(limits.time[1], 0, "opponent clock is ignored");
        assert!(limits.has_time_limit());
    }

    #[test]
    fn parse_go_depth_and_infinite() {
        let limits = parse_go(&["go", "depth", "9"], Color::Black);
        assert_eq!(limits.depth, 9);
        assert!(!limits.has_time_limit());

        let limits = parse_go(&["go", "infinite"], Color::Black);
        assert!(limits.infinite);
        assert!(!limits.has_time_limit());
    }

    #[test]
    fn parse_setoption_hash() {
        let parts = ["setoption", "name", "Hash", "value", "64"];
        assert_eq!(
            parse_setoption(&parts),
            Some(("Hash".to_string(), "64".to_string()))
        );
    }
}
