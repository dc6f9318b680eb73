//! Engine worker: a single long-lived thread that owns the `Search` value.
//!
//! The UCI thread never touches search state directly. It enqueues commands
//! behind a mutex and drives the shared tri-state status flag; the worker
//! polls both with a short sleep while idle. A `stop` request is just a
//! status transition that a running search observes at its next poll.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::board::Position;
use crate::search::{Search, SearchLimits, SearchStatus, StatusFlag};

/// Idle poll interval for the worker.
const IDLE_POLL: Duration = Duration::from_millis(1);

pub enum Command {
    Go {
        position: Position,
        seen_keys: Vec<u64>,
        limits: SearchLimits,
    },
    SetHash(usize),
    NewGame,
    Perft {
        position: Position,
        depth: u32,
    },
    Quit,
}

pub struct Engine {
    status: StatusFlag,
    commands: Arc<Mutex<VecDeque<Command>>>,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    /// Spawn the worker with a transposition table of `hash_mib` MiB.
    #[must_use]
    pub fn new(hash_mib: usize) -> Self {
        let status = StatusFlag::new();
        let commands: Arc<Mutex<VecDeque<Command>>> = Arc::new(Mutex::new(VecDeque::new()));

        let worker_status = status.clone();
        let worker_commands = Arc::clone(&commands);
        let worker = thread::Builder::new()
            .name("search".to_string())
            .spawn(move || worker_loop(hash_mib, &worker_status, &worker_commands))
            .expect("failed to spawn search worker");

        Engine {
            status,
            commands,
            worker: Some(worker),
        }
    }

    /// Queue a command for the worker. `Go` marks the engine running
    /// immediately so a following `stop` is never lost.
    pub fn submit(&self, command: Command) {
        if matches!(command, Command::Go { .. }) {
            self.status.set(SearchStatus::Running);
        }
        self.commands.lock().push_back(command);
    }

    /// Request cancellation of a running search.
    pub fn stop(&self) {
        if self.status.get() == SearchStatus::Running {
            self.status.request_stop();
        }
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.status.get() != SearchStatus::Idle
    }

    /// Block until the current search (if any) has finished.
    pub fn wait_until_idle(&self) {
        while self.is_searching() {
            thread::sleep(IDLE_POLL);
        }
    }

    /// Stop any search, drain the worker and join it.
    pub fn quit(mut self) {
        self.status.request_stop();
        self.commands.lock().push_back(Command::Quit);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    hash_mib: usize,
    status: &StatusFlag,
    commands: &Arc<Mutex<VecDeque<Command>>>,
) {
    let mut search = Search::new(hash_mib, status.clone());

    loop {
        let command = commands.lock().pop_front();
        let Some(command) = command else {
            thread::sleep(IDLE_POLL);
            continue;
        };

        match command {
            Command::Go {
                position,
                seen_keys,
                limits,
            } => {
                search.set_position(position, seen_keys);
                search.start_search(limits);
                status.set(SearchStatus::Idle);
            }
            Command::SetHash(mib) => search.resize_tt(mib),
            Command::NewGame => {
                search.clear_tables();
                let startpos = Position::startpos();
                search.set_position(startpos, vec![startpos.key]);
            }
            Command::Perft { position, depth } => {
                search.set_position(position, vec![position.key]);
                search.perft_divide(depth);
            }
            Command::Quit => break,
        }
    }
}
