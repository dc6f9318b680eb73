//! Transposition table.
//!
//! A flat always-replace table indexed by `key mod entry_count`. Every probe
//! resolves to exactly one slot and every store overwrites it, so callers
//! never deal with bucket or aging policy; upgrading the replacement scheme
//! stays local to this module.

use crate::board::types::{Move, MOVE_NONE};
use crate::search::constants::Value;

/// Bound kind stored with an entry. `LOWER | UPPER == EXACT`, so testing
/// `flag & flag_for(condition)` answers "is this bound usable to cut off".
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TtFlag(u8);

pub const NO_FLAG: TtFlag = TtFlag(0);
pub const FLAG_LOWER: TtFlag = TtFlag(1);
pub const FLAG_UPPER: TtFlag = TtFlag(2);
pub const FLAG_EXACT: TtFlag = TtFlag(3);

impl TtFlag {
    /// True when this stored bound covers the requested bound kind.
    #[inline]
    #[must_use]
    pub const fn cuts(self, needed: TtFlag) -> bool {
        self.0 & needed.0 != 0
    }
}

/// Bound kind that makes a stored value usable for a cutoff, given whether
/// the value fails high against the probing window.
#[inline]
#[must_use]
pub const fn flag_for(fails_high: bool) -> TtFlag {
    if fails_high {
        FLAG_LOWER
    } else {
        FLAG_UPPER
    }
}

/// One 16-byte slot.
#[derive(Clone, Copy, Debug)]
pub struct TtEntry {
    pub key: u64,
    pub mv: Move,
    pub value: i16,
    pub static_eval: i16,
    pub depth: i8,
    pub flag: TtFlag,
}

impl TtEntry {
    const EMPTY: TtEntry = TtEntry {
        key: 0,
        mv: MOVE_NONE,
        value: 0,
        static_eval: 0,
        depth: 0,
        flag: NO_FLAG,
    };

    #[inline]
    #[must_use]
    pub fn matches(&self, key: u64) -> bool {
        self.key == key && self.flag != NO_FLAG
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> Value {
        Value::from(self.value)
    }

    #[inline]
    #[must_use]
    pub fn static_eval(&self) -> Value {
        Value::from(self.static_eval)
    }
}

pub struct TranspositionTable {
    entries: Vec<TtEntry>,
}

impl TranspositionTable {
    /// Allocate a table of roughly `mib` mebibytes, cleared.
    #[must_use]
    pub fn new(mib: usize) -> Self {
        let mut tt = TranspositionTable { entries: Vec::new() };
        tt.resize(mib);
        tt
    }

    /// Reallocate to `mib` mebibytes and clear.
    pub fn resize(&mut self, mib: usize) {
        let count = (mib * 1024 * 1024 / std::mem::size_of::<TtEntry>()).max(1);
        self.entries = vec![TtEntry::EMPTY; count];
    }

    pub fn clear(&mut self) {
        self.entries.fill(TtEntry::EMPTY);
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    /// The slot for `key` and whether it holds that key's data.
    #[inline]
    #[must_use]
    pub fn probe(&self, key: u64) -> (TtEntry, bool) {
        let entry = self.entries[self.index(key)];
        let hit = entry.matches(key);
        (entry, hit)
    }

    /// Overwrite the slot for `key`.
    pub fn store(
        &mut self,
        key: u64,
        flag: TtFlag,
        depth: i32,
        mv: Move,
        value: Value,
        static_eval: Value,
    ) {
        let idx = self.index(key);
        self.entries[idx] = TtEntry {
            key,
            mv,
            value: value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16,
            static_eval: static_eval.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16,
            depth: depth.clamp(0, i32::from(i8::MAX)) as i8,
            flag,
        };
    }
}
