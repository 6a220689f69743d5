//! Station assignment map of one branch: station id → items currently there.
//!
//! Derived and non-authoritative. Item statuses are the source of truth; the board
//! exists so a station display can be answered without scanning every item, and can
//! always be rebuilt from them.
//!
//! Every write names where an item belongs and how far along its sequence that is.
//! The board remembers the furthest [`Step`] seen per item and ignores anything
//! behind it, so a rebuild computed from an older read never undoes a newer move.

use crate::model::ItemKey;
use serde::Serialize;
use std::collections::BTreeMap;

/// Progress of an item along its station sequence. Orders by progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    At(usize),
    Done,
}

/// Where an item belongs on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Listed at `station`, the `index`-th of its sequence.
    Station { station: String, index: usize },
    /// No station data; listed for manual handling.
    Unassigned,
    /// Off the board for good.
    Done,
}

impl Placement {
    pub fn step(&self) -> Step {
        match self {
            Placement::Station { index, .. } => Step::At(*index),
            Placement::Unassigned => Step::At(0),
            Placement::Done => Step::Done,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry {
    pub key: ItemKey,
    pub placement: Placement,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationBoard {
    pub branch: String,
    /// Arrival order per station; each key appears at most once.
    pub stations: BTreeMap<String, Vec<ItemKey>>,
    /// Items without station data, waiting for manual handling.
    pub unassigned: Vec<ItemKey>,
    #[serde(skip)]
    pub(crate) steps: BTreeMap<ItemKey, Step>,
}

impl StationBoard {
    pub fn queue(&self, station: &str) -> &[ItemKey] {
        self.stations.get(station).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stations listing `key`. More than one entry would be a routing bug.
    pub fn holders(&self, key: &ItemKey) -> Vec<&str> {
        self.stations
            .iter()
            .filter(|(_, keys)| keys.contains(key))
            .map(|(station, _)| station.as_str())
            .collect()
    }

    pub(crate) fn insert(&mut self, station: &str, key: ItemKey) {
        let queue = self.stations.entry(station.to_string()).or_default();
        if !queue.contains(&key) {
            queue.push(key);
        }
    }

    pub(crate) fn remove_everywhere(&mut self, key: &ItemKey) {
        for queue in self.stations.values_mut() {
            queue.retain(|k| k != key);
        }
        self.stations.retain(|_, queue| !queue.is_empty());
        self.unassigned.retain(|k| k != key);
    }

    /// Moves `key` to `to` unless the board already saw it further along. Returns
    /// whether the lists changed.
    pub(crate) fn place(&mut self, key: ItemKey, to: Placement) -> bool {
        let step = to.step();
        if self.steps.get(&key).is_some_and(|known| *known > step) {
            return false;
        }
        self.steps.insert(key, step);
        if self.is_placed(&key, &to) {
            return false;
        }
        self.remove_everywhere(&key);
        match to {
            Placement::Station { station, .. } => self.insert(&station, key),
            Placement::Unassigned => self.unassigned.push(key),
            Placement::Done => {}
        }
        true
    }

    fn is_placed(&self, key: &ItemKey, placement: &Placement) -> bool {
        let holders = self.holders(key);
        let unassigned = self.unassigned.contains(key);
        match placement {
            Placement::Station { station, .. } => holders == [station.as_str()] && !unassigned,
            Placement::Unassigned => holders.is_empty() && unassigned,
            Placement::Done => holders.is_empty() && !unassigned,
        }
    }

    /// Same stations holding the same keys, ignoring arrival order.
    pub fn same_assignments(&self, other: &StationBoard) -> bool {
        fn sorted(board: &StationBoard) -> (BTreeMap<&str, Vec<ItemKey>>, Vec<ItemKey>) {
            let stations = board
                .stations
                .iter()
                .filter(|(_, keys)| !keys.is_empty())
                .map(|(station, keys)| {
                    let mut keys = keys.clone();
                    keys.sort();
                    (station.as_str(), keys)
                })
                .collect();
            let mut unassigned = board.unassigned.clone();
            unassigned.sort();
            (stations, unassigned)
        }
        sorted(self) == sorted(other)
    }
}

#[derive(Debug, Clone)]
pub struct BoardCreate {
    pub branch: String,
}
