//! Ordered view over a count mapping, used for leaderboards

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CounterError;

/// Sort direction for [`OrderedCounter::sort_by`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

impl FromStr for Direction {
    type Err = CounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            other => Err(CounterError::Direction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterEntry {
    pub key: String,
    pub value: u64,
}

/// Sequence of `(key, value)` pairs with a deterministic order.
///
/// Mutations go through `&mut self`, so an insert of a new key or a removal
/// is seen by every later reader of the same counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderedCounter {
    entries: Vec<CounterEntry>,
}

impl OrderedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an unordered mapping. Entries start in ascending key order
    /// so that a later stable sort gives the same result on every run.
    pub fn from_mapping(counts: &HashMap<String, u64>) -> Self {
        let mut entries: Vec<CounterEntry> = counts
            .iter()
            .map(|(key, value)| CounterEntry {
                key: key.clone(),
                value: *value,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Result<u64, CounterError> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value)
            .ok_or_else(|| CounterError::NotFound(key.to_string()))
    }

    /// Update `key` in place, or append it when absent
    pub fn set(&mut self, key: &str, value: u64) {
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(CounterEntry {
                key: key.to_string(),
                value,
            }),
        }
    }

    /// Remove `key`, returning its value if it was present
    pub fn delete(&mut self, key: &str) -> Option<u64> {
        let index = self.entries.iter().position(|entry| entry.key == key)?;
        Some(self.entries.remove(index).value)
    }

    /// Stable sort by value; equal values keep their relative order in
    /// either direction.
    pub fn sort_by(&mut self, direction: Direction) -> &mut Self {
        match direction {
            Direction::Ascending => self.entries.sort_by(|a, b| a.value.cmp(&b.value)),
            Direction::Descending => self.entries.sort_by(|a, b| b.value.cmp(&a.value)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|entry| (entry.key.as_str(), entry.value))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.key.as_str()).collect()
    }
}
