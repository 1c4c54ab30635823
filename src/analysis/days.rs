//! Distinct day buckets seen during a scan

use std::collections::HashMap;

use chrono::NaiveDateTime;

/// Day key format, e.g. `2024-01-01`
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Collects day keys together with a representative instant so they can be
/// listed chronologically no matter how the map iterates.
#[derive(Debug, Default)]
pub struct DayIndex {
    days: HashMap<String, NaiveDateTime>,
}

impl DayIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a day. The first instant seen for a key is kept.
    pub fn record(&mut self, day: &str, instant: NaiveDateTime) {
        if !self.days.contains_key(day) {
            self.days.insert(day.to_string(), instant);
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Day keys in ascending chronological order
    pub fn sorted(&self) -> Vec<String> {
        let mut decorated: Vec<(&NaiveDateTime, &String)> =
            self.days.iter().map(|(day, instant)| (instant, day)).collect();
        decorated.sort();
        decorated.into_iter().map(|(_, day)| day.clone()).collect()
    }
}
