use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sport stacking event a solve belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
    strum_macros::Display,
)]
pub enum Event {
    #[serde(rename = "3-3-3")]
    #[value(name = "3-3-3")]
    #[strum(serialize = "3-3-3")]
    ThreeThreeThree,
    #[serde(rename = "3-6-3")]
    #[value(name = "3-6-3")]
    #[strum(serialize = "3-6-3")]
    ThreeSixThree,
    #[default]
    #[serde(rename = "cycle")]
    #[value(name = "cycle")]
    #[strum(serialize = "cycle")]
    Cycle,
}

impl Event {
    pub const ALL: [Event; 3] = [Event::ThreeThreeThree, Event::ThreeSixThree, Event::Cycle];

    pub fn label(&self) -> &'static str {
        match self {
            Event::ThreeThreeThree => "3-3-3",
            Event::ThreeSixThree => "3-6-3",
            Event::Cycle => "Cycle",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The `(event, session)` pair a history belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    pub event: Event,
    pub session: u32,
}

impl Scope {
    pub fn new(event: Event, session: u32) -> Self {
        Self {
            event,
            session: session.max(1),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(Event::default(), 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolveId(pub i64);

/// One completed timing measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solve {
    pub id: SolveId,
    pub time_ms: f64,
    pub timestamp: DateTime<Local>,
    pub event: Event,
    pub session: u32,
}

/// Anything that carries a solve time in milliseconds
pub trait Timed {
    fn time_ms(&self) -> f64;
}

impl Timed for f64 {
    fn time_ms(&self) -> f64 {
        *self
    }
}

impl Timed for Solve {
    fn time_ms(&self) -> f64 {
        self.time_ms
    }
}

/// Solves of one scope, newest first and unique by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveHistory {
    solves: Vec<Solve>,
}

impl SolveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from solves already ordered newest first. Later duplicates of an
    /// id are dropped.
    pub fn from_newest_first(solves: Vec<Solve>) -> Self {
        let mut history = Self::new();
        for solve in solves {
            if !history.contains(solve.id) {
                history.solves.push(solve);
            }
        }
        history
    }

    /// Insert as the most recent solve. Returns false if the id is already present.
    pub fn prepend(&mut self, solve: Solve) -> bool {
        if self.contains(solve.id) {
            return false;
        }
        self.solves.insert(0, solve);
        true
    }

    pub fn remove(&mut self, id: SolveId) -> Option<Solve> {
        let idx = self.solves.iter().position(|s| s.id == id)?;
        Some(self.solves.remove(idx))
    }

    pub fn clear(&mut self) {
        self.solves.clear();
    }

    pub fn newest(&self) -> Option<&Solve> {
        self.solves.first()
    }

    pub fn contains(&self, id: SolveId) -> bool {
        self.solves.iter().any(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.solves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Solve> {
        self.solves.iter()
    }

    pub fn as_slice(&self) -> &[Solve] {
        &self.solves
    }

    /// Next id for a solve the store never saw. Store ids start at 1, so
    /// local ids count down from -1 and never collide with them.
    pub fn next_local_id(&self) -> SolveId {
        let lowest = self.solves.iter().map(|s| s.id.0).min().unwrap_or(0);
        SolveId(lowest.min(0) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(id: i64, time_ms: f64) -> Solve {
        Solve {
            id: SolveId(id),
            time_ms,
            timestamp: Local::now(),
            event: Event::Cycle,
            session: 1,
        }
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let mut history = SolveHistory::new();
        history.prepend(solve(1, 1000.0));
        history.prepend(solve(2, 2000.0));

        assert_eq!(history.newest().map(|s| s.id), Some(SolveId(2)));
        let ids: Vec<i64> = history.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_prepend_rejects_duplicate_id() {
        let mut history = SolveHistory::new();
        assert!(history.prepend(solve(1, 1000.0)));
        assert!(!history.prepend(solve(1, 1500.0)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut history =
            SolveHistory::from_newest_first(vec![solve(3, 3.0), solve(2, 2.0), solve(1, 1.0)]);

        assert_eq!(history.remove(SolveId(2)).map(|s| s.time_ms), Some(2.0));
        assert_eq!(history.remove(SolveId(2)), None);
        assert_eq!(history.len(), 2);

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.newest(), None);
    }

    #[test]
    fn test_from_newest_first_dedups() {
        let history = SolveHistory::from_newest_first(vec![solve(1, 1.0), solve(1, 2.0)]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.as_slice()[0].time_ms, 1.0);
    }

    #[test]
    fn test_next_local_id() {
        let mut history = SolveHistory::new();
        assert_eq!(history.next_local_id(), SolveId(-1));
        history.prepend(solve(7, 1.0));
        assert_eq!(history.next_local_id(), SolveId(-1));
        history.prepend(solve(-1, 2.0));
        history.prepend(solve(8, 3.0));
        assert_eq!(history.next_local_id(), SolveId(-2));
    }

    #[test]
    fn test_event_cycling_and_tags() {
        assert_eq!(Event::Cycle.next(), Event::ThreeThreeThree);
        assert_eq!(Event::ThreeThreeThree.prev(), Event::Cycle);
        assert_eq!(Event::ThreeSixThree.to_string(), "3-6-3");
    }

    #[test]
    fn test_scope_session_floor() {
        assert_eq!(Scope::new(Event::Cycle, 0).session, 1);
        assert_eq!(Scope::default(), Scope::new(Event::Cycle, 1));
    }
}
