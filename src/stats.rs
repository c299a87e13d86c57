//! Rolling solve statistics.
//!
//! Every function here is a pure function of a newest-first slice of times.
//! Averages of five or more results drop the single best and single worst
//! result before taking the mean; smaller windows are plain means.

use crate::solve::{Solve, SolveId, Timed};
use crate::util::{mean, std_dev};
use itertools::Itertools;

pub const MO3: usize = 3;
pub const AO5: usize = 5;
pub const AO12: usize = 12;

/// Smallest window that gets the best and worst result trimmed
const TRIM_FROM: usize = 5;

/// Average of the `n` most recent results, `None` if there are fewer than `n`
pub fn average<T: Timed>(history: &[T], n: usize) -> Option<f64> {
    if n == 0 || history.len() < n {
        return None;
    }

    let recent = history[..n].iter().map(Timed::time_ms);

    if n >= TRIM_FROM {
        let sorted = recent.sorted_by(|a, b| a.total_cmp(b)).collect::<Vec<f64>>();
        mean(&sorted[1..n - 1])
    } else {
        mean(&recent.collect::<Vec<f64>>())
    }
}

/// Fastest single over the whole history
pub fn best<T: Timed>(history: &[T]) -> Option<f64> {
    history.iter().map(Timed::time_ms).min_by(|a, b| a.total_cmp(b))
}

/// Untrimmed mean of every result
pub fn session_mean<T: Timed>(history: &[T]) -> Option<f64> {
    mean(&history.iter().map(Timed::time_ms).collect::<Vec<f64>>())
}

/// One history row with the trailing statistics as of that solve
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRow {
    pub id: SolveId,
    pub time: f64,
    pub mo3: Option<f64>,
    pub ao5: Option<f64>,
    pub ao12: Option<f64>,
    pub is_best_time: bool,
    pub is_best_ao5: bool,
    pub is_best_ao12: bool,
}

impl Timed for SolveRow {
    fn time_ms(&self) -> f64 {
        self.time
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub current_single: Option<f64>,
    pub current_mo3: Option<f64>,
    pub current_ao5: Option<f64>,
    pub current_ao12: Option<f64>,
    pub best_single: Option<f64>,
    pub best_mo3: Option<f64>,
    pub best_ao5: Option<f64>,
    pub best_ao12: Option<f64>,
    pub session_mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub rows: Vec<SolveRow>,
    pub summary: Summary,
}

fn min_defined(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().min_by(|a, b| a.total_cmp(b))
}

/// Compute per-row trailing statistics and the session summary
pub fn enrich(history: &[Solve]) -> SessionStats {
    let times = history.iter().map(Timed::time_ms).collect::<Vec<f64>>();

    let trailing = (0..times.len())
        .map(|i| {
            let tail = &times[i..];
            (
                average(tail, MO3),
                average(tail, AO5),
                average(tail, AO12),
            )
        })
        .collect::<Vec<_>>();

    let best_single = best(&times);
    let best_mo3 = min_defined(trailing.iter().map(|t| t.0));
    let best_ao5 = min_defined(trailing.iter().map(|t| t.1));
    let best_ao12 = min_defined(trailing.iter().map(|t| t.2));

    let rows = history
        .iter()
        .zip(trailing.iter())
        .map(|(solve, &(mo3, ao5, ao12))| SolveRow {
            id: solve.id,
            time: solve.time_ms,
            mo3,
            ao5,
            ao12,
            is_best_time: best_single == Some(solve.time_ms),
            is_best_ao5: ao5.is_some() && ao5 == best_ao5,
            is_best_ao12: ao12.is_some() && ao12 == best_ao12,
        })
        .collect::<Vec<SolveRow>>();

    let summary = Summary {
        current_single: times.first().copied(),
        current_mo3: trailing.first().and_then(|t| t.0),
        current_ao5: trailing.first().and_then(|t| t.1),
        current_ao12: trailing.first().and_then(|t| t.2),
        best_single,
        best_mo3,
        best_ao5,
        best_ao12,
        session_mean: mean(&times),
        std_dev: std_dev(&times),
        count: times.len(),
    };

    SessionStats { rows, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::Event;
    use chrono::Local;

    fn history(times: &[f64]) -> Vec<Solve> {
        let n = times.len() as i64;
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| Solve {
                id: SolveId(n - i as i64),
                time_ms: t,
                timestamp: Local::now(),
                event: Event::Cycle,
                session: 1,
            })
            .collect()
    }

    #[test]
    fn test_average_insufficient_data() {
        assert_eq!(average::<f64>(&[], 3), None);
        assert_eq!(average(&[1.0, 2.0, 3.0, 4.0], 5), None);
        assert_eq!(average(&[1.0; 11], AO12), None);
    }

    #[test]
    fn test_average_zero_window() {
        assert_eq!(average(&[1.0, 2.0], 0), None);
    }

    #[test]
    fn test_ao5_trims_best_and_worst() {
        assert_eq!(average(&[10.0, 20.0, 30.0, 40.0, 50.0], AO5), Some(30.0));
        assert_eq!(average(&[50.0, 10.0, 40.0, 20.0, 30.0], AO5), Some(30.0));
    }

    #[test]
    fn test_ao5_uses_only_most_recent() {
        // the sixth (oldest) value must not influence the result
        let times = [10.0, 20.0, 30.0, 40.0, 50.0, 1.0];
        assert_eq!(average(&times, AO5), Some(30.0));
    }

    #[test]
    fn test_ao5_drops_one_duplicate_extreme() {
        assert_eq!(average(&[10.0, 10.0, 20.0, 30.0, 30.0], AO5), Some(20.0));
        assert_eq!(average(&[5.0, 5.0, 5.0, 5.0, 5.0], AO5), Some(5.0));
    }

    #[test]
    fn test_ao12_trims_one_each_end() {
        let times = (1..=12).map(|v| v as f64 * 100.0).collect::<Vec<f64>>();
        // drops 100 and 1200, mean of 200..=1100
        assert_eq!(average(&times, AO12), Some(650.0));
    }

    #[test]
    fn test_mo3_is_untrimmed() {
        assert_eq!(average(&[10.0, 20.0, 30.0], MO3), Some(20.0));
        assert_eq!(average(&[10.0, 20.0, 90.0, 1.0], MO3), Some(40.0));
    }

    #[test]
    fn test_best() {
        assert_eq!(best::<f64>(&[]), None);
        assert_eq!(best(&[50.0, 30.0]), Some(30.0));
    }

    #[test]
    fn test_session_mean() {
        assert_eq!(session_mean::<f64>(&[]), None);
        assert_eq!(session_mean(&[10.0, 20.0, 90.0]), Some(40.0));
    }

    #[test]
    fn test_enrich_empty_history() {
        let stats = enrich(&[]);
        assert!(stats.rows.is_empty());
        assert_eq!(stats.summary, Summary::default());
    }

    #[test]
    fn test_enrich_rows_are_trailing() {
        let solves = history(&[3000.0, 1000.0, 2000.0, 4000.0, 5000.0, 6000.0]);
        let stats = enrich(&solves);

        assert_eq!(stats.rows.len(), 6);
        // row 0: mo3 of 3000,1000,2000 and ao5 of first five
        assert_eq!(stats.rows[0].mo3, Some(2000.0));
        assert_eq!(stats.rows[0].ao5, Some(3000.0));
        // row 1: ao5 over 1000,2000,4000,5000,6000 -> 2000,4000,5000
        assert_eq!(stats.rows[1].ao5, Some(11000.0 / 3.0));
        // rows without enough trailing solves have no value
        assert_eq!(stats.rows[2].ao5, None);
        assert_eq!(stats.rows[4].mo3, None);
        assert!(stats.rows.iter().all(|r| r.ao12.is_none()));
    }

    #[test]
    fn test_enrich_best_flags() {
        let solves = history(&[3000.0, 1000.0, 2000.0, 4000.0, 5000.0, 6000.0]);
        let stats = enrich(&solves);

        let best_rows = stats
            .rows
            .iter()
            .filter(|r| r.is_best_time)
            .map(|r| r.time)
            .collect::<Vec<f64>>();
        assert_eq!(best_rows, vec![1000.0]);

        assert!(stats.rows[0].is_best_ao5);
        assert!(!stats.rows[1].is_best_ao5);
        assert!(!stats.rows.iter().any(|r| r.is_best_ao12));
    }

    #[test]
    fn test_enrich_summary() {
        let solves = history(&[3000.0, 1000.0, 2000.0, 4000.0, 5000.0, 6000.0]);
        let summary = enrich(&solves).summary;

        assert_eq!(summary.count, 6);
        assert_eq!(summary.current_single, Some(3000.0));
        assert_eq!(summary.current_mo3, Some(2000.0));
        assert_eq!(summary.current_ao5, Some(3000.0));
        assert_eq!(summary.current_ao12, None);
        assert_eq!(summary.best_single, Some(1000.0));
        assert_eq!(summary.best_mo3, Some(2000.0));
        assert_eq!(summary.best_ao5, Some(3000.0));
        assert_eq!(summary.best_ao12, None);
        assert_eq!(summary.session_mean, Some(3500.0));
        assert!(summary.std_dev.is_some());
    }

    #[test]
    fn test_best_mo3_comes_from_older_window() {
        let solves = history(&[9000.0, 9000.0, 9000.0, 1000.0, 1000.0]);
        let summary = enrich(&solves).summary;
        assert_eq!(summary.current_mo3, Some(9000.0));
        assert_eq!(summary.best_mo3, Some(11000.0 / 3.0));
    }

    #[test]
    fn test_enrich_is_idempotent() {
        let solves = history(&[
            1200.0, 1500.0, 900.0, 1100.0, 1300.0, 1250.0, 1800.0, 1000.0, 950.0, 1400.0,
            1600.0, 1700.0, 1150.0,
        ]);
        let first = enrich(&solves);
        let second = enrich(&solves);
        assert_eq!(first, second);
        assert!(first.summary.current_ao12.is_some());
        assert_eq!(average(&solves, AO12), average(&solves, AO12));
    }
}
