use std::io::Write;

use crate::solve::{Scope, SolveHistory};
use crate::stats::enrich;
use crate::util::{format_stat, format_time};

/// Write a history as CSV, oldest solve first, numbered like the UI table
pub fn write_csv<W: Write>(history: &SolveHistory, writer: W) -> crate::Result<()> {
    let stats = enrich(history.as_slice());
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["n", "time_ms", "time", "mo3", "ao5", "ao12", "timestamp"])?;

    let count = history.len();
    for (idx, (solve, row)) in history
        .as_slice()
        .iter()
        .zip(stats.rows.iter())
        .enumerate()
        .rev()
    {
        wtr.write_record([
            (count - idx).to_string(),
            format!("{:.0}", solve.time_ms),
            format_time(solve.time_ms),
            format_stat(row.mo3),
            format_stat(row.ao5),
            format_stat(row.ao12),
            solve.timestamp.to_rfc3339(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Plain text session summary for the `stats` subcommand
pub fn write_summary<W: Write>(scope: Scope, history: &SolveHistory, mut out: W) -> crate::Result<()> {
    let summary = enrich(history.as_slice()).summary;

    writeln!(
        out,
        "{} session {} ({} solves)",
        scope.event.label(),
        scope.session,
        summary.count
    )?;
    writeln!(out, "{:<8}{:>12}{:>12}", "", "current", "best")?;
    for (label, current, best) in [
        ("single", summary.current_single, summary.best_single),
        ("mo3", summary.current_mo3, summary.best_mo3),
        ("ao5", summary.current_ao5, summary.best_ao5),
        ("ao12", summary.current_ao12, summary.best_ao12),
    ] {
        writeln!(
            out,
            "{:<8}{:>12}{:>12}",
            label,
            format_stat(current),
            format_stat(best)
        )?;
    }
    writeln!(out, "{:<8}{:>12}", "mean", format_stat(summary.session_mean))?;
    writeln!(
        out,
        "{:<8}{:>12}",
        "sd",
        summary
            .std_dev
            .map_or_else(|| "-".to_string(), |sd| format!("{:.3}", sd / 1000.0))
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::{Event, Solve, SolveId};
    use chrono::Local;

    #[test]
    fn test_write_csv_oldest_first() {
        let solves = [1500.0, 2500.0, 3500.0]
            .iter()
            .enumerate()
            .map(|(i, &t)| Solve {
                id: SolveId(3 - i as i64),
                time_ms: t,
                timestamp: Local::now(),
                event: Event::Cycle,
                session: 1,
            })
            .collect();
        let history = SolveHistory::from_newest_first(solves);

        let mut out = Vec::new();
        write_csv(&history, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "n,time_ms,time,mo3,ao5,ao12,timestamp");
        assert!(lines[1].starts_with("1,3500,3.500,-,-,-,"));
        assert!(lines[3].starts_with("3,1500,1.500,2.500,-,-,"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_write_summary() {
        let solves = (0..5)
            .map(|i| Solve {
                id: SolveId(5 - i),
                time_ms: 1000.0 * (i + 1) as f64,
                timestamp: Local::now(),
                event: Event::ThreeThreeThree,
                session: 2,
            })
            .collect();
        let history = SolveHistory::from_newest_first(solves);

        let mut out = Vec::new();
        write_summary(Scope::new(Event::ThreeThreeThree, 2), &history, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("3-3-3 session 2 (5 solves)"));
        assert!(text.contains("single"));
        assert!(text.contains("1.000"));
        // ao5 of 1..5 seconds drops 1 and 5
        assert!(text.lines().any(|l| l.starts_with("ao5") && l.contains("3.000")));
        assert!(text.lines().any(|l| l.starts_with("ao12") && l.trim_end().ends_with('-')));
    }

    #[test]
    fn test_write_csv_empty_history() {
        let mut out = Vec::new();
        write_csv(&SolveHistory::new(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
