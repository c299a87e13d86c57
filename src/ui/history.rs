use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use crate::stats::SolveRow;
use crate::util::{format_stat, format_time};

/// Pure presenter for one history row. `number` counts from the oldest solve.
pub fn present_row(number: usize, row: &SolveRow) -> Row<'static> {
    let best_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let plain = Style::default();

    let pick = |best: bool| if best { best_style } else { plain };

    Row::new(vec![
        Cell::from(number.to_string()).style(Style::default().add_modifier(Modifier::DIM)),
        Cell::from(format_time(row.time)).style(pick(row.is_best_time)),
        Cell::from(format_stat(row.mo3)),
        Cell::from(format_stat(row.ao5)).style(pick(row.is_best_ao5)),
        Cell::from(format_stat(row.ao12)).style(pick(row.is_best_ao12)),
    ])
}

/// Scrolling solve table, newest on top. The window follows `selected`.
pub fn render_history(rows: &[SolveRow], selected: usize, title: String, area: Rect, buf: &mut Buffer) {
    let visible_height = area.height.saturating_sub(3) as usize;
    let total = rows.len();
    let offset = selected
        .saturating_sub(visible_height.saturating_sub(1))
        .min(total.saturating_sub(visible_height));

    let header = Row::new(vec!["#", "time", "mo3", "ao5", "ao12"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let body = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_height)
        .map(|(idx, row)| {
            let presented = present_row(total - idx, row);
            if idx == selected {
                presented.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                presented
            }
        })
        .collect::<Vec<Row>>();

    let table = Table::new(
        body,
        [
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));

    Widget::render(table, area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::SolveId;

    fn row(time: f64) -> SolveRow {
        SolveRow {
            id: SolveId(1),
            time,
            mo3: None,
            ao5: Some(time),
            ao12: None,
            is_best_time: true,
            is_best_ao5: false,
            is_best_ao12: false,
        }
    }

    #[test]
    fn test_render_history_lists_rows() {
        let rows = vec![row(2345.0), row(1234.0)];
        let area = Rect::new(0, 0, 50, 10);
        let mut buf = Buffer::empty(area);

        render_history(&rows, 0, "Session 1".to_string(), area, &mut buf);

        let content: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Session 1"));
        assert!(content.contains("2.345"));
        assert!(content.contains("1.234"));
    }

    #[test]
    fn test_render_history_clamps_scroll() {
        let rows = (0..3).map(|i| row(1000.0 + i as f64)).collect::<Vec<_>>();
        let area = Rect::new(0, 0, 50, 10);
        let mut buf = Buffer::empty(area);

        render_history(&rows, 99, "s".to_string(), area, &mut buf);

        let content: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("1.000"));
    }

    #[test]
    fn test_render_history_follows_selection() {
        // 7 rows of space for 20 solves
        let rows = (0..20).map(|i| row(1000.0 * (i + 1) as f64)).collect::<Vec<_>>();
        let area = Rect::new(0, 0, 50, 10);
        let mut buf = Buffer::empty(area);

        render_history(&rows, 15, "s".to_string(), area, &mut buf);

        let content: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("16.000"));
        assert!(!content.contains("9.000"));

        // the selected row is drawn reversed
        let selected_line = (0..area.height)
            .find(|&y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .contains("16.000")
            })
            .unwrap();
        assert!(buf[(1, selected_line)].modifier.contains(Modifier::REVERSED));
    }
}
