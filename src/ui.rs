pub mod digits;
pub mod history;

use std::rc::Rc;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use crate::{
    app::{App, Prompt, EVENT_BAR_HEIGHT},
    clock::Clock,
    solve::Event,
    timer::TimerState,
    util::{format_stat, format_time},
};

const HISTORY_WIDTH: u16 = 46;

pub fn draw<C: Clock>(app: &App<C>, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(EVENT_BAR_HEIGHT),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(area);

        render_event_bar(self.scope.event, rows[0], buf);

        // immersive mode: the history panel hides while a cycle is in flight
        let focused = self.timer.is_focused();
        let body = if focused || area.width < HISTORY_WIDTH * 2 {
            vec![Rect::default(), rows[1]]
        } else {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(HISTORY_WIDTH), Constraint::Min(0)])
                .split(rows[1])
                .to_vec()
        };

        if !body[0].is_empty() {
            history::render_history(
                &self.stats.rows,
                self.selected,
                format!(" Session {} ({}) ", self.scope.session, self.history.len()),
                body[0],
                buf,
            );
        }

        render_timer_panel(self, body[1], buf);
        render_status_line(self, rows[2], buf);
    }
}

fn event_tabs(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            Event::ALL
                .iter()
                .map(|_| Constraint::Ratio(1, Event::ALL.len() as u32))
                .collect::<Vec<_>>(),
        )
        .split(area)
}

/// Event whose tab covers `column` on a screen `width` columns wide
pub fn event_at(width: u16, column: u16) -> Option<Event> {
    let tabs = event_tabs(Rect::new(0, 0, width, EVENT_BAR_HEIGHT));
    Event::ALL
        .iter()
        .zip(tabs.iter())
        .find(|(_, tab)| column >= tab.left() && column < tab.right())
        .map(|(event, _)| *event)
}

fn render_event_bar(current: Event, area: Rect, buf: &mut Buffer) {
    let tabs = event_tabs(area);

    for (event, tab) in Event::ALL.iter().zip(tabs.iter()) {
        let style = if *event == current {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        Paragraph::new(Span::styled(event.label(), style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(style))
            .render(*tab, buf);
    }
}

fn state_style(state: TimerState) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match state {
        TimerState::Idle => bold,
        TimerState::Holding => bold.fg(Color::Red),
        TimerState::Ready => bold.fg(Color::Green),
        TimerState::Running => bold.fg(Color::White),
        TimerState::Stopped => bold.fg(Color::Cyan),
    }
}

fn render_timer_panel<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let text = format_time(app.timer.elapsed_ms());
    let style = state_style(app.timer.state());

    let big = digits::render_big(&text)
        .filter(|lines| digits::big_width(lines) <= area.width as usize);
    let time_height = big
        .as_ref()
        .map_or(1, |lines| lines.len() as u16);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(time_height),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let time_lines = match big {
        Some(lines) => lines
            .into_iter()
            .map(|l| Line::from(Span::styled(l, style)))
            .collect::<Vec<Line>>(),
        None => vec![Line::from(Span::styled(text, style))],
    };
    Paragraph::new(time_lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    if app.timer.is_focused() {
        return;
    }

    let summary = &app.stats.summary;
    let dim = Style::default().add_modifier(Modifier::DIM);
    let current = Line::from(vec![
        Span::styled("mo3 ", dim),
        Span::raw(format_stat(summary.current_mo3)),
        Span::styled("   ao5 ", dim),
        Span::raw(format_stat(summary.current_ao5)),
        Span::styled("   ao12 ", dim),
        Span::raw(format_stat(summary.current_ao12)),
    ]);
    let best = Line::from(vec![
        Span::styled("best ", dim),
        Span::raw(format_stat(summary.best_single)),
        Span::styled("   ao5 ", dim),
        Span::raw(format_stat(summary.best_ao5)),
        Span::styled("   ao12 ", dim),
        Span::raw(format_stat(summary.best_ao12)),
        Span::styled("   mean ", dim),
        Span::raw(format_stat(summary.session_mean)),
    ]);
    Paragraph::new(vec![current, best])
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn render_status_line<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let (text, style) = match app.prompt {
        Some(Prompt::DeleteLast(_)) => (
            format!(
                "Delete last solve ({})? (y/n)",
                format_stat(app.history.newest().map(|s| s.time_ms))
            ),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Some(Prompt::Delete(id)) => {
            let (number, time) = app
                .history
                .iter()
                .enumerate()
                .find(|(_, solve)| solve.id == id)
                .map_or((0, None), |(idx, solve)| {
                    (app.history.len() - idx, Some(solve.time_ms))
                });
            (
                format!("Delete solve #{} ({})? (y/n)", number, format_stat(time)),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        }
        Some(Prompt::ClearSession) => (
            format!(
                "Clear all {} solves of {} session {}? (y/n)",
                app.history.len(),
                app.scope.event.label(),
                app.scope.session
            ),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        None => match app.timer.state() {
            TimerState::Idle | TimerState::Stopped => (
                "HOLD SPACE TO START   (e)vent  [ ] session  (d)elete last  (x) delete selected  (c)lear  (q)uit"
                    .to_string(),
                Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
            ),
            TimerState::Holding => (
                "keep holding... drag down to delete the last solve".to_string(),
                Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
            ),
            TimerState::Ready => (
                "release to start".to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::ITALIC),
            ),
            TimerState::Running => (String::new(), Style::default()),
        },
    };

    Paragraph::new(Span::styled(text, style))
        .alignment(Alignment::Center)
        .render(area, buf);
}
