//! Terminal host around the gesture timer: maps crossterm input to timer
//! calls, owns the scoped solve history and keeps it in sync with the store.

use chrono::Local;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::solve::{Scope, Solve, SolveHistory, SolveId};
use crate::stats::{enrich, SessionStats};
use crate::store::SolveStore;
use crate::timer::{GestureTimer, Key, Modality, TimerConfig, TimerListener, TimerState};

/// Rows at the top of the screen taken by the clickable event bar
pub const EVENT_BAR_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    Record(f64),
    RequestDeleteLast,
    Beep,
}

/// Timer listener that queues commands for the app to apply after each input
#[derive(Debug, Default)]
pub struct HostListener {
    pending: Vec<HostCommand>,
    beep: bool,
}

impl HostListener {
    pub fn new(beep: bool) -> Self {
        Self {
            pending: Vec::new(),
            beep,
        }
    }

    pub fn drain(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.pending)
    }
}

impl TimerListener for HostListener {
    fn on_solve_complete(&mut self, elapsed_ms: f64) {
        self.pending.push(HostCommand::Record(elapsed_ms));
    }

    fn on_swipe_delete(&mut self) {
        self.pending.push(HostCommand::RequestDeleteLast);
    }

    fn on_ready(&mut self) {
        if self.beep {
            self.pending.push(HostCommand::Beep);
        }
    }
}

/// Destructive actions waiting for a `y`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prompt {
    DeleteLast(SolveId),
    /// Delete the solve highlighted in the history table
    Delete(SolveId),
    ClearSession,
}

#[derive(Debug)]
pub struct App<C: Clock> {
    pub timer: GestureTimer<C, HostListener>,
    pub scope: Scope,
    pub history: SolveHistory,
    pub stats: SessionStats,
    pub prompt: Option<Prompt>,
    /// Highlighted history row, 0 is the newest solve
    pub selected: usize,
    store: Option<SolveStore>,
    cell_size: (f64, f64),
    screen_width: u16,
    key_release_supported: bool,
    bell_pending: bool,
    should_quit: bool,
}

impl<C: Clock> App<C> {
    pub fn new(
        config: &Config,
        scope: Scope,
        store: Option<SolveStore>,
        clock: C,
    ) -> crate::Result<Self> {
        let history = match &store {
            Some(store) => store.load_history(scope)?,
            None => SolveHistory::new(),
        };
        let bar_bottom = EVENT_BAR_HEIGHT as f64 * config.cell_height_px;
        let timer = GestureTimer::new(
            TimerConfig::from(config),
            clock,
            HostListener::new(config.ready_beep),
        )
        .with_interactive_filter(move |origin| origin.y < bar_bottom);

        Ok(Self {
            timer,
            scope,
            stats: enrich(history.as_slice()),
            history,
            prompt: None,
            selected: 0,
            store,
            cell_size: (config.cell_width_px, config.cell_height_px),
            screen_width: 80,
            key_release_supported: true,
            bell_pending: false,
            should_quit: false,
        })
    }

    /// Without key release events a second trigger press stands in for the release
    pub fn set_key_release_supported(&mut self, supported: bool) {
        self.key_release_supported = supported;
    }

    pub fn set_screen_width(&mut self, width: u16) {
        self.screen_width = width;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    pub fn quit(&mut self) {
        self.timer.shutdown();
        self.should_quit = true;
    }

    pub fn on_tick(&mut self) {
        self.timer.tick();
        self.apply_pending();
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        let trigger = key.code == KeyCode::Char(' ');
        match key.kind {
            KeyEventKind::Release => {
                if trigger {
                    self.timer.key_up(Key::Trigger);
                }
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                let repeat = key.kind == KeyEventKind::Repeat;
                self.on_key_press(key.code, trigger, repeat);
            }
        }
        self.apply_pending();
    }

    fn on_key_press(&mut self, code: KeyCode, trigger: bool, repeat: bool) {
        if let Some(prompt) = self.prompt.take() {
            if code == KeyCode::Char('y') {
                self.confirm(prompt);
            }
            return;
        }

        match self.timer.state() {
            TimerState::Running => {
                let key = if trigger { Key::Trigger } else { Key::Other };
                self.timer.key_down(key, repeat);
            }
            TimerState::Holding | TimerState::Ready => {
                if trigger && !repeat && !self.key_release_supported {
                    self.timer.key_up(Key::Trigger);
                }
            }
            TimerState::Idle | TimerState::Stopped => {
                if trigger {
                    self.timer.key_down(Key::Trigger, repeat);
                } else if !repeat {
                    self.on_command_key(code);
                }
            }
        }
    }

    fn on_command_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.quit(),
            KeyCode::Char('e') => self.switch_scope(Scope::new(self.scope.event.next(), self.scope.session)),
            KeyCode::Char('E') => self.switch_scope(Scope::new(self.scope.event.prev(), self.scope.session)),
            KeyCode::Char(']') => {
                self.switch_scope(Scope::new(self.scope.event, self.scope.session.saturating_add(1)))
            }
            KeyCode::Char('[') => {
                self.switch_scope(Scope::new(self.scope.event, self.scope.session.saturating_sub(1)))
            }
            KeyCode::Char('d') => self.request_delete_last(),
            KeyCode::Char('x') | KeyCode::Delete => self.request_delete_selected(),
            KeyCode::Char('c') => {
                if !self.history.is_empty() {
                    self.prompt = Some(Prompt::ClearSession);
                }
            }
            KeyCode::Down => self.select_by(1),
            KeyCode::Up => self.select_by(-1),
            KeyCode::PageDown => self.select_by(10),
            KeyCode::PageUp => self.select_by(-10),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.history.len().saturating_sub(1),
            _ => {}
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let x = mouse.column as f64 * self.cell_size.0;
        let y = mouse.row as f64 * self.cell_size.1;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.prompt.take().is_some() {
                    return;
                }
                if mouse.row < EVENT_BAR_HEIGHT && !self.timer.is_focused() {
                    self.click_event_bar(mouse.column);
                }
                self.timer.start(x, y, Modality::Mouse);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.timer.pointer_move(x, y, Modality::Mouse);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.timer.end(Modality::Mouse);
            }
            MouseEventKind::ScrollDown => self.select_by(1),
            MouseEventKind::ScrollUp => self.select_by(-1),
            _ => {}
        }
        self.apply_pending();
    }

    fn click_event_bar(&mut self, column: u16) {
        if let Some(event) = crate::ui::event_at(self.screen_width, column) {
            self.switch_scope(Scope::new(event, self.scope.session));
        }
    }

    fn select_by(&mut self, delta: isize) {
        let max = self.history.len().saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(max);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.history.len().saturating_sub(1));
    }

    fn apply_pending(&mut self) {
        for command in self.timer.listener_mut().drain() {
            match command {
                HostCommand::Record(elapsed_ms) => self.record(elapsed_ms),
                HostCommand::RequestDeleteLast => self.request_delete_last(),
                HostCommand::Beep => self.bell_pending = true,
            }
        }
    }

    fn record(&mut self, elapsed_ms: f64) {
        let timestamp = Local::now();
        let solve = match &self.store {
            Some(store) => match store.record_solve(self.scope, elapsed_ms, timestamp) {
                Ok(solve) => Some(solve),
                Err(err) => {
                    warn!(%err, "failed to persist solve");
                    None
                }
            },
            None => None,
        };
        let solve = solve.unwrap_or_else(|| Solve {
            id: self.history.next_local_id(),
            time_ms: elapsed_ms,
            timestamp,
            event: self.scope.event,
            session: self.scope.session,
        });

        info!(
            event = %self.scope.event,
            session = self.scope.session,
            time = %crate::util::format_time(elapsed_ms),
            "solve recorded"
        );
        let local_id = self.history.next_local_id();
        if !self.history.prepend(solve.clone()) {
            warn!(id = solve.id.0, "solve id already in history, keeping it under a local id");
            self.history.prepend(Solve {
                id: local_id,
                ..solve
            });
        }
        self.selected = 0;
        self.refresh_stats();
    }

    fn request_delete_last(&mut self) {
        if let Some(newest) = self.history.newest() {
            self.prompt = Some(Prompt::DeleteLast(newest.id));
        }
    }

    fn request_delete_selected(&mut self) {
        if let Some(solve) = self.history.as_slice().get(self.selected) {
            self.prompt = Some(Prompt::Delete(solve.id));
        }
    }

    fn confirm(&mut self, prompt: Prompt) {
        match prompt {
            Prompt::DeleteLast(id) | Prompt::Delete(id) => {
                if let Some(store) = &self.store {
                    if let Err(err) = store.remove_solve(id) {
                        warn!(%err, "failed to delete solve");
                    }
                }
                if self.history.remove(id).is_some() {
                    info!(id = id.0, "solve deleted");
                }
            }
            Prompt::ClearSession => {
                if let Some(store) = &self.store {
                    if let Err(err) = store.clear_session(self.scope) {
                        warn!(%err, "failed to clear session");
                    }
                }
                info!(event = %self.scope.event, session = self.scope.session, "session cleared");
                self.history.clear();
            }
        }
        self.clamp_selection();
        self.refresh_stats();
    }

    pub fn switch_scope(&mut self, scope: Scope) {
        if scope == self.scope || self.timer.is_focused() {
            return;
        }
        let history = match &self.store {
            Some(store) => store.load_history(scope).unwrap_or_else(|err| {
                warn!(%err, "failed to load history");
                SolveHistory::new()
            }),
            None => SolveHistory::new(),
        };
        self.scope = scope;
        self.history = history;
        self.prompt = None;
        self.selected = 0;
        self.refresh_stats();
    }

    fn refresh_stats(&mut self) {
        self.stats = enrich(self.history.as_slice());
    }
}
