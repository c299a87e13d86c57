//! Hold-to-start gesture timer.
//!
//! The timer is a single-threaded state machine fed with normalized input
//! events. Holding the trigger (a key or a pointer press) for
//! [`TimerConfig::hold_ms`] arms it, releasing starts the measurement and the
//! next press stops it. A downward drag while holding is recognized as a
//! swipe and requests deletion of the previous solve instead.
//!
//! Both asynchronous pieces of the cycle, the hold deadline and the per-frame
//! elapsed refresh, are plain fields advanced by [`GestureTimer::tick`], so
//! cancelling them is just clearing the field.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::{millis_between, Clock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TimerState {
    #[strum(serialize = "IDLE")]
    Idle,
    #[strum(serialize = "HOLDING")]
    Holding,
    #[strum(serialize = "READY")]
    Ready,
    #[strum(serialize = "RUNNING")]
    Running,
    #[strum(serialize = "STOPPED")]
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Keyboard,
    Mouse,
    Touch,
}

impl Modality {
    pub fn is_pointer(&self) -> bool {
        matches!(self, Modality::Mouse | Modality::Touch)
    }
}

/// Key classification done by the host before forwarding a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The designated hold-to-start key
    Trigger,
    Other,
}

/// Pointer origin captured when a hold starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub x: f64,
    pub y: f64,
}

impl GestureSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Semantic actions derived from the raw input stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerAction {
    HoldStarted,
    Armed,
    Launched,
    Stopped { elapsed_ms: f64 },
    HoldCancelled,
    SwipeDeleted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerConfig {
    pub hold_ms: u64,
    pub debounce_ms: u64,
    /// Minimum downward displacement for a swipe
    pub swipe_min_dy: f64,
    /// Horizontal displacement must stay below this for a swipe
    pub swipe_max_dx: f64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            hold_ms: 500,
            debounce_ms: 300,
            swipe_min_dy: 50.0,
            swipe_max_dx: 80.0,
        }
    }
}

/// Host callbacks
pub trait TimerListener {
    fn on_solve_complete(&mut self, elapsed_ms: f64);
    fn on_swipe_delete(&mut self);
    /// Ready cue, played when the hold arms the timer
    fn on_ready(&mut self) {}
}

type InteractivePredicate = Box<dyn Fn(GestureSample) -> bool>;

pub struct GestureTimer<C: Clock, L: TimerListener> {
    config: TimerConfig,
    clock: C,
    listener: L,
    state: TimerState,
    elapsed_ms: f64,
    started_at: Option<Instant>,
    hold_deadline: Option<Instant>,
    origin: Option<GestureSample>,
    gesture_modality: Option<Modality>,
    swiped: bool,
    ticking: bool,
    shut_down: bool,
    interactive: Option<InteractivePredicate>,
}

impl<C: Clock, L: TimerListener> fmt::Debug for GestureTimer<C, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureTimer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("hold_pending", &self.hold_deadline.is_some())
            .field("ticking", &self.ticking)
            .field("swiped", &self.swiped)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

impl<C: Clock, L: TimerListener> GestureTimer<C, L> {
    pub fn new(config: TimerConfig, clock: C, listener: L) -> Self {
        Self {
            config,
            clock,
            listener,
            state: TimerState::Idle,
            elapsed_ms: 0.0,
            started_at: None,
            hold_deadline: None,
            origin: None,
            gesture_modality: None,
            swiped: false,
            ticking: false,
            shut_down: false,
            interactive: None,
        }
    }

    /// Install the "origin is an interactive control" check. Pointer presses
    /// for which it returns true are ignored in every state.
    pub fn with_interactive_filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(GestureSample) -> bool + 'static,
    {
        self.interactive = Some(Box::new(predicate));
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn hold_pending(&self) -> bool {
        self.hold_deadline.is_some()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// True while a cycle is in flight (holding, armed or running)
    pub fn is_focused(&self) -> bool {
        matches!(
            self.state,
            TimerState::Holding | TimerState::Ready | TimerState::Running
        )
    }

    pub fn is_interactive(&self, origin: GestureSample) -> bool {
        self.interactive.as_ref().is_some_and(|p| p(origin))
    }

    pub fn key_down(&mut self, key: Key, repeat: bool) -> Vec<TimerAction> {
        let mut actions = self.catch_up();
        if self.shut_down || (key == Key::Trigger && repeat) {
            return actions;
        }

        match (self.state, key) {
            (TimerState::Running, _) => actions.extend(self.try_stop()),
            (TimerState::Idle | TimerState::Stopped, Key::Trigger) => {
                actions.push(self.begin_hold(None, Modality::Keyboard))
            }
            _ => {}
        }
        actions
    }

    pub fn key_up(&mut self, key: Key) -> Vec<TimerAction> {
        let mut actions = self.catch_up();
        if self.shut_down || key != Key::Trigger {
            return actions;
        }
        actions.extend(self.release(Modality::Keyboard));
        actions
    }

    /// Pointer press (or any normalized start gesture) at `(x, y)`
    pub fn start(&mut self, x: f64, y: f64, modality: Modality) -> Vec<TimerAction> {
        let mut actions = self.catch_up();
        let origin = GestureSample::new(x, y);
        if self.shut_down || self.is_interactive(origin) {
            return actions;
        }

        match self.state {
            TimerState::Running => actions.extend(self.try_stop()),
            TimerState::Idle | TimerState::Stopped => {
                let origin = modality.is_pointer().then_some(origin);
                actions.push(self.begin_hold(origin, modality));
            }
            TimerState::Holding | TimerState::Ready => {}
        }
        actions
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, modality: Modality) -> Vec<TimerAction> {
        let mut actions = self.catch_up();
        if self.shut_down
            || self.swiped
            || self.state != TimerState::Holding
            || !modality.is_pointer()
        {
            return actions;
        }

        let Some(origin) = self.origin else {
            return actions;
        };
        let dx = x - origin.x;
        let dy = y - origin.y;
        if dy > self.config.swipe_min_dy && dx.abs() < self.config.swipe_max_dx {
            actions.push(self.swipe());
        }
        actions
    }

    pub fn end(&mut self, modality: Modality) -> Vec<TimerAction> {
        let mut actions = self.catch_up();
        if self.shut_down {
            return actions;
        }
        actions.extend(self.release(modality));
        actions
    }

    /// Per-frame callback: fires a due hold deadline and refreshes the
    /// elapsed time of a running measurement from the absolute start instant.
    pub fn tick(&mut self) -> Vec<TimerAction> {
        let actions = self.catch_up();
        if self.ticking {
            if let Some(started_at) = self.started_at {
                self.elapsed_ms = millis_between(started_at, self.clock.now());
            }
        }
        actions
    }

    /// Cancel every pending deadline and silence all callbacks for good
    pub fn shutdown(&mut self) {
        self.hold_deadline = None;
        self.ticking = false;
        self.started_at = None;
        self.origin = None;
        self.gesture_modality = None;
        self.shut_down = true;
        if self.is_focused() {
            self.transition(TimerState::Idle);
        }
    }

    fn transition(&mut self, to: TimerState) {
        debug!(from = %self.state, to = %to, "timer transition");
        self.state = to;
    }

    fn catch_up(&mut self) -> Vec<TimerAction> {
        let mut actions = Vec::new();
        if self.shut_down {
            return actions;
        }
        let due = self
            .hold_deadline
            .is_some_and(|deadline| self.clock.now() >= deadline);
        if due && self.state == TimerState::Holding && !self.swiped {
            self.hold_deadline = None;
            self.transition(TimerState::Ready);
            self.listener.on_ready();
            actions.push(TimerAction::Armed);
        }
        actions
    }

    fn begin_hold(&mut self, origin: Option<GestureSample>, modality: Modality) -> TimerAction {
        self.elapsed_ms = 0.0;
        self.origin = origin;
        self.gesture_modality = Some(modality);
        self.swiped = false;
        self.hold_deadline =
            Some(self.clock.now() + Duration::from_millis(self.config.hold_ms));
        self.transition(TimerState::Holding);
        TimerAction::HoldStarted
    }

    fn release(&mut self, modality: Modality) -> Option<TimerAction> {
        let same_gesture = self
            .gesture_modality
            .is_some_and(|m| m.is_pointer() == modality.is_pointer());

        match self.state {
            TimerState::Ready if same_gesture => {
                self.origin = None;
                self.gesture_modality = None;
                self.started_at = Some(self.clock.now());
                self.ticking = true;
                self.transition(TimerState::Running);
                Some(TimerAction::Launched)
            }
            TimerState::Holding if same_gesture => {
                self.hold_deadline = None;
                self.origin = None;
                self.gesture_modality = None;
                self.transition(TimerState::Idle);
                Some(TimerAction::HoldCancelled)
            }
            _ => None,
        }
    }

    fn swipe(&mut self) -> TimerAction {
        self.hold_deadline = None;
        self.swiped = true;
        self.origin = None;
        self.gesture_modality = None;
        self.transition(TimerState::Idle);
        self.listener.on_swipe_delete();
        TimerAction::SwipeDeleted
    }

    fn try_stop(&mut self) -> Option<TimerAction> {
        let started_at = self.started_at?;
        let elapsed_ms = millis_between(started_at, self.clock.now());
        if elapsed_ms < self.config.debounce_ms as f64 {
            debug!(elapsed_ms, "stop ignored inside debounce window");
            return None;
        }

        self.ticking = false;
        self.started_at = None;
        self.elapsed_ms = elapsed_ms;
        self.transition(TimerState::Stopped);
        self.listener.on_solve_complete(elapsed_ms);
        Some(TimerAction::Stopped { elapsed_ms })
    }
}
