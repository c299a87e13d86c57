use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Input and timing events fed to the timer host, one per loop iteration
#[derive(Clone, Debug)]
pub enum StackrEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Source of key, mouse and resize events
pub trait StackrEventSource: Send + 'static {
    /// Wait at most `timeout` for the next input event
    fn recv_timeout(&self, timeout: Duration) -> Result<StackrEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread. Key releases only arrive
/// when the terminal accepted the keyboard enhancement flags.
pub struct CrosstermEventSource {
    rx: Receiver<StackrEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => StackrEvent::Key(key),
                Ok(CtEvent::Mouse(mouse)) => StackrEvent::Mouse(mouse),
                Ok(CtEvent::Resize(_, _)) => StackrEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(%err, "terminal input reader stopped");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StackrEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StackrEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Frame interval. Each expiry drives `GestureTimer::tick`, which fires a due
/// hold deadline and refreshes the running time.
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Constant frame interval, `Config::tick_rate_ms` in the binary
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed event source for headless tests
pub struct TestEventSource {
    rx: Receiver<StackrEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<StackrEvent>) -> Self {
        Self { rx }
    }
}

impl StackrEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StackrEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls one step of the timer loop: the next input, or `Tick` once a frame
/// interval passes without any
pub struct Runner<E: StackrEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: StackrEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// A closed input channel also yields `Tick`, so the timer keeps running
    pub fn step(&self) -> StackrEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                StackrEvent::Tick
            }
        }
    }
}
