// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod runtime;
pub mod solve;
pub mod stats;
pub mod store;
pub mod timer;
pub mod ui;
pub mod util;

pub use error::{Error, Result};
pub use timer::{GestureTimer, TimerState};
