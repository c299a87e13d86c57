use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "stackr=info";

/// Route `tracing` output to `path`. The terminal belongs to the UI, so
/// nothing is ever logged to stdout or stderr.
pub fn init(path: &Path) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let env_filter = EnvFilter::try_from_env("STACKR_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // a second init (tests, re-entry) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();

    Ok(())
}
