//! Graceful shutdown via atomic flag set from SIGINT/SIGTERM.
//!
//! The orchestrator polls the flag between items and pages; a set flag
//! means "finish the current item, flush the checkpoint, exit 130".

use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

static FLAG: LazyLock<std::sync::Arc<AtomicBool>> =
    LazyLock::new(|| std::sync::Arc::new(AtomicBool::new(false)));

/// Check if shutdown was requested
pub fn is_shutdown_requested() -> bool {
    FLAG.load(Ordering::Relaxed)
}

/// Request shutdown (signal handlers, tests)
pub fn request_shutdown() {
    FLAG.store(true, Ordering::Relaxed);
}

/// Install SIGINT/SIGTERM handlers that set the shutdown flag.
pub fn register_signal_handlers() -> std::io::Result<()> {
    for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(sig, FLAG.clone())?;
    }
    Ok(())
}
