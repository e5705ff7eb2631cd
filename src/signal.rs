//! Ctrl+C handling for cooperative cancellation.
//!
//! The handler flips a shared `AtomicBool`. The resolver checks it between
//! files and between comparison rows and stops with
//! [`ResolveError::Interrupted`](crate::resolve::ResolveError::Interrupted),
//! which the binary maps to exit code 130.
//!
//! ```rust,no_run
//! use recordlink::resolve::ResolverConfig;
//! use recordlink::signal::install_handler;
//!
//! let handler = install_handler();
//! let config = ResolverConfig::default().with_shutdown_flag(handler.flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// The flag to hand to the resolver and walker.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C hook and return its handler.
///
/// Repeated calls return the same handler with the flag cleared. If the hook
/// cannot be registered the handler still works for manual requests.
pub fn install_handler() -> ShutdownHandler {
    let handler = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        let flag = handler.flag();

        let hooked = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
            let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing current item...");
            let _ = std::io::stderr().flush();
            log::info!("Shutdown signal received");
        });
        if let Err(e) = hooked {
            log::debug!("Ctrl+C hook unavailable ({}), using manual shutdown only", e);
        }
        handler
    });

    handler.reset();
    handler.clone()
}
