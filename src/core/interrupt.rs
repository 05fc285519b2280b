//! Shared interrupt flag
//!
//! The flag is set once (normally from the Ctrl-C handler) and only ever read
//! afterwards. Workers check it while idle on the queue, the pool checks it
//! between liveness polls, and the walker checks it between discoveries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the invocation as interrupted
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Routes the process Ctrl-C signal into this flag
    ///
    /// Can only succeed once per process.
    pub fn install_ctrlc_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = Arc::clone(&self.flag);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
    }
}
