pub mod config;
pub mod console;
pub(crate) mod error;
pub(crate) mod interrupt;
pub(crate) mod pool;
pub(crate) mod roots;
pub(crate) mod scanner;
pub(crate) mod settings;
pub(crate) mod stats;
pub(crate) mod walker;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
