pub(crate) mod fs;
pub(crate) mod shell;
pub(crate) mod terminal;

// Public API - utilities used by commands
pub use fs::shorten_path;
pub use shell::{double_quoted, single_quoted};
pub use terminal::set_terminal_title;
