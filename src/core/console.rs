//! Leveled user-facing output
//!
//! A `Console` is a cheap cloneable handle. Every message is formatted by
//! the caller and sent whole over a bounded channel to one writer thread,
//! so lines from concurrent workers never interleave. The writer thread
//! belongs to the invocation: `ConsoleGuard::finish` drains and joins it.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::Write;
use std::thread::JoinHandle;

use super::config::CONSOLE_CHANNEL_CAPACITY;

/// Output threshold, ordered from least to most chatty
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    /// Maps `-q` / repeated `-v` flags onto a threshold
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    /// Matching `tracing` filter directive for diagnostics
    pub fn tracing_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "reposweep=error",
            Verbosity::Normal => "reposweep=warn",
            Verbosity::Verbose => "reposweep=info",
            Verbosity::Debug => "reposweep=debug",
        }
    }
}

enum Stream {
    Stdout,
    Stderr,
}

struct Record {
    stream: Stream,
    text: String,
}

#[derive(Clone)]
pub struct Console {
    threshold: Verbosity,
    tx: Sender<Record>,
}

/// Owns the writer thread; dropping it without `finish` detaches the thread
pub struct ConsoleGuard {
    handle: Option<JoinHandle<()>>,
}

impl ConsoleGuard {
    /// Waits until every message sent so far has been written
    ///
    /// All `Console` clones must be dropped first, otherwise this blocks.
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Console {
    /// Starts a console writing to the process stdout and stderr
    pub fn start(threshold: Verbosity) -> (Self, ConsoleGuard) {
        Self::with_writers(threshold, std::io::stdout(), std::io::stderr())
    }

    /// Starts a console writing to arbitrary sinks
    pub fn with_writers<O, E>(threshold: Verbosity, out: O, err: E) -> (Self, ConsoleGuard)
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        let (tx, rx) = bounded(CONSOLE_CHANNEL_CAPACITY);
        let handle = std::thread::Builder::new()
            .name("console-writer".into())
            .spawn(move || write_records(rx, out, err))
            .ok();
        (
            Self { threshold, tx },
            ConsoleGuard { handle },
        )
    }

    pub fn threshold(&self) -> Verbosity {
        self.threshold
    }

    pub fn enabled(&self, level: Verbosity) -> bool {
        level <= self.threshold
    }

    /// Sends `text` to stdout when `level` passes the threshold
    pub fn emit(&self, level: Verbosity, text: impl Into<String>) {
        if self.enabled(level) {
            self.send(Stream::Stdout, text.into());
        }
    }

    /// Errors are shown at every threshold, on stderr
    pub fn error(&self, text: impl Into<String>) {
        self.send(Stream::Stderr, text.into());
    }

    pub fn info(&self, text: impl Into<String>) {
        self.emit(Verbosity::Normal, text);
    }

    pub fn verbose(&self, text: impl Into<String>) {
        self.emit(Verbosity::Verbose, text);
    }

    pub fn debug(&self, text: impl Into<String>) {
        self.emit(Verbosity::Debug, text);
    }

    /// Unfiltered stdout, for generated output meant to be piped
    pub fn raw(&self, text: impl Into<String>) {
        self.send(Stream::Stdout, text.into());
    }

    fn send(&self, stream: Stream, text: String) {
        let _ = self.tx.send(Record { stream, text });
    }
}

fn write_records<O: Write, E: Write>(rx: Receiver<Record>, mut out: O, mut err: E) {
    for record in rx {
        let mut buffer = record.text.into_bytes();
        buffer.push(b'\n');
        // Write failures (broken pipe) are dropped; the loop keeps draining
        let _ = match record.stream {
            Stream::Stdout => out.write_all(&buffer).and_then(|_| out.flush()),
            Stream::Stderr => err.write_all(&buffer).and_then(|_| err.flush()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(threshold: Verbosity, f: impl FnOnce(&Console)) -> (String, String) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let (console, guard) = Console::with_writers(threshold, out.clone(), err.clone());
        f(&console);
        drop(console);
        guard.finish();
        (out.contents(), err.contents())
    }

    #[test]
    fn test_threshold_filters_messages() {
        let (out, err) = capture(Verbosity::Normal, |c| {
            c.info("shown");
            c.verbose("hidden");
            c.debug("hidden too");
            c.error("problem");
        });
        assert_eq!(out, "shown\n");
        assert_eq!(err, "problem\n");
    }

    #[test]
    fn test_quiet_still_shows_errors_and_raw_output() {
        let (out, err) = capture(Verbosity::Quiet, |c| {
            c.info("hidden");
            c.raw("export A=1");
            c.error("problem");
        });
        assert_eq!(out, "export A=1\n");
        assert_eq!(err, "problem\n");
    }

    #[test]
    fn test_concurrent_blocks_do_not_interleave() {
        let (out, _) = capture(Verbosity::Normal, |c| {
            std::thread::scope(|scope| {
                for worker in 0..4 {
                    let console = c.clone();
                    scope.spawn(move || {
                        for round in 0..25 {
                            console.info(format!("begin {worker}-{round}\nbody\nend {worker}-{round}"));
                        }
                    });
                }
            });
        });

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4 * 25 * 3);
        for block in lines.chunks(3) {
            let id = block[0].strip_prefix("begin ").unwrap();
            assert_eq!(block[1], "body");
            assert_eq!(block[2], format!("end {id}"));
        }
    }

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Debug);
        assert!(Verbosity::Quiet < Verbosity::Debug);
    }
}
