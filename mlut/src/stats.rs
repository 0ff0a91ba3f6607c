//! Collecting statistics of the build process.

use std::io::Write;

/// Receives events of the build process.
///
/// The implementation for `()` ignores everything and compiles to nothing.
pub trait BuildStatsCollector {
    /// Called when an engine finishes its search, with the number of
    /// multiplier candidates consumed and whether a structure was found.
    #[inline(always)] fn searched(&mut self, _engine: &'static str, _attempts: u64, _success: bool) {}

    /// Called once, when the whole construction ends.
    #[inline(always)] fn end(&mut self) {}
}

impl BuildStatsCollector for () {}

/// Writes one line per engine search.
pub struct BuildStatsPrinter<W: Write = std::io::Stdout> {
    writer: W,
}

impl BuildStatsPrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self { writer: std::io::stdout() }
    }
}

impl<W: Write> BuildStatsPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> BuildStatsCollector for BuildStatsPrinter<W> {
    fn searched(&mut self, engine: &'static str, attempts: u64, success: bool) {
        writeln!(self.writer, "{} {} {}", engine, attempts,
            if success { "found" } else { "exhausted" }).unwrap();
    }
}
