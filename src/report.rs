//! Reporting: the log sink contract and the stable line formats.
//!
//! The harness's only output is an ordered sequence of `log(level, message)`
//! calls against a [`LogSink`]. Per-test lines are informational; failure
//! detail at the end of a run is emitted at error severity. The line wording
//! produced here is a stable contract relied on by golden-output tests:
//!
//! ```text
//! [TESTS] [suite1] [suite2] adds gravel ok
//! [TESTS] [suite1] [suite2] adds gravel FAILED
//! [TESTS] All tests passed
//! [TESTS] No tests to run
//! ```

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Severity of a log entry. `Info` corresponds to an unspecified level in
/// the host's log call; `Error` is reserved for failure detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Log sink the harness reports through, to make output testable and
/// injectable.
pub trait LogSink {
    fn log(&mut self, level: Level, message: &str);
}

/// Collects log entries into memory for tests or programmatic capture.
#[derive(Debug, Default)]
pub struct LogBuffer {
    entries: Vec<(Level, String)>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in emission order.
    pub fn entries(&self) -> &[(Level, String)] {
        &self.entries
    }

    /// Just the message lines, in emission order.
    pub fn lines(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, m)| m.as_str()).collect()
    }

    /// Messages recorded at error severity.
    pub fn error_lines(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LogSink for LogBuffer {
    fn log(&mut self, level: Level, message: &str) {
        self.entries.push((level, message.to_string()));
    }
}

/// Writes log entries to stdout, errors in red when the stream is a tty.
pub struct ConsoleSink {
    stream: StandardStream,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let choice = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::with_color_choice(choice)
    }

    pub fn with_color_choice(choice: ColorChoice) -> Self {
        ConsoleSink {
            stream: StandardStream::stdout(choice),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn log(&mut self, level: Level, message: &str) {
        if level == Level::Error {
            let _ = self
                .stream
                .set_color(ColorSpec::new().set_fg(Some(Color::Red)));
        }
        let _ = writeln!(&mut self.stream, "{}", message);
        let _ = self.stream.reset();
    }
}

// ----------------------------------------------------------------------------
// Line formatting
// ----------------------------------------------------------------------------

/// Formats a message with the `[TESTS]` tag and bracketed suite path.
pub(crate) fn format_line(suites: &[&str], message: &str) -> String {
    let mut line = String::from("[TESTS] ");
    for suite in suites {
        line.push('[');
        line.push_str(suite);
        line.push_str("] ");
    }
    line.push_str(message);
    line
}

pub(crate) fn test_line(sink: &mut dyn LogSink, suites: &[&str], label: &str, passed: bool) {
    let word = if passed { "ok" } else { "FAILED" };
    let message = format!("{} {}", label, word);
    sink.log(Level::Info, &format_line(suites, &message));
}

pub(crate) fn no_tests(sink: &mut dyn LogSink) {
    sink.log(Level::Info, &format_line(&[], "No tests to run"));
}

pub(crate) fn all_passed(sink: &mut dyn LogSink) {
    sink.log(Level::Info, &format_line(&[], "All tests passed"));
}

pub(crate) fn failure_block(
    sink: &mut dyn LogSink,
    suites: &[&str],
    label: &str,
    diagnostics: &[String],
) {
    let heading = format!("{} failed:", label);
    sink.log(Level::Error, &format_line(suites, &heading));
    for diagnostic in diagnostics {
        sink.log(Level::Error, &format_line(&[], &format!("  {}", diagnostic)));
    }
}
