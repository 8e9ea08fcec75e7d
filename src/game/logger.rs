//! Game logger: the append-only game log and its console echo
//!
//! Every entry is retained as part of the game's audit trail, whatever the
//! verbosity. Verbosity and output mode only decide what is echoed to stdout.

use serde::{Deserialize, Serialize};

/// Verbosity level for game output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during game
    Silent = 0,
    /// Minimal - only game start and outcome
    Minimal = 1,
    /// Normal - phases and key actions (default)
    #[default]
    Normal = 2,
    /// Verbose - decision engine reasoning as well
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Keep entries in memory only (default)
    #[default]
    Memory,
    /// Keep entries and echo them to stdout
    Both,
}

/// A log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category (e.g., "decision")
    pub category: Option<String>,
}

/// Centralized logger for game events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    entries: Vec<LogEntry>,
}

impl GameLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            ..Self::default()
        }
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    #[inline]
    fn log_to_stdout(&self, level: VerbosityLevel, message: &str) {
        if level == VerbosityLevel::Minimal {
            println!("{message}");
        } else {
            println!("  {message}");
        }
    }

    fn push(&mut self, level: VerbosityLevel, message: String, category: Option<&str>) {
        if self.output_mode == OutputMode::Both && level <= self.verbosity {
            self.log_to_stdout(level, &message);
        }
        self.entries.push(LogEntry {
            level,
            message,
            category: category.map(str::to_string),
        });
    }

    /// Log at Minimal level
    pub fn minimal(&mut self, message: impl Into<String>) {
        self.push(VerbosityLevel::Minimal, message.into(), None);
    }

    /// Log at Normal level
    pub fn normal(&mut self, message: impl Into<String>) {
        self.push(VerbosityLevel::Normal, message.into(), None);
    }

    /// Log at Verbose level
    pub fn verbose(&mut self, message: impl Into<String>) {
        self.push(VerbosityLevel::Verbose, message.into(), None);
    }

    /// Log a decision engine choice (Verbose, "decision" category)
    pub fn decision(&mut self, message: impl Into<String>) {
        self.push(VerbosityLevel::Verbose, message.into(), Some("decision"));
    }

    /// All entries in order
    pub fn logs(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The game log as plain strings
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    /// Entries appended since `start` (a previous `len()`)
    pub fn messages_since(&self, start: usize) -> Vec<String> {
        self.entries
            .iter()
            .skip(start)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Drop entries appended after `len` (used when a command is rolled back)
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Print the last `tail_lines` entries allowed by the verbosity
    pub fn print_tail(&self, tail_lines: usize) {
        let visible: Vec<&LogEntry> = self
            .entries
            .iter()
            .filter(|e| e.level <= self.verbosity)
            .collect();
        let elided = visible.len().saturating_sub(tail_lines);
        if elided > 0 {
            println!(">>> {elided} LOG LINES ELIDED. PRINTING LAST {tail_lines} LINES <<<");
        }
        for entry in visible.iter().skip(elided) {
            self.log_to_stdout(entry.level, &entry.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_retained_regardless_of_verbosity() {
        let mut logger = GameLogger::with_verbosity(VerbosityLevel::Silent);
        logger.minimal("Game started");
        logger.normal("Alice draws a card");
        logger.decision("Play Azoth to increase resources");

        assert_eq!(logger.len(), 3);
        assert_eq!(logger.logs()[2].category.as_deref(), Some("decision"));
        assert_eq!(logger.logs()[1].level, VerbosityLevel::Normal);
    }

    #[test]
    fn test_messages_since() {
        let mut logger = GameLogger::new();
        logger.normal("one");
        let mark = logger.len();
        logger.normal("two");
        logger.normal("three");
        assert_eq!(logger.messages_since(mark), vec!["two", "three"]);
        assert_eq!(logger.messages().count(), 3);
    }

    #[test]
    fn test_verbosity_ordering() {
        assert!(VerbosityLevel::Silent < VerbosityLevel::Minimal);
        assert!(VerbosityLevel::Normal < VerbosityLevel::Verbose);
        assert_eq!(VerbosityLevel::default(), VerbosityLevel::Normal);
    }
}
