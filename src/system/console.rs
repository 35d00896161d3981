// src/system/console.rs

use crate::constants::DEFAULT_COLUMNS;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Where handlers send their output.
pub trait OutputSink: Send {
    fn print_line(&mut self, line: &str);

    /// Prints `items` as a block of left-aligned columns.
    fn print_columns(&mut self, items: &[String]);
}

/// Lays `items` out column-major in as many columns as fit into `width`.
///
/// Each column is as wide as the longest item plus two spaces of padding. Items longer than
/// `width` get a line of their own.
pub fn format_columns(items: &[String], width: usize) -> Vec<String> {
    let Some(longest) = items.iter().map(|item| item.chars().count()).max() else {
        return Vec::new();
    };
    let column_width = longest + 2;
    let columns = (width / column_width).max(1);
    let rows = items.len().div_ceil(columns);

    let mut lines = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut line = String::new();
        let mut cells = (0..columns)
            .filter_map(|column| items.get(column * rows + row))
            .peekable();
        while let Some(cell) = cells.next() {
            if cells.peek().is_some() {
                line.push_str(&format!("{:<width$}", cell, width = column_width));
            } else {
                line.push_str(cell);
            }
        }
        lines.push(line);
    }
    lines
}

/// Writes to the process's standard output.
#[derive(Debug, Clone, Copy)]
pub struct StdoutSink {
    width: usize,
}

impl StdoutSink {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

impl OutputSink for StdoutSink {
    fn print_line(&mut self, line: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            log::warn!("Failed to write to stdout: {}", e);
        }
    }

    fn print_columns(&mut self, items: &[String]) {
        for line in format_columns(items, self.width) {
            self.print_line(&line);
        }
    }
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Printed {
    Line(String),
    Columns(Vec<String>),
}

/// Keeps everything it is asked to print. Clones share the same record, so a caller can hand
/// one clone to a session and inspect the output through another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    record: Arc<Mutex<Vec<Printed>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn printed(&self) -> Vec<Printed> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&self, printed: Printed) {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(printed);
    }
}

impl OutputSink for RecordingSink {
    fn print_line(&mut self, line: &str) {
        self.push(Printed::Line(line.to_string()));
    }

    fn print_columns(&mut self, items: &[String]) {
        self.push(Printed::Columns(items.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_columns_column_major() {
        let items = strings(&["a", "bb", "ccc", "dd", "e"]);
        // Column width is 5, so three columns fit into 16 characters.
        let lines = format_columns(&items, 16);
        assert_eq!(lines, vec!["a    ccc  e", "bb   dd"]);
    }

    #[test]
    fn test_format_columns_narrow_width_falls_back_to_one_column() {
        let items = strings(&["datasource", "logging"]);
        assert_eq!(format_columns(&items, 4), vec!["datasource", "logging"]);
    }

    #[test]
    fn test_format_columns_empty() {
        assert!(format_columns(&[], 80).is_empty());
    }

    #[test]
    fn test_recording_sink_clones_share_the_record() {
        let sink = RecordingSink::new();
        let mut writer = sink.clone();
        writer.print_line("hello");
        writer.print_columns(&strings(&["a", "b"]));
        assert_eq!(
            sink.printed(),
            vec![
                Printed::Line("hello".to_string()),
                Printed::Columns(strings(&["a", "b"]))
            ]
        );
        sink.clear();
        assert!(sink.printed().is_empty());
    }
}
