//! Line-oriented progress plumbing for subprocess output.
//!
//! Git writes transfer progress to stderr using carriage returns to repaint
//! the same line. [`LineSplitter`] turns that byte stream into whole lines
//! (both `\n` and `\r` terminate), and [`parse_received_objects`] extracts
//! the numeric `(current/total)` pair from "Receiving objects" lines so the
//! renderer can show a progress fraction.

use std::io;
use std::sync::OnceLock;

use regex::Regex;

use crate::task::Progress;

/// An [`io::Write`] adapter that invokes a callback once per complete line.
///
/// Bytes are buffered across writes until a terminator arrives, so a line
/// split over several chunks is still delivered once. Call [`finish`] after
/// the stream ends to flush a trailing unterminated line.
///
/// [`finish`]: LineSplitter::finish
pub struct LineSplitter<F: FnMut(&str)> {
    buf: Vec<u8>,
    callback: F,
}

impl<F: FnMut(&str)> LineSplitter<F> {
    pub fn new(callback: F) -> Self {
        Self {
            buf: Vec::new(),
            callback,
        }
    }

    /// Flush whatever remains in the buffer as a final line.
    pub fn finish(&mut self) {
        if !self.buf.is_empty() {
            let line = String::from_utf8_lossy(&self.buf).into_owned();
            (self.callback)(&line);
            self.buf.clear();
        }
    }
}

impl<F: FnMut(&str)> io::Write for LineSplitter<F> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        for &byte in data {
            if byte == b'\n' || byte == b'\r' {
                if !self.buf.is_empty() {
                    let line = String::from_utf8_lossy(&self.buf).into_owned();
                    (self.callback)(&line);
                    self.buf.clear();
                }
            } else {
                self.buf.push(byte);
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Extract `(current, total)` from a git "Receiving objects" progress line,
/// e.g. `Receiving objects:  42% (123/456), 1.2 MiB | 800 KiB/s`.
pub fn parse_received_objects(line: &str) -> Option<Progress> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"Receiving objects:\s+\d+%\s+\((\d+)/(\d+)\)").expect("progress regex")
    });

    let caps = re.captures(line)?;
    let current = caps[1].parse().ok()?;
    let total = caps[2].parse().ok()?;
    Some(Progress { current, total })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
