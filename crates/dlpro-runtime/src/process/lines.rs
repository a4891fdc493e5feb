//! Line splitting for tool output (non-UTF8-safe).
//!
//! Tools redraw progress in place with a bare `\r`, and C tooling may emit
//! invalid UTF-8. Splitting happens on raw bytes and each line is decoded
//! lossily so one bad byte never ends the stream.

/// Incremental splitter over arbitrary byte chunks.
///
/// Partial lines are buffered across chunks. Blank lines are dropped.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
    after_cr: bool,
}

impl LineSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            let after_cr = std::mem::replace(&mut self.after_cr, false);
            match byte {
                b'\n' if after_cr => {}
                b'\n' => self.flush_into(&mut lines),
                b'\r' => {
                    self.flush_into(&mut lines);
                    self.after_cr = true;
                }
                _ => self.pending.push(byte),
            }
        }
        lines
    }

    /// Flush the trailing unterminated line at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        let mut lines = Vec::with_capacity(1);
        self.flush_into(&mut lines);
        lines.pop()
    }

    fn flush_into(&mut self, lines: &mut Vec<String>) {
        if self.pending.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_terminators() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"one\ntwo\r\nthree\rfour\r");
        assert_eq!(lines, vec!["one", "two", "three", "four"]);
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_partial_lines_span_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push(b"[download]  1").is_empty());
        assert_eq!(splitter.push(b"0.0%\r[down"), vec!["[download]  10.0%"]);
        assert!(splitter.push(b"load]  20.0%").is_empty());
        assert_eq!(splitter.finish(), Some("[download]  20.0%".to_string()));
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut splitter = LineSplitter::new();
        assert_eq!(splitter.push(b"a\r"), vec!["a"]);
        assert_eq!(splitter.push(b"\nb\n"), vec!["b"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let mut splitter = LineSplitter::new();
        assert_eq!(splitter.push(b"\n\n   \nx\n\r\n"), vec!["x"]);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"bad \xff byte\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("bad "));
        assert!(lines[0].contains('\u{FFFD}'));
    }
}
