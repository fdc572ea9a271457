//! The block automaton.
//!
//! A [`BlockScanner`] consumes log lines one at a time and produces the
//! ordered segment list that ends up in tickets. Each line passes through two
//! stages:
//!
//! - **Framing** (exclusive): a backup-start line opens a block, a
//!   task-running line closes it and flushes it to the output, and any other
//!   line inside an open block is buffered with it. A line consumed here goes
//!   no further.
//! - **Error tracking** (non-exclusive): otherwise, four guarded mutations run
//!   in order against shared state. Streaming while `has_error` is set, error
//!   buffering, post-error flushing and finish handling can all fire for the
//!   same line, so e.g. a `Backup terminado` line seen while `has_error` is set
//!   is emitted twice.
//!
//! The error buffer lives for the whole stream. A post-error line emits a
//! copy of everything buffered so far, so an error line seen early in a file
//! is repeated at every later post-error line. Only an overflow empties it,
//! which makes the overflow count a per-file total.
//!
//! Lines still buffered when the stream ends (an unclosed block, or error
//! lines never followed by a post-error line) are dropped.

use super::{BLOCK_DELIMITER, LineMarker, Vocabulary};

/// Default size above which a buffered error run is replaced by a notice.
pub const DEFAULT_OVERFLOW_THRESHOLD: usize = 2000;

/// Visual separator written at the top of every block.
pub const INTERVAL_SEPARATOR: &str =
    "<br><br>-------------------------INTERVAL---------------------------------<br>\n";

/// Replaces an error run longer than the overflow threshold.
///
/// Carries the error token so the splitter files it under `error`.
pub const OVERFLOW_NOTICE: &str =
    "\n<br><b style=\"color: red;\">ERR - Em todo arquivo....</b><br>";

/// Scanner state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Inside a start-to-running block.
    pub in_block: bool,
    /// A post-error line was seen and no finish line since.
    pub has_error: bool,
}

/// Stateful scanner over one log stream.
///
/// One scanner per file; it is consumed by [`BlockScanner::finish`].
#[derive(Debug)]
pub struct BlockScanner<'v> {
    vocabulary: &'v Vocabulary,
    overflow_threshold: usize,
    state: ScanState,
    current_block: Vec<String>,
    error_buffer: Vec<String>,
    all_logs: Vec<String>,
}

fn format_line(line: &str) -> String {
    format!("\n{}", line)
}

fn format_bold(line: &str) -> String {
    format!("\n<b>{}</b>", line)
}

impl<'v> BlockScanner<'v> {
    pub fn new(vocabulary: &'v Vocabulary, overflow_threshold: usize) -> Self {
        BlockScanner {
            vocabulary,
            overflow_threshold,
            state: ScanState::default(),
            current_block: Vec::new(),
            error_buffer: Vec::new(),
            all_logs: Vec::new(),
        }
    }

    /// Current state flags.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Segments emitted so far.
    pub fn emitted(&self) -> &[String] {
        &self.all_logs
    }

    /// Feeds one line.
    pub fn feed(&mut self, line: &str) {
        let marker = self.vocabulary.classify(line);

        // ─── Framing ──────────────────────────────────────────────────────────
        match marker {
            LineMarker::BackupStart => {
                self.current_block.push(format!("\n{}\n", BLOCK_DELIMITER));
                self.current_block.push(INTERVAL_SEPARATOR.to_string());
                self.current_block.push(format_line(line));
                self.state.in_block = true;
                return;
            }
            LineMarker::TaskRunning => {
                self.current_block.push(format_line(line));
                self.all_logs.append(&mut self.current_block);
                self.state.in_block = false;
                return;
            }
            _ if self.state.in_block => {
                self.current_block.push(format_line(line));
                return;
            }
            _ => {}
        }

        // ─── Error tracking ───────────────────────────────────────────────────
        if self.state.has_error {
            self.all_logs.push(format_line(line));
        }

        if marker == LineMarker::ErrorLine {
            self.error_buffer.push(format_bold(line));
        }

        if marker == LineMarker::PostError {
            if self.error_buffer.len() > self.overflow_threshold {
                tracing::debug!(
                    buffered = self.error_buffer.len(),
                    threshold = self.overflow_threshold,
                    "Suppressing oversized error run"
                );
                self.error_buffer.clear();
                self.all_logs.push(OVERFLOW_NOTICE.to_string());
            } else {
                self.all_logs.extend_from_slice(&self.error_buffer);
            }
            self.all_logs.push(format_line(line));
            self.state.has_error = true;
        }

        if marker == LineMarker::BackupFinish {
            self.all_logs.push(format_line(line));
            self.state.has_error = false;
        }
    }

    /// Ends the stream and returns the emitted segments.
    ///
    /// An unflushed block and the error buffer are discarded.
    pub fn finish(self) -> Vec<String> {
        if !self.current_block.is_empty() {
            tracing::trace!(
                block_lines = self.current_block.len(),
                error_lines = self.error_buffer.len(),
                "Discarding unflushed trailing block"
            );
        }
        self.all_logs
    }
}

/// Scans a whole line stream with a fresh scanner.
pub fn scan_lines<I, S>(vocabulary: &Vocabulary, overflow_threshold: usize, lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scanner = BlockScanner::new(vocabulary, overflow_threshold);
    for line in lines {
        scanner.feed(line.as_ref());
    }
    scanner.finish()
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::standard().unwrap()
    }

    fn run(lines: &[&str]) -> (Vec<String>, ScanState) {
        let v = vocabulary();
        let mut scanner = BlockScanner::new(&v, DEFAULT_OVERFLOW_THRESHOLD);
        for line in lines {
            scanner.feed(line);
        }
        let state = scanner.state();
        (scanner.finish(), state)
    }

    #[test]
    fn start_plain_running_emits_one_block() {
        let (out, state) = run(&[START, PLAIN, RUNNING]);
        assert_eq!(
            out,
            vec![
                "\n###\n".to_string(),
                INTERVAL_SEPARATOR.to_string(),
                format!("\n{}", START),
                format!("\n{}", PLAIN),
                format!("\n{}", RUNNING),
            ]
        );
        assert_eq!(
            state,
            ScanState {
                in_block: false,
                has_error: false
            }
        );
    }

    #[test]
    fn error_run_flushed_by_post_error() {
        let (out, state) = run(&[ERR_DISK, ERR_DISK, REVERTING]);
        assert_eq!(
            out,
            vec![
                format!("\n<b>{}</b>", ERR_DISK),
                format!("\n<b>{}</b>", ERR_DISK),
                format!("\n{}", REVERTING),
            ]
        );
        assert!(state.has_error);
    }

    #[test]
    fn lines_inside_block_are_not_error_tracked() {
        let (out, state) = run(&[START, ERR_DISK, REVERTING, RUNNING]);
        assert_eq!(out.len(), 6);
        assert_eq!(out[3], format!("\n{}", ERR_DISK));
        assert_eq!(out[4], format!("\n{}", REVERTING));
        assert!(!state.has_error);
    }

    #[test]
    fn plain_lines_outside_blocks_are_dropped_until_error() {
        let (out, _) = run(&[PLAIN, PLAIN]);
        assert!(out.is_empty());
    }

    #[test]
    fn lines_stream_through_while_has_error() {
        let (out, state) = run(&[REVERTING, PLAIN]);
        assert_eq!(out, vec![format!("\n{}", REVERTING), format!("\n{}", PLAIN)]);
        assert!(state.has_error);
    }

    #[test]
    fn finish_line_double_fires_while_has_error() {
        let (out, state) = run(&[REVERTING, FINISHED, PLAIN]);
        assert_eq!(
            out,
            vec![
                format!("\n{}", REVERTING),
                format!("\n{}", FINISHED),
                format!("\n{}", FINISHED),
            ]
        );
        assert!(!state.has_error);
    }

    #[test]
    fn error_line_double_fires_while_has_error() {
        let (out, _) = run(&[REVERTING, ERR_DISK, REVERTING]);
        assert_eq!(
            out,
            vec![
                format!("\n{}", REVERTING),
                // Streamed by the has-error rule...
                format!("\n{}", ERR_DISK),
                // ...then the second post-error line streams, flushes the
                // buffered bold copy, and emits itself.
                format!("\n{}", REVERTING),
                format!("\n<b>{}</b>", ERR_DISK),
                format!("\n{}", REVERTING),
            ]
        );
    }

    #[test]
    fn earlier_error_lines_repeat_at_every_post_error_line() {
        let second = "05/08/2025 23:10:11 ERR second failure";
        let (out, state) = run(&[ERR_DISK, REVERTING, FINISHED, second, REVERTING]);
        assert_eq!(
            out,
            vec![
                format!("\n<b>{}</b>", ERR_DISK),
                format!("\n{}", REVERTING),
                format!("\n{}", FINISHED),
                format!("\n{}", FINISHED),
                format!("\n<b>{}</b>", ERR_DISK),
                format!("\n<b>{}</b>", second),
                format!("\n{}", REVERTING),
            ]
        );
        assert_eq!(
            out.iter()
                .filter(|s| **s == format!("\n<b>{}</b>", ERR_DISK))
                .count(),
            2
        );
        assert!(state.has_error);
    }

    #[test]
    fn overflow_counts_error_lines_across_the_file() {
        let v = vocabulary();
        // Neither run alone exceeds the threshold; together they do.
        let out = scan_lines(
            &v,
            2,
            [ERR_DISK, ERR_DISK, REVERTING, FINISHED, ERR_DISK, REVERTING],
        );
        assert_eq!(
            out,
            vec![
                format!("\n<b>{}</b>", ERR_DISK),
                format!("\n<b>{}</b>", ERR_DISK),
                format!("\n{}", REVERTING),
                format!("\n{}", FINISHED),
                format!("\n{}", FINISHED),
                OVERFLOW_NOTICE.to_string(),
                format!("\n{}", REVERTING),
            ]
        );
    }

    #[test]
    fn overflow_empties_the_error_buffer() {
        let v = vocabulary();
        let out = scan_lines(
            &v,
            2,
            [ERR_DISK, ERR_DISK, ERR_DISK, REVERTING, FINISHED, ERR_DISK, REVERTING],
        );
        assert_eq!(
            out,
            vec![
                OVERFLOW_NOTICE.to_string(),
                format!("\n{}", REVERTING),
                format!("\n{}", FINISHED),
                format!("\n{}", FINISHED),
                format!("\n<b>{}</b>", ERR_DISK),
                format!("\n{}", REVERTING),
            ]
        );
    }

    #[test]
    fn finish_without_error_is_emitted_once() {
        let (out, state) = run(&[FINISHED]);
        assert_eq!(out, vec![format!("\n{}", FINISHED)]);
        assert!(!state.has_error);
    }

    #[test]
    fn oversized_error_run_is_replaced_by_notice() {
        let v = vocabulary();
        let out = scan_lines(&v, 2, [ERR_DISK, ERR_DISK, ERR_DISK, REVERTING]);
        assert_eq!(
            out,
            vec![OVERFLOW_NOTICE.to_string(), format!("\n{}", REVERTING)]
        );
    }

    #[test]
    fn error_run_at_threshold_is_kept() {
        let v = vocabulary();
        let out = scan_lines(&v, 2, [ERR_DISK, ERR_DISK, REVERTING]);
        assert_eq!(out.len(), 3);
        assert!(!out.contains(&OVERFLOW_NOTICE.to_string()));
    }

    #[test]
    fn unclosed_block_is_discarded() {
        let (out, state) = run(&[START, PLAIN, PLAIN]);
        assert!(out.is_empty());
        assert!(state.in_block);
    }

    #[test]
    fn unflushed_error_buffer_is_discarded() {
        let (out, state) = run(&[ERR_DISK, ERR_DISK]);
        assert!(out.is_empty());
        assert!(!state.has_error);
    }

    #[test]
    fn second_start_restarts_block_framing_without_flushing() {
        let (out, _) = run(&[START, PLAIN, START, RUNNING]);
        // Both openings stay buffered in the same block and are flushed together.
        assert_eq!(out.len(), 8);
        assert_eq!(out.iter().filter(|s| *s == "\n###\n").count(), 2);
    }

    #[test]
    fn overflow_notice_carries_error_token() {
        assert!(OVERFLOW_NOTICE.contains(crate::classify::ERROR_TOKEN));
    }
}
