//! Backup log classification.
//!
//! Turns raw backup-tool log lines into ticket-ready text in three pure steps:
//!
//! 1. [`Vocabulary::classify`] maps one line to a [`LineMarker`].
//! 2. [`BlockScanner`] walks a line stream and emits formatted segments,
//!    buffering start-to-running blocks and streaming error runs.
//! 3. [`split_segments`] partitions the emitted segments into a `success`
//!    body and an `error` body.
//!
//! Nothing here touches the filesystem or the network.

use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod scan;
pub mod split;

pub use scan::{BlockScanner, DEFAULT_OVERFLOW_THRESHOLD, ScanState, scan_lines};
pub use split::{ClassifiedOutput, split_segments};

/// Separator written between blocks; the splitter cuts on it.
pub const BLOCK_DELIMITER: &str = "###";

/// Token whose presence marks a chunk as an error chunk.
pub const ERROR_TOKEN: &str = "ERR ";

/// The category of a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineMarker {
    /// A new backup job started.
    BackupStart,
    /// The queued task is now running.
    TaskRunning,
    /// A line carrying the `ERR ` token.
    ErrorLine,
    /// The tool is reverting its work module after a failure.
    PostError,
    /// The backup job finished.
    BackupFinish,
    /// Anything else.
    Plain,
}

/// Source patterns for the backup tool's log vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyPatterns {
    pub backup_start: String,
    pub task_running: String,
    pub error_line: String,
    pub post_error: String,
    pub backup_finish: String,
}

impl Default for VocabularyPatterns {
    /// The vocabulary of the Portuguese-localised backup tool in production.
    fn default() -> Self {
        VocabularyPatterns {
            backup_start: r"\bUm novo backup iniciou.  Número de tarefas na fila: 1\b".to_string(),
            task_running: r"\bA tarefa está agora\b".to_string(),
            error_line: r"\bERR \b".to_string(),
            post_error: r"\bRevertendo o módulo de trabalho\b".to_string(),
            backup_finish: r"\bBackup terminado\b".to_string(),
        }
    }
}

/// Compiled line vocabulary.
///
/// Classification is total and deterministic: the first matching pattern in
/// the order start, running, error, post-error, finish wins; no match is
/// [`LineMarker::Plain`].
#[derive(Debug, Clone)]
pub struct Vocabulary {
    backup_start: Regex,
    task_running: Regex,
    error_line: Regex,
    post_error: Regex,
    backup_finish: Regex,
}

impl Vocabulary {
    /// Compiles a vocabulary from its source patterns.
    pub fn from_patterns(patterns: &VocabularyPatterns) -> Result<Self, regex::Error> {
        Ok(Vocabulary {
            backup_start: Regex::new(&patterns.backup_start)?,
            task_running: Regex::new(&patterns.task_running)?,
            error_line: Regex::new(&patterns.error_line)?,
            post_error: Regex::new(&patterns.post_error)?,
            backup_finish: Regex::new(&patterns.backup_finish)?,
        })
    }

    /// Compiles the production vocabulary.
    pub fn standard() -> Result<Self, regex::Error> {
        Self::from_patterns(&VocabularyPatterns::default())
    }

    /// Classifies one line.
    pub fn classify(&self, line: &str) -> LineMarker {
        if self.backup_start.is_match(line) {
            LineMarker::BackupStart
        } else if self.task_running.is_match(line) {
            LineMarker::TaskRunning
        } else if self.error_line.is_match(line) {
            LineMarker::ErrorLine
        } else if self.post_error.is_match(line) {
            LineMarker::PostError
        } else if self.backup_finish.is_match(line) {
            LineMarker::BackupFinish
        } else {
            LineMarker::Plain
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use proptest::prelude::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::standard().unwrap()
    }

    #[test]
    fn classifies_each_marker() {
        let v = vocabulary();
        assert_eq!(v.classify(START), LineMarker::BackupStart);
        assert_eq!(v.classify(RUNNING), LineMarker::TaskRunning);
        assert_eq!(v.classify(ERR_DISK), LineMarker::ErrorLine);
        assert_eq!(v.classify(REVERTING), LineMarker::PostError);
        assert_eq!(v.classify(FINISHED), LineMarker::BackupFinish);
        assert_eq!(v.classify(PLAIN), LineMarker::Plain);
        assert_eq!(v.classify(""), LineMarker::Plain);
    }

    #[test]
    fn start_wins_over_later_markers() {
        let v = vocabulary();
        let line = format!("{} ERR x Backup terminado", START);
        assert_eq!(v.classify(&line), LineMarker::BackupStart);
    }

    #[test]
    fn error_wins_over_post_error_and_finish() {
        let v = vocabulary();
        assert_eq!(
            v.classify("ERR x Revertendo o módulo de trabalho"),
            LineMarker::ErrorLine
        );
        assert_eq!(v.classify("ERR x Backup terminado"), LineMarker::ErrorLine);
    }

    #[test]
    fn error_token_needs_word_boundaries() {
        let v = vocabulary();
        // Glued to a preceding word: not the token.
        assert_eq!(v.classify("XERR disk full"), LineMarker::Plain);
        // Trailing space with nothing after it: no boundary after the space.
        assert_eq!(v.classify("ERR "), LineMarker::Plain);
        assert_eq!(v.classify("ERROR disk full"), LineMarker::Plain);
    }

    #[test]
    fn start_requires_the_queue_count_of_one() {
        let v = vocabulary();
        assert_eq!(
            v.classify("Um novo backup iniciou.  Número de tarefas na fila: 12"),
            LineMarker::Plain
        );
    }

    #[test]
    fn custom_patterns_compile() {
        let patterns = VocabularyPatterns {
            backup_start: "new backup started".into(),
            task_running: "task is now running".into(),
            error_line: r"\bERR \b".into(),
            post_error: "reverting module".into(),
            backup_finish: "backup finished".into(),
        };
        let v = Vocabulary::from_patterns(&patterns).unwrap();
        assert_eq!(v.classify("new backup started"), LineMarker::BackupStart);
        assert_eq!(v.classify("reverting module"), LineMarker::PostError);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let patterns = VocabularyPatterns {
            backup_start: "(".into(),
            ..VocabularyPatterns::default()
        };
        assert!(Vocabulary::from_patterns(&patterns).is_err());
    }

    proptest! {
        #[test]
        fn classify_is_deterministic(line in ".{0,120}") {
            let v = vocabulary();
            prop_assert_eq!(v.classify(&line), v.classify(&line));
        }
    }
}
