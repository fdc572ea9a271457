//! Partitioning scanned segments into success and error bodies.

use serde::{Deserialize, Serialize};

use super::{BLOCK_DELIMITER, ERROR_TOKEN};

/// The two ticket bodies produced for one site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedOutput {
    /// Chunks without the error token, newline-joined and trimmed.
    pub success: String,
    /// Chunks carrying the error token, newline-joined and trimmed.
    pub error: String,
}

impl ClassifiedOutput {
    /// Returns true if no chunk carried the error token.
    pub fn is_clean(&self) -> bool {
        self.error.is_empty()
    }
}

/// Joins the segments, cuts on the block delimiter and files every chunk under
/// `error` if it contains the error token, `success` otherwise.
pub fn split_segments<S: AsRef<str>>(segments: &[S]) -> ClassifiedOutput {
    let joined: String = segments.iter().map(AsRef::as_ref).collect();

    let (error, success): (Vec<&str>, Vec<&str>) = joined
        .split(BLOCK_DELIMITER)
        .partition(|chunk| chunk.contains(ERROR_TOKEN));

    ClassifiedOutput {
        success: success.join("\n").trim().to_string(),
        error: error.join("\n").trim().to_string(),
    }
}
