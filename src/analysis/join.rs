// src/analysis/join.rs

use anyhow::{bail, Result};
use std::fmt::Debug;
use tracing::warn;

/// Rows that found a partner plus the keys that did not, from both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinResult<T, K> {
    pub matched: Vec<T>,
    /// Left-side keys with no partner on the right.
    pub unmatched_left: Vec<K>,
    /// Right-side keys with no partner on the left.
    pub unmatched_right: Vec<K>,
}

impl<T, K: Debug> JoinResult<T, K> {
    pub fn is_complete(&self) -> bool {
        self.unmatched_left.is_empty()
    }

    /// Emit one counted warning per non-empty side.
    pub fn warn_unmatched(&self, stage: &str) {
        if !self.unmatched_left.is_empty() {
            warn!(
                stage,
                count = self.unmatched_left.len(),
                keys = ?self.unmatched_left,
                "left rows without a match were dropped"
            );
        }
        if !self.unmatched_right.is_empty() {
            warn!(
                stage,
                count = self.unmatched_right.len(),
                "right rows without a match were dropped"
            );
        }
    }

    /// Fail if any left-side key went unmatched.
    pub fn ensure_complete(&self, stage: &str) -> Result<()> {
        if !self.is_complete() {
            bail!(
                "{}: {} key(s) without a match: {:?}",
                stage,
                self.unmatched_left.len(),
                self.unmatched_left
            );
        }
        Ok(())
    }
}
