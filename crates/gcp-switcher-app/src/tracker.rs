// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::BootstrapOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending { completed: usize, total: usize },
    Complete,
    Ignored,
}

/// Counts startup outcomes until every bootstrap operation has reported once.
/// After it settles (all reported, or forced by the fallback timer) further
/// outcomes are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionTracker {
    seen: BTreeSet<BootstrapOp>,
    settled: bool,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn total(&self) -> usize {
        BootstrapOp::ALL.len()
    }

    pub fn completed(&self) -> usize {
        self.seen.len()
    }

    pub const fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn record(&mut self, op: BootstrapOp) -> Progress {
        if self.settled || !self.seen.insert(op) {
            return Progress::Ignored;
        }
        if self.completed() >= self.total() {
            self.settled = true;
            return Progress::Complete;
        }
        Progress::Pending {
            completed: self.completed(),
            total: self.total(),
        }
    }

    /// Returns true when this call is the one that settled the tracker.
    pub fn settle(&mut self) -> bool {
        !std::mem::replace(&mut self.settled, true)
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionTracker, Progress};
    use crate::BootstrapOp;

    #[test]
    fn completes_once_every_op_reports() {
        let mut tracker = CompletionTracker::new();
        let mut completions = 0;
        for op in BootstrapOp::ALL {
            if tracker.record(op) == Progress::Complete {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(tracker.completed(), tracker.total());
        assert!(tracker.is_settled());
    }

    #[test]
    fn duplicate_outcomes_do_not_advance() {
        let mut tracker = CompletionTracker::new();
        assert_eq!(
            tracker.record(BootstrapOp::ActiveAccount),
            Progress::Pending {
                completed: 1,
                total: 5
            }
        );
        assert_eq!(tracker.record(BootstrapOp::ActiveAccount), Progress::Ignored);
        assert_eq!(tracker.completed(), 1);
    }

    #[test]
    fn settled_tracker_ignores_late_outcomes() {
        let mut tracker = CompletionTracker::new();
        tracker.record(BootstrapOp::CheckTool);
        assert!(tracker.settle());
        assert!(!tracker.settle());
        for op in BootstrapOp::ALL {
            assert_eq!(tracker.record(op), Progress::Ignored);
        }
        assert_eq!(tracker.completed(), 1);
    }
}
