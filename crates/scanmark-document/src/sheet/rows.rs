// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grouping bubble candidates into question rows.

use scanmark_core::{ScanOptions, TrailingRowPolicy};
use tracing::{debug, instrument, warn};

use super::locate::BubbleCandidate;

/// One question's bubbles, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub bubbles: Vec<BubbleCandidate>,
}

impl QuestionRow {
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

/// Orders candidates top to bottom and cuts them into rows of `n_choices`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGrouper {
    n_choices: usize,
    trailing: TrailingRowPolicy,
}

impl RowGrouper {
    /// `n_choices` must be at least 1; [`ScanOptions::validate`] enforces it.
    pub fn new(n_choices: usize, trailing: TrailingRowPolicy) -> Self {
        Self {
            n_choices: n_choices.max(1),
            trailing,
        }
    }

    pub fn from_options(options: &ScanOptions) -> Self {
        Self::new(options.n_choices, options.trailing_row_policy)
    }

    /// Sort by topmost coordinate, chunk consecutively, then sort each chunk
    /// by leftmost coordinate. Both sorts are stable.
    ///
    /// A short final chunk is kept or dropped according to the trailing-row
    /// policy.
    #[instrument(skip_all, fields(candidates = candidates.len(), n_choices = self.n_choices))]
    pub fn group(&self, mut candidates: Vec<BubbleCandidate>) -> Vec<QuestionRow> {
        candidates.sort_by_key(BubbleCandidate::top);

        let mut rows = Vec::with_capacity(candidates.len().div_ceil(self.n_choices));
        let mut remaining = candidates.into_iter().peekable();
        while remaining.peek().is_some() {
            let mut bubbles: Vec<BubbleCandidate> =
                remaining.by_ref().take(self.n_choices).collect();
            bubbles.sort_by_key(BubbleCandidate::left);
            rows.push(QuestionRow { bubbles });
        }

        let short_tail = rows
            .last()
            .map(QuestionRow::len)
            .filter(|&len| len < self.n_choices);
        if let Some(len) = short_tail {
            match self.trailing {
                TrailingRowPolicy::Keep => warn!(len, "Scoring partial trailing row"),
                TrailingRowPolicy::Drop => {
                    warn!(len, "Dropping partial trailing row");
                    rows.pop();
                }
            }
        }

        debug!(rows = rows.len(), "Question rows built");
        rows
    }
}
