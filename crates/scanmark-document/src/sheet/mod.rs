// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer-sheet reading: bubble location, row grouping and answer selection
// on a rectified, binarized page.

pub mod extractor;
pub mod locate;
pub mod rows;
pub mod select;

pub use extractor::{BubbleExtractor, SheetReading, read_binary_sheet};
pub use locate::{BubbleCandidate, BubbleGridLocator};
pub use rows::{QuestionRow, RowGrouper};
pub use select::{AnswerSelector, Selection, SheetAnswers};
