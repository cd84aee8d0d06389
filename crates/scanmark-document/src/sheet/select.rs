// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer selection: pick the most filled bubble in each row.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use scanmark_core::error::{Result, ScanError};
use scanmark_core::{AnswerKey, ScanOptions};
use tracing::{debug, instrument};

use super::locate::BubbleCandidate;
use super::rows::QuestionRow;
use crate::overlay::trace_closed;

/// The winning bubble of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Position within the row, left to right.
    pub index: usize,
    /// Foreground pixels inside the winning bubble.
    pub filled: u32,
}

/// Answers read from a sheet plus the winning contours for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetAnswers {
    pub answers: AnswerKey,
    pub selected: Vec<BubbleCandidate>,
}

/// Scores bubbles by counting foreground pixels inside their filled contour.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerSelector;

impl AnswerSelector {
    pub fn new() -> Self {
        Self
    }

    /// Foreground pixels of `binary` covered by the filled contour of
    /// `bubble`, boundary included.
    pub fn fill_count(&self, binary: &GrayImage, bubble: &BubbleCandidate) -> u32 {
        let bounds = bubble.bounds;
        if bounds.width == 0 || bounds.height == 0 {
            return 0;
        }
        let mask = contour_mask(bubble);

        let mut count = 0;
        for (mx, my, m) in mask.enumerate_pixels() {
            if m.0[0] == 0 {
                continue;
            }
            let x = bounds.x + mx as i32;
            let y = bounds.y + my as i32;
            if x < 0 || y < 0 || x as u32 >= binary.width() || y as u32 >= binary.height() {
                continue;
            }
            if binary.get_pixel(x as u32, y as u32).0[0] != 0 {
                count += 1;
            }
        }
        count
    }

    /// The most filled bubble of `row`.
    ///
    /// A later bubble replaces the current best only when strictly more filled,
    /// so ties go to the leftmost. `None` for an empty row.
    pub fn select_row(&self, binary: &GrayImage, row: &QuestionRow) -> Option<Selection> {
        let mut best: Option<Selection> = None;
        for (index, bubble) in row.bubbles.iter().enumerate() {
            let filled = self.fill_count(binary, bubble);
            if best.is_none_or(|b| filled > b.filled) {
                best = Some(Selection { index, filled });
            }
        }
        best
    }

    /// Score every row and record `question -> label` in row order.
    ///
    /// Questions are numbered from 1. Labels come from
    /// `options.answer_options` by position.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn select(
        &self,
        binary: &GrayImage,
        rows: &[QuestionRow],
        options: &ScanOptions,
    ) -> Result<SheetAnswers> {
        let mut sheet = SheetAnswers::default();
        for (question, row) in (1u32..).zip(rows) {
            let Some(choice) = self.select_row(binary, row) else {
                continue;
            };
            let label = options.option_label(choice.index).ok_or_else(|| {
                ScanError::InvalidOptions(format!(
                    "no answer label for bubble {} of question {question}",
                    choice.index
                ))
            })?;
            debug!(question, label, filled = choice.filled, "Answer selected");
            sheet.answers.insert(question, label);
            sheet.selected.push(row.bubbles[choice.index].clone());
        }
        Ok(sheet)
    }
}

/// Filled mask of the bubble contour in its own bounding-box frame.
fn contour_mask(bubble: &BubbleCandidate) -> GrayImage {
    let bounds = bubble.bounds;
    let mut mask = GrayImage::new(bounds.width, bounds.height);

    let mut local: Vec<Point<i32>> = Vec::with_capacity(bubble.contour.len());
    for p in &bubble.contour {
        let q = Point::new(p.x - bounds.x, p.y - bounds.y);
        if local.last() != Some(&q) {
            local.push(q);
        }
    }
    while local.len() > 1 && local.first() == local.last() {
        local.pop();
    }

    if local.len() >= 3 {
        draw_polygon_mut(&mut mask, &local, Luma([255]));
    }
    trace_closed(&mut mask, &local, (0, 0), Luma([255]));
    mask
}
