// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bubble candidate location on a binarized answer sheet.

use image::GrayImage;
use scanmark_core::{BoundingBox, ScanOptions};
use tracing::{debug, instrument};

use crate::scan::contours::{Contour, bounding_box, external_contours};

/// An answer-mark shaped region: its outer contour and bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleCandidate {
    pub contour: Contour,
    pub bounds: BoundingBox,
}

impl BubbleCandidate {
    pub fn new(contour: Contour) -> Self {
        let bounds = bounding_box(&contour);
        Self { contour, bounds }
    }

    /// Topmost row touched by the contour.
    pub fn top(&self) -> i32 {
        self.bounds.y
    }

    /// Leftmost column touched by the contour.
    pub fn left(&self) -> i32 {
        self.bounds.x
    }
}

/// Keeps external contours whose bounding box is bubble sized and roughly
/// square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleGridLocator {
    min_side: u32,
    min_aspect: f64,
    max_aspect: f64,
}

impl Default for BubbleGridLocator {
    fn default() -> Self {
        Self::from_options(&ScanOptions::default())
    }
}

impl BubbleGridLocator {
    pub fn new(min_side: u32, min_aspect: f64, max_aspect: f64) -> Self {
        Self {
            min_side,
            min_aspect,
            max_aspect,
        }
    }

    pub fn from_options(options: &ScanOptions) -> Self {
        Self::new(
            options.bubble_min_side,
            options.bubble_min_aspect,
            options.bubble_max_aspect,
        )
    }

    /// Size and aspect filter: both sides at least `min_side` and
    /// `min_aspect <= w / h <= max_aspect`.
    pub fn accepts(&self, bounds: &BoundingBox) -> bool {
        let ratio = bounds.aspect_ratio();
        bounds.width >= self.min_side
            && bounds.height >= self.min_side
            && ratio >= self.min_aspect
            && ratio <= self.max_aspect
    }

    /// Every bubble-shaped external region of `binary`, in no particular order.
    #[instrument(skip_all, fields(width = binary.width(), height = binary.height()))]
    pub fn locate(&self, binary: &GrayImage) -> Vec<BubbleCandidate> {
        let contours = external_contours(binary);
        let total = contours.len();
        let candidates: Vec<BubbleCandidate> = contours
            .into_iter()
            .map(BubbleCandidate::new)
            .filter(|c| self.accepts(&c.bounds))
            .collect();
        debug!(total, kept = candidates.len(), "Bubble candidates filtered");
        candidates
    }
}
