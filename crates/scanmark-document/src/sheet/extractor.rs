// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bubble sheet extraction: scan the page, read the marked answers and draw
// them back onto the rectified page.

use image::{GrayImage, RgbImage, imageops};
use scanmark_core::error::Result;
use scanmark_core::{AnswerKey, ScanOptions};
use tracing::{info, instrument};

use super::locate::{BubbleCandidate, BubbleGridLocator};
use super::rows::RowGrouper;
use super::select::{AnswerSelector, SheetAnswers};
use crate::overlay::{Overlay, SELECTION_COLOR};
use crate::scan::binarize::inverse_otsu;
use crate::scan::scanner::{DocumentScanner, PageScan};
use crate::transform::Transformation;

/// Everything read from one answer-sheet frame.
#[derive(Debug, Clone)]
pub struct SheetReading {
    /// Question number to chosen label, in row order. Empty when the page
    /// outline was not found.
    pub answers: AnswerKey,
    /// Winning bubble of each scored row.
    pub selected: Vec<BubbleCandidate>,
    /// Annotated rectified page, or the annotated original on fallback.
    pub annotated: RgbImage,
    /// Whether the page outline was located.
    pub page_found: bool,
}

/// Locate, group and score bubbles on an already binarized sheet
/// (foreground 255).
pub fn read_binary_sheet(binary: &GrayImage, options: &ScanOptions) -> Result<SheetAnswers> {
    options.validate()?;
    let candidates = BubbleGridLocator::from_options(options).locate(binary);
    let rows = RowGrouper::from_options(options).group(candidates);
    AnswerSelector::new().select(binary, &rows, options)
}

/// Reads a photographed multiple-choice answer sheet.
///
/// Every frame is independent: candidates and answers are locals of each call,
/// so the extractor can be reused across frames without carrying data over.
#[derive(Debug, Clone)]
pub struct BubbleExtractor {
    scanner: DocumentScanner,
    overlay: Overlay,
}

impl BubbleExtractor {
    /// Extractor using the bundled overlay font.
    pub fn new() -> Result<Self> {
        Ok(Self::with_overlay(Overlay::new()?))
    }

    pub fn with_overlay(overlay: Overlay) -> Self {
        Self {
            scanner: DocumentScanner::with_overlay(overlay.clone()),
            overlay,
        }
    }

    /// Read the answers on one frame.
    ///
    /// The page is always rectified and never adaptively binarized here,
    /// whatever `smart_crop` and `binarization` say; the crop is then
    /// thresholded with inverse Otsu. Without a page outline the annotated
    /// original comes back and no bubble logic runs.
    #[instrument(skip(self, image, options), fields(width = image.width(), height = image.height()))]
    pub fn extract(&self, image: &RgbImage, options: &ScanOptions) -> Result<SheetReading> {
        let crop_options = ScanOptions {
            smart_crop: true,
            binarization: false,
            ..options.clone()
        };

        let mut page = match self.scanner.scan(image, &crop_options)? {
            PageScan::Found { page, .. } => page,
            PageScan::NotFound { annotated } => {
                return Ok(SheetReading {
                    answers: AnswerKey::new(),
                    selected: Vec::new(),
                    annotated,
                    page_found: false,
                });
            }
        };

        let binary = inverse_otsu(&imageops::grayscale(&page));
        let SheetAnswers { answers, selected } = read_binary_sheet(&binary, options)?;

        for bubble in &selected {
            self.overlay.draw_contour(&mut page, &bubble.contour, SELECTION_COLOR);
        }
        self.overlay.draw_answer_summary(&mut page, &answers);
        info!(answers = %answers, "Answer sheet read");

        Ok(SheetReading {
            answers,
            selected,
            annotated: page,
            page_found: true,
        })
    }
}

impl Transformation for BubbleExtractor {
    fn name(&self) -> &str {
        "bubble-extractor"
    }

    fn transform(&self, image: &RgbImage, options: &ScanOptions) -> Result<Vec<RgbImage>> {
        Ok(vec![self.extract(image, options)?.annotated])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    #[test]
    fn binary_sheet_reads_expected_answers() {
        let mut binary = GrayImage::new(300, 200);
        let fills = [1usize, 3];
        for (r, fill) in fills.iter().enumerate() {
            for c in 0..5usize {
                let rect = Rect::at(30 + 50 * c as i32, 40 + 70 * r as i32).of_size(20, 20);
                if c == *fill {
                    draw_filled_rect_mut(&mut binary, rect, Luma([255]));
                } else {
                    draw_hollow_rect_mut(&mut binary, rect, Luma([255]));
                }
            }
        }

        let sheet = read_binary_sheet(&binary, &ScanOptions::default()).expect("read");
        let expected: AnswerKey = [(1u32, "b"), (2, "d")].into_iter().collect();
        assert_eq!(sheet.answers, expected);
    }

    #[test]
    fn fallback_skips_bubble_logic() {
        let extractor = BubbleExtractor::new().expect("font");
        let image = RgbImage::from_pixel(320, 240, Rgb([250, 250, 250]));
        let reading = extractor
            .extract(&image, &ScanOptions::default())
            .expect("extract");

        assert!(!reading.page_found);
        assert!(reading.answers.is_empty());
        assert!(reading.selected.is_empty());
        assert_eq!(reading.annotated.dimensions(), (320, 240));
    }

    #[test]
    fn repeated_frames_do_not_accumulate_answers() {
        let extractor = BubbleExtractor::new().expect("font");
        let blank = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
        for _ in 0..3 {
            let reading = extractor
                .extract(&blank, &ScanOptions::default())
                .expect("extract");
            assert!(reading.answers.is_empty());
        }
    }
}
