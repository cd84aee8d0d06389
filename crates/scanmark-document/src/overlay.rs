// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation overlays: status text and contour outlines drawn onto result
// frames.

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{Canvas, draw_line_segment_mut, draw_text_mut};
use imageproc::point::Point;
use scanmark_core::error::{Result, ScanError};
use scanmark_core::AnswerKey;

static DEFAULT_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Text shown on the original frame when no page outline is found.
pub const NOT_FOUND_NOTICE: &str = "Could not find reference contour";

pub const NOTICE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const SUMMARY_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const SELECTION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const TEXT_ORIGIN: (i32, i32) = (10, 10);
const NOTICE_SCALE: f32 = 20.0;
const SUMMARY_SCALE: f32 = 14.0;
const OUTLINE_THICKNESS: i32 = 3;

/// Renders notices, answer summaries and bubble outlines.
///
/// Cloning is cheap; the font is reference counted.
#[derive(Clone)]
pub struct Overlay {
    font: FontArc,
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay").finish_non_exhaustive()
    }
}

impl Overlay {
    /// Overlay using the bundled monospace font.
    pub fn new() -> Result<Self> {
        let font =
            FontArc::try_from_slice(DEFAULT_FONT).map_err(|err| ScanError::Font(err.to_string()))?;
        Ok(Self { font })
    }

    /// Overlay using a caller-supplied font.
    pub fn with_font(font: FontArc) -> Self {
        Self { font }
    }

    /// Draw one line of text with its top-left corner at `origin`.
    pub fn draw_text(
        &self,
        image: &mut RgbImage,
        text: &str,
        origin: (i32, i32),
        scale: f32,
        color: Rgb<u8>,
    ) {
        draw_text_mut(image, color, origin.0, origin.1, PxScale::from(scale), &self.font, text);
    }

    /// Stamp the detection-failure notice onto `image`.
    pub fn draw_not_found(&self, image: &mut RgbImage) {
        self.draw_text(image, NOT_FOUND_NOTICE, TEXT_ORIGIN, NOTICE_SCALE, NOTICE_COLOR);
    }

    /// Stamp `Answers: {..}` onto `image`.
    pub fn draw_answer_summary(&self, image: &mut RgbImage, answers: &AnswerKey) {
        let text = answer_summary(answers);
        self.draw_text(image, &text, TEXT_ORIGIN, SUMMARY_SCALE, SUMMARY_COLOR);
    }

    /// Trace a closed contour with a 3 px stroke.
    pub fn draw_contour(&self, image: &mut RgbImage, contour: &[Point<i32>], color: Rgb<u8>) {
        let reach = OUTLINE_THICKNESS / 2;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                trace_closed(image, contour, (dx, dy), color);
            }
        }
    }
}

/// The summary line for an answer key, e.g. `Answers: {1: 'b', 2: 'd'}`.
pub fn answer_summary(answers: &AnswerKey) -> String {
    format!("Answers: {answers}")
}

/// Draw straight segments between consecutive contour points, closing the loop.
pub(crate) fn trace_closed<C: Canvas>(
    image: &mut C,
    contour: &[Point<i32>],
    offset: (i32, i32),
    color: C::Pixel,
) {
    let shifted = |p: &Point<i32>| ((p.x + offset.0) as f32, (p.y + offset.1) as f32);
    match contour {
        [] => {}
        [only] => {
            let p = shifted(only);
            draw_line_segment_mut(image, p, p, color);
        }
        _ => {
            for pair in contour.windows(2) {
                draw_line_segment_mut(image, shifted(&pair[0]), shifted(&pair[1]), color);
            }
            if let (Some(last), Some(first)) = (contour.last(), contour.first()) {
                draw_line_segment_mut(image, shifted(last), shifted(first), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_font_loads() {
        assert!(Overlay::new().is_ok());
    }

    #[test]
    fn summary_uses_insertion_order() {
        let mut answers = AnswerKey::new();
        answers.insert(1, "b");
        answers.insert(2, "d");
        assert_eq!(answer_summary(&answers), "Answers: {1: 'b', 2: 'd'}");
    }

    #[test]
    fn notice_only_touches_top_band() {
        let overlay = Overlay::new().expect("font");
        let original = RgbImage::from_pixel(420, 120, Rgb([255, 255, 255]));
        let mut image = original.clone();
        overlay.draw_not_found(&mut image);

        assert_ne!(image, original, "notice should be visible");
        for y in 40..120 {
            for x in 0..420 {
                assert_eq!(image.get_pixel(x, y), original.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn contour_outline_is_drawn_in_selection_color() {
        let overlay = Overlay::new().expect("font");
        let mut image = RgbImage::new(40, 40);
        let square = [
            Point::new(10, 10),
            Point::new(29, 10),
            Point::new(29, 29),
            Point::new(10, 29),
        ];
        overlay.draw_contour(&mut image, &square, SELECTION_COLOR);

        assert_eq!(*image.get_pixel(20, 10), SELECTION_COLOR);
        assert_eq!(*image.get_pixel(20, 9), SELECTION_COLOR);
        assert_eq!(*image.get_pixel(20, 11), SELECTION_COLOR);
        assert_eq!(*image.get_pixel(20, 20), Rgb([0, 0, 0]));
    }
}
