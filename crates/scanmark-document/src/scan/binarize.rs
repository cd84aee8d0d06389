// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binarization: adaptive Gaussian thresholding for rectified pages and an
// inverse Otsu threshold for high-contrast answer marks.

use image::{GrayImage, Luma, Rgb, RgbImage, imageops};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;
use scanmark_core::ScanOptions;
use scanmark_core::error::Result;
use tracing::{debug, instrument};

use crate::transform::{Transformation, ensure_valid_input};

/// Adaptive local thresholding against a Gaussian-weighted neighbourhood mean.
///
/// A pixel becomes white (255) when it is brighter than its local weighted
/// mean minus `offset`, black (0) otherwise. This keeps text and marks legible
/// under uneven lighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binarizer {
    block_size: u32,
    offset: i32,
}

impl Default for Binarizer {
    fn default() -> Self {
        let options = ScanOptions::default();
        Self::new(options.adaptive_block_size, options.adaptive_offset)
    }
}

impl Binarizer {
    pub fn new(block_size: u32, offset: i32) -> Self {
        Self { block_size, offset }
    }

    pub fn from_options(options: &ScanOptions) -> Self {
        Self::new(options.adaptive_block_size, options.adaptive_offset)
    }

    /// Gaussian sigma for a square window of `block_size` pixels.
    ///
    /// Same derivation as the usual `0.3 * ((k - 1) / 2 - 1) + 0.8` rule for
    /// deriving a kernel's sigma from its size.
    pub fn sigma(&self) -> f32 {
        let k = self.block_size.max(3) as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Convert to grayscale and threshold.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn binarize(&self, image: &RgbImage) -> GrayImage {
        self.binarize_gray(&imageops::grayscale(image))
    }

    /// Threshold an already single-channel image.
    pub fn binarize_gray(&self, gray: &GrayImage) -> GrayImage {
        let local_mean = gaussian_blur_f32(gray, self.sigma());
        debug!(sigma = self.sigma(), offset = self.offset, "Adaptive threshold");

        GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let value = gray.get_pixel(x, y).0[0] as i32;
            let threshold = local_mean.get_pixel(x, y).0[0] as i32 - self.offset;
            if value > threshold { Luma([255]) } else { Luma([0]) }
        })
    }
}

impl Transformation for Binarizer {
    fn name(&self) -> &str {
        "binarizer"
    }

    fn transform(&self, image: &RgbImage, _options: &ScanOptions) -> Result<Vec<RgbImage>> {
        ensure_valid_input(image)?;
        Ok(vec![expand_to_rgb(&self.binarize(image))])
    }
}

/// Global inverse Otsu threshold: pixels at or below the Otsu level become
/// 255, brighter pixels 0. Dark marks on a light page come out white.
#[instrument(skip_all)]
pub fn inverse_otsu(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    debug!(level, "Otsu level computed");
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] > level { Luma([0]) } else { Luma([255]) }
    })
}

/// Replicate a single channel across RGB so binary output fits the colour
/// transformation contract.
pub fn expand_to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn is_binary(image: &GrayImage) -> bool {
        image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    #[test]
    fn default_window_sigma() {
        assert!((Binarizer::default().sigma() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn uniform_page_binarizes_white() {
        let image = RgbImage::from_pixel(60, 40, Rgb([180, 180, 180]));
        let out = Binarizer::default().binarize(&image);
        assert_eq!(out.dimensions(), (60, 40));
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn dark_stroke_survives_uneven_lighting() {
        // Brightness ramps across the page; a dark stroke sits in the dim half.
        let mut gray = GrayImage::from_fn(100, 50, |x, _| Luma([(90 + x) as u8]));
        draw_filled_rect_mut(&mut gray, Rect::at(20, 20).of_size(3, 10), Luma([20]));

        let out = Binarizer::default().binarize_gray(&gray);
        assert!(is_binary(&out));
        assert_eq!(out.get_pixel(21, 25).0[0], 0, "stroke should be black");
        assert_eq!(out.get_pixel(70, 5).0[0], 255, "lit background should be white");
    }

    #[test]
    fn binarization_is_deterministic() {
        let gray = GrayImage::from_fn(64, 64, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let binarizer = Binarizer::default();
        assert_eq!(binarizer.binarize_gray(&gray), binarizer.binarize_gray(&gray));
    }

    #[test]
    fn inverse_otsu_turns_dark_marks_white() {
        let mut gray = GrayImage::from_pixel(50, 50, Luma([230]));
        draw_filled_rect_mut(&mut gray, Rect::at(10, 10).of_size(10, 10), Luma([25]));

        let out = inverse_otsu(&gray);
        assert!(is_binary(&out));
        assert_eq!(out.get_pixel(15, 15).0[0], 255);
        assert_eq!(out.get_pixel(40, 40).0[0], 0);
    }

    #[test]
    fn transform_keeps_dimensions_and_channels() {
        let image = RgbImage::from_pixel(30, 20, Rgb([120, 130, 140]));
        let out = Binarizer::default()
            .transform(&image, &ScanOptions::default())
            .expect("binarize");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dimensions(), (30, 20));
        assert!(out[0].pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn rgb_expansion_replicates_channel() {
        let gray = GrayImage::from_pixel(3, 2, Luma([77]));
        let rgb = expand_to_rgb(&gray);
        assert!(rgb.pixels().all(|p| *p == Rgb([77, 77, 77])));
    }
}
