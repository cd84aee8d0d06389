// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge detection and contour enumeration.

use image::{GrayImage, Rgb, RgbImage, imageops};
use imageproc::contours::{BorderType, find_contours};
use imageproc::edges::canny;
use imageproc::point::Point;
use scanmark_core::error::Result;
use scanmark_core::{BoundingBox, ScanOptions};
use tracing::{debug, instrument};

use crate::transform::{Transformation, ensure_valid_input};

/// A boundary curve as an ordered list of pixel coordinates.
pub type Contour = Vec<Point<i32>>;

/// Unordered contours rebuilt on every call.
pub type ContourSet = Vec<Contour>;

/// Canny edge detection followed by masking the colour image with the edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourExtractor {
    low: f32,
    high: f32,
}

impl Default for ContourExtractor {
    fn default() -> Self {
        let options = ScanOptions::default();
        Self::new(options.canny_low, options.canny_high)
    }
}

impl ContourExtractor {
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    pub fn from_options(options: &ScanOptions) -> Self {
        Self::new(options.canny_low, options.canny_high)
    }

    /// Binary edge map (0 or 255) of `image`.
    pub fn edge_map(&self, image: &RgbImage) -> GrayImage {
        let gray = imageops::grayscale(image);
        canny(&gray, self.low, self.high)
    }

    /// The colour image with every non-edge pixel set to black.
    ///
    /// An edge-free image comes back entirely black.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn extract(&self, image: &RgbImage) -> RgbImage {
        let edges = self.edge_map(image);
        let mut masked = image.clone();
        for (x, y, pixel) in masked.enumerate_pixels_mut() {
            if edges.get_pixel(x, y).0[0] == 0 {
                *pixel = Rgb([0, 0, 0]);
            }
        }
        masked
    }

    /// Every contour (outer borders and holes) of the edge-masked image.
    #[instrument(skip(self, image))]
    pub fn contours(&self, image: &RgbImage) -> ContourSet {
        let masked = imageops::grayscale(&self.extract(image));
        let contours: ContourSet = find_contours::<i32>(&masked)
            .into_iter()
            .map(|c| c.points)
            .collect();
        debug!(count = contours.len(), "Contours extracted");
        contours
    }
}

impl Transformation for ContourExtractor {
    fn name(&self) -> &str {
        "contour-extractor"
    }

    fn transform(&self, image: &RgbImage, _options: &ScanOptions) -> Result<Vec<RgbImage>> {
        ensure_valid_input(image)?;
        Ok(vec![self.extract(image)])
    }
}

/// Outer borders of the top-level foreground regions of a binary image.
///
/// Contours nested inside another region are skipped.
pub fn external_contours(binary: &GrayImage) -> ContourSet {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Enclosed area of a closed contour via the shoelace formula.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x as i64 * points[j].y as i64;
        twice_area -= points[j].x as i64 * points[i].y as i64;
    }
    twice_area.abs() as f64 / 2.0
}

/// Smallest axis-aligned box containing every point.
///
/// Width and height count pixels, so a single point yields a 1x1 box. An empty
/// contour yields an empty box at the origin.
pub fn bounding_box(points: &[Point<i32>]) -> BoundingBox {
    let Some(first) = points.first() else {
        return BoundingBox::new(0, 0, 0, 0);
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    BoundingBox::new(
        min_x,
        min_y,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    )
}
