// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: warp a located page quadrilateral to a frontal,
// axis-aligned rectangle.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::point::Point;
use scanmark_core::error::{Result, ScanError};
use tracing::{debug, info, instrument};

use super::quad::Quadrilateral;

/// Warps the region inside a [`Quadrilateral`] to a "birds-eye" rectangle.
///
/// Width is the longer of the top and bottom edges, height the longer of the
/// left and right edges, both truncated to whole pixels and never below 1.
/// Near-degenerate quadrilaterals produce correspondingly tiny outputs; if
/// the corners collapse so far that no projective transform exists, the call
/// fails with [`ScanError::Projection`] and the scanner keeps the frame as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerspectiveRectifier;

impl PerspectiveRectifier {
    pub fn new() -> Self {
        Self
    }

    /// Output `(width, height)` for `quad`.
    pub fn target_size(&self, quad: &Quadrilateral) -> (u32, u32) {
        let top = distance(quad.top_left, quad.top_right);
        let bottom = distance(quad.bottom_left, quad.bottom_right);
        let left = distance(quad.top_left, quad.bottom_left);
        let right = distance(quad.top_right, quad.bottom_right);

        let width = (top.max(bottom) as u32).max(1);
        let height = (left.max(right) as u32).max(1);
        (width, height)
    }

    /// Resample the quadrilateral region of `image` into a new frontal image.
    ///
    /// The result never aliases `image`.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn rectify(&self, image: &RgbImage, quad: &Quadrilateral) -> Result<RgbImage> {
        if corner_area(quad) <= f32::EPSILON {
            return Err(ScanError::Projection);
        }

        let (out_w, out_h) = self.target_size(quad);
        // A one-pixel side still maps onto a unit span so the transform stays solvable.
        let right = (out_w.max(2) - 1) as f32;
        let bottom = (out_h.max(2) - 1) as f32;

        let dest: [(f32, f32); 4] = [
            (0.0, 0.0),      // top-left
            (right, 0.0),    // top-right
            (right, bottom), // bottom-right
            (0.0, bottom),   // bottom-left
        ];

        let projection =
            Projection::from_control_points(quad.control_points(), dest).ok_or(ScanError::Projection)?;
        debug!(out_w, out_h, "Projective transform solved");

        let mut output = RgbImage::new(out_w, out_h);
        warp_into(image, &projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut output);

        info!(out_w, out_h, "Perspective rectification applied");
        Ok(output)
    }
}

fn distance(a: Point<f32>, b: Point<f32>) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Shoelace area of the corner polygon.
fn corner_area(quad: &Quadrilateral) -> f32 {
    let corners = quad.corners();
    let mut area = 0.0f32;
    for i in 0..corners.len() {
        let j = (i + 1) % corners.len();
        area += corners[i].x * corners[j].y;
        area -= corners[j].x * corners[i].y;
    }
    area.abs() / 2.0
}
