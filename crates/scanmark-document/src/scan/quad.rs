// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page outline location: reduce a noisy contour set to the best four-corner
// polygon and put its corners in canonical order.

use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use scanmark_core::ScanOptions;
use tracing::{debug, instrument};

use super::contours::{Contour, contour_area};

/// Four page corners in canonical order.
///
/// `top_left` has the smallest `x + y` and `bottom_right` the largest;
/// `top_right` has the smallest `x - y` and `bottom_left` the largest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    pub top_left: Point<f32>,
    pub top_right: Point<f32>,
    pub bottom_right: Point<f32>,
    pub bottom_left: Point<f32>,
}

impl Quadrilateral {
    /// Assign four unordered points to canonical corners.
    ///
    /// Ties resolve to the earliest point in `points`. When the extremes do
    /// not pick four distinct points (a page turned by 45 degrees ties both
    /// the sums and the differences), the corners are instead taken clockwise
    /// around their centroid, starting from the one with the smallest `x + y`.
    pub fn from_corners(points: [Point<f32>; 4]) -> Self {
        let sum = |p: &Point<f32>| p.x + p.y;
        // Difference taken as y - x so the minimum lands on the top-right corner.
        let diff = |p: &Point<f32>| p.y - p.x;

        let roles = [
            argmin(&points, sum),
            argmin(&points, diff),
            argmax(&points, sum),
            argmax(&points, diff),
        ];
        let distinct = (0..4).all(|i| (i + 1..4).all(|j| roles[i] != roles[j]));
        let [tl, tr, br, bl] = if distinct {
            roles.map(|idx| points[idx])
        } else {
            clockwise_from_top_left(points)
        };

        Self {
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        }
    }

    /// Corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn corners(&self) -> [Point<f32>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Corners as `(x, y)` tuples in canonical order.
    pub fn control_points(&self) -> [(f32, f32); 4] {
        self.corners().map(|p| (p.x, p.y))
    }
}

/// Sort by angle around the centroid (clockwise on screen, y pointing down)
/// and rotate so the smallest `x + y` comes first.
fn clockwise_from_top_left(points: [Point<f32>; 4]) -> [Point<f32>; 4] {
    let cx = points.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = points.iter().map(|p| p.y).sum::<f32>() / 4.0;
    let angle = |p: &Point<f32>| (p.y - cy).atan2(p.x - cx);

    let mut sorted = points;
    sorted.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
    let start = argmin(&sorted, |p| p.x + p.y);
    sorted.rotate_left(start);
    sorted
}

fn argmin(points: &[Point<f32>; 4], key: impl Fn(&Point<f32>) -> f32) -> usize {
    let mut best = 0;
    for (idx, p) in points.iter().enumerate().skip(1) {
        if key(p) < key(&points[best]) {
            best = idx;
        }
    }
    best
}

fn argmax(points: &[Point<f32>; 4], key: impl Fn(&Point<f32>) -> f32) -> usize {
    let mut best = 0;
    for (idx, p) in points.iter().enumerate().skip(1) {
        if key(p) > key(&points[best]) {
            best = idx;
        }
    }
    best
}

/// Finds the largest contour that simplifies to exactly four vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrilateralLocator {
    epsilon_ratio: f64,
}

impl Default for QuadrilateralLocator {
    fn default() -> Self {
        Self::new(ScanOptions::default().approx_epsilon_ratio)
    }
}

impl QuadrilateralLocator {
    /// `epsilon_ratio` is the polygon tolerance as a fraction of each
    /// contour's perimeter.
    pub fn new(epsilon_ratio: f64) -> Self {
        Self { epsilon_ratio }
    }

    pub fn from_options(options: &ScanOptions) -> Self {
        Self::new(options.approx_epsilon_ratio)
    }

    /// Try contours from largest to smallest enclosed area and accept the
    /// first whose approximation has exactly four vertices.
    ///
    /// Returns `None` when no contour qualifies; that is an expected outcome.
    #[instrument(skip_all, fields(contours = contours.len()))]
    pub fn locate(&self, contours: &[Contour]) -> Option<Quadrilateral> {
        let mut by_area: Vec<(f64, &Contour)> =
            contours.iter().map(|c| (contour_area(c), c)).collect();
        by_area.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (area, contour) in by_area {
            let Some(vertices) = self.approximate(contour) else {
                continue;
            };
            if let [a, b, c, d] = vertices.as_slice() {
                let quad = Quadrilateral::from_corners([a, b, c, d].map(to_f32));
                debug!(area, corners = ?quad.control_points(), "Page outline located");
                return Some(quad);
            }
        }

        debug!("No contour simplifies to four vertices");
        None
    }

    /// Douglas-Peucker simplification of a closed contour. Contours with no
    /// length cannot be simplified and yield `None`.
    fn approximate(&self, contour: &Contour) -> Option<Vec<Point<i32>>> {
        if contour.len() < 4 {
            return None;
        }
        let perimeter = arc_length(contour, true);
        let epsilon = self.epsilon_ratio * perimeter;
        if epsilon <= 0.0 {
            return None;
        }
        Some(approximate_polygon_dp(contour, epsilon, true))
    }
}

fn to_f32(p: &Point<i32>) -> Point<f32> {
    Point::new(p.x as f32, p.y as f32)
}
