// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: edge contours, page outline location, perspective
// rectification and binarization.

pub mod binarize;
pub mod contours;
pub mod quad;
pub mod rectify;
pub mod scanner;

pub use binarize::Binarizer;
pub use contours::{Contour, ContourExtractor, ContourSet};
pub use quad::{Quadrilateral, QuadrilateralLocator};
pub use rectify::PerspectiveRectifier;
pub use scanner::{DocumentScanner, PageScan};
