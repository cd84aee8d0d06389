// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scanner: edge contours, page outline, rectification and
// binarization chained into one transformation.

use image::RgbImage;
use scanmark_core::error::{Result, ScanError};
use scanmark_core::ScanOptions;
use tracing::{info, instrument, warn};

use super::binarize::{Binarizer, expand_to_rgb};
use super::contours::ContourExtractor;
use super::quad::{Quadrilateral, QuadrilateralLocator};
use super::rectify::PerspectiveRectifier;
use crate::overlay::Overlay;
use crate::transform::{Transformation, ensure_valid_input};

/// Result of scanning one frame.
#[derive(Debug, Clone)]
pub enum PageScan {
    /// The page outline was located. `page` is the processed page: rectified
    /// and/or binarized according to the options.
    Found {
        page: RgbImage,
        outline: Quadrilateral,
    },
    /// No four-corner outline exists. `annotated` is a copy of the input with
    /// the failure notice drawn on it.
    NotFound { annotated: RgbImage },
}

impl PageScan {
    /// The image to hand back to the caller in either case.
    pub fn image(&self) -> &RgbImage {
        match self {
            PageScan::Found { page, .. } => page,
            PageScan::NotFound { annotated } => annotated,
        }
    }

    pub fn into_image(self) -> RgbImage {
        match self {
            PageScan::Found { page, .. } => page,
            PageScan::NotFound { annotated } => annotated,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PageScan::Found { .. })
    }
}

/// Scans a photographed page into a frontal, optionally binarized view.
///
/// Holds no per-frame state; the same scanner can process any number of
/// frames.
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    overlay: Overlay,
}

impl DocumentScanner {
    /// Scanner using the bundled overlay font.
    pub fn new() -> Result<Self> {
        Ok(Self::with_overlay(Overlay::new()?))
    }

    pub fn with_overlay(overlay: Overlay) -> Self {
        Self { overlay }
    }

    /// Locate the page outline in `image`, if any.
    pub fn locate_page(&self, image: &RgbImage, options: &ScanOptions) -> Option<Quadrilateral> {
        let contours = ContourExtractor::from_options(options).contours(image);
        QuadrilateralLocator::from_options(options).locate(&contours)
    }

    /// Run the full scan on one frame.
    ///
    /// Invalid input and invalid options are errors. A frame without a page
    /// outline is not: it yields [`PageScan::NotFound`].
    #[instrument(skip(self, image, options), fields(width = image.width(), height = image.height()))]
    pub fn scan(&self, image: &RgbImage, options: &ScanOptions) -> Result<PageScan> {
        ensure_valid_input(image)?;
        options.validate()?;

        let Some(outline) = self.locate_page(image, options) else {
            warn!("Page outline not found; annotating the original frame");
            let mut annotated = image.clone();
            self.overlay.draw_not_found(&mut annotated);
            return Ok(PageScan::NotFound { annotated });
        };

        let mut page = if options.smart_crop {
            self.crop(image, &outline)?
        } else {
            image.clone()
        };

        if options.binarization {
            page = expand_to_rgb(&Binarizer::from_options(options).binarize(&page));
        }

        info!(
            out_w = page.width(),
            out_h = page.height(),
            smart_crop = options.smart_crop,
            binarization = options.binarization,
            "Document scan complete"
        );
        Ok(PageScan::Found { page, outline })
    }

    /// Rectify `outline` out of `image`. Corners no projective transform can
    /// map (a collapsed outline) leave the frame unrectified.
    fn crop(&self, image: &RgbImage, outline: &Quadrilateral) -> Result<RgbImage> {
        match PerspectiveRectifier::new().rectify(image, outline) {
            Ok(page) => Ok(page),
            Err(ScanError::Projection) => {
                warn!(
                    corners = ?outline.control_points(),
                    "Failed to compute projective transform; returning unrectified frame"
                );
                Ok(image.clone())
            }
            Err(err) => Err(err),
        }
    }
}

impl Transformation for DocumentScanner {
    fn name(&self) -> &str {
        "document-scanner"
    }

    fn transform(&self, image: &RgbImage, options: &ScanOptions) -> Result<Vec<RgbImage>> {
        Ok(vec![self.scan(image, options)?.into_image()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point;

    fn scanner() -> DocumentScanner {
        DocumentScanner::new().expect("bundled font")
    }

    #[test]
    fn blank_canvas_falls_back_to_annotated_original() {
        let image = RgbImage::from_pixel(400, 300, Rgb([255, 255, 255]));
        let scan = scanner().scan(&image, &ScanOptions::default()).expect("scan");

        assert!(!scan.is_found());
        let out = scan.image();
        assert_eq!(out.dimensions(), image.dimensions());
        assert_ne!(out, &image, "failure notice should be drawn");
        for y in 40..300 {
            for x in 0..400 {
                assert_eq!(out.get_pixel(x, y), image.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn zero_area_frame_is_rejected_up_front() {
        let err = scanner()
            .scan(&RgbImage::new(0, 0), &ScanOptions::default())
            .expect_err("empty frame");
        assert!(matches!(err, ScanError::InvalidInput { .. }));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let image = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let options = ScanOptions {
            n_choices: 0,
            ..ScanOptions::default()
        };
        assert!(matches!(
            scanner().scan(&image, &options),
            Err(ScanError::InvalidOptions(_))
        ));
    }

    #[test]
    fn transform_wraps_single_image() {
        let image = RgbImage::from_pixel(100, 80, Rgb([128, 128, 128]));
        let out = scanner()
            .transform(&image, &ScanOptions::default())
            .expect("transform");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dimensions(), (100, 80));
    }

    #[test]
    fn page_turned_by_45_degrees_is_rectified() {
        let mut image = RgbImage::from_pixel(400, 400, Rgb([0, 0, 0]));
        let diamond = [
            Point::new(200, 50),
            Point::new(350, 200),
            Point::new(200, 350),
            Point::new(50, 200),
        ];
        draw_polygon_mut(&mut image, &diamond, Rgb([255, 255, 255]));

        let options = ScanOptions {
            binarization: false,
            ..ScanOptions::default()
        };
        let scan = scanner().scan(&image, &options).expect("tilted page is not an error");

        let PageScan::Found { page, outline } = scan else {
            panic!("diamond outline should be located");
        };
        let corners = outline.corners();
        for i in 0..4 {
            for j in i + 1..4 {
                assert_ne!(corners[i], corners[j], "each corner takes its own role");
            }
        }
        // Each side of the diamond is about 212 px long.
        let (w, h) = page.dimensions();
        assert!(w.abs_diff(212) <= 12, "width {w}");
        assert!(h.abs_diff(212) <= 12, "height {h}");
    }

    #[test]
    fn collapsed_outline_leaves_frame_unrectified() {
        let image = RgbImage::from_pixel(60, 40, Rgb([90, 90, 90]));
        let line = Quadrilateral {
            top_left: Point::new(5.0, 5.0),
            top_right: Point::new(20.0, 5.0),
            bottom_right: Point::new(40.0, 5.0),
            bottom_left: Point::new(50.0, 5.0),
        };
        let page = scanner().crop(&image, &line).expect("degrades instead of failing");
        assert_eq!(page, image);
    }
}
