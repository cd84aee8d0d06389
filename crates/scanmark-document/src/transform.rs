// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The uniform transformation contract shared by every pipeline stage and by
// the two top-level scanners.

use image::RgbImage;
use scanmark_core::error::{Result, ScanError};
use scanmark_core::ScanOptions;

/// A single-image transformation: one colour frame in, one or more frames out.
///
/// Implementations must return a non-empty list and must not keep per-call
/// state, so one instance can be reused across any number of frames.
pub trait Transformation {
    /// Short human-readable name used in logs.
    fn name(&self) -> &str;

    /// Apply the transformation to `image` under `options`.
    fn transform(&self, image: &RgbImage, options: &ScanOptions) -> Result<Vec<RgbImage>>;

    /// Feed the first output of `self` into `next`.
    fn then<B>(self, next: B) -> Then<Self, B>
    where
        Self: Sized,
        B: Transformation,
    {
        Then { first: self, second: next }
    }
}

impl<T: Transformation + ?Sized> Transformation for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn transform(&self, image: &RgbImage, options: &ScanOptions) -> Result<Vec<RgbImage>> {
        (**self).transform(image, options)
    }
}

impl<T: Transformation + ?Sized> Transformation for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn transform(&self, image: &RgbImage, options: &ScanOptions) -> Result<Vec<RgbImage>> {
        (**self).transform(image, options)
    }
}

/// Sequential composition of two transformations. See [`Transformation::then`].
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<A: Transformation, B: Transformation> Transformation for Then<A, B> {
    fn name(&self) -> &str {
        self.second.name()
    }

    fn transform(&self, image: &RgbImage, options: &ScanOptions) -> Result<Vec<RgbImage>> {
        let intermediate = self.first.transform(image, options)?;
        let head = intermediate.first().ok_or_else(|| {
            ScanError::Image(format!("{} produced no output image", self.first.name()))
        })?;
        self.second.transform(head, options)
    }
}

/// Reject images no stage can work with.
///
/// Channel count and bit depth are fixed by the `RgbImage` type, so only the
/// area needs checking here.
pub(crate) fn ensure_valid_input(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ScanError::InvalidInput {
            width,
            height,
            reason: "image has zero area".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    struct Invert;

    impl Transformation for Invert {
        fn name(&self) -> &str {
            "invert"
        }

        fn transform(&self, image: &RgbImage, _options: &ScanOptions) -> Result<Vec<RgbImage>> {
            let mut out = image.clone();
            for pixel in out.pixels_mut() {
                pixel.0 = pixel.0.map(|c| 255 - c);
            }
            Ok(vec![out])
        }
    }

    struct Nothing;

    impl Transformation for Nothing {
        fn name(&self) -> &str {
            "nothing"
        }

        fn transform(&self, _image: &RgbImage, _options: &ScanOptions) -> Result<Vec<RgbImage>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn composition_feeds_first_output_forward() {
        let image = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        let twice = Invert.then(Invert);
        let out = twice
            .transform(&image, &ScanOptions::default())
            .expect("compose");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], image);
    }

    #[test]
    fn composition_rejects_empty_intermediate() {
        let image = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let err = Nothing
            .then(Invert)
            .transform(&image, &ScanOptions::default())
            .expect_err("empty output must fail");
        assert!(err.to_string().contains("nothing"));
    }

    #[test]
    fn boxed_trait_objects_compose() {
        let stages: Vec<Box<dyn Transformation>> = vec![Box::new(Invert), Box::new(Invert)];
        let image = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        let mut current = vec![image.clone()];
        for stage in &stages {
            current = stage
                .transform(&current[0], &ScanOptions::default())
                .expect("stage");
        }
        assert_eq!(current[0], image);
    }

    #[test]
    fn zero_area_is_invalid_input() {
        let empty = RgbImage::new(0, 10);
        assert!(matches!(
            ensure_valid_input(&empty),
            Err(ScanError::InvalidInput { width: 0, height: 10, .. })
        ));
    }
}
