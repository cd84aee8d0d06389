// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decoding, aspect-preserving resize and encoding of the
// frames fed to and returned from the scanners.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use scanmark_core::error::{Result, ScanError};
use tracing::{debug, info, instrument};

/// Wraps a single in-memory frame.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining.
///
/// ```ignore
/// let frame = ImageProcessor::open("sheet.jpg")?
///     .smart_resize(800, true)
///     .to_rgb8();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            ScanError::Image(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| ScanError::Image(format!("failed to decode image: {}", err)))?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Wrap a colour frame, e.g. one returned by a transformation.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(image),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Three-channel, 8-bit copy of the frame as the scanners expect it.
    /// Alpha is dropped and grayscale is replicated.
    pub fn to_rgb8(&self) -> RgbImage {
        self.image.to_rgb8()
    }

    // -- Transformations ------------------------------------------------------

    /// Resize so one side equals `size`, keeping the aspect ratio.
    ///
    /// With `by_height` the height becomes `size` and the width follows;
    /// otherwise the width becomes `size`. The derived side is truncated and
    /// never drops below 1.
    #[instrument(skip(self), fields(size, by_height))]
    pub fn smart_resize(self, size: u32, by_height: bool) -> Self {
        let (w, h) = (self.image.width(), self.image.height());
        if w == 0 || h == 0 || size == 0 {
            return self;
        }

        let (new_w, new_h) = if by_height {
            (((w as f64) * (size as f64 / h as f64)) as u32, size)
        } else {
            (size, ((h as f64) * (size as f64 / w as f64)) as u32)
        };
        let (new_w, new_h) = (new_w.max(1), new_h.max(1));

        info!(from_w = w, from_h = h, new_w, new_h, "Resizing image");
        Self {
            image: self.image.resize_exact(new_w, new_h, FilterType::Triangle),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ScanError::Image(format!("image encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            ScanError::Image(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}
