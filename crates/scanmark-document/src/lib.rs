// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanmark-document: Document scanning and answer-sheet reading.
//
// Provides the page scanner (edge contours, page outline location, perspective
// rectification, adaptive binarization), the bubble-sheet reader (bubble
// location, row grouping, answer selection) and the uniform `Transformation`
// contract both implement.

pub mod image;
pub mod overlay;
pub mod scan;
pub mod sheet;
pub mod transform;

// Re-export the primary structs so callers can use `scanmark_document::DocumentScanner` etc.
pub use self::image::processor::ImageProcessor;
pub use overlay::Overlay;
pub use scan::{
    Binarizer, ContourExtractor, DocumentScanner, PageScan, PerspectiveRectifier, Quadrilateral,
    QuadrilateralLocator,
};
pub use sheet::{
    AnswerSelector, BubbleCandidate, BubbleExtractor, BubbleGridLocator, QuestionRow, RowGrouper,
    SheetReading, read_binary_sheet,
};
pub use transform::{Then, Transformation};
