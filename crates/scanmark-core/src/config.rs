// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-call scan options.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, ScanError};
use crate::types::TrailingRowPolicy;

/// Options recognised by every transformation.
///
/// The first four fields form the public option set; the rest are tunables
/// whose defaults reproduce the reference thresholds. Missing JSON fields take
/// their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Enable perspective rectification of the located page.
    pub smart_crop: bool,
    /// Enable adaptive-threshold output.
    pub binarization: bool,
    /// Ordered (left to right) labels for the bubbles in a row.
    pub answer_options: Vec<String>,
    /// Bubbles per question row.
    pub n_choices: usize,

    /// Lower hysteresis bound of the edge detector.
    pub canny_low: f32,
    /// Upper hysteresis bound of the edge detector.
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Side of the adaptive-threshold neighbourhood, in pixels (odd).
    pub adaptive_block_size: u32,
    /// Constant subtracted from the weighted neighbourhood mean.
    pub adaptive_offset: i32,
    /// Minimum bubble width and height, in pixels.
    pub bubble_min_side: u32,
    /// Smallest accepted bubble width / height ratio.
    pub bubble_min_aspect: f64,
    /// Largest accepted bubble width / height ratio.
    pub bubble_max_aspect: f64,
    /// What to do with a last row holding fewer than `n_choices` bubbles.
    pub trailing_row_policy: TrailingRowPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            smart_crop: true,
            binarization: true,
            answer_options: ["a", "b", "c", "d", "e"].map(String::from).to_vec(),
            n_choices: 5,
            canny_low: 75.0,
            canny_high: 200.0,
            approx_epsilon_ratio: 0.02,
            adaptive_block_size: 11,
            adaptive_offset: 10,
            bubble_min_side: 15,
            bubble_min_aspect: 0.9,
            bubble_max_aspect: 1.5,
            trailing_row_policy: TrailingRowPolicy::Keep,
        }
    }
}

impl ScanOptions {
    /// Parse options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Read and parse options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check the invariants every stage relies on.
    pub fn validate(&self) -> Result<()> {
        if self.n_choices == 0 {
            return Err(ScanError::InvalidOptions(
                "n_choices must be at least 1".into(),
            ));
        }
        if self.answer_options.is_empty() {
            return Err(ScanError::InvalidOptions(
                "answer_options must not be empty".into(),
            ));
        }
        if self.n_choices > self.answer_options.len() {
            return Err(ScanError::InvalidOptions(format!(
                "n_choices ({}) exceeds the number of answer options ({})",
                self.n_choices,
                self.answer_options.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.answer_options.iter().find(|o| !seen.insert(o.as_str())) {
            return Err(ScanError::InvalidOptions(format!(
                "duplicate answer option '{dup}'"
            )));
        }
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(ScanError::InvalidOptions(format!(
                "adaptive_block_size must be odd and >= 3, got {}",
                self.adaptive_block_size
            )));
        }
        if self.approx_epsilon_ratio.is_nan() || self.approx_epsilon_ratio <= 0.0 {
            return Err(ScanError::InvalidOptions(
                "approx_epsilon_ratio must be positive".into(),
            ));
        }
        if self.bubble_min_aspect > self.bubble_max_aspect {
            return Err(ScanError::InvalidOptions(
                "bubble_min_aspect exceeds bubble_max_aspect".into(),
            ));
        }
        Ok(())
    }

    /// Label for the bubble at `index` within a row, if the alphabet has one.
    pub fn option_label(&self, index: usize) -> Option<&str> {
        self.answer_options.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_values() {
        let options = ScanOptions::default();
        assert!(options.smart_crop);
        assert!(options.binarization);
        assert_eq!(options.answer_options, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(options.n_choices, 5);
        assert_eq!(options.adaptive_block_size, 11);
        assert_eq!(options.adaptive_offset, 10);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let options =
            ScanOptions::from_json_str(r#"{"binarization": false, "trailing_row_policy": "drop"}"#)
                .expect("valid json");
        assert!(!options.binarization);
        assert!(options.smart_crop);
        assert_eq!(options.trailing_row_policy, TrailingRowPolicy::Drop);
        assert_eq!(options.n_choices, 5);
    }

    #[test]
    fn zero_choices_rejected() {
        let options = ScanOptions {
            n_choices: 0,
            ..ScanOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ScanError::InvalidOptions(_))
        ));
    }

    #[test]
    fn more_choices_than_labels_rejected() {
        let options = ScanOptions {
            n_choices: 6,
            ..ScanOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn duplicate_labels_rejected() {
        let options = ScanOptions {
            answer_options: vec!["a".into(), "b".into(), "a".into()],
            n_choices: 3,
            ..ScanOptions::default()
        };
        let err = options.validate().expect_err("duplicates must fail");
        assert!(err.to_string().contains("duplicate answer option 'a'"));
    }

    #[test]
    fn even_block_size_rejected() {
        let options = ScanOptions {
            adaptive_block_size: 10,
            ..ScanOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = ScanOptions::from_json_str("{ not json").expect_err("must fail");
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"n_choices": 4, "answer_options": ["w", "x", "y", "z"]}}"#)
            .expect("write");
        let options = ScanOptions::from_json_file(file.path()).expect("load");
        assert_eq!(options.n_choices, 4);
        assert_eq!(options.option_label(3), Some("z"));
        assert_eq!(options.option_label(4), None);
    }
}
