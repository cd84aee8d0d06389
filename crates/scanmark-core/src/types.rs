// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for scanned pages and answer sheets.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Axis-aligned bounding box in pixel coordinates.
///
/// Matches the `(x, y, w, h)` convention of a bounding rectangle: `width` and
/// `height` count pixels, so a single pixel has a 1x1 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width divided by height. Zero-height boxes report `f64::INFINITY`.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return f64::INFINITY;
        }
        self.width as f64 / self.height as f64
    }
}

/// What to do with a final row holding fewer bubbles than `n_choices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingRowPolicy {
    /// Score the short row like any other.
    #[default]
    Keep,
    /// Discard the short row before scoring.
    Drop,
}

/// One recorded answer: 1-based question number and the chosen option label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub question: u32,
    pub option: String,
}

/// Ordered mapping from question number to the selected option label.
///
/// Insertion order is row order. Displays as `{1: 'b', 2: 'd'}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKey {
    entries: Vec<Answer>,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer. A repeated question number overwrites the earlier
    /// label in place, keeping its original position.
    pub fn insert(&mut self, question: u32, option: impl Into<String>) {
        let option = option.into();
        match self.entries.iter_mut().find(|a| a.question == question) {
            Some(existing) => existing.option = option,
            None => self.entries.push(Answer { question, option }),
        }
    }

    pub fn get(&self, question: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.question == question)
            .map(|a| a.option.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.entries.iter()
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, answer) in self.entries.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: '{}'", answer.question, answer.option)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for AnswerKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for answer in &self.entries {
            map.serialize_entry(&answer.question.to_string(), &answer.option)?;
        }
        map.end()
    }
}

impl<Q: Into<u32>, O: Into<String>> FromIterator<(Q, O)> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = (Q, O)>>(iter: I) -> Self {
        let mut key = AnswerKey::new();
        for (question, option) in iter {
            key.insert(question.into(), option);
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_key_display_keeps_insertion_order() {
        let mut key = AnswerKey::new();
        key.insert(2, "d");
        key.insert(1, "b");
        assert_eq!(key.to_string(), "{2: 'd', 1: 'b'}");
    }

    #[test]
    fn answer_key_overwrite_keeps_position() {
        let mut key: AnswerKey = [(1u32, "a"), (2, "c")].into_iter().collect();
        key.insert(1, "e");
        assert_eq!(key.get(1), Some("e"));
        assert_eq!(key.len(), 2);
        assert_eq!(key.to_string(), "{1: 'e', 2: 'c'}");
    }

    #[test]
    fn empty_answer_key_displays_braces() {
        assert_eq!(AnswerKey::new().to_string(), "{}");
    }

    #[test]
    fn answer_key_serializes_as_ordered_json_object() {
        let key: AnswerKey = [(1u32, "b"), (2, "d")].into_iter().collect();
        let json = serde_json::to_string(&key).expect("serialize");
        assert_eq!(json, r#"{"1":"b","2":"d"}"#);
    }

    #[test]
    fn aspect_ratio_of_zero_height_is_infinite() {
        assert!(BoundingBox::new(0, 0, 10, 0).aspect_ratio().is_infinite());
        assert!((BoundingBox::new(0, 0, 30, 20).aspect_ratio() - 1.5).abs() < 1e-9);
    }
}
