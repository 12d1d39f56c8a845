// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the bounding boxes drawn over an image, the ordered
//! set holding them, and the value-type edits that are the only way that
//! set changes.

use std::ops::{Add, Div, Mul, Sub};

/// A 2D point or vector. Depending on context this lives in widget pixels
/// or image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Sum of the absolute components.
    pub fn manhattan_length(&self) -> f64 {
        self.x.abs() + self.y.abs()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// Axis-aligned rectangle in image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from two opposite corners in any drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Same size, new top-left corner.
    pub fn moved_to(&self, top_left: Point) -> Self {
        Self {
            x: top_left.x,
            y: top_left.y,
            ..*self
        }
    }

    /// Intersection with the image area `[0, width] x [0, height]`.
    pub fn clipped_to(&self, width: f64, height: f64) -> Self {
        let left = self.x.clamp(0.0, width);
        let top = self.y.clamp(0.0, height);
        let right = (self.x + self.width).clamp(0.0, width);
        let bottom = (self.y + self.height).clamp(0.0, height);
        Self::new(left, top, right - left, bottom - top)
    }

    /// Nearest top-left corner that keeps this rectangle inside the image.
    /// A rectangle larger than the image is pinned to the origin.
    pub fn clamp_top_left(&self, top_left: Point, width: f64, height: f64) -> Point {
        Point::new(
            top_left.x.min(width - self.width).max(0.0),
            top_left.y.min(height - self.height).max(0.0),
        )
    }
}

/// A labeled bounding box on the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub rect: PixelRect,
    pub label: String,
}

impl BoundingBox {
    pub fn new(rect: PixelRect, label: impl Into<String>) -> Self {
        Self {
            rect,
            label: label.into(),
        }
    }
}

/// A single mutation of an [`AnnotationSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationEdit {
    Append(BoundingBox),
    /// Translate a box so its top-left lands on the given image point.
    Move { index: usize, top_left: Point },
    Delete { index: usize },
    Relabel { index: usize, label: String },
}

/// Ordered boxes of the currently loaded image. Order is display order only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    boxes: Vec<BoundingBox>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_boxes(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn get(&self, index: usize) -> Option<&BoundingBox> {
        self.boxes.get(index)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    /// Apply an edit. Returns false when the edit targets a missing index.
    pub(crate) fn apply(&mut self, edit: AnnotationEdit) -> bool {
        match edit {
            AnnotationEdit::Append(bbox) => {
                self.boxes.push(bbox);
                true
            }
            AnnotationEdit::Move { index, top_left } => match self.boxes.get_mut(index) {
                Some(bbox) => {
                    bbox.rect = bbox.rect.moved_to(top_left);
                    true
                }
                None => false,
            },
            AnnotationEdit::Delete { index } => {
                if index < self.boxes.len() {
                    self.boxes.remove(index);
                    true
                } else {
                    false
                }
            }
            AnnotationEdit::Relabel { index, label } => match self.boxes.get_mut(index) {
                Some(bbox) => {
                    bbox.label = label;
                    true
                }
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes_drag_direction() {
        let rect = PixelRect::from_corners(Point::new(50.0, 40.0), Point::new(10.0, 100.0));
        assert_eq!(rect, PixelRect::new(10.0, 40.0, 40.0, 60.0));
    }

    #[test]
    fn test_move_keeps_size() {
        let mut set = AnnotationSet::new();
        set.apply(AnnotationEdit::Append(BoundingBox::new(
            PixelRect::new(0.0, 0.0, 20.0, 10.0),
            "cat",
        )));
        assert!(set.apply(AnnotationEdit::Move {
            index: 0,
            top_left: Point::new(5.0, 7.0),
        }));
        assert_eq!(set.boxes()[0].rect, PixelRect::new(5.0, 7.0, 20.0, 10.0));
    }

    #[test]
    fn test_clip_to_image_bounds() {
        let rect = PixelRect::new(700.0, -10.0, 300.0, 50.0).clipped_to(800.0, 600.0);
        assert_eq!(rect, PixelRect::new(700.0, 0.0, 100.0, 40.0));

        let outside = PixelRect::new(900.0, 10.0, 50.0, 50.0).clipped_to(800.0, 600.0);
        assert_eq!(outside.width, 0.0);
    }

    #[test]
    fn test_clamp_top_left_keeps_box_inside() {
        let rect = PixelRect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            rect.clamp_top_left(Point::new(750.0, -5.0), 800.0, 600.0),
            Point::new(700.0, 0.0)
        );
        assert_eq!(
            rect.clamp_top_left(Point::new(20.0, 30.0), 800.0, 600.0),
            Point::new(20.0, 30.0)
        );
        assert_eq!(rect.clamp_top_left(Point::new(5.0, 5.0), 60.0, 40.0), Point::ZERO);
    }

    #[test]
    fn test_edits_on_missing_index_are_rejected() {
        let mut set = AnnotationSet::new();
        assert!(!set.apply(AnnotationEdit::Delete { index: 0 }));
        assert!(!set.apply(AnnotationEdit::Relabel {
            index: 3,
            label: "dog".to_string(),
        }));
        assert!(set.is_empty());
    }
}
