// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between widget
//! pixels, zoomed/panned image pixels, and YOLO-normalized coordinates.

use crate::models::annotation::{PixelRect, Point};

/// Smallest allowed zoom scale.
pub const MIN_SCALE: f64 = 0.05;
/// Largest allowed zoom scale.
pub const MAX_SCALE: f64 = 40.0;
/// Multiplicative zoom factor per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

/// A box in YOLO form: center and size normalized to the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert a pixel rectangle to normalized YOLO center/size.
pub fn normalize_rect(rect: &PixelRect, width: u32, height: u32) -> YoloBox {
    let (w, h) = (width as f64, height as f64);
    YoloBox {
        cx: (rect.x + rect.width / 2.0) / w,
        cy: (rect.y + rect.height / 2.0) / h,
        width: rect.width / w,
        height: rect.height / h,
    }
}

/// Convert a normalized YOLO box back to a pixel rectangle.
pub fn denormalize_rect(yolo: &YoloBox, width: u32, height: u32) -> PixelRect {
    let (w, h) = (width as f64, height as f64);
    PixelRect {
        x: (yolo.cx - yolo.width / 2.0) * w,
        y: (yolo.cy - yolo.height / 2.0) * h,
        width: yolo.width * w,
        height: yolo.height * h,
    }
}

/// Zoom and pan of the image inside the canvas widget.
///
/// `image = (widget + pan) / scale` and `widget = image * scale - pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub scale: f64,
    pub pan: Point,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: Point::ZERO,
        }
    }
}

impl ViewState {
    /// Fit-to-window view with zero pan, or `None` for degenerate sizes.
    pub fn fit(widget_size: (f64, f64), image_size: (u32, u32)) -> Option<Self> {
        let (ww, wh) = widget_size;
        let (iw, ih) = image_size;
        if !(ww > 0.0 && wh > 0.0) || iw == 0 || ih == 0 {
            return None;
        }
        let scale = (ww / iw as f64).min(wh / ih as f64);
        Some(Self {
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            pan: Point::ZERO,
        })
    }

    pub fn widget_to_image(&self, p: Point) -> Point {
        (p + self.pan) / self.scale
    }

    pub fn image_to_widget(&self, p: Point) -> Point {
        p * self.scale - self.pan
    }

    /// Map an image-space rectangle into widget space.
    pub fn rect_to_widget(&self, rect: &PixelRect) -> PixelRect {
        let top_left = self.image_to_widget(rect.top_left());
        PixelRect::new(
            top_left.x,
            top_left.y,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }

    /// Zoom by whole wheel notches: positive zooms in, negative zooms out.
    pub fn zoom(&mut self, notches: i32) {
        let factor = ZOOM_STEP.powi(notches);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Pan by a pointer delta in widget pixels.
    pub fn pan_by(&mut self, delta: Point) {
        self.pan = self.pan - delta / self.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-4 * b.abs().max(1.0), "{a} != {b}");
    }

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        let sizes = [(1920, 1080), (800, 600), (37, 1001)];
        let rects = [
            PixelRect::new(0.0, 0.0, 10.0, 10.0),
            PixelRect::new(123.4, 56.7, 300.25, 80.5),
            PixelRect::new(5.0, 900.0, 1.5, 3.0),
        ];
        for &(w, h) in &sizes {
            for rect in &rects {
                let back = denormalize_rect(&normalize_rect(rect, w, h), w, h);
                assert_close(back.x, rect.x);
                assert_close(back.y, rect.y);
                assert_close(back.width, rect.width);
                assert_close(back.height, rect.height);
            }
        }
    }

    #[test]
    fn test_denormalize_centered_box() {
        let yolo = YoloBox {
            cx: 0.5,
            cy: 0.5,
            width: 0.25,
            height: 0.25,
        };
        let rect = denormalize_rect(&yolo, 800, 600);
        assert_eq!(rect, PixelRect::new(300.0, 225.0, 200.0, 150.0));
    }

    #[test]
    fn test_transform_inverse() {
        let views = [
            ViewState::default(),
            ViewState {
                scale: 0.37,
                pan: Point::new(-12.5, 40.0),
            },
            ViewState {
                scale: 12.0,
                pan: Point::new(300.0, -7.25),
            },
        ];
        let points = [Point::new(0.0, 0.0), Point::new(512.3, 17.9), Point::new(-40.0, 999.0)];
        for view in &views {
            for &p in &points {
                let back = view.image_to_widget(view.widget_to_image(p));
                assert_close(back.x, p.x);
                assert_close(back.y, p.y);
            }
        }
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let view = ViewState::fit((1000.0, 750.0), (2000, 1000)).unwrap();
        assert_close(view.scale, 0.5);
        assert_eq!(view.pan, Point::ZERO);

        let view = ViewState::fit((1000.0, 750.0), (500, 1500)).unwrap();
        assert_close(view.scale, 0.5);

        assert!(ViewState::fit((0.0, 750.0), (500, 500)).is_none());
        assert!(ViewState::fit((100.0, 100.0), (0, 500)).is_none());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewState::default();
        view.zoom(1);
        assert_close(view.scale, 1.1);
        view.zoom(-2);
        assert_close(view.scale, 1.0 / 1.1);

        view.zoom(500);
        assert_eq!(view.scale, MAX_SCALE);
        view.zoom(-1000);
        assert_eq!(view.scale, MIN_SCALE);
    }

    #[test]
    fn test_pan_divides_by_scale() {
        let mut view = ViewState {
            scale: 2.0,
            pan: Point::ZERO,
        };
        view.pan_by(Point::new(10.0, -4.0));
        assert_eq!(view.pan, Point::new(-5.0, 2.0));
    }
}
