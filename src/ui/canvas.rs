// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and box annotation.
//!
//! This module paints the current image and its boxes through the
//! surface's view transform and forwards egui pointer input to the
//! surface. It never mutates annotations itself: whatever the surface
//! asks for is handed back to the caller.

use crate::models::annotation::{AnnotationSet, PixelRect, Point};
use crate::models::surface::{PointerButton, Surface, SurfaceEvent};

const BOX_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 0, 0);
const HOVER_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 255, 0);
const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 255, 255);

/// Result of canvas interaction.
#[derive(Default)]
pub struct CanvasOutput {
    pub events: Vec<SurfaceEvent>,
    /// Pointer position this frame: screen space and canvas-local.
    pub pointer: Option<(egui::Pos2, Point)>,
}

/// Display the canvas and handle pointer input when `input_enabled`.
pub fn show(
    ui: &mut egui::Ui,
    surface: &mut Surface,
    annotations: &AnnotationSet,
    texture: Option<&egui::TextureHandle>,
    input_enabled: bool,
) -> CanvasOutput {
    let mut output = CanvasOutput::default();

    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
    let canvas = response.rect;
    painter.rect_filled(canvas, 0.0, egui::Color32::from_gray(40));
    surface.resize((canvas.width() as f64, canvas.height() as f64));

    let to_local = |pos: egui::Pos2| Point::new((pos.x - canvas.min.x) as f64, (pos.y - canvas.min.y) as f64);
    let to_screen = |p: Point| egui::pos2(canvas.min.x + p.x as f32, canvas.min.y + p.y as f32);
    let rect_to_screen = |r: PixelRect| {
        egui::Rect::from_min_max(
            to_screen(r.top_left()),
            to_screen(r.bottom_right()),
        )
    };

    if input_enabled {
        let (latest, primary, secondary, released, scroll, double) = ui.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_pressed(),
                i.pointer.secondary_pressed(),
                i.pointer.any_released(),
                i.raw_scroll_delta.y,
                i.pointer.button_double_clicked(egui::PointerButton::Primary),
            )
        });
        let hovering = response.hovered();

        if let Some(pos) = latest {
            let local = to_local(pos);
            output.pointer = Some((pos, local));

            if hovering && primary {
                output
                    .events
                    .extend(surface.pointer_pressed(local, PointerButton::Primary, annotations));
            }
            if hovering && secondary {
                output
                    .events
                    .extend(surface.pointer_pressed(local, PointerButton::Secondary, annotations));
            }
            if tracks_motion(hovering, surface) {
                output.events.extend(surface.pointer_moved(local, annotations));
            } else {
                surface.pointer_left();
            }
            if released {
                output.events.extend(surface.pointer_released(local));
            }
        } else {
            surface.pointer_left();
        }

        if hovering {
            if scroll > 0.0 {
                surface.zoom(1);
            } else if scroll < 0.0 {
                surface.zoom(-1);
            }
            if double {
                surface.double_clicked();
            }
        }
    }

    let Some(texture) = texture else {
        draw_placeholder(&painter, canvas, surface.image_size().is_some());
        return output;
    };
    let Some((width, height)) = surface.image_size() else {
        return output;
    };

    let view = *surface.view();
    let image_rect = rect_to_screen(view.rect_to_widget(&PixelRect::new(0.0, 0.0, width as f64, height as f64)));
    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    let hovered = surface.hovered();
    let selected = surface.selected();
    for (index, bbox) in annotations.boxes().iter().enumerate() {
        let rect = rect_to_screen(view.rect_to_widget(&bbox.rect));
        let color = if Some(index) == hovered {
            draw_dashed_rect(&painter, rect, egui::Stroke::new(2.0, HOVER_COLOR));
            HOVER_COLOR
        } else {
            let color = if Some(index) == selected { SELECTED_COLOR } else { BOX_COLOR };
            painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, color));
            color
        };
        painter.text(
            rect.left_top() + egui::vec2(2.0, -4.0),
            egui::Align2::LEFT_BOTTOM,
            &bbox.label,
            egui::FontId::proportional(13.0),
            color,
        );
    }

    if let Some(transient) = surface.transient_rect() {
        let rect = rect_to_screen(view.rect_to_widget(&transient));
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, BOX_COLOR));
    }

    output
}

/// Motion reaches the surface while the pointer is over the canvas, or
/// anywhere during a drag that started on it.
fn tracks_motion(hovering: bool, surface: &Surface) -> bool {
    hovering || surface.in_gesture()
}

fn draw_dashed_rect(painter: &egui::Painter, rect: egui::Rect, stroke: egui::Stroke) {
    let outline = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ];
    painter.extend(egui::Shape::dashed_line(&outline, stroke, 6.0, 4.0));
}

/// Message shown when there is nothing to draw.
fn draw_placeholder(painter: &egui::Painter, canvas: egui::Rect, image_pending: bool) {
    let center = canvas.center();
    if image_pending {
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            "Loading image...",
            egui::FontId::proportional(16.0),
            egui::Color32::WHITE,
        );
        return;
    }
    painter.text(
        center - egui::vec2(0.0, 24.0),
        egui::Align2::CENTER_CENTER,
        "YOLABEL",
        egui::FontId::proportional(32.0),
        egui::Color32::from_gray(200),
    );
    painter.text(
        center + egui::vec2(0.0, 12.0),
        egui::Align2::CENTER_CENTER,
        "Open an image folder to begin annotating",
        egui::FontId::proportional(14.0),
        egui::Color32::from_gray(180),
    );
    painter.text(
        center + egui::vec2(0.0, 36.0),
        egui::Align2::CENTER_CENTER,
        "File → Open Folder...",
        egui::FontId::proportional(13.0),
        egui::Color32::from_gray(130),
    );
}
