// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interaction state of the annotation canvas.
//!
//! The surface owns the view transform and the current interaction mode.
//! Pointer handlers never touch the annotation set directly: they return a
//! [`SurfaceEvent`] that the session applies, so every change goes through
//! the session's mutation gateway.

use super::annotation::{AnnotationEdit, AnnotationSet, PixelRect, Point};
use crate::util::geometry::ViewState;

/// Boxes smaller than this (image pixels) on either side are discarded.
pub const MIN_BOX_SIZE: f64 = 3.0;

/// Move-drag updates smaller than this (widget pixels, Manhattan) are skipped.
pub const DRAG_THRESHOLD: f64 = 2.0;

/// Which interaction mode is active, without its gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Idle,
    Create,
    Edit,
}

/// Rubber-band rectangle being drawn in Create mode (image space).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawDrag {
    pub anchor: Point,
    pub end: Point,
}

/// Box being translated in Edit mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveDrag {
    pub index: usize,
    /// Pointer image position minus the box's top-left corner.
    pub offset: Point,
    /// Widget position of the last applied move.
    pub last_pointer: Point,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditState {
    pub hover: Option<usize>,
    pub selected: Option<usize>,
    pub drag: Option<MoveDrag>,
}

/// Interaction mode together with the gesture state only that mode can have.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Primary drag pans the view.
    Idle { pan_from: Option<Point> },
    /// Primary drag draws a new box.
    Create { drag: Option<DrawDrag> },
    /// Hover, select, move and context actions on existing boxes.
    Edit(EditState),
}

impl Mode {
    fn fresh(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Idle => Mode::Idle { pan_from: None },
            ModeKind::Create => Mode::Create { drag: None },
            ModeKind::Edit => Mode::Edit(EditState::default()),
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Idle { .. } => ModeKind::Idle,
            Mode::Create { .. } => ModeKind::Create,
            Mode::Edit(_) => ModeKind::Edit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// A finished Create drag waiting for a class label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingBox {
    pub rect: PixelRect,
}

/// What a pointer interaction asks the caller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Created(PendingBox),
    Edit(AnnotationEdit),
    /// Secondary press on a box: offer Move / Delete / Change Label.
    ContextMenu { index: usize },
}

/// View transform plus interaction state for one canvas.
#[derive(Debug, Clone)]
pub struct Surface {
    view: ViewState,
    mode: Mode,
    image_size: Option<(u32, u32)>,
    widget_size: (f64, f64),
    pointer_image: Option<Point>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        Self {
            view: ViewState::default(),
            mode: Mode::fresh(ModeKind::Idle),
            image_size: None,
            widget_size: (0.0, 0.0),
            pointer_image: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    /// Last pointer position over the canvas, in image pixels.
    pub fn pointer_image(&self) -> Option<Point> {
        self.pointer_image
    }

    /// Show a new image (or none). Resets the view and any gesture.
    pub fn set_image(&mut self, size: Option<(u32, u32)>) {
        self.image_size = size;
        self.mode = Mode::fresh(self.mode.kind());
        self.fit_to_window();
    }

    /// Report the canvas size; a change refits the view.
    pub fn resize(&mut self, widget_size: (f64, f64)) {
        if self.widget_size != widget_size {
            self.widget_size = widget_size;
            self.fit_to_window();
        }
    }

    pub fn fit_to_window(&mut self) {
        if let Some(size) = self.image_size {
            if let Some(view) = ViewState::fit(self.widget_size, size) {
                self.view = view;
            }
        }
    }

    pub fn zoom(&mut self, notches: i32) {
        if self.image_size.is_some() && notches != 0 {
            self.view.zoom(notches);
        }
    }

    /// Enter a mode, dropping any in-progress gesture.
    pub fn set_mode(&mut self, kind: ModeKind) {
        if self.mode.kind() != kind {
            log::debug!("Mode {:?} -> {:?}", self.mode.kind(), kind);
            self.mode = Mode::fresh(kind);
        }
    }

    /// Toggle button semantics: activating the active mode returns to Idle.
    pub fn toggle_mode(&mut self, kind: ModeKind) {
        if self.mode.kind() == kind {
            self.set_mode(ModeKind::Idle);
        } else {
            self.set_mode(kind);
        }
    }

    /// Abort the current drag without leaving the mode.
    pub fn cancel_gesture(&mut self) {
        match &mut self.mode {
            Mode::Idle { pan_from } => *pan_from = None,
            Mode::Create { drag } => *drag = None,
            Mode::Edit(state) => state.drag = None,
        }
    }

    /// True while a pan, draw or move drag is in progress.
    pub fn in_gesture(&self) -> bool {
        match &self.mode {
            Mode::Idle { pan_from } => pan_from.is_some(),
            Mode::Create { drag } => drag.is_some(),
            Mode::Edit(state) => state.drag.is_some(),
        }
    }

    pub fn hovered(&self) -> Option<usize> {
        match &self.mode {
            Mode::Edit(state) => state.hover,
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        match &self.mode {
            Mode::Edit(state) => state.selected,
            _ => None,
        }
    }

    /// Select a box from outside the canvas (e.g. the box list). Edit mode only.
    pub fn select(&mut self, index: Option<usize>) {
        if let Mode::Edit(state) = &mut self.mode {
            state.selected = index;
        }
    }

    /// Forget hover, selection and drag, e.g. after the set shrank.
    pub fn clear_selection(&mut self) {
        if let Mode::Edit(state) = &mut self.mode {
            *state = EditState::default();
        }
    }

    /// In-progress Create rectangle, in image space.
    pub fn transient_rect(&self) -> Option<PixelRect> {
        match &self.mode {
            Mode::Create {
                drag: Some(DrawDrag { anchor, end }),
            } => Some(PixelRect::from_corners(*anchor, *end)),
            _ => None,
        }
    }

    /// First box (in set order) whose widget-space bounds contain `pos`.
    pub fn hit_test(&self, pos: Point, annotations: &AnnotationSet) -> Option<usize> {
        annotations
            .boxes()
            .iter()
            .position(|bbox| self.view.rect_to_widget(&bbox.rect).contains(pos))
    }

    /// Start moving box `index` as if it had been grabbed at `pos`.
    pub fn begin_move(&mut self, index: usize, pos: Point, annotations: &AnnotationSet) {
        let Some(bbox) = annotations.get(index) else {
            return;
        };
        let offset = self.view.widget_to_image(pos) - bbox.rect.top_left();
        self.set_mode(ModeKind::Edit);
        if let Mode::Edit(state) = &mut self.mode {
            state.selected = Some(index);
            state.drag = Some(MoveDrag {
                index,
                offset,
                last_pointer: pos,
            });
        }
    }

    pub fn pointer_pressed(
        &mut self,
        pos: Point,
        button: PointerButton,
        annotations: &AnnotationSet,
    ) -> Option<SurfaceEvent> {
        self.image_size?;
        let image_pos = self.view.widget_to_image(pos);
        let hit = self.hit_test(pos, annotations);

        match (&mut self.mode, button) {
            (Mode::Idle { pan_from }, PointerButton::Primary) => {
                *pan_from = Some(pos);
                None
            }
            (Mode::Create { drag }, PointerButton::Primary) => {
                *drag = Some(DrawDrag {
                    anchor: image_pos,
                    end: image_pos,
                });
                None
            }
            (Mode::Edit(state), _) if state.drag.is_some() => {
                // A press finishes a move started from the context menu.
                state.drag = None;
                None
            }
            (Mode::Edit(state), PointerButton::Primary) => {
                state.hover = None;
                state.selected = hit;
                if let Some(index) = hit {
                    let bbox = annotations.get(index)?;
                    state.drag = Some(MoveDrag {
                        index,
                        offset: image_pos - bbox.rect.top_left(),
                        last_pointer: pos,
                    });
                }
                None
            }
            (Mode::Edit(state), PointerButton::Secondary) => {
                let index = hit?;
                state.selected = Some(index);
                Some(SurfaceEvent::ContextMenu { index })
            }
            _ => None,
        }
    }

    pub fn pointer_moved(&mut self, pos: Point, annotations: &AnnotationSet) -> Option<SurfaceEvent> {
        let (width, height) = self.image_size?;
        let image_pos = self.view.widget_to_image(pos);
        self.pointer_image = Some(image_pos);
        let hit = self.hit_test(pos, annotations);

        match &mut self.mode {
            Mode::Idle { pan_from } => {
                if let Some(from) = pan_from {
                    let delta = pos - *from;
                    *pan_from = Some(pos);
                    self.view.pan_by(delta);
                }
                None
            }
            Mode::Create { drag } => {
                if let Some(drag) = drag {
                    drag.end = image_pos;
                }
                None
            }
            Mode::Edit(state) => {
                state.hover = hit;
                let drag = state.drag.as_mut()?;
                if (pos - drag.last_pointer).manhattan_length() < DRAG_THRESHOLD {
                    return None;
                }
                drag.last_pointer = pos;
                let bbox = annotations.get(drag.index)?;
                let top_left =
                    bbox.rect
                        .clamp_top_left(image_pos - drag.offset, width as f64, height as f64);
                Some(SurfaceEvent::Edit(AnnotationEdit::Move {
                    index: drag.index,
                    top_left,
                }))
            }
        }
    }

    pub fn pointer_released(&mut self, pos: Point) -> Option<SurfaceEvent> {
        let (width, height) = self.image_size?;
        let image_pos = self.view.widget_to_image(pos);

        match &mut self.mode {
            Mode::Idle { pan_from } => {
                *pan_from = None;
                None
            }
            Mode::Create { drag } => {
                let mut finished = drag.take()?;
                finished.end = image_pos;
                let rect = PixelRect::from_corners(finished.anchor, finished.end)
                    .clipped_to(width as f64, height as f64);
                if rect.width < MIN_BOX_SIZE || rect.height < MIN_BOX_SIZE {
                    log::debug!("Discarding {:.1}x{:.1} box below minimum size", rect.width, rect.height);
                    return None;
                }
                Some(SurfaceEvent::Created(PendingBox { rect }))
            }
            Mode::Edit(state) => {
                state.drag = None;
                None
            }
        }
    }

    /// The pointer left the canvas: drop hover and the coordinate readout.
    pub fn pointer_left(&mut self) {
        self.pointer_image = None;
        if let Mode::Edit(state) = &mut self.mode {
            state.hover = None;
        }
    }

    /// Double click in Edit mode ends editing of the selected box.
    pub fn double_clicked(&mut self) {
        if let Mode::Edit(state) = &mut self.mode {
            state.selected = None;
            state.drag = None;
        }
    }
}
