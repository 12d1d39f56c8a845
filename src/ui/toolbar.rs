// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and mode selection UI.
//!
//! This module provides the Create/Edit mode toggles and the explicit
//! Save action.

use crate::models::surface::{ModeKind, Surface};

/// Action requested from the toolbar.
pub enum ToolbarAction {
    None,
    Save,
}

/// Display the toolbar. Mode toggles are applied to `surface` directly.
pub fn show(ui: &mut egui::Ui, surface: &mut Surface, dirty: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Mode:");

        ui.separator();

        let creating = surface.mode_kind() == ModeKind::Create;
        let label = if creating { "✚ Creating ON" } else { "✚ Create" };
        if ui.selectable_label(creating, label).clicked() {
            surface.toggle_mode(ModeKind::Create);
        }

        let editing = surface.mode_kind() == ModeKind::Edit;
        let label = if editing { "✎ Editing ON" } else { "✎ Edit" };
        if ui.selectable_label(editing, label).clicked() {
            surface.toggle_mode(ModeKind::Edit);
        }

        ui.separator();

        let save_label = if dirty { "💾 Save YOLO*" } else { "💾 Save YOLO" };
        if ui.button(save_label).clicked() {
            action = ToolbarAction::Save;
        }

        ui.separator();

        let mode_text = match surface.mode_kind() {
            ModeKind::Idle => "Drag to pan, scroll to zoom",
            ModeKind::Create => "Drag to draw a box, release to pick its class",
            ModeKind::Edit => "Drag a box to move it, right-click for more actions",
        };

        ui.label(egui::RichText::new(mode_text).italics().weak());
    });

    action
}
