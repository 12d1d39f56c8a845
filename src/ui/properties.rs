// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Class list and box list panel.
//!
//! This module shows the known classes and the boxes of the current image,
//! flagging labels that are missing from the class list.

use crate::models::session::Session;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    SelectBox(usize),
    DeleteBox(usize),
}

/// Display the class list and the boxes of the current image.
pub fn show(ui: &mut egui::Ui, session: &Session, selected: Option<usize>) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Class List");
    ui.separator();
    egui::ScrollArea::vertical()
        .id_source("class_list")
        .max_height(200.0)
        .show(ui, |ui| {
            if session.classes().is_empty() {
                ui.label(egui::RichText::new("No classes.txt in this folder").weak());
            }
            for (id, name) in session.classes().names().iter().enumerate() {
                ui.label(format!("{:>3}  {}", id, name));
            }
        });

    ui.add_space(12.0);
    ui.heading(format!("Boxes ({})", session.annotations().len()));
    ui.separator();

    let unknown = session.unknown_labels();
    if !unknown.is_empty() {
        ui.colored_label(
            egui::Color32::from_rgb(255, 140, 0),
            format!("Not in class list: {}", unknown.join(", ")),
        );
    }

    egui::ScrollArea::vertical().id_source("box_list").show(ui, |ui| {
        for (index, bbox) in session.annotations().boxes().iter().enumerate() {
            ui.horizontal(|ui| {
                let known = session.classes().contains(&bbox.label);
                let mut text = egui::RichText::new(format!(
                    "{}: ({:.0}, {:.0}) {:.0}×{:.0}",
                    bbox.label, bbox.rect.x, bbox.rect.y, bbox.rect.width, bbox.rect.height
                ));
                if !known {
                    text = text.color(egui::Color32::from_rgb(255, 140, 0));
                }
                let mut response = ui.selectable_label(selected == Some(index), text);
                if !known {
                    response = response.on_hover_text("Label is not in the class list; saving will fail");
                }
                if response.clicked() {
                    action = PropertiesAction::SelectBox(index);
                }
                if ui.small_button("🗑").on_hover_text("Delete box").clicked() {
                    action = PropertiesAction::DeleteBox(index);
                }
            });
        }
    });

    action
}
