// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image navigation bar: folder picker, name search, resolution, prev/next.

/// Action requested from the navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorAction {
    None,
    OpenFolder,
    Prev,
    Next,
    Search(String),
}

/// Search field state kept between frames.
#[derive(Default)]
pub struct NavigatorState {
    pub query: String,
    /// Set while the search field has focus; Enter only searches then.
    pub searching: bool,
}

impl NavigatorState {
    /// Show the current image name, unless the user is typing a query.
    pub fn show_name(&mut self, name: Option<String>) {
        if !self.searching {
            self.query = name.unwrap_or_default();
        }
    }
}

/// Display the navigation bar.
pub fn show(
    ui: &mut egui::Ui,
    state: &mut NavigatorState,
    resolution: Option<(u32, u32)>,
    position: Option<(usize, usize)>,
) -> NavigatorAction {
    let mut action = NavigatorAction::None;

    ui.horizontal(|ui| {
        if ui.button("📂 Image Folder").clicked() {
            action = NavigatorAction::OpenFolder;
        }

        let response = ui.add(
            egui::TextEdit::singleline(&mut state.query)
                .hint_text("Search image name")
                .desired_width(260.0),
        );
        if response.gained_focus() {
            state.searching = true;
            log::debug!("Entered search mode");
        }
        if response.lost_focus() {
            if state.searching && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                action = NavigatorAction::Search(state.query.clone());
            }
            state.searching = false;
        }

        let resolution_text = match resolution {
            Some((w, h)) => format!("Resolution: {}×{}", w, h),
            None => "Resolution: --".to_string(),
        };
        ui.label(egui::RichText::new(resolution_text).monospace());

        ui.separator();

        if ui.button("◀ PREV IMAGE").clicked() {
            action = NavigatorAction::Prev;
        }
        if ui.button("NEXT IMAGE ▶").clicked() {
            action = NavigatorAction::Next;
        }

        if let Some((index, total)) = position {
            ui.label(format!("{} / {}", index + 1, total));
        }
    });

    action
}
