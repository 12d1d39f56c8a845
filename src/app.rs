// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the eframe::App trait, wiring the navigation bar, toolbar, panels and
//! dialogs to the session and the canvas surface.

use crate::io::config::AppConfig;
use crate::io::error::LabelerError;
use crate::io::media::LoadedImage;
use crate::models::annotation::Point;
use crate::models::class_list::DEFAULT_LABEL;
use crate::models::session::{Navigation, SearchOutcome, Session};
use crate::models::status::StatusLevel;
use crate::models::surface::{ModeKind, PendingBox, Surface, SurfaceEvent};
use crate::ui::{canvas, navigator, properties, toolbar};
use std::path::{Path, PathBuf};

/// What the label prompt will do with the chosen name.
enum PromptTarget {
    NewBox(PendingBox),
    Relabel(usize),
}

struct LabelPrompt {
    target: PromptTarget,
    /// Existing class picked in the combo box.
    choice: String,
    /// Free-text new class; wins over `choice` when not blank.
    new_name: String,
}

/// Modal dialogs. At most one is open.
enum Dialog {
    ConfirmSave,
    Label(LabelPrompt),
    Message { title: String, text: String },
    About,
}

#[derive(Clone, Copy)]
enum MenuChoice {
    Move,
    Delete,
    ChangeLabel,
}

/// Right-click menu on a box.
struct ContextMenu {
    index: usize,
    screen_pos: egui::Pos2,
    local_pos: Point,
}

/// Main application state.
pub struct LabelerApp {
    session: Session,
    surface: Surface,

    /// Texture of the current image
    texture: Option<egui::TextureHandle>,

    navigator: navigator::NavigatorState,
    dialog: Option<Dialog>,
    context_menu: Option<ContextMenu>,
}

impl LabelerApp {
    /// Create the app, reopening the last folder recorded in `config_path`.
    pub fn new(ctx: &egui::Context, config_path: PathBuf) -> Self {
        let config = AppConfig::load(&config_path);
        let mut app = Self {
            session: Session::new(config_path),
            surface: Surface::new(),
            texture: None,
            navigator: navigator::NavigatorState::default(),
            dialog: None,
            context_menu: None,
        };

        if let Some(dir) = config.startup_dir() {
            log::info!("Restoring last folder {}", dir.display());
            app.open_folder(ctx, dir);
        }
        app
    }

    fn last_dir(&self) -> PathBuf {
        self.session
            .folder()
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }

    /// Replace the displayed image (or clear it) and reset the view.
    fn show_image(&mut self, ctx: &egui::Context, image: Option<LoadedImage>) {
        self.context_menu = None;
        match image {
            Some(image) => {
                let size = [image.width as usize, image.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                self.texture = Some(ctx.load_texture(
                    "current_image",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
                self.surface.set_image(Some(image.size()));
            }
            None => {
                self.texture = None;
                self.surface.set_image(None);
            }
        }
        self.navigator.show_name(self.session.current_name());
    }

    fn report(&mut self, title: &str, error: LabelerError) {
        self.session.status_mut().error(format!("{}: {}", title, error));
        self.dialog = Some(Dialog::Message {
            title: title.to_string(),
            text: error.to_string(),
        });
    }

    fn open_folder(&mut self, ctx: &egui::Context, dir: &Path) {
        match self.session.open_folder(dir) {
            Ok(image) => self.show_image(ctx, image),
            Err(e) => self.report("Failed to open folder", e),
        }
    }

    fn pick_folder(&mut self, ctx: &egui::Context) {
        if let Some(dir) = rfd::FileDialog::new()
            .set_title("Select Folder")
            .set_directory(self.last_dir())
            .pick_folder()
        {
            self.open_folder(ctx, &dir);
        }
    }

    fn handle_navigation(&mut self, ctx: &egui::Context, result: Result<Navigation, LabelerError>) {
        match result {
            Ok(Navigation::Moved(image)) => self.show_image(ctx, image),
            Ok(Navigation::Stayed) => {}
            Err(e) => self.report("Could not save before leaving this image", e),
        }
    }

    fn search(&mut self, ctx: &egui::Context, query: &str) {
        match self.session.search(query) {
            Ok(SearchOutcome::Found { name, image }) => {
                self.show_image(ctx, image);
                self.navigator.query = name;
            }
            Ok(SearchOutcome::NotFound) => {
                self.dialog = Some(Dialog::Message {
                    title: "Not Found".to_string(),
                    text: format!("No image matching '{}' found.", query.trim()),
                });
                self.navigator.show_name(self.session.current_name());
            }
            Ok(SearchOutcome::Ignored) => {}
            Err(e) => self.report("Could not save before leaving this image", e),
        }
    }

    /// Explicit save asks first; the pre-navigation save does not.
    fn request_save(&mut self) {
        if self.session.current_path().is_some() && self.session.image_size().is_some() {
            self.dialog = Some(Dialog::ConfirmSave);
        }
    }

    /// Remove box `index`. Any open context menu refers to an index that
    /// is no longer valid, so it is closed too.
    fn delete_box(&mut self, index: usize) {
        self.context_menu = None;
        if self.session.delete(index) {
            self.surface.clear_selection();
            log::info!("Deleted box {}, total: {}", index, self.session.annotations().len());
        }
    }

    fn open_label_prompt(&mut self, target: PromptTarget) {
        let classes = self.session.classes();
        let choice = match &target {
            PromptTarget::Relabel(index) => self
                .session
                .annotations()
                .get(*index)
                .map(|b| b.label.clone())
                .unwrap_or_default(),
            PromptTarget::NewBox(_) => classes
                .get(0)
                .unwrap_or(DEFAULT_LABEL)
                .to_string(),
        };
        self.dialog = Some(Dialog::Label(LabelPrompt {
            target,
            choice,
            new_name: String::new(),
        }));
    }

    fn apply_label(&mut self, target: PromptTarget, label: &str) {
        let result = match target {
            PromptTarget::NewBox(pending) => self.session.add_box(pending, label),
            PromptTarget::Relabel(index) => self.session.relabel(index, label).map(|relabeled| {
                if !relabeled {
                    log::warn!("Box {} no longer exists; label not changed", index);
                }
            }),
        };
        if let Err(e) = result {
            self.report("Failed to update class list", e);
        }
    }

    fn handle_surface_event(&mut self, event: SurfaceEvent, pointer: Option<(egui::Pos2, Point)>) {
        match event {
            SurfaceEvent::Created(pending) => {
                log::info!(
                    "New box {:.1}x{:.1} at ({:.1}, {:.1})",
                    pending.rect.width,
                    pending.rect.height,
                    pending.rect.x,
                    pending.rect.y
                );
                self.open_label_prompt(PromptTarget::NewBox(pending));
            }
            SurfaceEvent::Edit(edit) => {
                self.session.apply(edit);
            }
            SurfaceEvent::ContextMenu { index } => {
                if let Some((screen_pos, local_pos)) = pointer {
                    self.context_menu = Some(ContextMenu {
                        index,
                        screen_pos,
                        local_pos,
                    });
                }
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if self.dialog.is_some() || ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.context_menu.take().is_none() {
                if self.surface.in_gesture() {
                    self.surface.cancel_gesture();
                } else {
                    self.surface.set_mode(ModeKind::Idle);
                }
            }
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.request_save();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            if let Some(index) = self.surface.selected() {
                self.delete_box(index);
            }
        }

        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            let result = self.session.next();
            self.handle_navigation(ctx, result);
        } else if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            let result = self.session.prev();
            self.handle_navigation(ctx, result);
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Folder...").clicked() {
                        self.pick_folder(ctx);
                        ui.close_menu();
                    }
                    if ui.button("Save (Ctrl+S)").clicked() {
                        self.request_save();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.button("Create Mode").clicked() {
                        self.surface.set_mode(ModeKind::Create);
                        ui.close_menu();
                    }
                    if ui.button("Edit Mode").clicked() {
                        self.surface.set_mode(ModeKind::Edit);
                        ui.close_menu();
                    }
                    ui.separator();
                    let selected = self.surface.selected();
                    if ui
                        .add_enabled(selected.is_some(), egui::Button::new("Delete Selected"))
                        .clicked()
                    {
                        if let Some(index) = selected {
                            self.delete_box(index);
                        }
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In").clicked() {
                        self.surface.zoom(1);
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.surface.zoom(-1);
                        ui.close_menu();
                    }
                    if ui.button("Fit to Window").clicked() {
                        self.surface.fit_to_window();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.dialog = Some(Dialog::About);
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn show_status_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match self.surface.pointer_image() {
                        Some(p) => ui.label(format!("Image X: {:.1}, Y: {:.1}", p.x, p.y)),
                        None => ui.label("X: 0.00, Y: 0.00"),
                    };
                    ui.separator();
                    ui.label(format!("Mode: {:?}", self.surface.mode_kind()));
                    ui.separator();
                    ui.label(format!("Zoom: {:.0}%", self.surface.view().scale * 100.0));
                    if self.session.is_dirty() {
                        ui.separator();
                        ui.label(egui::RichText::new("Unsaved changes").color(egui::Color32::YELLOW));
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for entry in self.session.status().entries() {
                            let color = match entry.level {
                                StatusLevel::Info => ui.visuals().text_color(),
                                StatusLevel::Warning => egui::Color32::from_rgb(255, 170, 0),
                                StatusLevel::Error => egui::Color32::from_rgb(255, 80, 80),
                            };
                            ui.colored_label(color, entry.message.as_str());
                        }
                    });
            });
    }

    fn show_context_menu(&mut self, ctx: &egui::Context) {
        let Some(menu) = &self.context_menu else {
            return;
        };
        let (index, local_pos) = (menu.index, menu.local_pos);

        let mut chosen = None;
        let area = egui::Area::new(egui::Id::new("box_context_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(menu.screen_pos)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if ui.button("Move").clicked() {
                        chosen = Some(MenuChoice::Move);
                    }
                    if ui.button("Delete").clicked() {
                        chosen = Some(MenuChoice::Delete);
                    }
                    if ui.button("Change Label").clicked() {
                        chosen = Some(MenuChoice::ChangeLabel);
                    }
                });
            });

        match chosen {
            Some(MenuChoice::Move) => {
                self.context_menu = None;
                self.surface
                    .begin_move(index, local_pos, self.session.annotations());
            }
            Some(MenuChoice::Delete) => {
                self.context_menu = None;
                self.delete_box(index);
            }
            Some(MenuChoice::ChangeLabel) => {
                self.context_menu = None;
                self.open_label_prompt(PromptTarget::Relabel(index));
            }
            None => {
                let clicked_outside = ctx.input(|i| {
                    i.pointer.primary_pressed()
                        && i
                            .pointer
                            .interact_pos()
                            .map_or(true, |pos| !area.response.rect.contains(pos))
                });
                if clicked_outside {
                    self.context_menu = None;
                }
            }
        }
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };

        let window = |title: &str| {
            egui::Window::new(title.to_string())
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        };

        match dialog {
            Dialog::ConfirmSave => {
                let mut answer = None;
                window("Confirm Save").show(ctx, |ui| {
                    ui.label("Do you want to save current annotations?");
                    ui.horizontal(|ui| {
                        if ui.button("Yes").clicked() {
                            answer = Some(true);
                        }
                        if ui.button("No").clicked() {
                            answer = Some(false);
                        }
                    });
                });
                match answer {
                    Some(true) => {
                        if let Err(e) = self.session.save() {
                            self.dialog = Some(Dialog::Message {
                                title: "Save Failed".to_string(),
                                text: e.to_string(),
                            });
                        }
                    }
                    Some(false) => {}
                    None => self.dialog = Some(Dialog::ConfirmSave),
                }
            }
            Dialog::Label(mut prompt) => {
                let mut answer = None;
                let title = match prompt.target {
                    PromptTarget::NewBox(_) => "Select Label",
                    PromptTarget::Relabel(_) => "Edit Label",
                };
                window(title).show(ctx, |ui| {
                    let classes = self.session.classes();
                    if !classes.is_empty() {
                        egui::ComboBox::from_label("Class")
                            .selected_text(prompt.choice.as_str())
                            .show_ui(ui, |ui| {
                                for name in classes.names() {
                                    ui.selectable_value(&mut prompt.choice, name.clone(), name.as_str());
                                }
                            });
                    }
                    ui.horizontal(|ui| {
                        ui.label("New class:");
                        let hint = if classes.is_empty() { DEFAULT_LABEL } else { "" };
                        let response =
                            ui.add(egui::TextEdit::singleline(&mut prompt.new_name).hint_text(hint));
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            answer = Some(true);
                        }
                    });
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            answer = Some(true);
                        }
                        if ui.button("Cancel").clicked() {
                            answer = Some(false);
                        }
                    });
                });
                match answer {
                    Some(true) => {
                        let label = if prompt.new_name.trim().is_empty() {
                            prompt.choice.clone()
                        } else {
                            prompt.new_name.clone()
                        };
                        self.apply_label(prompt.target, &label);
                    }
                    Some(false) => {
                        if let PromptTarget::NewBox(_) = prompt.target {
                            log::info!("Discarded unlabeled box");
                        }
                    }
                    None => self.dialog = Some(Dialog::Label(prompt)),
                }
            }
            Dialog::Message { title, text } => {
                let mut open = true;
                window(title.as_str()).show(ctx, |ui| {
                    ui.label(text.as_str());
                    if ui.button("OK").clicked() {
                        open = false;
                    }
                });
                if open {
                    self.dialog = Some(Dialog::Message { title, text });
                }
            }
            Dialog::About => {
                let mut open = true;
                window("About").show(ctx, |ui| {
                    ui.heading("YOLABEL");
                    ui.label("Bounding-box label editor for YOLO datasets");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    if ui.button("OK").clicked() {
                        open = false;
                    }
                });
                if open {
                    self.dialog = Some(Dialog::About);
                }
            }
        }
    }
}

impl eframe::App for LabelerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Decided before any widget runs so a click that closes a popup
        // never reaches the canvas in the same frame.
        let canvas_input = self.dialog.is_none() && self.context_menu.is_none();
        let panels_enabled = self.dialog.is_none();

        self.show_menu_bar(ctx);

        // Navigation bar
        let nav_action = egui::TopBottomPanel::top("navigator")
            .show(ctx, |ui| {
                let position = self
                    .session
                    .current_index()
                    .map(|i| (i, self.session.images().len()));
                ui.add_enabled_ui(panels_enabled, |ui| {
                    navigator::show(ui, &mut self.navigator, self.session.image_size(), position)
                })
                .inner
            })
            .inner;

        match nav_action {
            navigator::NavigatorAction::OpenFolder => self.pick_folder(ctx),
            navigator::NavigatorAction::Prev => {
                let result = self.session.prev();
                self.handle_navigation(ctx, result);
            }
            navigator::NavigatorAction::Next => {
                let result = self.session.next();
                self.handle_navigation(ctx, result);
            }
            navigator::NavigatorAction::Search(query) => self.search(ctx, &query),
            navigator::NavigatorAction::None => {}
        }

        // Toolbar
        let dirty = self.session.is_dirty();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                ui.add_enabled_ui(panels_enabled, |ui| toolbar::show(ui, &mut self.surface, dirty))
                    .inner
            })
            .inner;
        if let toolbar::ToolbarAction::Save = toolbar_action {
            self.request_save();
        }

        self.show_status_panel(ctx);

        // Class and box lists (left side)
        let properties_action = egui::SidePanel::left("properties")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(panels_enabled, |ui| {
                    properties::show(ui, &self.session, self.surface.selected())
                })
                .inner
            })
            .inner;

        match properties_action {
            properties::PropertiesAction::SelectBox(index) => {
                self.surface.set_mode(ModeKind::Edit);
                self.surface.select(Some(index));
            }
            properties::PropertiesAction::DeleteBox(index) => self.delete_box(index),
            properties::PropertiesAction::None => {}
        }

        self.handle_keyboard(ctx);

        // Main canvas (center)
        let output = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    &mut self.surface,
                    self.session.annotations(),
                    self.texture.as_ref(),
                    canvas_input,
                )
            })
            .inner;

        for event in output.events {
            self.handle_surface_event(event, output.pointer);
        }

        self.show_context_menu(ctx);
        self.show_dialog(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_boxes() -> (tempfile::TempDir, LabelerApp) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("classes.txt"), "cat\n").unwrap();
        image::RgbImage::new(100, 100).save(dir.path().join("a.png")).unwrap();
        std::fs::write(
            dir.path().join("a.txt"),
            "0 0.2 0.2 0.2 0.2\n0 0.7 0.7 0.2 0.2\n",
        )
        .unwrap();

        let ctx = egui::Context::default();
        let mut app = LabelerApp::new(&ctx, dir.path().join("config_path.json"));
        app.open_folder(&ctx, dir.path());
        (dir, app)
    }

    #[test]
    fn test_delete_closes_context_menu() {
        let (_dir, mut app) = app_with_boxes();
        assert_eq!(app.session.annotations().len(), 2);
        app.context_menu = Some(ContextMenu {
            index: 0,
            screen_pos: egui::pos2(10.0, 10.0),
            local_pos: Point::new(10.0, 10.0),
        });

        app.delete_box(0);
        assert!(app.context_menu.is_none());
        assert_eq!(app.session.annotations().len(), 1);
        assert!((app.session.annotations().boxes()[0].rect.x - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_relabel_of_deleted_box_is_ignored() {
        let (dir, mut app) = app_with_boxes();
        app.delete_box(1);
        app.apply_label(PromptTarget::Relabel(1), "dog");
        assert!(app.dialog.is_none());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("classes.txt")).unwrap(),
            "cat\n"
        );
    }
}
