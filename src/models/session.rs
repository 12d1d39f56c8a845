// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session state management.
//!
//! This module manages the image folder being annotated: the ordered image
//! list, the current image and its boxes, the class list, and the dirty
//! flag. All box mutations go through [`Session::apply`], which keeps the
//! dirty flag honest.

use super::annotation::{AnnotationEdit, AnnotationSet, BoundingBox};
use super::class_list::{ClassList, DEFAULT_LABEL};
use super::status::StatusLog;
use super::surface::PendingBox;
use crate::io::classes::{self, CLASSES_FILE};
use crate::io::config::AppConfig;
use crate::io::error::{LabelerError, Result};
use crate::io::labels;
use crate::io::media::{self, LoadedImage};
use crate::util::geometry::normalize_rect;
use std::path::{Path, PathBuf};

/// Outcome of a navigation request.
pub enum Navigation {
    /// Already at the requested end, or nothing to navigate.
    Stayed,
    /// A new image is current. `None` when it could not be decoded.
    Moved(Option<LoadedImage>),
}

/// Outcome of a search by file name.
pub enum SearchOutcome {
    /// Empty query or no images: nothing happened.
    Ignored,
    NotFound,
    Found {
        name: String,
        image: Option<LoadedImage>,
    },
}

pub struct Session {
    config_path: PathBuf,
    folder: Option<PathBuf>,
    images: Vec<PathBuf>,
    current: usize,
    classes: ClassList,
    annotations: AnnotationSet,
    image_size: Option<(u32, u32)>,
    dirty: bool,
    status: StatusLog,
}

impl Session {
    /// Create an empty session persisting the chosen folder to `config_path`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            folder: None,
            images: Vec::new(),
            current: 0,
            classes: ClassList::new(),
            annotations: AnnotationSet::new(),
            image_size: None,
            dirty: false,
            status: StatusLog::default(),
        }
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn current_index(&self) -> Option<usize> {
        (self.current < self.images.len()).then_some(self.current)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.images.get(self.current).map(PathBuf::as_path)
    }

    /// Base name of the current image.
    pub fn current_name(&self) -> Option<String> {
        self.current_path().map(file_name)
    }

    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Pixel size of the current image, if it decoded.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusLog {
        &mut self.status
    }

    /// Labels of current boxes that are not in the class list.
    pub fn unknown_labels(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = Vec::new();
        for bbox in self.annotations.boxes() {
            let label = bbox.label.as_str();
            if !self.classes.contains(label) && !unknown.contains(&label) {
                unknown.push(label);
            }
        }
        unknown
    }

    /// The single entry point for box mutations. Marks the session dirty.
    pub fn apply(&mut self, edit: AnnotationEdit) -> bool {
        let edit = self.keep_inside_image(edit);
        let applied = self.annotations.apply(edit);
        if applied {
            self.dirty = true;
        }
        applied
    }

    /// Clip new boxes and moves to the current image so saved values stay
    /// within `[0, 1]`.
    fn keep_inside_image(&self, edit: AnnotationEdit) -> AnnotationEdit {
        let Some((width, height)) = self.image_size else {
            return edit;
        };
        let (width, height) = (width as f64, height as f64);
        match edit {
            AnnotationEdit::Append(mut bbox) => {
                bbox.rect = bbox.rect.clipped_to(width, height);
                AnnotationEdit::Append(bbox)
            }
            AnnotationEdit::Move { index, top_left } => {
                let top_left = match self.annotations.get(index) {
                    Some(bbox) => bbox.rect.clamp_top_left(top_left, width, height),
                    None => top_left,
                };
                AnnotationEdit::Move { index, top_left }
            }
            other => other,
        }
    }

    /// Switch to a folder: list its images, load its class list, remember
    /// it in the config, and load the first image.
    pub fn open_folder(&mut self, dir: &Path) -> Result<Option<LoadedImage>> {
        self.save_if_dirty()?;

        let images = media::list_images(dir)?;
        let classes = classes::read_classes(&dir.join(CLASSES_FILE))?;
        log::info!(
            "Opened {}: {} images, {} classes",
            dir.display(),
            images.len(),
            classes.len()
        );

        self.folder = Some(dir.to_path_buf());
        self.images = images;
        self.classes = classes;
        self.current = 0;

        let config = AppConfig {
            last_open_dir: Some(dir.to_path_buf()),
        };
        if let Err(e) = config.save(&self.config_path) {
            log::warn!("Failed to save path: {}", e);
        }

        if self.images.is_empty() {
            self.reset_image();
            self.status.clear();
            self.status.info(format!("No images found in {}", dir.display()));
            return Ok(None);
        }
        Ok(self.load_current())
    }

    fn reset_image(&mut self) {
        self.annotations.clear();
        self.image_size = None;
        self.dirty = false;
    }

    /// Decode the current image and read its label file.
    ///
    /// Failures are reported in the status log; the session stays usable.
    pub fn load_current(&mut self) -> Option<LoadedImage> {
        self.status.clear();
        self.reset_image();
        let path = self.current_path()?.to_path_buf();

        let image = match media::load_image(&path) {
            Ok(image) => image,
            Err(e) => {
                self.status.error(format!("Error loading image: {}", e));
                return None;
            }
        };
        let size = image.size();
        self.image_size = Some(size);
        log::info!("Loaded image: {} ({}x{})", path.display(), size.0, size.1);

        let label_path = labels::label_path_for(&path);
        match labels::read_labels(&label_path, &self.classes, size) {
            Ok(Some(parsed)) => {
                for warning in &parsed.warnings {
                    self.status
                        .warn(format!("Warning: {} in {}", warning, label_path.display()));
                }
                for bbox in &parsed.boxes {
                    self.status.info(format!(
                        "Loaded annotation: class={}, rect=({:.1}, {:.1}, {:.1}, {:.1})",
                        bbox.label, bbox.rect.x, bbox.rect.y, bbox.rect.width, bbox.rect.height
                    ));
                }
                self.annotations = AnnotationSet::from_boxes(parsed.boxes);
            }
            Ok(None) => {
                self.status
                    .info(format!("No annotation file found at {}", label_path.display()));
            }
            Err(e) => {
                self.status.error(format!("Error reading annotations: {}", e));
            }
        }

        Some(image)
    }

    /// Write the current boxes to the image's label file.
    ///
    /// The dirty flag is cleared only on success.
    pub fn save(&mut self) -> Result<()> {
        let (path, size) = match (self.current_path(), self.image_size) {
            (Some(path), Some(size)) => (path.to_path_buf(), size),
            _ => return Err(LabelerError::NoImageLoaded),
        };
        let label_path = labels::label_path_for(&path);

        if let Err(e) = labels::write_labels(&label_path, self.annotations.boxes(), &self.classes, size) {
            self.status.error(format!("Save failed: {}", e));
            return Err(e);
        }

        for bbox in self.annotations.boxes() {
            let yolo = normalize_rect(&bbox.rect, size.0, size.1);
            let class_id = self.classes.index_of(&bbox.label).unwrap_or_default();
            self.status.info(format!(
                "Saved: class={} (ID:{}) pixel=({:.1}, {:.1}, {:.1}, {:.1}) normalized=({:.6}, {:.6}, {:.6}, {:.6})",
                bbox.label,
                class_id,
                bbox.rect.x,
                bbox.rect.y,
                bbox.rect.width,
                bbox.rect.height,
                yolo.cx,
                yolo.cy,
                yolo.width,
                yolo.height
            ));
        }
        self.status.info(format!("Saved {} boxes to {}", self.annotations.len(), label_path.display()));
        self.dirty = false;
        Ok(())
    }

    /// Silent save used before leaving an image.
    pub fn save_if_dirty(&mut self) -> Result<()> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    /// Make image `index` current, saving pending changes first.
    ///
    /// If that save fails the current image is kept and the error returned.
    pub fn go_to(&mut self, index: usize) -> Result<Navigation> {
        if index >= self.images.len() {
            return Ok(Navigation::Stayed);
        }
        self.save_if_dirty()?;
        self.current = index;
        Ok(Navigation::Moved(self.load_current()))
    }

    pub fn next(&mut self) -> Result<Navigation> {
        if self.current + 1 >= self.images.len() {
            return Ok(Navigation::Stayed);
        }
        self.go_to(self.current + 1)
    }

    pub fn prev(&mut self) -> Result<Navigation> {
        if self.current == 0 || self.images.is_empty() {
            return Ok(Navigation::Stayed);
        }
        self.go_to(self.current - 1)
    }

    /// First image whose base name contains `query`, ignoring case.
    pub fn find_image(&self, query: &str) -> Option<usize> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.images
            .iter()
            .position(|path| file_name(path).to_lowercase().contains(&needle))
    }

    /// Jump to the first image matching `query`.
    pub fn search(&mut self, query: &str) -> Result<SearchOutcome> {
        if query.trim().is_empty() || self.images.is_empty() {
            return Ok(SearchOutcome::Ignored);
        }
        let Some(index) = self.find_image(query) else {
            log::info!("No image matching '{}'", query.trim());
            return Ok(SearchOutcome::NotFound);
        };
        let image = match self.go_to(index)? {
            Navigation::Moved(image) => image,
            Navigation::Stayed => None,
        };
        Ok(SearchOutcome::Found {
            name: file_name(&self.images[index]),
            image,
        })
    }

    /// Make sure `label` is a known class, appending it to `classes.txt`
    /// if it is new. Returns the name actually used.
    fn ensure_class(&mut self, label: &str) -> Result<String> {
        let label = match label.trim() {
            "" => DEFAULT_LABEL,
            trimmed => trimmed,
        };
        if !self.classes.contains(label) {
            let folder = self.folder.as_deref().ok_or(LabelerError::NoImageLoaded)?;
            classes::append_class(&folder.join(CLASSES_FILE), label)?;
            self.classes.push(label);
            self.status.info(format!("Added class '{}'", label));
        }
        Ok(label.to_string())
    }

    /// Label a finished Create drag and add it to the current image.
    pub fn add_box(&mut self, pending: PendingBox, label: &str) -> Result<()> {
        let label = self.ensure_class(label)?;
        self.apply(AnnotationEdit::Append(BoundingBox::new(pending.rect, label)));
        Ok(())
    }

    /// Change the class of box `index`. Returns false, leaving the class
    /// list untouched, when there is no such box.
    pub fn relabel(&mut self, index: usize, label: &str) -> Result<bool> {
        if self.annotations.get(index).is_none() {
            return Ok(false);
        }
        let label = self.ensure_class(label)?;
        Ok(self.apply(AnnotationEdit::Relabel { index, label }))
    }

    pub fn delete(&mut self, index: usize) -> bool {
        self.apply(AnnotationEdit::Delete { index })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{PixelRect, Point};
    use crate::models::status::StatusLevel;
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
        image::RgbImage::new(width, height).save(dir.join(name)).unwrap();
    }

    fn folder(classes: &str) -> (TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CLASSES_FILE), classes).unwrap();
        let session = Session::new(dir.path().join("config_path.json"));
        (dir, session)
    }

    #[test]
    fn test_load_and_save_scenario() {
        let (dir, mut session) = folder("cat\n");
        write_image(dir.path(), "img.png", 800, 600);
        std::fs::write(dir.path().join("img.txt"), "0 0.5 0.5 0.25 0.25\n").unwrap();

        let image = session.open_folder(dir.path()).unwrap().unwrap();
        assert_eq!(image.size(), (800, 600));
        assert_eq!(
            session.annotations().boxes(),
            [BoundingBox::new(PixelRect::new(300.0, 225.0, 200.0, 150.0), "cat")]
        );
        assert!(!session.is_dirty());

        session.save().unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("img.txt")).unwrap(),
            "0 0.500000 0.500000 0.250000 0.250000\n"
        );
    }

    #[test]
    fn test_label_file_tolerance() {
        let (dir, mut session) = folder("cat\n");
        write_image(dir.path(), "img.png", 100, 100);
        std::fs::write(dir.path().join("img.txt"), "0 0.5 0.5 0.2 0.2\n0 0.5 0.5 0.2\n").unwrap();

        session.open_folder(dir.path()).unwrap();
        assert_eq!(session.annotations().len(), 1);
        assert_eq!(session.status().count(StatusLevel::Warning), 1);
    }

    #[test]
    fn test_open_folder_remembers_path() {
        let (dir, mut session) = folder("");
        session.open_folder(dir.path()).unwrap();
        let config = AppConfig::load(&dir.path().join("config_path.json"));
        assert_eq!(config.last_open_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_empty_folder_navigation_is_noop() {
        let (dir, mut session) = folder("cat\n");
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        assert!(session.open_folder(dir.path()).unwrap().is_none());
        assert!(session.images().is_empty());
        assert_eq!(session.current_index(), None);
        assert!(matches!(session.next().unwrap(), Navigation::Stayed));
        assert!(matches!(session.prev().unwrap(), Navigation::Stayed));
        assert!(matches!(session.search("a").unwrap(), SearchOutcome::Ignored));
        assert!(matches!(session.save(), Err(LabelerError::NoImageLoaded)));
    }

    #[test]
    fn test_edits_mark_dirty_and_navigation_saves_silently() {
        let (dir, mut session) = folder("cat\n");
        write_image(dir.path(), "a.png", 100, 50);
        write_image(dir.path(), "b.png", 100, 50);
        session.open_folder(dir.path()).unwrap();

        session
            .add_box(PendingBox { rect: PixelRect::new(10.0, 10.0, 20.0, 10.0) }, "cat")
            .unwrap();
        assert!(session.is_dirty());

        assert!(matches!(session.next().unwrap(), Navigation::Moved(Some(_))));
        assert_eq!(session.current_index(), Some(1));
        assert!(!session.is_dirty());
        assert!(session.annotations().is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "0 0.200000 0.300000 0.200000 0.200000\n"
        );

        assert!(matches!(session.next().unwrap(), Navigation::Stayed));
        assert!(matches!(session.prev().unwrap(), Navigation::Moved(Some(_))));
        assert_eq!(session.annotations().len(), 1);
    }

    #[test]
    fn test_failed_implicit_save_cancels_navigation() {
        let (dir, mut session) = folder("cat\n");
        write_image(dir.path(), "a.png", 100, 50);
        write_image(dir.path(), "b.png", 100, 50);
        session.open_folder(dir.path()).unwrap();

        session.apply(AnnotationEdit::Append(BoundingBox::new(
            PixelRect::new(0.0, 0.0, 5.0, 5.0),
            "ghost",
        )));
        assert_eq!(session.unknown_labels(), ["ghost"]);

        assert!(matches!(session.next(), Err(LabelerError::UnknownClass { .. })));
        assert_eq!(session.current_index(), Some(0));
        assert!(session.is_dirty());
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_move_and_delete_go_through_gateway() {
        let (dir, mut session) = folder("cat\n");
        write_image(dir.path(), "a.png", 100, 100);
        std::fs::write(dir.path().join("a.txt"), "0 0.5 0.5 0.2 0.2\n").unwrap();
        session.open_folder(dir.path()).unwrap();
        assert!(!session.is_dirty());

        assert!(session.apply(AnnotationEdit::Move {
            index: 0,
            top_left: Point::new(0.0, 0.0),
        }));
        assert!(session.is_dirty());
        session.save().unwrap();
        assert!(!session.is_dirty());

        assert!(!session.delete(5));
        assert!(!session.is_dirty());
        assert!(session.delete(0));
        assert!(session.is_dirty());
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_new_labels_are_appended_to_class_file() {
        let (dir, mut session) = folder("cat\n");
        write_image(dir.path(), "a.png", 100, 100);
        session.open_folder(dir.path()).unwrap();

        session
            .add_box(PendingBox { rect: PixelRect::new(0.0, 0.0, 10.0, 10.0) }, " dog ")
            .unwrap();
        session.relabel(0, "bird").unwrap();
        session
            .add_box(PendingBox { rect: PixelRect::new(0.0, 0.0, 10.0, 10.0) }, "")
            .unwrap();

        assert_eq!(session.classes().names(), ["cat", "dog", "bird", DEFAULT_LABEL]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(CLASSES_FILE)).unwrap(),
            "cat\ndog\nbird\nunlabeled\n"
        );
        assert_eq!(session.annotations().boxes()[0].label, "bird");
        assert_eq!(session.annotations().boxes()[1].label, DEFAULT_LABEL);
    }

    #[test]
    fn test_relabel_missing_box_leaves_classes_alone() {
        let (dir, mut session) = folder("cat\n");
        write_image(dir.path(), "a.png", 100, 100);
        session.open_folder(dir.path()).unwrap();

        assert!(!session.relabel(3, "fish").unwrap());
        assert!(!session.is_dirty());
        assert_eq!(session.classes().names(), ["cat"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(CLASSES_FILE)).unwrap(),
            "cat\n"
        );
    }

    #[test]
    fn test_box_past_image_edge_survives_reload() {
        let (dir, mut session) = folder("cat\n");
        write_image(dir.path(), "a.png", 800, 600);
        write_image(dir.path(), "b.png", 800, 600);
        session.open_folder(dir.path()).unwrap();

        session
            .add_box(PendingBox { rect: PixelRect::new(700.0, 10.0, 300.0, 50.0) }, "cat")
            .unwrap();
        session.next().unwrap();
        session.prev().unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "0 0.937500 0.058333 0.125000 0.083333\n"
        );
        assert_eq!(session.annotations().len(), 1);
        assert_eq!(session.status().count(StatusLevel::Warning), 0);
        let rect = session.annotations().boxes()[0].rect;
        assert!((rect.x - 700.0).abs() < 1e-3);
        assert!((rect.width - 100.0).abs() < 1e-3);

        assert!(session.apply(AnnotationEdit::Move {
            index: 0,
            top_left: Point::new(-40.0, 580.0),
        }));
        let rect = session.annotations().boxes()[0].rect;
        assert_eq!(rect.x, 0.0);
        assert!((rect.y + rect.height - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_search_by_name() {
        let (dir, mut session) = folder("cat\n");
        for name in ["IMG_001.png", "img_002.jpg", "other.png"] {
            write_image(dir.path(), name, 10, 10);
        }
        session.open_folder(dir.path()).unwrap();

        match session.search("  IMG_002 ").unwrap() {
            SearchOutcome::Found { name, image } => {
                assert_eq!(name, "img_002.jpg");
                assert!(image.is_some());
            }
            _ => panic!("expected a match"),
        }
        assert_eq!(session.current_index(), Some(1));

        assert!(matches!(session.search("missing").unwrap(), SearchOutcome::NotFound));
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.find_image("img"), Some(0));
    }

    #[test]
    fn test_decode_failure_keeps_session_usable() {
        let (dir, mut session) = folder("cat\n");
        std::fs::write(dir.path().join("a.png"), b"garbage").unwrap();
        std::fs::write(dir.path().join("a.txt"), "0 0.5 0.5 0.2 0.2\n").unwrap();
        write_image(dir.path(), "b.png", 20, 20);

        assert!(session.open_folder(dir.path()).unwrap().is_none());
        assert_eq!(session.image_size(), None);
        assert!(session.annotations().is_empty());
        assert_eq!(session.status().count(StatusLevel::Error), 1);

        assert!(matches!(session.next().unwrap(), Navigation::Moved(Some(_))));
        assert_eq!(session.image_size(), Some((20, 20)));
    }
}
