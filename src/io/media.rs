// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image folder listing and image loading.
//!
//! This module finds the images of a folder and decodes them into RGBA
//! pixels suitable for display in egui, applying the EXIF orientation tag.

use super::error::{LabelerError, Result};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::{Path, PathBuf};

/// Extensions (lowercase) recognized as annotatable images.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Check the file extension case-insensitively.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// List the images directly inside `dir`, sorted lexicographically.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| LabelerError::io(dir, e))?;
    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LabelerError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_image_file(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Rotation applied to undo the camera orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    /// Only the pure rotations are honored; mirrored orientations load as-is.
    fn from_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Rotate180 => Rotation::Clockwise180,
            Orientation::Rotate90 => Rotation::Clockwise90,
            Orientation::Rotate270 => Rotation::Clockwise270,
            _ => Rotation::None,
        }
    }

    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Rotation::None => image,
            Rotation::Clockwise90 => image.rotate90(),
            Rotation::Clockwise180 => image.rotate180(),
            Rotation::Clockwise270 => image.rotate270(),
        }
    }
}

/// Decoded image ready to upload as a texture.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major.
    pub pixels: Vec<u8>,
}

impl LoadedImage {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Decode an image, correcting for its EXIF orientation.
///
/// An unreadable orientation tag is logged and treated as upright.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let image_err = |source| LabelerError::Image {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| LabelerError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| LabelerError::io(path, e))?;
    let mut decoder = reader.into_decoder().map_err(image_err)?;

    let rotation = match decoder.orientation() {
        Ok(orientation) => Rotation::from_orientation(orientation),
        Err(e) => {
            log::warn!("EXIF read failed for {}: {}", path.display(), e);
            Rotation::None
        }
    };

    let image = DynamicImage::from_decoder(decoder).map_err(image_err)?;
    let rgba = rotation.apply(image).into_rgba8();

    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_matching_ignores_case() {
        assert!(is_image_file(Path::new("a/b/photo.JPG")));
        assert!(is_image_file(Path::new("photo.jpeg")));
        assert!(is_image_file(Path::new("photo.Png")));
        assert!(!is_image_file(Path::new("photo.txt")));
        assert!(!is_image_file(Path::new("photo.bmp")));
        assert!(!is_image_file(Path::new("png")));
    }

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "c.jpeg", "classes.txt", "a.txt", "notes.md"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let images = list_images(dir.path()).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.jpeg"]);
    }

    #[test]
    fn test_orientation_mapping() {
        assert_eq!(Rotation::from_orientation(Orientation::NoTransforms), Rotation::None);
        assert_eq!(Rotation::from_orientation(Orientation::Rotate90), Rotation::Clockwise90);
        assert_eq!(Rotation::from_orientation(Orientation::Rotate180), Rotation::Clockwise180);
        assert_eq!(Rotation::from_orientation(Orientation::Rotate270), Rotation::Clockwise270);
        assert_eq!(Rotation::from_orientation(Orientation::FlipHorizontal), Rotation::None);
    }

    #[test]
    fn test_exif_tags_map_to_rotations() {
        let rotation = |tag| Orientation::from_exif(tag).map(Rotation::from_orientation);
        assert_eq!(rotation(1), Some(Rotation::None));
        assert_eq!(rotation(3), Some(Rotation::Clockwise180));
        assert_eq!(rotation(6), Some(Rotation::Clockwise90));
        assert_eq!(rotation(8), Some(Rotation::Clockwise270));
        assert_eq!(rotation(2), Some(Rotation::None));
        assert_eq!(rotation(0), None);
    }

    #[test]
    fn test_quarter_rotation_swaps_dimensions() {
        let image = DynamicImage::new_rgb8(40, 10);
        let rotated = Rotation::Clockwise90.apply(image.clone());
        assert_eq!((rotated.width(), rotated.height()), (10, 40));
        let rotated = Rotation::Clockwise180.apply(image);
        assert_eq!((rotated.width(), rotated.height()), (40, 10));
    }

    #[test]
    fn test_load_image_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        image::RgbImage::new(32, 16).save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.size(), (32, 16));
        assert_eq!(loaded.pixels.len(), 32 * 16 * 4);
    }

    #[test]
    fn test_load_image_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(load_image(&path).is_err());
        assert!(load_image(&dir.path().join("missing.png")).is_err());
    }
}
