// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! YOLO label file reading and writing.
//!
//! One file per image (`<stem>.txt`), one box per line:
//! `class_id center_x center_y width height`, all but the class normalized
//! to the image dimensions. Bad lines are skipped with a warning so one
//! broken entry never hides the rest of the file.

use super::error::{LabelerError, Result};
use crate::models::annotation::BoundingBox;
use crate::models::class_list::ClassList;
use crate::util::geometry::{denormalize_rect, normalize_rect, YoloBox};
use std::fmt;
use std::path::{Path, PathBuf};

/// A skipped line of a label file.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelWarning {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LabelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Boxes read from a label file plus the lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLabels {
    pub boxes: Vec<BoundingBox>,
    pub warnings: Vec<LabelWarning>,
}

/// The label file that belongs to an image.
pub fn label_path_for(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
}

fn parse_class_id(token: &str) -> Option<i64> {
    if let Ok(id) = token.parse::<i64>() {
        return Some(id);
    }
    // Some exporters write the class as a float ("0.0").
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        _ => None,
    }
}

fn parse_line(line: &str, classes: &ClassList, image_size: (u32, u32)) -> std::result::Result<BoundingBox, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 5 {
        return Err(format!("malformed line (expected 5 values, got {}): {}", tokens.len(), line.trim()));
    }

    let class_id = parse_class_id(tokens[0])
        .ok_or_else(|| format!("malformed class id '{}'", tokens[0]))?;

    let mut values = [0.0f64; 4];
    for (value, token) in values.iter_mut().zip(&tokens[1..]) {
        let v = token
            .parse::<f64>()
            .map_err(|_| format!("malformed value '{}'", token))?;
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            return Err(format!("value {} outside [0, 1]", token));
        }
        *value = v;
    }

    let label = usize::try_from(class_id)
        .ok()
        .and_then(|id| classes.get(id))
        .ok_or_else(|| format!("invalid class ID {} ({} classes known)", class_id, classes.len()))?;

    let yolo = YoloBox {
        cx: values[0],
        cy: values[1],
        width: values[2],
        height: values[3],
    };
    let (width, height) = image_size;
    Ok(BoundingBox::new(denormalize_rect(&yolo, width, height), label))
}

/// Parse label file content against the class list and image size.
pub fn parse_labels(content: &str, classes: &ClassList, image_size: (u32, u32)) -> ParsedLabels {
    let mut parsed = ParsedLabels::default();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, classes, image_size) {
            Ok(bbox) => parsed.boxes.push(bbox),
            Err(message) => parsed.warnings.push(LabelWarning { line: idx + 1, message }),
        }
    }
    parsed
}

/// Read an image's label file. `Ok(None)` means there is no file yet.
pub fn read_labels(path: &Path, classes: &ClassList, image_size: (u32, u32)) -> Result<Option<ParsedLabels>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(parse_labels(&content, classes, image_size))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LabelerError::io(path, e)),
    }
}

/// Render boxes as label file content.
///
/// Fails without producing anything if any label is missing from `classes`.
pub fn format_labels(boxes: &[BoundingBox], classes: &ClassList, image_size: (u32, u32)) -> Result<String> {
    let (width, height) = image_size;
    let mut out = String::new();
    for bbox in boxes {
        let class_id = classes
            .index_of(&bbox.label)
            .ok_or_else(|| LabelerError::UnknownClass {
                label: bbox.label.clone(),
            })?;
        let yolo = normalize_rect(&bbox.rect, width, height);
        out.push_str(&format!(
            "{} {:.6} {:.6} {:.6} {:.6}\n",
            class_id, yolo.cx, yolo.cy, yolo.width, yolo.height
        ));
    }
    Ok(out)
}

/// Write boxes to a label file, replacing its content.
pub fn write_labels(path: &Path, boxes: &[BoundingBox], classes: &ClassList, image_size: (u32, u32)) -> Result<()> {
    let content = format_labels(boxes, classes, image_size)?;
    std::fs::write(path, content).map_err(|e| LabelerError::io(path, e))?;
    Ok(())
}
