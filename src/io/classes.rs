// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! `classes.txt` reading and appending.

use super::error::{LabelerError, Result};
use crate::models::class_list::ClassList;
use std::io::Write;
use std::path::Path;

/// File name of the class list inside an image folder.
pub const CLASSES_FILE: &str = "classes.txt";

/// Read the class list; a missing file is an empty list.
pub fn read_classes(path: &Path) -> Result<ClassList> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(ClassList::from_names(content.lines())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No class list at {}", path.display());
            Ok(ClassList::new())
        }
        Err(e) => Err(LabelerError::io(path, e)),
    }
}

/// Append one class name as a new line, creating the file if needed.
pub fn append_class(path: &Path, name: &str) -> Result<()> {
    let needs_newline = match std::fs::read_to_string(path) {
        Ok(content) => !content.is_empty() && !content.ends_with('\n'),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(LabelerError::io(path, e)),
    };

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LabelerError::io(path, e))?;
    if needs_newline {
        writeln!(file).map_err(|e| LabelerError::io(path, e))?;
    }
    writeln!(file, "{}", name).map_err(|e| LabelerError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let classes = read_classes(&dir.path().join(CLASSES_FILE)).unwrap();
        assert!(classes.is_empty());
    }

    #[test]
    fn test_append_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CLASSES_FILE);
        std::fs::write(&path, "cat\n\ndog\n").unwrap();

        append_class(&path, "bird").unwrap();
        let classes = read_classes(&path).unwrap();
        assert_eq!(classes.names(), ["cat", "dog", "bird"]);
    }

    #[test]
    fn test_append_after_unterminated_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CLASSES_FILE);
        std::fs::write(&path, "cat").unwrap();

        append_class(&path, "dog").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "cat\ndog\n");
    }
}
