// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing images, labels, classes or config.
#[derive(Error, Debug)]
pub enum LabelerError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A box carries a label that is not in the class list.
    #[error("Label '{label}' is not in the class list")]
    UnknownClass { label: String },

    #[error("No image is loaded")]
    NoImageLoaded,
}

impl LabelerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LabelerError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LabelerError>;
