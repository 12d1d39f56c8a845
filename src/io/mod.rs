// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, label files, class lists and configuration.

pub mod classes;
pub mod config;
pub mod error;
pub mod labels;
pub mod media;
