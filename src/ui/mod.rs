// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the label editor.

pub mod canvas;
pub mod navigator;
pub mod properties;
pub mod toolbar;
