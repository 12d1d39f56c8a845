// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model and editor state, independent of the GUI toolkit.

pub mod annotation;
pub mod class_list;
pub mod session;
pub mod status;
pub mod surface;
