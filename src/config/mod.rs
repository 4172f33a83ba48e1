// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Configuration module for aiter-client
//!
//! Handles loading, saving, and managing persisted client state.

pub mod settings;

pub use settings::*;
