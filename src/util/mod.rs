// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod mime_helper;
pub mod test_fixtures;

pub use mime_helper::detect_mime_type;
