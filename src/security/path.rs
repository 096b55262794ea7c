// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use log::warn;
use std::path::{Path, PathBuf};

/// Validates that a file path stays within the docroot after
/// canonicalization. Returns the canonical path if it does, None otherwise
/// (missing file, symlink escape, traversal).
pub fn canonical_path_checks(file_path: &Path, root_dir: &Path) -> Option<PathBuf> {
    let canonical_file_path = file_path.canonicalize().ok()?;
    let canonical_root = root_dir.canonicalize().ok()?;

    match canonical_file_path.strip_prefix(&canonical_root) {
        Ok(remaining_path) => {
            let remaining_str = remaining_path.to_string_lossy();
            if remaining_str.contains("..") || Path::new(remaining_str.as_ref()).is_absolute() {
                warn!(
                    "Suspicious remaining path after strip_prefix: {}",
                    remaining_str
                );
                return None;
            }
            Some(canonical_file_path)
        }
        Err(_) => {
            warn!(
                "Path traversal attempt - file outside docroot: {:?} not in {:?}",
                canonical_file_path, canonical_root
            );
            None
        }
    }
}
