// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Path normalization for docroot lookups.
//!
//! A request path yields an ordered sequence of candidate docroot-relative
//! paths: the unmodified path first, then (when a locale is active and not
//! ignored) the locale-prefix-stripped variant, then the variant with the
//! host-appended trailing slash removed as well. The resolver tries each
//! candidate in order and stops at the first file it finds.

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeFlags {
    pub ignore_locale_prefix: bool,
    pub strip_appended_slash: bool,
}

pub fn candidate_paths(
    original_path: &str,
    locale: Option<&str>,
    flags: NormalizeFlags,
) -> Vec<String> {
    let original_path = original_path.trim();
    let mut candidates = vec![strip_leading_slash(original_path).to_string()];

    if flags.ignore_locale_prefix {
        return candidates;
    }

    let Some(locale) = locale else {
        return candidates;
    };

    let prefix = format!("/{}/", locale);
    if !original_path.starts_with(&prefix) {
        return candidates;
    }

    candidates.push(original_path[prefix.len()..].to_string());

    // The host may have appended a slash after routing (e.g. /en/x.json ->
    // /en/x.json/); try the locale-stripped path without it as a last resort.
    if flags.strip_appended_slash && original_path.ends_with('/') {
        candidates.push(original_path[prefix.len()..original_path.len() - 1].to_string());
    }

    candidates
}

fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Resolves the locale active for a request from the configured locale list
/// and the Accept-Language header. Absent when no locales are configured.
pub fn active_locale(accept_language: Option<&str>, locales: &[String]) -> Option<String> {
    if locales.is_empty() {
        return None;
    }

    if let Some(header) = accept_language {
        for range in header.split(',') {
            let tag = range.split(';').next().unwrap_or("").trim();
            let primary = tag.split('-').next().unwrap_or("").to_ascii_lowercase();
            if locales.iter().any(|locale| locale == &primary) {
                return Some(primary);
            }
        }
    }

    locales.first().cloned()
}
