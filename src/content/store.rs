// This file is part of the product Docroot.
// SPDX-FileCopyrightText: 2025-2026 Docroot Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! YAML-file-backed store for editable page content fragments.
//!
//! Records are unique on `(uri, element_id)` and written with an
//! atomic replace: temp file in the same directory, fsync, rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const MAX_TEMP_ATTEMPTS: u32 = 100;

#[derive(Debug)]
pub struct ContentStoreError {
    message: String,
}

impl ContentStoreError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ContentStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ContentStoreError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentRecord {
    pub uri: String,
    pub element_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

pub struct ContentStore {
    path: PathBuf,
    records: Mutex<Vec<ContentRecord>>,
}

impl ContentStore {
    pub fn open(path: PathBuf) -> Result<Self, ContentStoreError> {
        let records = read_records(&path)?;
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn list_by_uri(&self, uri: &str) -> Vec<ContentRecord> {
        let records = self.records.lock().expect("content store lock poisoned");
        records
            .iter()
            .filter(|record| record.uri == uri)
            .cloned()
            .collect()
    }

    /// Inserts or updates the record for `(uri, element_id)` and persists
    /// the store. Existing records keep their creation timestamp.
    pub fn upsert(
        &self,
        uri: &str,
        element_id: Option<&str>,
        content: &str,
    ) -> Result<ContentRecord, ContentStoreError> {
        let mut records = self.records.lock().expect("content store lock poisoned");
        let now = Utc::now();

        let record = match records
            .iter_mut()
            .find(|record| record.uri == uri && record.element_id.as_deref() == element_id)
        {
            Some(existing) => {
                existing.content = content.to_string();
                existing.modified_at = now;
                existing.clone()
            }
            None => {
                let record = ContentRecord {
                    uri: uri.to_string(),
                    element_id: element_id.map(str::to_string),
                    content: content.to_string(),
                    created_at: now,
                    modified_at: now,
                };
                records.push(record.clone());
                record
            }
        };

        write_records(&self.path, &records)?;
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("content store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_records(path: &Path) -> Result<Vec<ContentRecord>, ContentStoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .map_err(|err| ContentStoreError::new(format!("Failed to read content file: {}", err)))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(&content)
        .map_err(|err| ContentStoreError::new(format!("Failed to parse content file: {}", err)))
}

fn write_records(path: &Path, records: &[ContentRecord]) -> Result<(), ContentStoreError> {
    let content = serde_yaml::to_string(records)
        .map_err(|err| ContentStoreError::new(format!("Failed to serialize content: {}", err)))?;
    let parent = path
        .parent()
        .ok_or_else(|| ContentStoreError::new("Content file path has no parent directory"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| ContentStoreError::new("Content file path has no file name"))?;
    let (mut file, temp_path) = create_temp_file(parent, file_name)?;

    if let Err(err) = file.write_all(content.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(ContentStoreError::new(format!(
            "Failed to write content temp file: {}",
            err
        )));
    }
    if let Err(err) = file.sync_all() {
        let _ = fs::remove_file(&temp_path);
        return Err(ContentStoreError::new(format!(
            "Failed to sync content temp file: {}",
            err
        )));
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ContentStoreError::new(format!(
            "Failed to replace content file: {}",
            err
        )));
    }

    Ok(())
}

fn create_temp_file(
    parent: &Path,
    file_name: &std::ffi::OsStr,
) -> Result<(fs::File, PathBuf), ContentStoreError> {
    let file_name = file_name
        .to_str()
        .ok_or_else(|| ContentStoreError::new("Content file name is not valid UTF-8"))?;
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_name = format!(".{}.tmp.{}.{}", file_name, std::process::id(), attempt);
        let temp_path = parent.join(temp_name);
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path);
        match file {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(ContentStoreError::new(format!(
                    "Failed to create temp content file: {}",
                    err
                )));
            }
        }
    }
    Err(ContentStoreError::new(
        "Failed to create temp content file after multiple attempts",
    ))
}
