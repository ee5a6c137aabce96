//! Session-scoped form store.
//!
//! Every wizard step writes its values here. The store only ever grows:
//! `set` replaces the value under a key (last write wins) and nothing is
//! removed for the lifetime of the session.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue, json};
use tracing::debug;

use crate::errors::UploadError;

/// Ordered snapshot of all committed values.
pub type FormData = BTreeMap<String, FormValue>;

/// A file uploaded through a wizard field, held fully in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    Int(i64),
    Float(f64),
    /// Selected option of a single-choice field.
    Choice(String),
    Blob(Upload),
}

impl FormValue {
    /// Read an upload from disk into memory.
    ///
    /// `limit` is the caller's size cap in bytes; the store itself has none.
    pub fn read_upload(path: &Path, limit: Option<u64>) -> Result<Self, UploadError> {
        let read_err = |source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        };
        if let Some(limit) = limit {
            let size = std::fs::metadata(path).map_err(read_err)?.len();
            if size > limit {
                return Err(UploadError::TooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit,
                });
            }
        }
        let bytes = std::fs::read(path).map_err(read_err)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        debug!(file = %file_name, len = bytes.len(), "upload read into memory");
        Ok(FormValue::Blob(Upload { file_name, bytes }))
    }

    /// Text used when the value is substituted into a document or shown in a form.
    pub fn display_value(&self) -> String {
        match self {
            FormValue::Text(s) | FormValue::Choice(s) => s.clone(),
            FormValue::Int(n) => n.to_string(),
            FormValue::Float(v) => v.to_string(),
            FormValue::Blob(upload) => {
                format!("{} ({} bytes)", upload.file_name, upload.bytes.len())
            }
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            FormValue::Text(s) | FormValue::Choice(s) => JsonValue::String(s.clone()),
            FormValue::Int(n) => json!(n),
            FormValue::Float(v) => json!(v),
            FormValue::Blob(upload) => json!({
                "file_name": upload.file_name,
                "size_bytes": upload.bytes.len(),
            }),
        }
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_value())
    }
}

#[derive(Debug, Default, Clone)]
pub struct FormStore {
    values: FormData,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: FormValue) {
        let key = key.into();
        debug!(%key, "form value committed");
        self.values.insert(key, value);
    }

    /// `None` means the step owning `key` has not been completed yet.
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Text or selected choice under `key`.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(FormValue::Text(s)) | Some(FormValue::Choice(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(FormValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Floats, with integers widened.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(FormValue::Float(v)) => Some(*v),
            Some(FormValue::Int(n)) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries whose key starts with `prefix`, in key order.
    pub fn keys_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a FormValue)> + 'a {
        self.values
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
    }

    /// Copy of everything committed so far.
    pub fn snapshot(&self) -> FormData {
        self.values.clone()
    }

    /// Pretty key -> value JSON view of the store (uploads summarised).
    pub fn dump(&self) -> String {
        let map: JsonMap<String, JsonValue> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::to_string_pretty(&JsonValue::Object(map)).unwrap_or_else(|_| "{}".into())
    }
}
