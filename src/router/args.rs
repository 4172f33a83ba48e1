// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Call arguments and their per-transport shapes

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::action::{ActionDescriptor, ParamKind};

/// File content attached to a call (document learning)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub async fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { filename, bytes })
    }
}

/// One argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Value(Value),
    File(FilePart),
}

/// Arguments keyed by logical parameter name
///
/// Absent parameters are simply not present; they are never sent as null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    entries: BTreeMap<String, ArgValue>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value argument.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a value argument only when present.
    pub fn with_opt<T: Into<Value>>(mut self, name: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    /// Attach a file argument.
    pub fn with_file(mut self, name: &str, file: FilePart) -> Self {
        self.entries.insert(name.to_string(), ArgValue::File(file));
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.entries
            .insert(name.to_string(), ArgValue::Value(value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries.get(name)
    }

    /// String value of an argument, if it is one.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(ArgValue::Value(Value::String(s))) => Some(s),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Build from a JSON object keyed by logical names (CLI and tests).
    pub fn from_json(value: Value) -> Self {
        let mut args = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                if !value.is_null() {
                    args.entries.insert(key, ArgValue::Value(value));
                }
            }
        }
        args
    }

    fn warn_unknown(&self, descriptor: &ActionDescriptor) {
        for key in self.entries.keys() {
            if descriptor.param(key).is_none() {
                tracing::debug!(
                    "Dropping unknown argument '{}' for action {}",
                    key,
                    descriptor.name
                );
            }
        }
    }

    /// Arguments for the local host, keyed by local (camelCase) names.
    /// Files become a byte array plus a file name field.
    pub fn to_local(&self, descriptor: &ActionDescriptor) -> Value {
        self.warn_unknown(descriptor);
        let mut map = Map::new();
        for param in descriptor.params {
            match (self.entries.get(param.name), param.kind) {
                (None, _) => {}
                (Some(ArgValue::Value(value)), _) => {
                    map.insert(param.local.to_string(), value.clone());
                }
                (Some(ArgValue::File(file)), ParamKind::File { local_name_field, .. }) => {
                    map.insert(param.local.to_string(), Value::from(file.bytes.clone()));
                    map.insert(
                        local_name_field.to_string(),
                        Value::String(file.filename.clone()),
                    );
                }
                (Some(ArgValue::File(_)), ParamKind::Value) => {
                    tracing::debug!(
                        "Ignoring file given for value parameter '{}' of {}",
                        param.name,
                        descriptor.name
                    );
                }
            }
        }
        Value::Object(map)
    }

    /// JSON body (or query) for the remote server, keyed by remote (snake_case) names.
    pub fn to_remote(&self, descriptor: &ActionDescriptor) -> Map<String, Value> {
        self.warn_unknown(descriptor);
        let mut map = Map::new();
        for param in descriptor.params {
            if let Some(ArgValue::Value(value)) = self.entries.get(param.name) {
                map.insert(param.remote.to_string(), value.clone());
            }
        }
        map
    }

    /// Multipart form for the remote server. Every declared field is sent;
    /// missing text fields are sent empty.
    pub fn to_form(&self, descriptor: &ActionDescriptor) -> FormBody {
        self.warn_unknown(descriptor);
        let mut form = FormBody::default();
        for param in descriptor.params {
            match (self.entries.get(param.name), param.kind) {
                (Some(ArgValue::File(file)), ParamKind::File { remote_name_field, .. }) => {
                    form.files.push((param.remote.to_string(), file.clone()));
                    form.texts
                        .push((remote_name_field.to_string(), file.filename.clone()));
                }
                (None, ParamKind::File { .. }) => {}
                (value, _) => {
                    let text = match value {
                        Some(ArgValue::Value(Value::String(s))) => s.clone(),
                        Some(ArgValue::Value(Value::Null)) | None => String::new(),
                        Some(ArgValue::Value(other)) => other.to_string(),
                        Some(ArgValue::File(file)) => file.filename.clone(),
                    };
                    form.texts.push((param.remote.to_string(), text));
                }
            }
        }
        form
    }
}

/// Multipart form contents, in field order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBody {
    pub texts: Vec<(String, String)>,
    pub files: Vec<(String, FilePart)>,
}
