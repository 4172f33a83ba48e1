// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use serde_json::{Map, Value};

/// Flat keys written by older front-ends, mapped to their nested location.
const LEGACY_KEYS: &[(&str, &[&str])] = &[
    ("aiter-base-url", &["remote", "url"]),
    ("aiter-token", &["remote", "token"]),
    ("aiter-lang", &["language"]),
];

/// Move legacy flat keys into the current layout. Existing nested values win.
pub(super) fn migrate_on_load(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };

    for (legacy, path) in LEGACY_KEYS {
        let Some(legacy_value) = map.remove(*legacy) else {
            continue;
        };
        if legacy_value.as_str().is_some_and(|s| s.trim().is_empty()) {
            continue;
        }
        insert_if_absent(&mut map, path, legacy_value);
    }

    Value::Object(map)
}

fn insert_if_absent(map: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            if map.get(*last).is_none_or(Value::is_null) {
                map.insert(last.to_string(), value);
            }
        }
        [head, rest @ ..] => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_if_absent(child, rest, value);
            }
        }
    }
}

/// Deep-merge two JSON values.
/// `base` is existing file content, `overlay` is serialized current struct.
/// Overlay values take priority.
pub(super) fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = if let Some(base_val) = base_map.remove(&key) {
                    deep_merge(base_val, overlay_val)
                } else {
                    overlay_val
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_base, overlay) => overlay,
    }
}
