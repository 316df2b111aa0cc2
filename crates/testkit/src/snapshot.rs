//! Canonical JSON snapshots.
//!
//! Values are serialized as pretty JSON with object keys sorted, so two runs
//! that produce equal state produce byte-identical text. Golden files are
//! compared by default; set `WILDGROVE_UPDATE_SNAPSHOTS=1` to rewrite them.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "WILDGROVE_UPDATE_SNAPSHOTS";

/// Serialize `value` as canonical pretty JSON (sorted keys, trailing newline).
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let mut s = serde_json::to_string_pretty(&canonicalize(value))
        .context("Failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

/// Assert that `value` matches the golden file at `path`, or rewrite it when
/// updates are enabled.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if updates_enabled() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create snapshot directory {}", parent.display())
            })?;
        }
        return fs::write(path, &actual)
            .with_context(|| format!("Failed to write snapshot {}", path.display()));
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {}=1 to create it)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;
    if expected != actual {
        anyhow::bail!(
            "Snapshot mismatch at {} (run with {}=1 to update)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        );
    }
    Ok(())
}

/// JSON pointer of the first place where `a` and `b` differ, if any.
pub fn first_difference<A: Serialize, B: Serialize>(a: &A, b: &B) -> Result<Option<String>> {
    let a = serde_json::to_value(a).context("Failed to serialize left value")?;
    let b = serde_json::to_value(b).context("Failed to serialize right value")?;
    Ok(diff_at(&a, &b, String::new()))
}

fn diff_at(a: &Value, b: &Value, pointer: String) -> Option<String> {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            let mut keys: Vec<&String> = left.keys().chain(right.keys()).collect();
            keys.sort();
            keys.dedup();
            keys.into_iter().find_map(|key| {
                let child = format!("{pointer}/{key}");
                match (left.get(key), right.get(key)) {
                    (Some(l), Some(r)) => diff_at(l, r, child),
                    _ => Some(child),
                }
            })
        }
        (Value::Array(left), Value::Array(right)) => {
            if left.len() != right.len() {
                return Some(pointer);
            }
            left.iter()
                .zip(right)
                .enumerate()
                .find_map(|(i, (l, r))| diff_at(l, r, format!("{pointer}/{i}")))
        }
        _ if a == b => None,
        _ => Some(pointer),
    }
}

fn updates_enabled() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes") | Ok("YES")
    )
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_keys() {
        let text = canonical_json(&json!({"b": 1, "a": {"d": 2, "c": 3}})).unwrap();
        let a = text.find("\"a\"").unwrap();
        let b = text.find("\"b\"").unwrap();
        assert!(a < b);
        assert!(text.find("\"c\"").unwrap() < text.find("\"d\"").unwrap());
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn first_difference_points_at_divergence() {
        let a = json!({"chunks": [{"moisture": 1.0}, {"moisture": 2.0}]});
        let b = json!({"chunks": [{"moisture": 1.0}, {"moisture": 2.5}]});
        assert_eq!(
            first_difference(&a, &b).unwrap().as_deref(),
            Some("/chunks/1/moisture")
        );
        assert_eq!(first_difference(&a, &a).unwrap(), None);
    }

    #[test]
    fn missing_snapshot_is_an_error() {
        let path = std::env::temp_dir().join("wildgrove-no-such-snapshot.json");
        if updates_enabled() {
            return;
        }
        assert!(assert_json_snapshot(&path, &json!({"x": 1})).is_err());
    }
}
