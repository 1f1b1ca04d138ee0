//! Failable accessors over schema-less webhook payloads.
//!
//! Webhook bodies are kept as a [`serde_json::Value`] tree rather than typed
//! structs, since handlers only ever read a handful of fields. A missing or
//! renamed field surfaces as a [`PayloadError`] naming the dotted path.

use serde_json::Value;
use thiserror::Error;

/// Error type for payload field access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// No value exists at the path.
    #[error("payload field not found: {path}")]
    Missing { path: String },

    /// A value exists but is not of the requested type.
    #[error("payload field {path} is not a {expected}")]
    WrongType { path: String, expected: &'static str },
}

/// Follows `path` from `root`.
///
/// Each segment indexes an object by key; a segment that parses as an integer
/// also indexes into arrays.
///
/// # Examples
///
/// ```
/// use ideal_octo_garbanzo::webhooks::lookup;
/// use serde_json::json;
///
/// let payload = json!({"issue": {"labels": [{"name": "bug"}]}});
/// let name = lookup(&payload, &["issue", "labels", "0", "name"]).unwrap();
/// assert_eq!(name, "bug");
///
/// assert!(lookup(&payload, &["issue", "user"]).is_err());
/// ```
pub fn lookup<'v>(root: &'v Value, path: &[&str]) -> Result<&'v Value, PayloadError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        let next = match current {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| PayloadError::Missing {
            path: join_path(&path[..=depth]),
        })?;
    }
    Ok(current)
}

/// Like [`lookup`], requiring a string.
pub fn lookup_str<'v>(root: &'v Value, path: &[&str]) -> Result<&'v str, PayloadError> {
    lookup(root, path)?
        .as_str()
        .ok_or_else(|| wrong_type(path, "string"))
}

/// Like [`lookup`], requiring a boolean.
pub fn lookup_bool(root: &Value, path: &[&str]) -> Result<bool, PayloadError> {
    lookup(root, path)?
        .as_bool()
        .ok_or_else(|| wrong_type(path, "boolean"))
}

/// Like [`lookup`], requiring a non-negative integer.
pub fn lookup_u64(root: &Value, path: &[&str]) -> Result<u64, PayloadError> {
    lookup(root, path)?
        .as_u64()
        .ok_or_else(|| wrong_type(path, "non-negative integer"))
}

fn wrong_type(path: &[&str], expected: &'static str) -> PayloadError {
    PayloadError::WrongType {
        path: join_path(path),
        expected,
    }
}

fn join_path(path: &[&str]) -> String {
    path.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "action": "opened",
            "issue": {
                "number": 7,
                "locked": false,
                "user": { "login": "alice" },
                "labels": [{ "name": "bug" }, { "name": "help wanted" }]
            }
        })
    }

    #[test]
    fn lookup_empty_path_returns_root() {
        let payload = sample();
        assert_eq!(lookup(&payload, &[]).unwrap(), &payload);
    }

    #[test]
    fn lookup_nested_string() {
        let payload = sample();
        assert_eq!(lookup_str(&payload, &["issue", "user", "login"]), Ok("alice"));
    }

    #[test]
    fn lookup_array_index() {
        let payload = sample();
        assert_eq!(
            lookup_str(&payload, &["issue", "labels", "1", "name"]),
            Ok("help wanted")
        );
    }

    #[test]
    fn lookup_array_index_out_of_bounds() {
        let payload = sample();
        assert_eq!(
            lookup(&payload, &["issue", "labels", "5", "name"]),
            Err(PayloadError::Missing {
                path: "issue.labels.5".to_string()
            })
        );
    }

    #[test]
    fn lookup_missing_reports_first_missing_segment() {
        let payload = sample();
        assert_eq!(
            lookup(&payload, &["issue", "assignee", "login"]),
            Err(PayloadError::Missing {
                path: "issue.assignee".to_string()
            })
        );
    }

    #[test]
    fn lookup_through_scalar_is_missing() {
        let payload = sample();
        assert!(matches!(
            lookup(&payload, &["action", "name"]),
            Err(PayloadError::Missing { .. })
        ));
    }

    #[test]
    fn typed_lookups_report_wrong_type() {
        let payload = sample();
        assert_eq!(
            lookup_str(&payload, &["issue", "number"]),
            Err(PayloadError::WrongType {
                path: "issue.number".to_string(),
                expected: "string"
            })
        );
        assert!(matches!(
            lookup_bool(&payload, &["issue", "user"]),
            Err(PayloadError::WrongType { .. })
        ));
        assert!(matches!(
            lookup_u64(&payload, &["action"]),
            Err(PayloadError::WrongType { .. })
        ));
    }

    #[test]
    fn typed_lookups_succeed() {
        let payload = sample();
        assert_eq!(lookup_bool(&payload, &["issue", "locked"]), Ok(false));
        assert_eq!(lookup_u64(&payload, &["issue", "number"]), Ok(7));
    }

    #[test]
    fn error_messages_name_the_path() {
        let err = PayloadError::Missing {
            path: "issue.user.login".to_string(),
        };
        assert_eq!(err.to_string(), "payload field not found: issue.user.login");
    }
}
