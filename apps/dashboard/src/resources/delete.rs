use serde_json::Value;

/// What the backend did with a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record is gone.
    Deleted,
    /// The record is referenced elsewhere and was marked inactive instead.
    Deactivated,
}

const FLAG_KEYS: &[&str] = &["softDeleted", "soft_deleted", "isSoftDeleted", "deactivated"];

impl DeleteOutcome {
    /// Reads the soft-delete signal from any of the response shapes the
    /// backend uses: a top-level flag, the same flag under `data`, or an
    /// `action: "deactivated"` marker.
    pub fn from_response(body: &Value) -> Self {
        let flagged = |v: &Value| {
            FLAG_KEYS
                .iter()
                .any(|k| v.get(*k).and_then(Value::as_bool).unwrap_or(false))
                || v.get("action").and_then(Value::as_str) == Some("deactivated")
        };

        if flagged(body) || body.get("data").is_some_and(flagged) {
            DeleteOutcome::Deactivated
        } else {
            DeleteOutcome::Deleted
        }
    }
}
