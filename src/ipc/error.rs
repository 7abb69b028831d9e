use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadJson,
    BadParams,
    WorkspaceUnavailable,
    UnknownPartition,
    WriteFailed,
    SplitFailed,
    AggregateFailed,
    NotImplemented,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadJson => "bad_json",
            Self::BadParams => "bad_params",
            Self::WorkspaceUnavailable => "workspace_unavailable",
            Self::UnknownPartition => "unknown_partition",
            Self::WriteFailed => "write_failed",
            Self::SplitFailed => "split_failed",
            Self::AggregateFailed => "aggregate_failed",
            Self::NotImplemented => "not_implemented",
        }
    }
}

fn error_body(code: ErrorCode, message: String, details: Option<Value>) -> Value {
    let mut body = json!({ "code": code.as_str(), "message": message });
    if let Some(d) = details {
        body["details"] = d;
    }
    body
}

pub fn ok(id: &str, result: Value) -> Value {
    json!({ "id": id, "ok": true, "result": result })
}

pub fn err(id: &str, code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> Value {
    json!({ "id": id, "ok": false, "error": error_body(code, message.into(), details) })
}

/// Reply to a line that is not a request at all; there is no id to echo.
pub fn unparseable(message: impl Into<String>) -> Value {
    json!({ "ok": false, "error": error_body(ErrorCode::BadJson, message.into(), None) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_envelope_carries_code_and_optional_details() {
        let plain = err("7", ErrorCode::UnknownPartition, "unknown partition: XYZ", None);
        assert_eq!(
            plain,
            json!({
                "id": "7",
                "ok": false,
                "error": { "code": "unknown_partition", "message": "unknown partition: XYZ" }
            })
        );

        let detailed = err("8", ErrorCode::WriteFailed, "disk full", Some(json!({ "partition": "ECE" })));
        assert_eq!(detailed["error"]["details"]["partition"], json!("ECE"));

        let bad = unparseable("expected value");
        assert_eq!(bad.get("id"), None);
        assert_eq!(bad["error"]["code"], json!("bad_json"));
    }
}
