use crate::ids::{assign_ids, new_id, unresolved_refs};
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::types::{AppState, Request};
use crate::model::ParsedAssessmentOutput;
use serde_json::json;

fn handle_assign_ids(req: &Request) -> serde_json::Value {
    let Some(bundle) = req.params.get("bundle") else {
        return err(&req.id, ErrorCode::BadParams, "missing params.bundle", None);
    };
    let bundle: ParsedAssessmentOutput = match serde_json::from_value(bundle.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, ErrorCode::BadParams, format!("invalid bundle: {e}"), None),
    };
    let course_id = req.params.get("courseId").and_then(|v| v.as_str());

    let out = assign_ids(&bundle, course_id, new_id);
    let unresolved = unresolved_refs(&out);
    if !unresolved.is_empty() {
        tracing::warn!(count = unresolved.len(), "unresolved group references passed through");
    }
    ok(
        &req.id,
        json!({
            "bundle": out,
            "unresolved": unresolved,
        }),
    )
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.assignIds" => Some(handle_assign_ids(req)),
        _ => None,
    }
}
