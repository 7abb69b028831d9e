use crate::export_split::split_outlines_export;
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_exports_split(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(input) = req
        .params
        .get("inputPath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
    else {
        return err(&req.id, ErrorCode::BadParams, "missing params.inputPath", None);
    };
    let out_dir = req
        .params
        .get("outDir")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .unwrap_or_else(|| state.output_root());

    match split_outlines_export(&input, &out_dir, &state.config) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "outDir": out_dir.to_string_lossy(),
                "courses": summary.courses,
                "skipped": summary.skipped,
                "rows": summary.rows.to_json(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "outline export split failed");
            err(
                &req.id,
                ErrorCode::SplitFailed,
                format!("{e:#}"),
                Some(json!({ "inputPath": input.to_string_lossy() })),
            )
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exports.split" => Some(handle_exports_split(state, req)),
        _ => None,
    }
}
