use crate::config::scrape_dir;
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::types::{AppState, Request};
use crate::pipeline::{ingest_course, CourseExtract, IngestOutcome};
use serde_json::json;

fn handle_courses_ingest(state: &mut AppState, req: &Request) -> serde_json::Value {
    let extract: CourseExtract = match serde_json::from_value(req.params.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, ErrorCode::BadParams, format!("invalid course: {e}"), None),
    };
    let partition = extract.partition.trim().to_string();
    if !state.config.has_department(&partition) {
        return err(
            &req.id,
            ErrorCode::UnknownPartition,
            format!("unknown partition: {}", partition),
            Some(json!({ "partition": partition })),
        );
    }

    let root = state.output_root();
    match ingest_course(&scrape_dir(&root), &extract, &state.config) {
        Ok(IngestOutcome::Written {
            outline_id,
            summary,
            unresolved,
        }) => ok(
            &req.id,
            json!({
                "outlineId": outline_id,
                "partition": partition,
                "rows": summary.to_json(),
                "unresolved": unresolved,
            }),
        ),
        Ok(IngestOutcome::Skipped { reason }) => ok(
            &req.id,
            json!({
                "partition": partition,
                "skipped": true,
                "reason": reason,
            }),
        ),
        Err(e) => {
            tracing::error!(code = extract.outline.code.as_str(), error = %format!("{e:#}"), "course write failed");
            err(
                &req.id,
                ErrorCode::WriteFailed,
                format!("{e:#}"),
                Some(json!({ "code": extract.outline.code, "partition": partition })),
            )
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.ingest" => Some(handle_courses_ingest(state, req)),
        _ => None,
    }
}
