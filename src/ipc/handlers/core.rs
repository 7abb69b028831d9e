use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::types::{AppState, Request};
use crate::schema::Table;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "outputRoot": state.output_root().to_string_lossy(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, ErrorCode::BadParams, "missing params.path", None);
    };

    if let Err(e) = std::fs::create_dir_all(&path) {
        return err(
            &req.id,
            ErrorCode::WorkspaceUnavailable,
            e.to_string(),
            Some(json!({ "path": path.to_string_lossy() })),
        );
    }
    tracing::info!(path = %path.display(), "workspace selected");
    state.workspace = Some(path.clone());
    ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
}

fn handle_config_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let tables: Vec<serde_json::Value> = Table::ALL
        .iter()
        .map(|t| json!({ "name": t.name(), "columns": t.columns() }))
        .collect();
    ok(
        &req.id,
        json!({
            "departments": state.config.departments,
            "invalidEmails": state.config.invalid_emails,
            "tables": tables,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "config.get" => Some(handle_config_get(state, req)),
        _ => None,
    }
}
