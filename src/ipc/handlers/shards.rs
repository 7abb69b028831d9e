use crate::aggregate::aggregate;
use crate::config::{final_dir, scrape_dir};
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_shards_aggregate(state: &mut AppState, req: &Request) -> serde_json::Value {
    // An explicit list narrows or reorders the configured departments.
    let partitions: Vec<String> = match req.params.get("partitions") {
        None | Some(serde_json::Value::Null) => state.config.departments.clone(),
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(list) => list,
            Err(e) => {
                return err(
                    &req.id,
                    ErrorCode::BadParams,
                    format!("partitions must be a list of strings: {e}"),
                    None,
                )
            }
        },
    };

    // Codes are joined onto the scrape directory, so only configured ones pass.
    let unknown: Vec<&str> = partitions
        .iter()
        .map(String::as_str)
        .filter(|p| !state.config.has_department(p))
        .collect();
    if !unknown.is_empty() {
        return err(
            &req.id,
            ErrorCode::UnknownPartition,
            format!("unknown partitions: {}", unknown.join(", ")),
            Some(json!({ "partitions": unknown })),
        );
    }

    let root = state.output_root();
    match aggregate(&scrape_dir(&root), &final_dir(&root), &partitions) {
        Ok(summary) => {
            tracing::info!(merged = summary.merged.len(), "shards aggregated");
            ok(&req.id, summary.to_json())
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "shard aggregation failed");
            err(&req.id, ErrorCode::AggregateFailed, format!("{e:#}"), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "shards.aggregate" => Some(handle_shards_aggregate(state, req)),
        _ => None,
    }
}
