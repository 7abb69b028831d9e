use crate::ids::new_id;
use crate::ipc::error::{err, ok, ErrorCode};
use crate::ipc::types::{AppState, Request};
use crate::model::RawGroup;
use crate::normalize::normalize_group;
use crate::weight::parse_weight_detailed;
use serde_json::json;

fn handle_weights_parse(req: &Request) -> serde_json::Value {
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, ErrorCode::BadParams, "missing params.text", None);
    };
    let (weight, rule) = parse_weight_detailed(text);
    ok(&req.id, json!({ "weight": weight, "rule": rule.as_str() }))
}

/// Preview of one group's records; nothing is written.
fn handle_groups_normalize(req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("group") else {
        return err(&req.id, ErrorCode::BadParams, "missing params.group", None);
    };
    let raw: RawGroup = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, ErrorCode::BadParams, format!("invalid group: {e}"), None),
    };
    let outline_id = req
        .params
        .get("outlineId")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(new_id);

    let mut id_gen = new_id;
    let ng = normalize_group(&raw, &outline_id, &mut id_gen);
    ok(
        &req.id,
        json!({
            "group": ng.group,
            "assessments": ng.assessments,
            "symbol": ng.symbol,
        }),
    )
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "weights.parse" => Some(handle_weights_parse(req)),
        "groups.normalize" => Some(handle_groups_normalize(req)),
        _ => None,
    }
}
