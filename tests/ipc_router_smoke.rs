use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_outlined");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn outlined");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["version"], json!(env!("CARGO_PKG_VERSION")));

    let cfg = request(&mut stdin, &mut reader, "2", "config.get", json!({}));
    let departments = cfg["result"]["departments"].as_array().expect("departments");
    assert_eq!(departments.first(), Some(&json!("AE")));
    let tables = cfg["result"]["tables"].as_array().expect("tables");
    assert_eq!(tables.len(), 7);
    assert_eq!(
        tables[2],
        json!({ "name": "assessments", "columns": ["id", "group_id", "weight", "index", "due_date", "name"] })
    );

    let w = request(&mut stdin, &mut reader, "3", "weights.parse", json!({ "text": "a*3%" }));
    assert_eq!(w["result"]["rule"], json!("weightedChoice"));
    assert!((w["result"]["weight"].as_f64().expect("weight") - 0.06).abs() < 1e-9);

    let missing = request(&mut stdin, &mut reader, "4", "weights.parse", json!({}));
    assert_eq!(missing["ok"], json!(false));
    assert_eq!(missing["error"]["code"], json!("bad_params"));

    let unknown = request(&mut stdin, &mut reader, "5", "grades.compute", json!({}));
    assert_eq!(unknown["error"]["code"], json!("not_implemented"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn malformed_line_gets_bad_json_and_loop_continues() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read");
    let v: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
    assert_eq!(v["error"]["code"], json!("bad_json"));

    let health = request(&mut stdin, &mut reader, "after", "health", json!({}));
    assert_eq!(health["ok"], json!(true));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn groups_normalize_previews_scenario_from_scraped_scheme() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "groups.normalize",
        json!({
            "outlineId": "course-1",
            "group": {
                "weight": "Quiz [50%]",
                "name": "Quizzes",
                "items": [
                    { "name": "Quiz 4", "weight": "[25%]" },
                    { "name": "Quiz 2", "weight": "[25%]" },
                    { "weight": "[25%]" },
                    { "name": "Quiz 1", "weight": "[25%]" }
                ]
            }
        }),
    );
    let result = &resp["result"];
    assert_eq!(result["group"]["weight"], json!(0.5));
    assert_eq!(result["group"]["count"], json!(4));
    assert_eq!(result["group"]["courseId"], json!("course-1"));

    let items = result["assessments"].as_array().expect("assessments");
    let idx: Vec<u64> = items.iter().map(|a| a["index"].as_u64().expect("index")).collect();
    assert_eq!(idx, vec![0, 1, 2, 3]);
    for a in items {
        assert_eq!(a["weight"], json!(0.125));
        assert_eq!(a["groupId"], result["group"]["id"]);
    }

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn exports_split_reports_counts_and_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("outlines_rows.csv");
    std::fs::write(
        &input,
        "id,personnel,schemes\nc-1,\"[{\"\"name\"\":\"\"Bo\"\",\"\"role\"\":\"\"TA\"\"}]\",[]\nc-2,oops,[]\n",
    )
    .expect("write export");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let missing = request(&mut stdin, &mut reader, "1", "exports.split", json!({}));
    assert_eq!(missing["error"]["code"], json!("bad_params"));

    let out = dir.path().join("out");
    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "exports.split",
        json!({ "inputPath": input.to_string_lossy(), "outDir": out.to_string_lossy() }),
    );
    assert_eq!(resp["ok"], json!(true));
    assert_eq!(resp["result"]["courses"], json!(1));
    assert_eq!(resp["result"]["skipped"], json!(1));
    assert_eq!(resp["result"]["rows"]["personnels"], json!(1));
    assert!(out.join("conditions.csv").is_file());

    let gone = request(
        &mut stdin,
        &mut reader,
        "3",
        "exports.split",
        json!({ "inputPath": dir.path().join("nope.csv").to_string_lossy() }),
    );
    assert_eq!(gone["error"]["code"], json!("split_failed"));

    drop(stdin);
    let _ = child.wait();
}
