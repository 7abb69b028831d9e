use crate::config::Config;
use crate::csv::parse_rows;
use crate::ids::new_id;
use crate::model::{CourseRecords, RawPersonnel, RawScheme};
use crate::normalize::{normalize_personnel, normalize_scheme};
use crate::schema::Table;
use crate::tables::{TableSet, WriteMode, WriteSummary};
use anyhow::{anyhow, Context};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct SplitSummary {
    pub courses: usize,
    pub skipped: usize,
    pub rows: WriteSummary,
}

/// Columns of an outline export, located by header name.
struct ExportColumns {
    id: usize,
    personnel: usize,
    schemes: usize,
}

impl ExportColumns {
    fn from_header(header: &[String]) -> anyhow::Result<Self> {
        let pos: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
            .collect();
        let find = |name: &str| {
            pos.get(name)
                .copied()
                .ok_or_else(|| anyhow!("outline export is missing the {} column", name))
        };
        Ok(Self {
            id: find("id")?,
            personnel: find("personnel")?,
            schemes: find("schemes")?,
        })
    }
}

fn json_list<T: serde::de::DeserializeOwned>(cell: Option<&String>) -> serde_json::Result<Vec<T>> {
    match cell.map(|s| s.trim()) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text),
    }
}

fn split_row(
    row: &[String],
    cols: &ExportColumns,
    config: &Config,
) -> anyhow::Result<CourseRecords> {
    let course_id = row
        .get(cols.id)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("row has no course id"))?;
    let personnel: Vec<RawPersonnel> =
        json_list(row.get(cols.personnel)).context("personnel column is not a JSON list")?;
    let schemes: Vec<RawScheme> =
        json_list(row.get(cols.schemes)).context("schemes column is not a JSON list")?;

    let mut recs = CourseRecords::default();
    for p in &personnel {
        recs.personnels
            .push(normalize_personnel(p, &course_id, &config.invalid_emails));
    }
    let mut id_gen = new_id;
    for (i, scheme) in schemes.iter().enumerate() {
        recs.extend(normalize_scheme(scheme, i, &course_id, &mut id_gen));
    }
    Ok(recs)
}

/// Split an exported `outlines` table (personnel and grading schemes stored
/// as JSON columns) into the personnels, conditions, assessment_groups and
/// assessments tables in `out_dir`. Unreadable rows are skipped; a missing
/// column or any I/O failure aborts.
pub fn split_outlines_export(
    input: &Path,
    out_dir: &Path,
    config: &Config,
) -> anyhow::Result<SplitSummary> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.to_string_lossy()))?;
    let mut rows = parse_rows(&text).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| anyhow!("outline export {} is empty", input.to_string_lossy()))?;
    let cols = ExportColumns::from_header(&header)?;

    let mut tables = TableSet::open(out_dir, &Table::SPLIT, WriteMode::Truncate)?;
    let mut summary = SplitSummary::default();

    for (n, row) in rows.enumerate() {
        match split_row(&row, &cols, config) {
            Ok(recs) => {
                tables.write(&recs)?;
                summary.courses += 1;
            }
            Err(e) => {
                // Header is line 1.
                tracing::warn!(row = n + 2, error = %format!("{e:#}"), "skipping outline row");
                summary.skipped += 1;
            }
        }
    }

    summary.rows = tables.finish()?;
    tracing::info!(
        courses = summary.courses,
        skipped = summary.skipped,
        "outline export split"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::write_row;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn export_file(dir: &Path, rows: &[Vec<String>]) -> std::path::PathBuf {
        let path = dir.join("outlines_rows.csv");
        let mut buf = Vec::new();
        write_row(&mut buf, &["code", "personnel", "schemes", "id", "name", "description"])
            .expect("header");
        for r in rows {
            write_row(&mut buf, r).expect("row");
        }
        std::fs::write(&path, buf).expect("write export");
        path
    }

    #[test]
    fn splits_json_columns_into_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let personnel = json!([{ "name": "Ada", "role": "ta", "email": "a6lian@uwaterloo.ca" }]);
        let schemes = json!([{
            "schemeNum": 1,
            "condition": { "symbol": "A", "lowerBound": 50, "upperBound": 100 },
            "assessments": [
                { "weight": "a*3%", "count": 2, "name": "Assignments", "symbol": "A" }
            ]
        }]);
        let input = export_file(
            dir.path(),
            &[
                vec![
                    "CS 135".into(),
                    personnel.to_string(),
                    schemes.to_string(),
                    "course-1".into(),
                    "Designing Functional Programs".into(),
                    "desc".into(),
                ],
                vec![
                    "CS 136".into(),
                    "not json".into(),
                    "[]".into(),
                    "course-2".into(),
                    "x".into(),
                    "y".into(),
                ],
            ],
        );

        let out = dir.path().join("out");
        let summary = split_outlines_export(&input, &out, &Config::default()).expect("split");
        assert_eq!(summary.courses, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rows.rows_for(Table::Assessments), 2);

        let personnels = std::fs::read_to_string(out.join("personnels.csv")).expect("read");
        assert_eq!(personnels, "course_id,name,role,email\ncourse-1,Ada,TA,\n");

        let groups = parse_rows(&std::fs::read_to_string(out.join("assessment_groups.csv")).expect("read"));
        assert_eq!(groups[1][1], "course-1");
        assert_eq!(groups[1][2], "0.06");

        let conditions = parse_rows(&std::fs::read_to_string(out.join("conditions.csv")).expect("read"));
        assert_eq!(conditions[1][1], groups[1][0]);
        assert_eq!(&conditions[1][2..], &["1", "50", "100"]);
    }

    #[test]
    fn missing_column_aborts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("bad.csv");
        std::fs::write(&input, "code,id\nCS 135,x\n").expect("write");
        assert!(split_outlines_export(&input, &dir.path().join("out"), &Config::default()).is_err());
    }
}
