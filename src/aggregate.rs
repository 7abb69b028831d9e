use crate::csv::{parse_rows, write_row};
use crate::schema::Table;
use anyhow::Context;
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSummary {
    pub rows: Vec<(Table, usize)>,
    pub merged: Vec<String>,
    pub skipped: Vec<String>,
}

impl AggregateSummary {
    pub fn to_json(&self) -> serde_json::Value {
        let mut tables = serde_json::Map::new();
        for (t, n) in &self.rows {
            tables.insert(t.name().to_string(), json!(n));
        }
        json!({
            "tables": tables,
            "merged": self.merged,
            "skipped": self.skipped,
        })
    }
}

/// Merge `scrape_dir/<partition>/<table>.csv` for every partition into
/// `final_dir/<table>.csv`: one header, then every partition's data rows in
/// partition order. Missing files are skipped; any I/O error aborts.
pub fn aggregate(
    scrape_dir: &Path,
    final_dir: &Path,
    partitions: &[String],
) -> anyhow::Result<AggregateSummary> {
    std::fs::create_dir_all(final_dir)
        .with_context(|| format!("failed to create directory {}", final_dir.to_string_lossy()))?;

    let mut summary = AggregateSummary::default();
    for p in partitions {
        if scrape_dir.join(p).is_dir() {
            summary.merged.push(p.clone());
        } else {
            summary.skipped.push(p.clone());
        }
    }

    for table in Table::ALL {
        let out_path = final_dir.join(table.file_name());
        let file = File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.to_string_lossy()))?;
        let mut out = BufWriter::new(file);
        write_row(&mut out, table.columns())
            .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))?;

        let mut written = 0usize;
        for p in &summary.merged {
            let src = scrape_dir.join(p).join(table.file_name());
            if !src.is_file() {
                tracing::debug!(partition = p.as_str(), table = table.name(), "no table file, skipping");
                continue;
            }
            let text = std::fs::read_to_string(&src)
                .with_context(|| format!("failed to read {}", src.to_string_lossy()))?;
            for row in parse_rows(&text).into_iter().skip(1) {
                write_row(&mut out, &row)
                    .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))?;
                written += 1;
            }
        }

        out.flush()
            .with_context(|| format!("failed to flush {}", out_path.to_string_lossy()))?;
        tracing::debug!(table = table.name(), rows = written, "table consolidated");
        summary.rows.push((table, written));
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seed(dir: &Path, partition: &str, table: Table, body: &str) {
        let p = dir.join(partition);
        std::fs::create_dir_all(&p).expect("mkdir");
        let header = table.columns().join(",");
        std::fs::write(p.join(table.file_name()), format!("{header}\n{body}")).expect("seed");
    }

    #[test]
    fn merges_in_partition_order_with_single_header() {
        let root = tempfile::tempdir().expect("tempdir");
        let scrape = root.path().join("scrape");
        seed(&scrape, "SE", Table::Sections, "201,se-1\n202,se-1\n");
        seed(&scrape, "ECE", Table::Sections, "101,ece-1\n");
        seed(&scrape, "ECE", Table::Outlines, "ece-1,ECE 105,Physics,\"a\nb\",1251,/x\n");

        let parts = vec!["ECE".to_string(), "CS".to_string(), "SE".to_string()];
        let summary = aggregate(&scrape, &root.path().join("final"), &parts).expect("aggregate");

        assert_eq!(summary.merged, vec!["ECE", "SE"]);
        assert_eq!(summary.skipped, vec!["CS"]);

        let sections =
            std::fs::read_to_string(root.path().join("final/sections.csv")).expect("read");
        assert_eq!(sections, "section,course_id\n101,ece-1\n201,se-1\n202,se-1\n");

        let outlines = parse_rows(
            &std::fs::read_to_string(root.path().join("final/outlines.csv")).expect("read"),
        );
        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[1][3], "a\nb");

        let conditions =
            std::fs::read_to_string(root.path().join("final/conditions.csv")).expect("read");
        assert_eq!(conditions, "course_id,group_id,scheme,lower,upper\n");
    }

    #[test]
    fn row_counts_add_up_across_partitions() {
        let root = tempfile::tempdir().expect("tempdir");
        let scrape = root.path().join("scrape");
        let parts: Vec<String> = ["AE", "BME", "CHE"].iter().map(|s| s.to_string()).collect();
        for (k, p) in parts.iter().enumerate() {
            let body: String = (0..k + 1).map(|i| format!("{p}-{i},c\n")).collect();
            seed(&scrape, p, Table::Types, &body);
        }

        let summary = aggregate(&scrape, &root.path().join("final"), &parts).expect("aggregate");
        let types = summary.rows.iter().find(|(t, _)| *t == Table::Types).map(|(_, n)| *n);
        assert_eq!(types, Some(6));

        let rows = parse_rows(
            &std::fs::read_to_string(root.path().join("final/types.csv")).expect("read"),
        );
        let firsts: Vec<&str> = rows.iter().skip(1).map(|r| r[0].as_str()).collect();
        assert_eq!(firsts, vec!["AE-0", "BME-0", "BME-1", "CHE-0", "CHE-1", "CHE-2"]);
    }

    #[test]
    fn unwritable_destination_fails() {
        let root = tempfile::tempdir().expect("tempdir");
        let blocker = root.path().join("final");
        std::fs::write(&blocker, "not a directory").expect("seed");
        let err = aggregate(&root.path().join("scrape"), &blocker, &[]);
        assert!(err.is_err());
    }
}
