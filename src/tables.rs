use crate::csv::write_row;
use crate::model::CourseRecords;
use crate::schema::Table;
use anyhow::{anyhow, Context};
use serde_json::json;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Start every file over, header first.
    Truncate,
    /// Keep existing rows; header only if the file is new or empty.
    Append,
}

struct TableStream {
    table: Table,
    path: PathBuf,
    out: BufWriter<File>,
    rows: usize,
}

/// One open output stream per table in a directory. Dropping the set closes
/// every stream; `finish` also surfaces flush errors.
pub struct TableSet {
    streams: Vec<TableStream>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteSummary {
    pub rows: Vec<(Table, usize)>,
}

impl WriteSummary {
    pub fn rows_for(&self, table: Table) -> usize {
        self.rows
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut m = serde_json::Map::new();
        for (t, n) in &self.rows {
            m.insert(t.name().to_string(), json!(n));
        }
        serde_json::Value::Object(m)
    }
}

impl TableSet {
    pub fn open(dir: &Path, tables: &[Table], mode: WriteMode) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.to_string_lossy()))?;

        let mut streams = Vec::with_capacity(tables.len());
        for &table in tables {
            let path = dir.join(table.file_name());
            let file = match mode {
                WriteMode::Truncate => File::create(&path),
                WriteMode::Append => OpenOptions::new().create(true).append(true).open(&path),
            }
            .with_context(|| format!("failed to open {}", path.to_string_lossy()))?;

            let needs_header = match mode {
                WriteMode::Truncate => true,
                WriteMode::Append => {
                    file.metadata()
                        .with_context(|| format!("failed to stat {}", path.to_string_lossy()))?
                        .len()
                        == 0
                }
            };

            let mut out = BufWriter::new(file);
            if needs_header {
                write_row(&mut out, table.columns())
                    .with_context(|| format!("failed to write header to {}", path.to_string_lossy()))?;
            }
            streams.push(TableStream {
                table,
                path,
                out,
                rows: 0,
            });
        }
        Ok(Self { streams })
    }

    fn append(&mut self, table: Table, row: &[String]) -> anyhow::Result<()> {
        let stream = self
            .streams
            .iter_mut()
            .find(|s| s.table == table)
            .ok_or_else(|| anyhow!("table {} is not open for writing", table.name()))?;
        write_row(&mut stream.out, row)
            .with_context(|| format!("failed to write to {}", stream.path.to_string_lossy()))?;
        stream.rows += 1;
        Ok(())
    }

    /// Route every record of one course to its table.
    pub fn write(&mut self, recs: &CourseRecords) -> anyhow::Result<()> {
        if let Some(o) = &recs.outline {
            self.append(Table::Outlines, &o.to_row())?;
        }
        for g in &recs.groups {
            self.append(Table::AssessmentGroups, &g.to_row())?;
        }
        for a in &recs.assessments {
            self.append(Table::Assessments, &a.to_row())?;
        }
        for c in &recs.conditions {
            self.append(Table::Conditions, &c.to_row())?;
        }
        for p in &recs.personnels {
            self.append(Table::Personnels, &p.to_row())?;
        }
        for s in &recs.sections {
            self.append(Table::Sections, &s.to_row())?;
        }
        for t in &recs.types {
            self.append(Table::Types, &t.to_row())?;
        }
        Ok(())
    }

    pub fn finish(self) -> anyhow::Result<WriteSummary> {
        let mut summary = WriteSummary::default();
        for mut s in self.streams {
            s.out
                .flush()
                .with_context(|| format!("failed to flush {}", s.path.to_string_lossy()))?;
            summary.rows.push((s.table, s.rows));
        }
        Ok(summary)
    }
}
