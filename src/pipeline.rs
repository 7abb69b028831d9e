use crate::config::Config;
use crate::ids::{assign_ids, new_id};
use crate::model::{
    value_text, CourseRecords, CourseType, Outline, ParsedAssessmentOutput, RawPersonnel,
    RawScheme, Section,
};
use crate::normalize::{expand_sections, normalize_llm_output, normalize_personnel, normalize_scheme};
use crate::schema::Table;
use crate::tables::{TableSet, WriteMode, WriteSummary};
use anyhow::bail;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineInput {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Everything the extraction layer hands over for one course.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseExtract {
    pub partition: String,
    pub outline: OutlineInput,
    /// `"101-106, 201"` or a list of such strings.
    #[serde(default)]
    pub sections: Option<Value>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub personnels: Vec<RawPersonnel>,
    #[serde(default)]
    pub schemes: Vec<RawScheme>,
    #[serde(default)]
    pub assessments: Option<ParsedAssessmentOutput>,
}

#[derive(Debug, Clone)]
pub struct BuiltCourse {
    pub records: CourseRecords,
    pub unresolved: usize,
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Written {
        outline_id: String,
        summary: WriteSummary,
        unresolved: usize,
    },
    Skipped {
        reason: String,
    },
}

fn section_values(v: &Value) -> Vec<String> {
    match v {
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .flat_map(|t| expand_sections(&t))
            .collect(),
        other => value_text(other)
            .map(|t| expand_sections(&t))
            .unwrap_or_default(),
    }
}

/// Assemble every record of one course. Pure apart from the id generator.
pub fn build_course<F>(extract: &CourseExtract, invalid_emails: &[String], id_gen: &mut F) -> BuiltCourse
where
    F: FnMut() -> String,
{
    let outline_id = id_gen();
    let o = &extract.outline;

    let mut records = CourseRecords {
        outline: Some(Outline {
            id: outline_id.clone(),
            code: o.code.trim().to_string(),
            name: o.name.trim().to_string(),
            description: o.description.trim().to_string(),
            term: o.term.trim().to_string(),
            url: o.url.clone().unwrap_or_default(),
        }),
        ..Default::default()
    };

    for (i, scheme) in extract.schemes.iter().enumerate() {
        records.extend(normalize_scheme(scheme, i, &outline_id, id_gen));
    }

    let mut unresolved = 0;
    if let Some(bundle) = &extract.assessments {
        let assigned = assign_ids(bundle, Some(outline_id.as_str()), &mut *id_gen);
        let (llm, n) = normalize_llm_output(&assigned, &outline_id, id_gen);
        records.extend(llm);
        unresolved = n;
    }

    records.personnels = extract
        .personnels
        .iter()
        .map(|p| normalize_personnel(p, &outline_id, invalid_emails))
        .collect();

    records.sections = extract
        .sections
        .as_ref()
        .map(section_values)
        .unwrap_or_default()
        .into_iter()
        .map(|section| Section {
            section,
            course_id: outline_id.clone(),
        })
        .collect();

    records.types = extract
        .types
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| CourseType {
            kind: t.to_string(),
            course_id: outline_id.clone(),
        })
        .collect();

    BuiltCourse { records, unresolved }
}

/// Normalize one course and append it to its partition's tables under
/// `scrape_dir/<partition>/`.
pub fn ingest_course(
    scrape_dir: &Path,
    extract: &CourseExtract,
    config: &Config,
) -> anyhow::Result<IngestOutcome> {
    let partition = extract.partition.trim();
    if !config.has_department(partition) {
        bail!("unknown partition: {}", partition);
    }

    let code = extract.outline.code.trim();
    if extract.outline.url.as_deref().map(str::trim).unwrap_or("").is_empty() {
        tracing::warn!(code, "no outline url provided, skipping course");
        return Ok(IngestOutcome::Skipped {
            reason: format!("no outline url provided for {}", code),
        });
    }

    let built = build_course(extract, &config.invalid_emails, &mut new_id);
    let outline_id = built
        .records
        .outline
        .as_ref()
        .map(|o| o.id.clone())
        .unwrap_or_default();

    let mut tables = TableSet::open(&scrape_dir.join(partition), &Table::ALL, WriteMode::Append)?;
    tables.write(&built.records)?;
    let summary = tables.finish()?;

    tracing::info!(
        code,
        partition,
        groups = built.records.groups.len(),
        assessments = built.records.assessments.len(),
        "course written"
    );

    Ok(IngestOutcome::Written {
        outline_id,
        summary,
        unresolved: built.unresolved,
    })
}
