use serde::{Deserialize, Serialize};
use serde_json::Value;

/* ---------------- Output records ---------------- */

#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub term: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentGroup {
    pub id: String,
    pub course_id: String,
    pub weight: f64,
    pub count: u32,
    pub drop: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub group_id: String,
    pub weight: f64,
    pub index: u32,
    pub due_date: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub course_id: String,
    pub group_id: Option<String>,
    pub scheme: i64,
    pub lower: Option<String>,
    pub upper: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Personnel {
    pub course_id: String,
    pub name: String,
    pub role: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub section: String,
    pub course_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseType {
    pub kind: String,
    pub course_id: String,
}

/// Everything produced for one course in one pass. `outline` is absent when
/// the records come from an outline export that already has its outline rows.
#[derive(Debug, Clone, Default)]
pub struct CourseRecords {
    pub outline: Option<Outline>,
    pub groups: Vec<AssessmentGroup>,
    pub assessments: Vec<Assessment>,
    pub conditions: Vec<Condition>,
    pub personnels: Vec<Personnel>,
    pub sections: Vec<Section>,
    pub types: Vec<CourseType>,
}

impl CourseRecords {
    pub fn extend(&mut self, other: CourseRecords) {
        self.groups.extend(other.groups);
        self.assessments.extend(other.assessments);
        self.conditions.extend(other.conditions);
        self.personnels.extend(other.personnels);
        self.sections.extend(other.sections);
        self.types.extend(other.types);
    }
}

fn fmt_opt(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

impl Outline {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.code.clone(),
            self.name.clone(),
            self.description.clone(),
            self.term.clone(),
            self.url.clone(),
        ]
    }
}

impl AssessmentGroup {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.course_id.clone(),
            self.weight.to_string(),
            self.count.to_string(),
            self.drop.to_string(),
            self.name.clone(),
            fmt_opt(&self.kind),
            self.optional.to_string(),
        ]
    }
}

impl Assessment {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.group_id.clone(),
            self.weight.to_string(),
            self.index.to_string(),
            fmt_opt(&self.due_date),
            self.name.clone(),
        ]
    }
}

impl Condition {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.course_id.clone(),
            fmt_opt(&self.group_id),
            self.scheme.to_string(),
            fmt_opt(&self.lower),
            fmt_opt(&self.upper),
        ]
    }
}

impl Personnel {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.course_id.clone(),
            self.name.clone(),
            self.role.clone(),
            fmt_opt(&self.email),
        ]
    }
}

impl Section {
    pub fn to_row(&self) -> Vec<String> {
        vec![self.section.clone(), self.course_id.clone()]
    }
}

impl CourseType {
    pub fn to_row(&self) -> Vec<String> {
        vec![self.kind.clone(), self.course_id.clone()]
    }
}

/* ---------------- Extraction-layer input ---------------- */

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<Value>,
    #[serde(default, alias = "due_date")]
    pub due_date: Option<String>,
}

/// One grading-scheme row as scraped: every field is free text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGroup {
    #[serde(default)]
    pub weight: Option<Value>,
    #[serde(default)]
    pub count: Option<Value>,
    #[serde(default)]
    pub drop: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub assessment_type: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCondition {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub lower_bound: Option<Value>,
    #[serde(default)]
    pub upper_bound: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScheme {
    #[serde(default)]
    pub scheme_num: Option<Value>,
    #[serde(default)]
    pub condition: Option<RawCondition>,
    #[serde(default)]
    pub assessments: Vec<RawGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPersonnel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/* ---------------- LLM extraction output ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmGroup {
    /// Placeholder such as `G1` until identifiers are assigned.
    pub id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    pub weight: f64,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub drop: u32,
    pub name: String,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmAssessment {
    #[serde(default)]
    pub id: Option<String>,
    pub group_id: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAssessmentOutput {
    #[serde(default)]
    pub assessment_groups: Vec<LlmGroup>,
    #[serde(default)]
    pub assessments: Vec<LlmAssessment>,
}

/* ---------------- Value coercion ---------------- */

/// Text form of a JSON scalar; `null` and containers give `None`.
pub fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Non-negative integer from a JSON number or numeric string.
pub fn value_count(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
