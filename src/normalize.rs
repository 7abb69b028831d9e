use crate::model::{
    value_count, value_text, Assessment, AssessmentGroup, Condition, CourseRecords,
    ParsedAssessmentOutput, Personnel, RawGroup, RawPersonnel, RawScheme,
};
use crate::weight::parse_weight;
use chrono::NaiveDate;
use serde_json::Value;

/// Item weights must add back up to the group weight within this tolerance.
pub const WEIGHT_TOLERANCE: f64 = 0.005;

/// Largest believable item count for one group. Anything above it is treated
/// as unreadable rather than expanded into that many rows.
pub const MAX_GROUP_COUNT: u32 = 500;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y"];

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGroup {
    pub group: AssessmentGroup,
    pub assessments: Vec<Assessment>,
    /// The scraped condition symbol this group answers to, if any.
    pub symbol: Option<String>,
}

pub fn is_optional_text(text: &str) -> bool {
    text.to_lowercase().contains("optional")
}

/// Graduate-only variants are kept but flagged optional so the undergraduate
/// row stays the default.
pub fn is_graduate_variant(text: &str) -> bool {
    let t = text.to_lowercase();
    if t.contains("undergrad") {
        return false;
    }
    t.contains("graduate") || t.contains("grad student")
}

fn flags_optional(name: &str, kind: Option<&str>) -> bool {
    let kind = kind.unwrap_or("");
    is_optional_text(name)
        || is_optional_text(kind)
        || is_graduate_variant(name)
        || is_graduate_variant(kind)
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn item_name(group_name: &str, names: &[Option<String>], i: usize, count: u32) -> String {
    if let Some(Some(n)) = names.get(i) {
        return n.clone();
    }
    if count == 1 {
        group_name.to_string()
    } else {
        format!("{} {}", group_name, i + 1)
    }
}

/// `Some(unit)` when relative item weights describe the whole group, where
/// `unit` is what a full group adds up to (1.0 or 100.0).
fn relative_unit(parts: &[f64], unit: f64) -> Option<f64> {
    if parts.is_empty() {
        return None;
    }
    let sum: f64 = parts.iter().sum();
    if (sum - unit).abs() <= WEIGHT_TOLERANCE * unit {
        Some(unit)
    } else {
        None
    }
}

pub fn normalize_due_date(raw: Option<&str>) -> Option<String> {
    let t = raw?.trim();
    if t.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    // ISO timestamps: keep the date part.
    if let Some(head) = t.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    tracing::debug!(due_date = t, "unrecognized due date, dropping");
    None
}

/// One scraped grading-scheme row to a group record plus `count` items.
pub fn normalize_group<F>(raw: &RawGroup, outline_id: &str, id_gen: &mut F) -> NormalizedGroup
where
    F: FnMut() -> String,
{
    let weight_text = raw.weight.as_ref().and_then(value_text).unwrap_or_default();
    let weight = parse_weight(&weight_text);

    let fallback = if raw.items.is_empty() { 1 } else { raw.items.len() as u32 };
    let count = match raw.count.as_ref().and_then(value_count) {
        Some(n) if n > MAX_GROUP_COUNT => {
            tracing::warn!(count = n, max = MAX_GROUP_COUNT, "implausible group count, ignoring");
            fallback
        }
        Some(n) if n > 0 => n,
        _ => fallback,
    };
    let drop = raw
        .drop
        .as_ref()
        .and_then(value_count)
        .unwrap_or(0)
        .min(count);

    let name = raw.name.as_deref().unwrap_or("").trim().to_string();
    let kind = non_empty(raw.assessment_type.as_deref());
    let optional = flags_optional(&name, kind.as_deref());

    let group_id = id_gen();

    let relative: Option<Vec<f64>> = if raw.items.len() == count as usize {
        raw.items
            .iter()
            .map(|it| it.weight.as_ref().and_then(value_text).map(|t| parse_weight(&t)))
            .collect()
    } else {
        None
    };
    let item_weights: Vec<f64> = match relative
        .as_deref()
        .and_then(|parts| relative_unit(parts, 1.0).map(|u| (parts, u)))
    {
        Some((parts, unit)) => parts.iter().map(|p| weight * p / unit).collect(),
        None => vec![weight / count as f64; count as usize],
    };

    let names: Vec<Option<String>> = raw.items.iter().map(|it| non_empty(it.name.as_deref())).collect();
    let assessments = item_weights
        .into_iter()
        .enumerate()
        .map(|(i, w)| Assessment {
            id: id_gen(),
            group_id: group_id.clone(),
            weight: w,
            index: i as u32,
            due_date: normalize_due_date(raw.items.get(i).and_then(|it| it.due_date.as_deref())),
            name: item_name(&name, &names, i, count),
        })
        .collect();

    NormalizedGroup {
        group: AssessmentGroup {
            id: group_id,
            course_id: outline_id.to_string(),
            weight,
            count,
            drop,
            name,
            kind,
            optional,
        },
        assessments,
        symbol: non_empty(raw.symbol.as_deref()),
    }
}

/// LLM weights may come back as percentages or as fractions.
fn as_fraction(w: f64) -> f64 {
    let w = if w > 1.0 { w / 100.0 } else { w };
    w.clamp(0.0, 1.0)
}

fn scheme_number(v: Option<&Value>, fallback: i64) -> i64 {
    match v {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(fallback),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(fallback),
        _ => fallback,
    }
}

/// All groups of one grading scheme plus the scheme's condition row. The
/// condition links to the first group whose symbol matches its own; when
/// nothing matches it is still recorded, unlinked.
pub fn normalize_scheme<F>(
    raw: &RawScheme,
    position: usize,
    outline_id: &str,
    id_gen: &mut F,
) -> CourseRecords
where
    F: FnMut() -> String,
{
    let mut out = CourseRecords::default();
    let condition = raw.condition.clone().unwrap_or_default();
    let wanted = non_empty(condition.symbol.as_deref());
    let mut linked: Option<String> = None;

    for raw_group in &raw.assessments {
        let ng = normalize_group(raw_group, outline_id, id_gen);
        // Last match wins.
        if wanted.is_some() && ng.symbol == wanted {
            linked = Some(ng.group.id.clone());
        }
        out.groups.push(ng.group);
        out.assessments.extend(ng.assessments);
    }

    if wanted.is_some() && linked.is_none() {
        tracing::debug!(symbol = ?wanted, "condition symbol matched no group");
    }

    out.conditions.push(Condition {
        course_id: outline_id.to_string(),
        group_id: linked,
        scheme: scheme_number(raw.scheme_num.as_ref(), position as i64 + 1),
        lower: condition.lower_bound.as_ref().and_then(value_text),
        upper: condition.upper_bound.as_ref().and_then(value_text),
    });
    out
}

/// Turn an identifier-assigned LLM bundle into output records. Item weights
/// arrive as percentages of their group; they are scaled when they cover
/// the whole group and split evenly otherwise. Returns the records and the
/// number of items whose group reference resolved to nothing.
pub fn normalize_llm_output<F>(
    bundle: &ParsedAssessmentOutput,
    outline_id: &str,
    id_gen: &mut F,
) -> (CourseRecords, usize)
where
    F: FnMut() -> String,
{
    let mut out = CourseRecords::default();
    let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();

    for g in &bundle.assessment_groups {
        if !seen.insert(g.id.as_str()) {
            tracing::warn!(group = g.id.as_str(), "repeated group id, keeping the first");
            continue;
        }
        let weight = as_fraction(g.weight);
        let items: Vec<_> = bundle
            .assessments
            .iter()
            .filter(|a| a.group_id == g.id)
            .collect();

        let count = match (items.len(), g.count) {
            (0, n) if n > MAX_GROUP_COUNT => {
                tracing::warn!(count = n, max = MAX_GROUP_COUNT, "implausible group count, ignoring");
                1
            }
            (0, n) => n.max(1),
            (k, _) => k as u32,
        };
        let parts: Vec<f64> = items.iter().map(|a| a.weight).collect();
        let unit = relative_unit(&parts, 100.0).or_else(|| relative_unit(&parts, 1.0));

        let course_id = g.course_id.clone().unwrap_or_else(|| outline_id.to_string());
        for i in 0..count as usize {
            let src = items.get(i);
            let w = match unit {
                Some(u) => weight * parts[i] / u,
                None => weight / count as f64,
            };
            out.assessments.push(Assessment {
                id: src.and_then(|a| a.id.clone()).unwrap_or_else(&mut *id_gen),
                group_id: g.id.clone(),
                weight: w,
                index: i as u32,
                due_date: normalize_due_date(src.and_then(|a| a.due_date.as_deref())),
                name: match src.map(|a| a.name.trim()).filter(|n| !n.is_empty()) {
                    Some(n) => n.to_string(),
                    None if count == 1 => g.name.clone(),
                    None => format!("{} {}", g.name, i + 1),
                },
            });
        }

        out.groups.push(AssessmentGroup {
            id: g.id.clone(),
            course_id,
            weight,
            count,
            drop: g.drop.min(count),
            name: g.name.clone(),
            kind: None,
            optional: g.optional || flags_optional(&g.name, None),
        });
    }

    let known: std::collections::HashSet<&str> =
        bundle.assessment_groups.iter().map(|g| g.id.as_str()).collect();
    let mut unresolved = 0;
    let mut next_index: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();
    for a in bundle.assessments.iter().filter(|a| !known.contains(a.group_id.as_str())) {
        unresolved += 1;
        let idx = next_index.entry(a.group_id.as_str()).or_insert(0);
        out.assessments.push(Assessment {
            id: a.id.clone().unwrap_or_else(&mut *id_gen),
            group_id: a.group_id.clone(),
            weight: as_fraction(a.weight),
            index: *idx,
            due_date: normalize_due_date(a.due_date.as_deref()),
            name: a.name.clone(),
        });
        *idx += 1;
    }
    if unresolved > 0 {
        tracing::warn!(unresolved, "assessments reference unknown groups, kept as-is");
    }

    (out, unresolved)
}

pub fn normalize_role(raw: &str) -> String {
    let t = raw.trim();
    match t.to_lowercase().as_str() {
        "professor" | "prof" | "instructor" | "lecturer" => "Professor".to_string(),
        "ta" | "teaching assistant" => "TA".to_string(),
        _ => {
            let lower = t.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

pub fn normalize_personnel(
    raw: &RawPersonnel,
    outline_id: &str,
    invalid_emails: &[String],
) -> Personnel {
    let email = non_empty(raw.email.as_deref()).filter(|e| {
        let bad = invalid_emails.iter().any(|x| x.trim().eq_ignore_ascii_case(e));
        if bad {
            tracing::debug!(email = e.as_str(), "blanking known invalid email");
        }
        !bad
    });
    Personnel {
        course_id: outline_id.to_string(),
        name: raw.name.as_deref().unwrap_or("").trim().to_string(),
        role: normalize_role(raw.role.as_deref().unwrap_or("")),
        email,
    }
}

/// `"101-106, 201"` gives every section number in the ranges plus `201`.
/// Anything that is not a clean ascending numeric range is kept verbatim.
pub fn expand_sections(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((lo, hi)) = part.split_once('-') {
            let (lo, hi) = (lo.trim(), hi.trim());
            if let (Ok(a), Ok(b)) = (lo.parse::<u32>(), hi.parse::<u32>()) {
                if a <= b {
                    // Zero-padded sections ("001-003") keep their width.
                    let width = if lo.starts_with('0') { lo.len() } else { 0 };
                    out.extend((a..=b).map(|v| format!("{:0width$}", v, width = width)));
                    continue;
                }
            }
        }
        out.push(part.to_string());
    }
    out
}
