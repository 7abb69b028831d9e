use crate::model::ParsedAssessmentOutput;
use std::collections::HashMap;
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Replace the placeholder group ids (`G1`, `G2`, ...) of an extraction
/// bundle with fresh identifiers and rewrite every assessment reference to
/// match. The input is left untouched; a reference with no matching
/// placeholder passes through unchanged. A repeated placeholder keeps only
/// its first group, so its items are never counted twice.
pub fn assign_ids<F>(
    bundle: &ParsedAssessmentOutput,
    course_id: Option<&str>,
    mut id_gen: F,
) -> ParsedAssessmentOutput
where
    F: FnMut() -> String,
{
    let mut remap: HashMap<String, String> = HashMap::new();
    let mut groups = Vec::with_capacity(bundle.assessment_groups.len());
    for g in &bundle.assessment_groups {
        if remap.contains_key(&g.id) {
            tracing::warn!(placeholder = g.id.as_str(), "repeated group placeholder, keeping the first");
            continue;
        }
        let fresh = id_gen();
        remap.insert(g.id.clone(), fresh.clone());
        let mut g = g.clone();
        g.id = fresh;
        if let Some(cid) = course_id {
            g.course_id = Some(cid.to_string());
        }
        groups.push(g);
    }

    let mut assessments = bundle.assessments.clone();
    for a in assessments.iter_mut() {
        if let Some(real) = remap.get(&a.group_id) {
            a.group_id = real.clone();
        }
        a.id = Some(id_gen());
    }

    ParsedAssessmentOutput {
        assessment_groups: groups,
        assessments,
    }
}

/// Assessment references that do not name any group in the bundle.
pub fn unresolved_refs(bundle: &ParsedAssessmentOutput) -> Vec<String> {
    let known: std::collections::HashSet<&str> = bundle
        .assessment_groups
        .iter()
        .map(|g| g.id.as_str())
        .collect();
    bundle
        .assessments
        .iter()
        .filter(|a| !known.contains(a.group_id.as_str()))
        .map(|a| a.group_id.clone())
        .collect()
}
