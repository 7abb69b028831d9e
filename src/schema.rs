#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Outlines,
    AssessmentGroups,
    Assessments,
    Conditions,
    Personnels,
    Sections,
    Types,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Outlines,
        Table::AssessmentGroups,
        Table::Assessments,
        Table::Conditions,
        Table::Personnels,
        Table::Sections,
        Table::Types,
    ];

    /// Tables produced when splitting an outline export; the export already
    /// is the outlines table and carries no section/type data.
    pub const SPLIT: [Table; 4] = [
        Table::Personnels,
        Table::Conditions,
        Table::Assessments,
        Table::AssessmentGroups,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Outlines => "outlines",
            Self::AssessmentGroups => "assessment_groups",
            Self::Assessments => "assessments",
            Self::Conditions => "conditions",
            Self::Personnels => "personnels",
            Self::Sections => "sections",
            Self::Types => "types",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.name())
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Outlines => &["id", "code", "name", "description", "term", "url"],
            Self::AssessmentGroups => &[
                "id", "course_id", "weight", "count", "drop", "name", "type", "optional",
            ],
            Self::Assessments => &["id", "group_id", "weight", "index", "due_date", "name"],
            Self::Conditions => &["course_id", "group_id", "scheme", "lower", "upper"],
            Self::Personnels => &["course_id", "name", "role", "email"],
            Self::Sections => &["section", "course_id"],
            Self::Types => &["type", "course_id"],
        }
    }
}
