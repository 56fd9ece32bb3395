//! Course record.

use serde::{Deserialize, Serialize};

/// Fields a submission cannot be stored without.
pub const REQUIRED_FIELDS: [&str; 3] = ["code", "name", "instructor"];

/// Optional fields whose emptiness is reported as a warning.
///
/// `description` is carried on the record but is not tracked: the add form
/// never asks for it.
pub const TRACKED_OPTIONAL_FIELDS: [&str; 5] =
    ["semester", "schedule", "classroom", "prerequisites", "grading"];

/// A course in the catalog.
///
/// Records are stored verbatim as submitted. Missing optional keys in the
/// catalog file deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course code (e.g. "CS101").
    pub code: String,
    pub name: String,
    pub instructor: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub classroom: String,
    #[serde(default)]
    pub prerequisites: String,
    #[serde(default)]
    pub grading: String,
    #[serde(default)]
    pub description: String,
}

impl Course {
    /// Create a course with only the required fields set.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        instructor: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            instructor: instructor.into(),
            ..Self::default()
        }
    }

    /// Look up a field by its serialized name.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "code" => &self.code,
            "name" => &self.name,
            "instructor" => &self.instructor,
            "semester" => &self.semester,
            "schedule" => &self.schedule,
            "classroom" => &self.classroom,
            "prerequisites" => &self.prerequisites,
            "grading" => &self.grading,
            "description" => &self.description,
            _ => return None,
        };
        Some(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let mut course = Course::new("CS101", "Intro", "Dr. X");
        course.grading = "A-F".into();

        assert_eq!(course.field("code"), Some("CS101"));
        assert_eq!(course.field("grading"), Some("A-F"));
        assert_eq!(course.field("semester"), Some(""));
        assert_eq!(course.field("credits"), None);
    }

    #[test]
    fn test_missing_optional_keys_default_to_empty() {
        let course: Course = serde_json::from_str(
            r#"{"code": "CS101", "name": "Intro", "instructor": "Dr. X"}"#,
        )
        .unwrap();

        assert_eq!(course, Course::new("CS101", "Intro", "Dr. X"));
    }
}
