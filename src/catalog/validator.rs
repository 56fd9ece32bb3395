//! Course submission validation.
//!
//! # Responsibilities
//! - Reject submissions with empty required fields
//! - Report empty optional fields as a warning, not a failure
//!
//! # Design Decisions
//! - Required-field failure short-circuits: warnings are never computed for a
//!   rejected submission
//! - Values are compared after trimming whitespace
//! - Field sets are ordered so messages and tests are deterministic

use std::collections::BTreeSet;

use crate::catalog::course::{Course, REQUIRED_FIELDS, TRACKED_OPTIONAL_FIELDS};

/// Result of validating a submitted course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// At least one required field is empty. The course must not be stored.
    Rejected {
        missing_required_fields: BTreeSet<String>,
    },
    /// Required fields are present, some tracked optional fields are empty.
    AcceptedWithWarning {
        empty_optional_fields: BTreeSet<String>,
    },
    /// Every tracked field has a value.
    Accepted,
}

impl ValidationOutcome {
    /// Message suitable for the log record and the span's `error.message`.
    pub fn error_message(&self) -> Option<String> {
        match self {
            ValidationOutcome::Rejected {
                missing_required_fields,
            } => Some(format!(
                "Required fields are empty: {}",
                join(missing_required_fields)
            )),
            _ => None,
        }
    }

    /// Message suitable for the log record and the span's `warning.message`.
    pub fn warning_message(&self) -> Option<String> {
        match self {
            ValidationOutcome::AcceptedWithWarning {
                empty_optional_fields,
            } => Some(format!(
                "Some fields are empty: {}",
                join(empty_optional_fields)
            )),
            _ => None,
        }
    }
}

fn join(fields: &BTreeSet<String>) -> String {
    fields.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Classify `course` against the given required and optional field names.
///
/// Unknown field names count as empty.
pub fn validate(
    course: &Course,
    required_fields: &[&str],
    optional_fields: &[&str],
) -> ValidationOutcome {
    let missing_required_fields = empty_fields(course, required_fields);
    if !missing_required_fields.is_empty() {
        return ValidationOutcome::Rejected {
            missing_required_fields,
        };
    }

    let empty_optional_fields = empty_fields(course, optional_fields);
    if !empty_optional_fields.is_empty() {
        return ValidationOutcome::AcceptedWithWarning {
            empty_optional_fields,
        };
    }

    ValidationOutcome::Accepted
}

/// Validate against the catalog's standard field lists.
pub fn validate_course(course: &Course) -> ValidationOutcome {
    validate(course, &REQUIRED_FIELDS, &TRACKED_OPTIONAL_FIELDS)
}

fn empty_fields(course: &Course, fields: &[&str]) -> BTreeSet<String> {
    fields
        .iter()
        .filter(|name| course.field(name).map_or(true, |v| v.trim().is_empty()))
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_course() -> Course {
        Course {
            code: "CS101".into(),
            name: "Intro".into(),
            instructor: "Dr. X".into(),
            semester: "Fall".into(),
            schedule: "MWF 9:00".into(),
            classroom: "B12".into(),
            prerequisites: "None".into(),
            grading: "A-F".into(),
            description: String::new(),
        }
    }

    fn set(fields: &[&str]) -> BTreeSet<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_complete_course_is_accepted() {
        assert_eq!(validate_course(&complete_course()), ValidationOutcome::Accepted);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut course = complete_course();
        course.code = String::new();

        assert_eq!(
            validate_course(&course),
            ValidationOutcome::Rejected {
                missing_required_fields: set(&["code"]),
            }
        );
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        let mut course = complete_course();
        course.name = "   ".into();
        course.instructor = "\t".into();

        assert_eq!(
            validate_course(&course),
            ValidationOutcome::Rejected {
                missing_required_fields: set(&["instructor", "name"]),
            }
        );
    }

    #[test]
    fn test_rejection_skips_optional_scan() {
        // Every optional field is empty too, but only required ones are reported.
        let course = Course::new("", "Algo", "Dr. Y");

        let outcome = validate_course(&course);
        assert_eq!(
            outcome,
            ValidationOutcome::Rejected {
                missing_required_fields: set(&["code"]),
            }
        );
        assert!(outcome.warning_message().is_none());
    }

    #[test]
    fn test_empty_optional_fields_warn_with_exact_set() {
        let mut course = complete_course();
        course.semester = String::new();
        course.grading = " ".into();

        assert_eq!(
            validate_course(&course),
            ValidationOutcome::AcceptedWithWarning {
                empty_optional_fields: set(&["grading", "semester"]),
            }
        );
    }

    #[test]
    fn test_description_is_not_tracked() {
        let course = complete_course();
        assert!(course.description.is_empty());
        assert_eq!(validate_course(&course), ValidationOutcome::Accepted);
    }

    #[test]
    fn test_unknown_field_counts_as_empty() {
        let outcome = validate(&complete_course(), &["code"], &["credits"]);
        assert_eq!(
            outcome,
            ValidationOutcome::AcceptedWithWarning {
                empty_optional_fields: set(&["credits"]),
            }
        );
    }

    #[test]
    fn test_messages() {
        let rejected = validate_course(&Course::new("", "", "Dr. Y"));
        assert_eq!(
            rejected.error_message().as_deref(),
            Some("Required fields are empty: code, name")
        );

        let mut course = complete_course();
        course.classroom = String::new();
        let warned = validate_course(&course);
        assert_eq!(warned.error_message(), None);
        assert_eq!(
            warned.warning_message().as_deref(),
            Some("Some fields are empty: classroom")
        );
    }
}
