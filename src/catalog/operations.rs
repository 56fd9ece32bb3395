//! Catalog use cases.
//!
//! Each operation classifies its outcome first, then writes exactly one
//! story to both channels: a log record per event and one span, sharing the
//! event name and message.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use opentelemetry::trace::SpanKind;
use thiserror::Error;

use crate::catalog::course::Course;
use crate::catalog::store::{CatalogStore, StoreError};
use crate::catalog::validator::{validate_course, ValidationOutcome};
use crate::observability::context::{Observability, RecordOptions, RequestContext};
use crate::observability::logging::LogSeverity;
use crate::observability::metrics;

/// Errors that abort a catalog operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result of submitting a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Stored. `empty_optional_fields` is non-empty when a warning was raised.
    Added {
        course: Course,
        empty_optional_fields: BTreeSet<String>,
    },
    /// Not stored.
    Rejected {
        missing_required_fields: BTreeSet<String>,
    },
}

/// Message used when a course code is unknown.
pub fn not_found_message(code: &str) -> String {
    format!("No course found with code '{code}'.")
}

/// Use-case layer over the store and the observability pipeline.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    observability: Arc<Observability>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, observability: Arc<Observability>) -> Self {
        Self {
            store,
            observability,
        }
    }

    pub fn observability(&self) -> &Observability {
        &self.observability
    }

    pub fn render_index(&self, ctx: &RequestContext) {
        self.page_view(ctx, "render-index", "Home page rendered successfully");
    }

    pub fn render_contact(&self, ctx: &RequestContext) {
        self.page_view(ctx, "render-contact", "Contact page rendered successfully");
    }

    pub fn render_add_course(&self, ctx: &RequestContext) {
        self.page_view(ctx, "render-add-course", "Add course page rendered successfully");
    }

    fn page_view(&self, ctx: &RequestContext, event: &'static str, message: &str) {
        let start = Instant::now();
        self.observability.log(LogSeverity::Info, event, ctx, message);
        self.observability.record(event, ctx, RecordOptions::new());
        metrics::record_operation(event, "ok", start);
    }

    /// Load the whole catalog for the listing page.
    pub fn list_courses(&self, ctx: &RequestContext) -> CatalogResult<Vec<Course>> {
        const EVENT: &str = "render-course-catalog";
        let start = Instant::now();

        let courses = match self.store.list_courses() {
            Ok(courses) => courses,
            Err(e) => {
                let message = format!("Failed to load course catalog: {e}");
                self.observability
                    .log(LogSeverity::Error, "render-course-catalog-error", ctx, &message);
                self.observability
                    .record(EVENT, ctx, RecordOptions::new().error(message));
                metrics::record_operation(EVENT, "error", start);
                return Err(e.into());
            }
        };
        let loading = start.elapsed();

        self.observability.log(
            LogSeverity::Info,
            EVENT,
            ctx,
            "Course catalog page rendered successfully",
        );
        self.observability.record(
            EVENT,
            ctx,
            RecordOptions::new()
                .with_catalog_count()
                .timing("course_loading.time", loading),
        );
        metrics::record_operation(EVENT, "ok", start);
        Ok(courses)
    }

    /// Validate and store a submitted course.
    ///
    /// A submission with empty optional fields is still stored.
    pub fn add_course(&self, ctx: &RequestContext, course: Course) -> CatalogResult<AddOutcome> {
        const SPAN: &str = "add-course";
        let start = Instant::now();

        let outcome = validate_course(&course);
        let validation = start.elapsed();

        if let ValidationOutcome::Rejected {
            missing_required_fields,
        } = &outcome
        {
            let message = outcome.error_message().unwrap_or_default();
            self.observability
                .log(LogSeverity::Error, "course-add-error", ctx, &message);
            self.observability.record(
                SPAN,
                ctx,
                RecordOptions::new()
                    .course_code(&course.code)
                    .error(message)
                    .timing("validation.time", validation),
            );
            metrics::record_operation(SPAN, "rejected", start);
            return Ok(AddOutcome::Rejected {
                missing_required_fields: missing_required_fields.clone(),
            });
        }

        let warning = outcome.warning_message();
        let save_start = Instant::now();
        let saved = self.store.append_course(course.clone());
        let save = save_start.elapsed();

        if let Some(message) = &warning {
            self.observability
                .log(LogSeverity::Warning, "course-add-warning", ctx, message);
        }

        let mut options = RecordOptions::new()
            .course_code(&course.code)
            .timing("validation.time", validation)
            .timing("save.time", save);
        if let Some(message) = warning {
            options = options.warning(message);
        }

        if let Err(e) = saved {
            let message = format!("Failed to save course '{}': {e}", course.code);
            self.observability
                .log(LogSeverity::Error, "course-add-error", ctx, &message);
            self.observability.record(SPAN, ctx, options.error(message));
            metrics::record_operation(SPAN, "error", start);
            return Err(e.into());
        }

        self.observability.record(SPAN, ctx, options);
        self.observability.log(
            LogSeverity::Info,
            "course-added",
            ctx,
            &format!("Course '{}' '{}' added successfully", course.code, course.name),
        );

        let (outcome_label, empty_optional_fields) = match outcome {
            ValidationOutcome::AcceptedWithWarning {
                empty_optional_fields,
            } => ("warning", empty_optional_fields),
            _ => ("ok", BTreeSet::new()),
        };
        metrics::record_operation(SPAN, outcome_label, start);

        Ok(AddOutcome::Added {
            course,
            empty_optional_fields,
        })
    }

    /// Look up one course. `Ok(None)` means the code is unknown.
    pub fn course_details(&self, ctx: &RequestContext, code: &str) -> CatalogResult<Option<Course>> {
        const SPAN: &str = "view-course-details";
        let start = Instant::now();

        let course = match self.store.list_courses() {
            Ok(courses) => courses.into_iter().find(|c| c.code == code),
            Err(e) => {
                let message = format!("Failed to load course '{code}': {e}");
                self.observability
                    .log(LogSeverity::Error, "view-course-details-error", ctx, &message);
                self.observability
                    .record(SPAN, ctx, RecordOptions::new().course_code(code).error(message));
                metrics::record_operation(SPAN, "error", start);
                return Err(e.into());
            }
        };
        let processing = start.elapsed();

        match course {
            Some(course) => {
                self.observability.log(
                    LogSeverity::Info,
                    SPAN,
                    ctx,
                    &format!("Course with code '{code}' viewed successfully"),
                );
                self.observability.record(
                    SPAN,
                    ctx,
                    RecordOptions::new()
                        .course_code(code)
                        .timing("processing.time", processing),
                );
                metrics::record_operation(SPAN, "ok", start);
                Ok(Some(course))
            }
            None => {
                let message = not_found_message(code);
                self.observability
                    .log(LogSeverity::Error, "view-course-details-error", ctx, &message);
                self.observability
                    .record(SPAN, ctx, RecordOptions::new().course_code(code).error(message));
                metrics::record_operation(SPAN, "not_found", start);
                Ok(None)
            }
        }
    }

    /// Delete every course with `code`. Unknown codes are logged as deleted too.
    pub fn delete_course(&self, ctx: &RequestContext, code: &str) -> CatalogResult<()> {
        const SPAN: &str = "delete-course";
        let start = Instant::now();

        if let Err(e) = self.store.remove_course(code) {
            let message = format!("Failed to delete course '{code}': {e}");
            self.observability
                .log(LogSeverity::Error, "course-delete-error", ctx, &message);
            self.observability
                .record(SPAN, ctx, RecordOptions::new().course_code(code).error(message));
            metrics::record_operation(SPAN, "error", start);
            return Err(e.into());
        }

        self.observability.log(
            LogSeverity::Info,
            "course-deleted",
            ctx,
            &format!("Course with code '{code}' deleted successfully"),
        );
        self.observability
            .record(SPAN, ctx, RecordOptions::new().course_code(code));
        metrics::record_operation(SPAN, "ok", start);
        Ok(())
    }

    /// Record a hand-built span with a single processing event.
    pub fn manual_trace(&self, ctx: &RequestContext) {
        self.observability
            .tracer()
            .with_span("manual-span", SpanKind::Server, ctx, |span| {
                span.add_event("Processing request", std::iter::empty::<(&str, &str)>());
            });
    }
}
