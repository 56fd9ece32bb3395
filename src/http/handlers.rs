//! Page handlers.
//!
//! Handlers only translate between HTTP and catalog operations; every log
//! record and span is produced by `CatalogService`.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::course::Course;
use crate::catalog::operations::{not_found_message, AddOutcome};
use crate::http::response::{html, redirect_with_notice, AppError, Notice, NoticeLevel, NoticeQuery};
use crate::http::server::AppState;
use crate::observability::context::RequestContext;

/// Fields posted by the add-course form. Absent fields are empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CourseForm {
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub semester: String,
    pub schedule: String,
    pub classroom: String,
    pub prerequisites: String,
    pub grading: String,
    pub description: String,
}

impl From<CourseForm> for Course {
    fn from(form: CourseForm) -> Self {
        Course {
            code: form.code,
            name: form.name,
            instructor: form.instructor,
            semester: form.semester,
            schedule: form.schedule,
            classroom: form.classroom,
            prerequisites: form.prerequisites,
            grading: form.grading,
            description: form.description,
        }
    }
}

fn page(state: &AppState, view: &str, data: Value) -> Result<Response, AppError> {
    Ok(html(state.renderer.render(view, &data)?))
}

fn join(fields: &BTreeSet<String>) -> String {
    fields.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<NoticeQuery>,
) -> Result<Response, AppError> {
    state.catalog.render_index(&ctx);
    page(&state, "index", json!({ "notice": query.into_notice() }))
}

pub async fn contact(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    state.catalog.render_contact(&ctx);
    page(&state, "contact", json!({}))
}

pub async fn catalog(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<NoticeQuery>,
) -> Result<Response, AppError> {
    let courses = state.catalog.list_courses(&ctx)?;
    page(
        &state,
        "course_catalog",
        json!({ "courses": courses, "notice": query.into_notice() }),
    )
}

pub async fn add_course_form(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<NoticeQuery>,
) -> Result<Response, AppError> {
    state.catalog.render_add_course(&ctx);
    page(&state, "add_course", json!({ "notice": query.into_notice() }))
}

pub async fn add_course(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<CourseForm>,
) -> Result<Response, AppError> {
    let notice = match state.catalog.add_course(&ctx, form.into())? {
        AddOutcome::Rejected {
            missing_required_fields,
        } => Notice::new(
            NoticeLevel::Error,
            format!("Error: '{}' field is required!", join(&missing_required_fields)),
        ),
        AddOutcome::Added {
            course,
            empty_optional_fields,
        } if !empty_optional_fields.is_empty() => Notice::new(
            NoticeLevel::Warning,
            format!(
                "Course '{}' added successfully! Warning: '{}' field is empty",
                course.name,
                join(&empty_optional_fields)
            ),
        ),
        AddOutcome::Added { course, .. } => Notice::new(
            NoticeLevel::Success,
            format!("Course '{}' added successfully!", course.name),
        ),
    };
    Ok(redirect_with_notice("/catalog", &notice))
}

pub async fn course_details(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    match state.catalog.course_details(&ctx, &code)? {
        Some(course) => page(&state, "course_details", json!({ "course": course })),
        None => Ok(redirect_with_notice(
            "/catalog",
            &Notice::new(NoticeLevel::Error, not_found_message(&code)),
        )),
    }
}

pub async fn delete_course(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    state.catalog.delete_course(&ctx, &code)?;
    Ok(redirect_with_notice(
        "/catalog",
        &Notice::new(
            NoticeLevel::Success,
            format!("Course with code '{code}' deleted successfully!"),
        ),
    ))
}

pub async fn manual_trace(State(state): State<AppState>, ctx: RequestContext) -> impl IntoResponse {
    state.catalog.manual_trace(&ctx);
    (StatusCode::OK, "Manual trace recorded!")
}

/// Covered only by the HTTP trace layer; no catalog span.
pub async fn auto_instrumented() -> impl IntoResponse {
    (StatusCode::OK, "This route is auto-instrumented!")
}
