//! Response helpers.
//!
//! # Responsibilities
//! - Turn rendered pages into HTML responses
//! - Carry one-shot user notices across redirects
//! - Map operation failures to a plain error page
//!
//! # Design Decisions
//! - Notices ride on the redirect target's query string (`notice`, `level`)
//!   instead of a session
//! - User-input problems (rejection, unknown code) always redirect to a safe
//!   view; only store and render failures produce a 500

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

use crate::catalog::operations::CatalogError;
use crate::http::render::RenderError;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A message shown once on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Query parameters a redirected page may receive.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
    pub level: Option<NoticeLevel>,
}

impl NoticeQuery {
    pub fn into_notice(self) -> Option<Notice> {
        self.notice
            .map(|message| Notice::new(self.level.unwrap_or(NoticeLevel::Success), message))
    }
}

/// Redirect to `path`, attaching `notice` to the query string.
pub fn redirect_with_notice(path: &str, notice: &Notice) -> Response {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("notice", &notice.message)
        .append_pair("level", notice.level.as_str())
        .finish();
    Redirect::to(&format!("{path}?{query}")).into_response()
}

/// Wrap a rendered page as an HTML response.
pub fn html(body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Failures that end a request with a 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "The course catalog is temporarily unavailable.",
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_encodes_notice() {
        let response = redirect_with_notice(
            "/catalog",
            &Notice::new(NoticeLevel::Error, "No course found with code 'MATH 200'."),
        );

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(
            location,
            "/catalog?notice=No+course+found+with+code+%27MATH+200%27.&level=error"
        );
    }

    #[test]
    fn test_notice_query_defaults_to_success() {
        let query = NoticeQuery {
            notice: Some("Saved".into()),
            level: None,
        };
        assert_eq!(
            query.into_notice(),
            Some(Notice::new(NoticeLevel::Success, "Saved"))
        );
        assert_eq!(NoticeQuery::default().into_notice(), None);
    }
}
