//! Page rendering.
//!
//! Templates are compiled into the binary and registered once at startup.

use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Errors raised while rendering a page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Turns a view name and its data into a response body.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, data: &Value) -> Result<Vec<u8>, RenderError>;
}

const PARTIALS: [(&str, &str); 2] = [
    ("header", include_str!("templates/header.hbs")),
    ("footer", include_str!("templates/footer.hbs")),
];

const VIEWS: [(&str, &str); 5] = [
    ("index", include_str!("templates/index.hbs")),
    ("course_catalog", include_str!("templates/course_catalog.hbs")),
    ("add_course", include_str!("templates/add_course.hbs")),
    ("course_details", include_str!("templates/course_details.hbs")),
    ("contact", include_str!("templates/contact.hbs")),
];

pub const PATH_SEGMENT_HELPER_NAME: &str = "path_segment";

/// Percent-encode `segment` so it stays a single URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    match url.path().strip_prefix('/') {
        Some(encoded) if !encoded.is_empty() => encoded.to_string(),
        _ => segment.to_string(),
    }
}

fn path_segment_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h.param(0).map(|p| p.value()).ok_or_else(|| {
        handlebars::RenderError::new(format!("`value` param not provided for helper `{}`", h.name()))
    })?;
    let raw = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    out.write(&handlebars::html_escape(&encode_path_segment(&raw)))?;
    Ok(())
}

/// Renders the built-in HTML views with Handlebars.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.register_helper(PATH_SEGMENT_HELPER_NAME, Box::new(path_segment_helper));
        for (name, source) in PARTIALS {
            registry.register_partial(name, source).map_err(Box::new)?;
        }
        for (name, source) in VIEWS {
            registry
                .register_template_string(name, source)
                .map_err(Box::new)?;
        }
        Ok(Self { registry })
    }
}

impl Renderer for HandlebarsRenderer {
    fn render(&self, view: &str, data: &Value) -> Result<Vec<u8>, RenderError> {
        Ok(self.registry.render(view, data)?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(view: &str, data: Value) -> String {
        let renderer = HandlebarsRenderer::new().unwrap();
        String::from_utf8(renderer.render(view, &data).unwrap()).unwrap()
    }

    #[test]
    fn test_catalog_lists_courses() {
        let html = render(
            "course_catalog",
            json!({
                "courses": [
                    {"code": "CS101", "name": "Intro", "instructor": "Dr. X", "semester": "Fall"},
                ],
            }),
        );

        assert!(html.contains("<title>Catalog | Course Catalog</title>"));
        assert!(html.contains(r#"<a href="/course/CS101">CS101</a>"#));
        assert!(html.contains("/delete_course/CS101"));
    }

    #[test]
    fn test_course_links_are_percent_encoded() {
        let html = render(
            "course_catalog",
            json!({
                "courses": [
                    {"code": "A/B?C#1", "name": "Odd", "instructor": "Dr. X", "semester": "Fall"},
                ],
            }),
        );

        assert!(html.contains(r#"<a href="/course/A%2FB%3FC%231">"#));
        assert!(html.contains(r#"href="/delete_course/A%2FB%3FC%231""#));

        let html = render(
            "course_details",
            json!({"course": {"code": "CS 101", "name": "Intro"}}),
        );
        assert!(html.contains(r#"href="/delete_course/CS%20101""#));
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("CS101"), "CS101");
        assert_eq!(encode_path_segment("CS 101"), "CS%20101");
        assert_eq!(encode_path_segment("50%"), "50%25");
    }

    #[test]
    fn test_notice_is_escaped() {
        let html = render(
            "index",
            json!({"notice": {"level": "error", "message": "<script>"}}),
        );

        assert!(html.contains(r#"class="notice notice-error""#));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unknown_view() {
        let renderer = HandlebarsRenderer::new().unwrap();
        assert!(matches!(
            renderer.render("missing", &json!({})),
            Err(RenderError::Render(_))
        ));
    }
}
