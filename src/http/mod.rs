//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, RequestContext extraction)
//!     → handlers.rs (call the catalog operation)
//!     → render.rs (HTML views) or response.rs (redirect with notice)
//!     → Send to client
//! ```

pub mod handlers;
pub mod render;
pub mod request;
pub mod response;
pub mod server;

pub use render::{HandlebarsRenderer, RenderError, Renderer};
pub use request::X_REQUEST_ID;
pub use response::{Notice, NoticeLevel};
pub use server::{AppState, HttpServer};
