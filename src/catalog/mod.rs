//! Course catalog domain.
//!
//! # Data Flow
//! ```text
//! submission (form / CLI)
//!     → course.rs (Course record)
//!     → validator.rs (Rejected | AcceptedWithWarning | Accepted)
//!     → operations.rs (log + span per outcome, store call unless rejected)
//!     → store.rs (JSON file, list / append / remove)
//! ```

pub mod course;
pub mod operations;
pub mod store;
pub mod validator;

pub use course::Course;
pub use operations::{AddOutcome, CatalogError, CatalogService};
pub use store::{CatalogStore, InMemoryStore, JsonFileStore, StoreError};
pub use validator::{validate, validate_course, ValidationOutcome};
