//! Catalog persistence.
//!
//! # Responsibilities
//! - List, append, and remove courses
//! - Persist the catalog as a JSON array in a flat file
//!
//! # Design Decisions
//! - A missing catalog file is an empty catalog
//! - Read-modify-write sequences hold a process-wide lock so concurrent
//!   requests cannot lose each other's updates
//! - Rewrites go through a temp file and an atomic rename
//! - Removing an unknown code is not an error

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::catalog::course::Course;

/// Errors raised by a catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog file is malformed: {0}")]
    Format(#[from] serde_json::Error),

    #[error("catalog lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for the catalog.
pub trait CatalogStore: Send + Sync {
    /// Return every course, in stored order.
    fn list_courses(&self) -> StoreResult<Vec<Course>>;

    /// Append a course to the end of the catalog.
    fn append_course(&self, course: Course) -> StoreResult<()>;

    /// Remove every course with `code`. Unknown codes are ignored.
    fn remove_course(&self, code: &str) -> StoreResult<()>;
}

/// Catalog stored as a pretty-printed JSON array on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| StoreError::Poisoned)
    }

    fn read(&self) -> StoreResult<Vec<Course>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn write(&self, courses: &[Course]) -> StoreResult<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, courses)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl CatalogStore for JsonFileStore {
    fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let _guard = self.lock()?;
        self.read()
    }

    fn append_course(&self, course: Course) -> StoreResult<()> {
        let _guard = self.lock()?;
        let mut courses = self.read()?;
        tracing::debug!(code = %course.code, path = ?self.path, "Appending course");
        courses.push(course);
        self.write(&courses)
    }

    fn remove_course(&self, code: &str) -> StoreResult<()> {
        let _guard = self.lock()?;
        let mut courses = self.read()?;
        let before = courses.len();
        courses.retain(|c| c.code != code);
        tracing::debug!(code = %code, removed = before - courses.len(), "Removing course");
        self.write(&courses)
    }
}

/// Catalog held in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    courses: Mutex<Vec<Course>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            courses: Mutex::new(courses),
        }
    }

    fn courses(&self) -> StoreResult<MutexGuard<'_, Vec<Course>>> {
        self.courses.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl CatalogStore for InMemoryStore {
    fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(self.courses()?.clone())
    }

    fn append_course(&self, course: Course) -> StoreResult<()> {
        self.courses()?.push(course);
        Ok(())
    }

    fn remove_course(&self, code: &str) -> StoreResult<()> {
        self.courses()?.retain(|c| c.code != code);
        Ok(())
    }
}
