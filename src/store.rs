//! File-backed store for analyses: one `<name>.json` per saved result.
//!
//! The store owns nothing algorithmic; it validates names, hands blobs to
//! [`crate::schema`], and reports precise errors. Listing returns bare
//! names (no extension) sorted alphabetically.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::schema::{self, SchemaError, StoredAnalysis};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("no stored analysis named '{name}'")]
    NotFound { name: String },
    #[error("invalid analysis name '{name}': must be non-empty and contain no path separators")]
    InvalidName { name: String },
}

/// Directory of persisted analyses.
pub struct AnalysisStore {
    dir: PathBuf,
}

impl AnalysisStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let trimmed = name.trim().trim_end_matches(".json");
        if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed.contains("..") {
            return Err(StoreError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.dir.join(format!("{trimmed}.json")))
    }

    pub fn save(&self, name: &str, analysis: &StoredAnalysis) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        let raw = schema::encode(analysis)?;
        fs::write(&path, raw)?;
        debug!(name, path = %path.display(), "saved analysis");
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<StoredAnalysis, StoreError> {
        let path = self.path_for(name)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        debug!(name, "loaded analysis");
        Ok(schema::decode(&raw)?)
    }

    /// Names of all stored analyses, without the `.json` extension.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if let Some(name) = file_name.strip_suffix(".json") {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(name, "deleted analysis");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
