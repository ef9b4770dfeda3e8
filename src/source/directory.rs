use crate::model::SourceError;
use crate::source::traits::CandidateSource;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Image files sitting directly under a folder.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Whether a symlink resolves to a regular file. Dangling links are skipped.
fn link_targets_file(path: &Path) -> Result<bool, SourceError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Skipping dangling link {}", path.display());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

impl CandidateSource for DirectorySource {
    fn snapshot(&self) -> Result<Vec<String>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::FolderNotFound(self.root.display().to_string()));
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            let file_type = entry.file_type();
            let is_file = if file_type.is_symlink() {
                link_targets_file(entry.path())?
            } else {
                file_type.is_file()
            };
            if !is_file {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().to_string());
        }

        // directory order is platform dependent; sort for stable tie-breaks
        names.sort();
        debug!("Snapshot of {}: {} files", self.root.display(), names.len());
        Ok(names)
    }
}
