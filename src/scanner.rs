//! Document discovery on disk.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::document::{Document, DocumentError};

/// Loads every markdown document under `dir`, recursively.
///
/// Paths are sorted so batch order is deterministic across runs. Hidden
/// files and directories are skipped. Files whose front-matter fails to
/// parse are logged and left out rather than failing the whole scan.
pub fn scan_documents(dir: &Path) -> Result<Vec<Document>, DocumentError> {
    let mut paths = Vec::new();
    collect_markdown(dir, &mut paths)?;
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        match Document::load(&path) {
            Ok(document) => documents.push(document),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable document"),
        }
    }
    Ok(documents)
}

fn collect_markdown(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DocumentError> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| DocumentError::Read(dir.to_path_buf(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DocumentError::Read(dir.to_path_buf(), e))?;
        let path = entry.path();

        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if hidden {
            continue;
        }

        if path.is_dir() {
            collect_markdown(&path, out)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            out.push(path);
        }
    }
    Ok(())
}
