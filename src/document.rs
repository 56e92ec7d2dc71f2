//! Markdown documents with YAML front-matter.
//!
//! A document is a markdown file whose metadata lives in a `---`-delimited
//! YAML block at the top. The sync engine reads the URL, title, and tag
//! fields from that block and writes the remote identifier back into it;
//! everything else in the file is carried through untouched.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Errors from loading, parsing, or saving documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Read(PathBuf, std::io::Error),

    #[error("Failed to write {}: {}", .0.display(), .1)]
    Write(PathBuf, std::io::Error),

    #[error("Invalid front-matter in {}: {}", .0.display(), .1)]
    FrontMatter(PathBuf, serde_yaml::Error),

    #[error("Front-matter in {} is not a mapping", .0.display())]
    NotMapping(PathBuf),

    #[error("Unterminated front-matter block in {}", .0.display())]
    Unterminated(PathBuf),
}

/// A local markdown document: path, front-matter fields, body.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    front_matter: Mapping,
    body: String,
    modified: bool,
}

impl Document {
    /// Parses `contents` as front-matter plus body.
    ///
    /// A file without a leading `---` line has no front-matter; the whole
    /// contents become the body.
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Result<Self, DocumentError> {
        let path = path.into();
        let Some(rest) = contents.strip_prefix("---\n") else {
            return Ok(Self {
                path,
                front_matter: Mapping::new(),
                body: contents.to_string(),
                modified: false,
            });
        };

        let (yaml, body) = match rest.find("\n---\n") {
            Some(end) => (&rest[..end], &rest[end + 5..]),
            None => match rest.strip_suffix("\n---") {
                Some(yaml) => (yaml, ""),
                None => return Err(DocumentError::Unterminated(path)),
            },
        };

        let front_matter = if yaml.trim().is_empty() {
            Mapping::new()
        } else {
            match serde_yaml::from_str::<Value>(yaml) {
                Ok(Value::Mapping(mapping)) => mapping,
                Ok(_) => return Err(DocumentError::NotMapping(path)),
                Err(e) => return Err(DocumentError::FrontMatter(path, e)),
            }
        };

        Ok(Self {
            path,
            front_matter,
            body: body.to_string(),
            modified: false,
        })
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DocumentError::Read(path.to_path_buf(), e))?;
        Self::parse(path, &contents)
    }

    /// Writes the document back to its path.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let rendered = self.render()?;
        std::fs::write(&self.path, rendered)
            .map_err(|e| DocumentError::Write(self.path.clone(), e))?;
        self.modified = false;
        Ok(())
    }

    /// Renders the document back to file contents.
    pub fn render(&self) -> Result<String, DocumentError> {
        if self.front_matter.is_empty() {
            return Ok(self.body.clone());
        }
        let yaml = serde_yaml::to_string(&Value::Mapping(self.front_matter.clone()))
            .map_err(|e| DocumentError::FrontMatter(self.path.clone(), e))?;
        Ok(format!("---\n{}---\n{}", yaml, self.body))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// True when a field has been changed since load/save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Looks up a string field. Empty strings count as absent.
    pub fn field_str(&self, name: &str) -> Option<String> {
        match self.front_matter.get(&Value::from(name)) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// Looks up an integer field. Quoted numbers are accepted.
    pub fn field_int(&self, name: &str) -> Option<i64> {
        match self.front_matter.get(&Value::from(name)) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Looks up a list-of-strings field. A lone string is a one-element
    /// list; anything else is empty.
    pub fn field_list(&self, name: &str) -> Vec<String> {
        match self.front_matter.get(&Value::from(name)) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Sets an integer field, creating it if absent.
    pub fn set_field_int(&mut self, name: &str, value: i64) {
        self.front_matter
            .insert(Value::from(name), Value::from(value));
        self.modified = true;
    }
}
