//! Directory aggregation.
//!
//! Walks an input tree in sorted order, projects every file a registered
//! format claims and keys the result by its path relative to the walk root
//! (forward slashes on every platform). Files no format claims are skipped.
//!
//! A file that cannot be read or projected does not stop the walk unless
//! `fail_fast` is set: it is logged and recorded in
//! [`Collection::failures`].

use crate::common::{Projection, ProjectionOptions};
use crate::error::FormatError;
use crate::registry::FormatRegistry;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// A file that was skipped because it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Path relative to the walk root.
    pub path: String,
    pub message: String,
}

/// Relative path → projection, ordered by path.
///
/// Serializes as the bare mapping; failures are not part of the output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    entries: BTreeMap<String, Projection>,
    failures: Vec<FileFailure>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, projection: Projection) {
        self.entries.insert(path.into(), projection);
    }

    pub fn get(&self, path: &str) -> Option<&Projection> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> &BTreeMap<String, Projection> {
        &self.entries
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The mapping as a JSON object, ready for the split passes.
    pub fn to_json_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, FormatError> {
        let mut map = serde_json::Map::new();
        for (path, projection) in &self.entries {
            map.insert(path.clone(), serde_json::to_value(projection)?);
        }
        Ok(map)
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// `path` relative to `root`, joined with `/`.
pub fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Project every recognised file beneath `root`.
///
/// # Errors
///
/// Fails when `root` is not a directory. With `fail_fast`, the first file
/// that cannot be read or projected aborts the walk; otherwise such files
/// are recorded as failures.
pub fn collect_directory(
    root: &Path,
    registry: &FormatRegistry,
    options: &ProjectionOptions,
    fail_fast: bool,
) -> Result<Collection, FormatError> {
    if !root.is_dir() {
        return Err(FormatError::io(
            root,
            io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut collection = Collection::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                let key = relative_key(root, &path);
                let error = FormatError::io(path, io::Error::from(err));
                isolate(&mut collection.failures, key, error, fail_fast)?;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let key = relative_key(root, entry.path());
        let span = tracing::debug_span!("project_file", path = %key);
        let _entered = span.enter();

        match registry.project_file(entry.path(), options) {
            Ok(Some(projection)) => collection.insert(key, projection),
            Ok(None) => tracing::debug!("no format claims this extension, skipped"),
            Err(error) => isolate(&mut collection.failures, key, error, fail_fast)?,
        }
    }

    Ok(collection)
}

/// Record a per-file failure, or propagate it when failing fast.
pub(crate) fn isolate(
    failures: &mut Vec<FileFailure>,
    key: String,
    error: FormatError,
    fail_fast: bool,
) -> Result<(), FormatError> {
    if fail_fast {
        return Err(error);
    }
    tracing::warn!(path = %key, error = %error, "skipping file");
    failures.push(FileFailure {
        path: key,
        message: error.to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SectionRecord;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn collect(root: &Path) -> Collection {
        collect_directory(
            root,
            &FormatRegistry::default(),
            &ProjectionOptions::default(),
            false,
        )
        .unwrap()
    }

    #[test]
    fn markdown_file_is_wrapped_verbatim() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "hello").unwrap();

        let collection = collect(dir.path());
        assert_eq!(
            serde_json::to_value(&collection).unwrap(),
            json!({"a.md": {"content": "hello"}})
        );
    }

    #[test]
    fn rst_file_projects_its_sections() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rst"), "Intro\n=====\n\nWelcome\n").unwrap();

        let collection = collect(dir.path());
        assert_eq!(
            collection.get("a.rst"),
            Some(&Projection::Sections(vec![SectionRecord {
                title: "Intro".to_string(),
                content: vec!["Welcome".to_string()],
                sections: vec![],
            }]))
        );
    }

    #[test]
    fn keys_are_sorted_relative_paths_and_unknown_files_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide/deep")).unwrap();
        fs::write(dir.path().join("z.md"), "z").unwrap();
        fs::write(dir.path().join("guide/deep/b.md"), "b").unwrap();
        fs::write(dir.path().join("guide/a.md"), "a").unwrap();
        fs::write(dir.path().join("guide/notes.txt"), "ignored").unwrap();

        let collection = collect(dir.path());
        let keys: Vec<&str> = collection.entries().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["guide/a.md", "guide/deep/b.md", "z.md"]);
        assert!(collection.failures().is_empty());
    }

    #[test]
    fn unreadable_file_is_isolated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("good.md"), "fine").unwrap();

        let collection = collect(dir.path());
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.failures().len(), 1);
        assert_eq!(collection.failures()[0].path, "bad.md");
    }

    #[test]
    fn fail_fast_propagates_the_first_failure() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.ipynb"), "{not json").unwrap();

        let result = collect_directory(
            dir.path(),
            &FormatRegistry::default(),
            &ProjectionOptions::default(),
            true,
        );
        assert!(matches!(result, Err(FormatError::ParseError(_))));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let result = collect_directory(
            &dir.path().join("absent"),
            &FormatRegistry::default(),
            &ProjectionOptions::default(),
            false,
        );
        assert!(matches!(result, Err(FormatError::Io { .. })));
    }

    #[test]
    fn relative_keys_use_forward_slashes() {
        let root = Path::new("/docs");
        assert_eq!(relative_key(root, &root.join("a").join("b.md")), "a/b.md");
    }
}
