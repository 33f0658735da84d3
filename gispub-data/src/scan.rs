//! Discovery of dataset collections and their staged files.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Reserved subdirectory holding post-extraction files.
pub const STAGING_DIR: &str = "output";

/// Errors raised while walking the dataset root.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A directory could not be listed.
    #[error("failed to list {path}: {source}")]
    List {
        /// Directory being listed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Staging directory of a collection.
#[must_use]
pub fn staging_dir(collection: &Utf8Path) -> Utf8PathBuf {
    collection.join(STAGING_DIR)
}

/// Enumerate the dataset collections under `root`.
///
/// The root itself is a collection when it directly holds at least one file.
/// Every immediate subdirectory is a collection except the staging
/// directory. The root comes first, followed by subdirectories in name
/// order.
///
/// # Errors
/// Returns [`ScanError::List`] when `root` cannot be listed.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use gispub_data::scan_collections;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8");
/// std::fs::write(root.join("parcel.zip"), b"").expect("write");
/// std::fs::create_dir(root.join("roads")).expect("mkdir");
/// std::fs::create_dir(root.join("output")).expect("mkdir");
/// let found = scan_collections(&root)?;
/// assert_eq!(found, vec![root.clone(), root.join("roads")]);
/// # Ok::<(), gispub_data::ScanError>(())
/// ```
pub fn scan_collections(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ScanError> {
    let entries = gispub_fs::list_dir(root).map_err(|source| ScanError::List {
        path: root.to_path_buf(),
        source,
    })?;

    let mut collections = Vec::new();
    if entries.iter().any(gispub_fs::DirEntry::is_file) {
        collections.push(root.to_path_buf());
    }
    collections.extend(
        entries
            .iter()
            .filter(|entry| entry.is_dir() && entry.name != STAGING_DIR)
            .map(|entry| root.join(&entry.name)),
    );
    log::debug!("found {} dataset collection(s) under {root}", collections.len());
    Ok(collections)
}

/// Names of the regular files in the staging directory of `collection`.
///
/// A collection without a staging directory has nothing staged.
///
/// # Errors
/// Returns [`ScanError::List`] when the staging directory exists but cannot
/// be listed.
pub fn list_staged_files(collection: &Utf8Path) -> Result<Vec<String>, ScanError> {
    let staging = staging_dir(collection);
    let list_error = |source| ScanError::List {
        path: staging.clone(),
        source,
    };
    if !gispub_fs::dir_exists(&staging).map_err(list_error)? {
        return Ok(Vec::new());
    }
    let entries = gispub_fs::list_dir(&staging).map_err(list_error)?;
    Ok(entries
        .into_iter()
        .filter(gispub_fs::DirEntry::is_file)
        .map(|entry| entry.name)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        (dir, path)
    }

    #[rstest]
    fn root_with_file_and_two_subdirectories(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        fs::write(path.join("loose.zip"), b"zip").expect("write file");
        fs::create_dir(path.join("roads")).expect("mkdir roads");
        fs::create_dir(path.join(STAGING_DIR)).expect("mkdir output");

        let found = scan_collections(&path).expect("scan");
        assert_eq!(found, vec![path.clone(), path.join("roads")]);
    }

    #[rstest]
    fn root_without_files_is_skipped(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        fs::create_dir(path.join("zeta")).expect("mkdir");
        fs::create_dir(path.join("alpha")).expect("mkdir");

        let found = scan_collections(&path).expect("scan");
        assert_eq!(found, vec![path.join("alpha"), path.join("zeta")]);
    }

    #[rstest]
    fn missing_root_is_an_error(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        let missing = path.join("absent");
        let err = scan_collections(&missing).expect_err("listing a missing root fails");
        assert!(matches!(err, ScanError::List { path: failed, .. } if failed == missing));
    }

    #[rstest]
    fn lists_only_staged_files(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        let staging = staging_dir(&path);
        fs::create_dir_all(staging.join("nested")).expect("mkdir");
        fs::write(staging.join("b.zip"), b"").expect("write");
        fs::write(staging.join("a.tif"), b"").expect("write");

        let staged = list_staged_files(&path).expect("list staged");
        assert_eq!(staged, vec!["a.tif", "b.zip"]);
    }

    #[rstest]
    fn missing_staging_directory_is_empty(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        assert!(list_staged_files(&path).expect("list staged").is_empty());
    }
}
