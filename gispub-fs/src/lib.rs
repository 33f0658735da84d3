//! Capability-scoped filesystem access for dataset folders and run artifacts.
//!
//! Every helper opens the narrowest ambient directory it needs and performs
//! the operation through `cap-std`, so callers never open paths through
//! `std::fs` directly. Paths are UTF-8 throughout.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Read};
use std::path::Component;

/// What a directory entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symlink, socket or anything else.
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name relative to the listed directory.
    pub name: String,
    /// Entry type.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Whether the entry is a regular file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Whether the entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Open a dataset or configuration file for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open a staged file for a streamed upload.
pub fn open_for_streaming(path: &Utf8Path) -> io::Result<std::fs::File> {
    open_utf8_file(path).map(fs_utf8::File::into_std)
}

/// Read a whole file as UTF-8 text.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let mut file = open_utf8_file(path)?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(text)
}

/// List the entries of `path` sorted by name.
///
/// Listing order is normalised so repeated runs visit collections in the
/// same order regardless of the platform's directory iteration.
pub fn list_dir(path: &Utf8Path) -> io::Result<Vec<DirEntry>> {
    let dir = fs_utf8::Dir::open_ambient_dir(path, ambient_authority())?;
    let mut entries = Vec::new();
    for item in dir.entries()? {
        let entry = item?;
        let file_type = entry.file_type()?;
        let kind = if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        };
        entries.push(DirEntry {
            name: entry.file_name()?,
            kind,
        });
    }
    entries.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(entries)
}

/// Whether `path` exists and is a directory. Missing paths yield `false`.
pub fn dir_exists(path: &Utf8Path) -> io::Result<bool> {
    match fs_utf8::Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(_) => Ok(true),
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Resolve an ambient directory for the given path and return the directory with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Whether `path` exists and is a regular file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Write `contents` to `path`, creating parent directories and replacing any
/// existing file.
pub fn write_artifact(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.write(name.as_str(), contents)
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    if relative.as_os_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Split a parent path into an ambient base directory and a relative suffix.
fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (base, relative) = match std_parent.components().next() {
        // Drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn root() -> (TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        (dir, path)
    }

    #[rstest]
    fn lists_entries_sorted_with_kinds(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        write_artifact(&path.join("b.zip"), b"zip").expect("write file");
        write_artifact(&path.join("a/inner.txt"), b"x").expect("write nested");
        let entries = list_dir(&path).expect("list");
        let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b.zip"]);
        assert!(entries.first().is_some_and(DirEntry::is_dir));
        assert!(entries.get(1).is_some_and(DirEntry::is_file));
    }

    #[rstest]
    fn writes_and_reads_artifacts(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        let target = path.join("deep/nested/demo.spec");
        write_artifact(&target, b"CREATE GIS demo USING 4326;").expect("write");
        assert!(file_is_file(&target).expect("stat"));
        assert_eq!(
            read_to_string(&target).expect("read"),
            "CREATE GIS demo USING 4326;"
        );
        let opened = open_for_streaming(&target).expect("open for streaming");
        assert_eq!(opened.metadata().expect("metadata").len(), 27);
    }

    #[rstest]
    fn missing_paths_report_false(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        assert!(!dir_exists(&path.join("output")).expect("check dir"));
        assert!(!file_is_file(&path.join("absent.json")).expect("check file"));
        assert!(dir_exists(&path).expect("check root"));
    }

    #[rstest]
    fn ensure_parent_dir_is_idempotent(root: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = root;
        let target = path.join("x/y/z.json");
        ensure_parent_dir(&target).expect("first");
        ensure_parent_dir(&target).expect("second");
        assert!(dir_exists(&path.join("x/y")).expect("check nested"));
    }
}
