//! Test helpers for staging dataset folders and project configuration.

use camino::{Utf8Path, Utf8PathBuf};
use gispub_core::DatasetDescriptor;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

use crate::adapters::DATASET_MANIFEST;
use crate::config::{ProjectConfig, PublishConfig};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write fixture");
}

/// A temporary dataset folder with an artifacts directory beside it.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) folder: Utf8PathBuf,
    pub(super) artifacts: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let folder = root.join("datasets");
        let artifacts = root.join("artifacts");
        fs::create_dir_all(&folder).expect("create dataset folder");
        fs::create_dir_all(&artifacts).expect("create artifacts dir");
        Self {
            _dir: dir,
            root,
            folder,
            artifacts,
        }
    }

    /// Stage `datasets` under `<folder>/<name>/output` with a manifest.
    pub(super) fn stage(&self, name: &str, datasets: &[DatasetDescriptor]) -> Utf8PathBuf {
        let collection = self.folder.join(name);
        let staging = collection.join("output");
        for dataset in datasets {
            write_utf8(&staging.join(&dataset.file_name), b"staged");
        }
        let manifest = serde_json::to_vec(datasets).expect("encode manifest");
        write_utf8(&staging.join(DATASET_MANIFEST), &manifest);
        collection
    }

    pub(super) fn config(&self) -> PublishConfig {
        PublishConfig {
            folder: self.folder.clone(),
            project_config: self.root.join("config.json"),
            debug: false,
            deploy: true,
            import_only: false,
            pacing: None,
            granularity: None,
            backend_host: None,
        }
    }
}

pub(super) fn project(features: &[&str]) -> ProjectConfig {
    serde_json::from_value(json!({
        "instance": "demo",
        "features": features,
        "deploy": { "strategy": "ssh", "host": "gis.example.org" }
    }))
    .expect("project config should decode")
}

pub(super) fn roads() -> DatasetDescriptor {
    DatasetDescriptor::vector("roads", "roads.zip")
}

pub(super) fn elevation() -> DatasetDescriptor {
    DatasetDescriptor::raster("elevation", "elevation.tif")
}
