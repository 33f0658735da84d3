//! Classification of staged files into vector and raster uploads.
//!
//! A staged file is importable only when its extension is recognised and the
//! extractor recorded a dataset of the matching kind under the same file
//! name. Anything else is skipped.

use camino::{Utf8Path, Utf8PathBuf};
use gispub_core::{DatasetDescriptor, DatasetKind};

use crate::scan::staging_dir;

/// Vector container formats accepted by the import endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorFormat {
    /// Zipped ESRI shapefile.
    Shapefile,
    /// OGC GeoPackage.
    GeoPackage,
}

impl VectorFormat {
    /// Name sent as the upload `type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shapefile => "shapefile",
            Self::GeoPackage => "geoPackage",
        }
    }
}

/// Kind of upload implied by a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedKind {
    /// Two-phase vector import.
    Vector(VectorFormat),
    /// Single-phase raster layer import.
    Raster,
}

impl StagedKind {
    /// Classify `file_name` by extension, ignoring case.
    ///
    /// Bare extensions such as `.zip` have no stem and are rejected.
    ///
    /// # Examples
    /// ```
    /// use gispub_data::{StagedKind, VectorFormat};
    ///
    /// assert_eq!(StagedKind::from_file_name("a.GPKG"), Some(StagedKind::Vector(VectorFormat::GeoPackage)));
    /// assert_eq!(StagedKind::from_file_name("dem.tiff"), Some(StagedKind::Raster));
    /// assert_eq!(StagedKind::from_file_name(".zip"), None);
    /// ```
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        match extension.to_ascii_lowercase().as_str() {
            "zip" => Some(Self::Vector(VectorFormat::Shapefile)),
            "gpkg" => Some(Self::Vector(VectorFormat::GeoPackage)),
            "tif" | "tiff" => Some(Self::Raster),
            _ => None,
        }
    }

    const fn dataset_kind(self) -> DatasetKind {
        match self {
            Self::Vector(_) => DatasetKind::Vector,
            Self::Raster => DatasetKind::Raster,
        }
    }
}

/// A staged file scheduled for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// File name inside the staging directory.
    pub name: String,
    /// Full path of the file.
    pub path: Utf8PathBuf,
}

impl StagedFile {
    /// File name without its extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }
}

/// A staged vector file and its container format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedVector {
    /// File to upload.
    pub file: StagedFile,
    /// Container format.
    pub format: VectorFormat,
}

/// Staged files of one collection split by upload protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedPartition {
    /// Files following the two-phase vector import.
    pub vector: Vec<StagedVector>,
    /// Files following the raster layer import.
    pub raster: Vec<StagedFile>,
    /// Files that are not importable.
    pub skipped: Vec<String>,
}

impl StagedPartition {
    /// Split `file_names` staged under `collection` using the extractor's
    /// dataset records.
    #[must_use]
    pub fn classify(
        collection: &Utf8Path,
        file_names: &[String],
        datasets: &[DatasetDescriptor],
    ) -> Self {
        let staging = staging_dir(collection);
        let mut partition = Self::default();
        for name in file_names {
            let kind = StagedKind::from_file_name(name).filter(|kind| {
                datasets.iter().any(|dataset| {
                    dataset.file_name == *name && dataset.kind == kind.dataset_kind()
                })
            });
            let file = StagedFile {
                name: name.clone(),
                path: staging.join(name),
            };
            match kind {
                Some(StagedKind::Vector(format)) => {
                    partition.vector.push(StagedVector { file, format });
                }
                Some(StagedKind::Raster) => partition.raster.push(file),
                None => partition.skipped.push(name.clone()),
            }
        }
        partition
    }

    /// Number of files scheduled for upload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vector.len() + self.raster.len()
    }

    /// Whether nothing is scheduled for upload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
