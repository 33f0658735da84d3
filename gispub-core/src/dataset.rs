//! Dataset descriptors produced by the external schema extractor.
//!
//! A descriptor is immutable once extracted: the synthesizer reads its schema
//! to emit entity and style blocks, and the import orchestrator reads its kind
//! to decide which upload protocol a staged file follows.
//!
//! # Examples
//! ```
//! use gispub_core::{DatasetDescriptor, DatasetKind, FieldDescriptor};
//!
//! let parcels = DatasetDescriptor::vector("parcel", "parcel.zip")
//!     .with_field(FieldDescriptor::new("area", "Number"))
//!     .with_field(FieldDescriptor::new("geom", "MultiPolygon"));
//! assert_eq!(parcels.kind, DatasetKind::Vector);
//! assert_eq!(parcels.file_stem(), "parcel");
//! ```

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::naming::identifier;

/// Whether a dataset carries features (vector) or pixels (raster).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Feature collection with an attribute schema.
    #[serde(alias = "shapefile", alias = "geoPackage", alias = "vector")]
    Vector,
    /// Gridded image such as a GeoTIFF.
    #[serde(alias = "geoTIFF", alias = "raster")]
    Raster,
}

impl DatasetKind {
    /// Return `true` for raster datasets.
    #[must_use]
    pub const fn is_raster(self) -> bool {
        matches!(self, Self::Raster)
    }
}

/// A single attribute column of a dataset schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name as found in the source file.
    pub name: String,
    /// Source type name (`Number`, `String`, or a geometry type).
    #[serde(rename = "type")]
    pub field_type: String,
}

impl FieldDescriptor {
    /// Construct a field from its name and source type.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }

    /// Geometry type carried by this field, if its type names one.
    #[must_use]
    pub fn geometry_type(&self) -> Option<GeometryType> {
        GeometryType::parse(&self.field_type)
    }
}

/// Single-part geometry tags understood by the style grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// Point and multi-point layers.
    Point,
    /// Line and multi-line layers.
    LineString,
    /// Polygon and multi-polygon layers.
    Polygon,
}

impl GeometryType {
    /// Parse a geometry type name, folding multi-part variants.
    ///
    /// # Examples
    /// ```
    /// use gispub_core::GeometryType;
    ///
    /// assert_eq!(GeometryType::parse("MultiPolygon"), Some(GeometryType::Polygon));
    /// assert_eq!(GeometryType::parse("Number"), None);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let single = raw.strip_prefix("Multi").unwrap_or(raw);
        match single {
            "Point" => Some(Self::Point),
            "LineString" => Some(Self::LineString),
            "Polygon" => Some(Self::Polygon),
            _ => None,
        }
    }

    /// Tag emitted in style blocks.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Polygon => "Polygon",
        }
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema and metadata for one importable geographic file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescriptor {
    /// Dataset name, usually the file stem.
    pub name: String,
    /// Staged file the dataset was extracted from.
    pub file_name: String,
    /// Vector or raster.
    #[serde(rename = "type")]
    pub kind: DatasetKind,
    /// Ordered attribute columns.
    #[serde(default)]
    pub schema: Vec<FieldDescriptor>,
    /// Whether a pre-supplied `.sld` style sits next to the dataset.
    #[serde(default)]
    pub has_style: bool,
}

impl DatasetDescriptor {
    /// Describe a vector dataset with an empty schema.
    pub fn vector(name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::new(name, file_name, DatasetKind::Vector)
    }

    /// Describe a raster dataset.
    pub fn raster(name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::new(name, file_name, DatasetKind::Raster)
    }

    fn new(name: impl Into<String>, file_name: impl Into<String>, kind: DatasetKind) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            kind,
            schema: Vec::new(),
            has_style: false,
        }
    }

    /// Append a schema column.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.schema.push(field);
        self
    }

    /// Mark the dataset as shipping its own style file.
    #[must_use]
    pub const fn with_style(mut self) -> Self {
        self.has_style = true;
        self
    }

    /// File name without its final extension.
    #[must_use]
    pub fn file_stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem)
    }

    /// Geometry of the first geometry-typed column, if any.
    #[must_use]
    pub fn geometry_type(&self) -> Option<GeometryType> {
        self.schema.iter().find_map(FieldDescriptor::geometry_type)
    }
}

/// Descriptors extracted from one dataset collection directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetBatch {
    /// Directory holding the collection.
    pub directory: Utf8PathBuf,
    /// Descriptors in extraction order.
    pub datasets: Vec<DatasetDescriptor>,
}

impl DatasetBatch {
    /// Group descriptors under their collection directory.
    pub fn new(directory: impl Into<Utf8PathBuf>, datasets: Vec<DatasetDescriptor>) -> Self {
        Self {
            directory: directory.into(),
            datasets,
        }
    }

    /// Human label for the batch, taken from the directory name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.directory.file_name().unwrap_or("root")
    }

    /// Identifier derived from [`Self::label`] for map and instance names.
    #[must_use]
    pub fn identifier(&self) -> String {
        identifier(self.label())
    }

    /// Whether any dataset in the batch is raster.
    #[must_use]
    pub fn has_raster(&self) -> bool {
        self.datasets.iter().any(|dataset| dataset.kind.is_raster())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Point", Some(GeometryType::Point))]
    #[case("MultiPoint", Some(GeometryType::Point))]
    #[case("MultiLineString", Some(GeometryType::LineString))]
    #[case("MultiPolygon", Some(GeometryType::Polygon))]
    #[case("Multi", None)]
    #[case("String", None)]
    fn folds_multi_part_geometries(#[case] raw: &str, #[case] expected: Option<GeometryType>) {
        assert_eq!(GeometryType::parse(raw), expected);
    }

    #[rstest]
    #[case("parcel.zip", "parcel")]
    #[case("roads.v2.gpkg", "roads.v2")]
    #[case("noextension", "noextension")]
    fn file_stem_drops_last_extension(#[case] file_name: &str, #[case] stem: &str) {
        let dataset = DatasetDescriptor::vector("x", file_name);
        assert_eq!(dataset.file_stem(), stem);
    }

    #[rstest]
    fn deserialises_extractor_manifest() {
        let json = r#"[
            {"name": "parcel", "fileName": "parcel.zip", "type": "shapefile",
             "schema": [{"name": "area", "type": "Number"}]},
            {"name": "dem", "fileName": "dem.tif", "type": "geoTIFF", "hasStyle": true}
        ]"#;
        let datasets: Vec<DatasetDescriptor> =
            serde_json::from_str(json).expect("manifest should deserialise");
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].kind, DatasetKind::Vector);
        assert_eq!(datasets[0].schema[0], FieldDescriptor::new("area", "Number"));
        assert_eq!(datasets[1].kind, DatasetKind::Raster);
        assert!(datasets[1].has_style);
        assert!(datasets[1].schema.is_empty());
    }

    #[rstest]
    fn batch_reports_raster_presence() {
        let vector_only =
            DatasetBatch::new("/data/a", vec![DatasetDescriptor::vector("a", "a.zip")]);
        let mixed = DatasetBatch::new(
            "/data/b",
            vec![
                DatasetDescriptor::vector("b", "b.zip"),
                DatasetDescriptor::raster("dem", "dem.tif"),
            ],
        );
        assert!(!vector_only.has_raster());
        assert!(mixed.has_raster());
        assert_eq!(mixed.label(), "b");
    }

    #[rstest]
    #[case("/data/land_use", "landUse")]
    #[case("/data/ríos", "rOs")]
    #[case("/data/2024", "dir2024")]
    #[case("/", "root")]
    fn batch_identifier_is_a_valid_name(#[case] directory: &str, #[case] expected: &str) {
        let batch = DatasetBatch::new(directory, Vec::new());
        assert_eq!(batch.identifier(), expected);
    }
}
