//! Backend entities and the reconciliation rules applied to them.
//!
//! The import orchestrator fetches the entity catalog once per run. Staged
//! files are matched to entities through an [`EntityResolver`], raw column
//! names are matched to entity properties with [`ColumnMapping::reconcile`],
//! and [`refresh_segment`] names the per-entity bounding-box endpoint.

use serde::{Deserialize, Serialize};

use crate::naming::{camel_case, pascal_case};

/// Name of the entity property that stores feature geometry.
pub const GEOMETRY_PROPERTY: &str = "geometry";

/// A typed attribute of a backend entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProperty {
    /// Property name in camelCase.
    pub name: String,
    /// Backend type name.
    #[serde(rename = "type")]
    pub property_type: String,
}

impl EntityProperty {
    /// Construct a property from its name and type.
    pub fn new(name: impl Into<String>, property_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: property_type.into(),
        }
    }
}

/// Entity materialised by the backend from the generated specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntity {
    /// Fully qualified dotted name, e.g. `app.domain.Parcel`.
    pub name: String,
    /// Declared properties.
    #[serde(default)]
    pub properties: Vec<EntityProperty>,
}

impl RemoteEntity {
    /// Construct an entity with the given properties.
    pub fn new(name: impl Into<String>, properties: Vec<EntityProperty>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Last component of the dotted name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    fn property(&self, name: &str) -> Option<&EntityProperty> {
        self.properties.iter().find(|property| property.name == name)
    }
}

/// Strategy that picks the entity owning a dataset.
///
/// Implementations receive the dataset name (usually the staged file stem)
/// and the catalog fetched for the current run.
pub trait EntityResolver {
    /// Return the entity that owns `dataset_name`, if any.
    fn resolve<'a>(
        &self,
        dataset_name: &str,
        catalog: &'a [RemoteEntity],
    ) -> Option<&'a RemoteEntity>;
}

/// Matches `PascalCase(dataset name)` against the last dotted component.
///
/// This is stricter than a plain `ends_with` on the dotted name: the match
/// must cover the whole component, so `Parcel` matches `app.model.Parcel`
/// but not `app.model.SubParcel`.
///
/// # Examples
/// ```
/// use gispub_core::{EntityResolver, RemoteEntity, SuffixEntityResolver};
///
/// let catalog = vec![
///     RemoteEntity::new("app.model.SubParcel", vec![]),
///     RemoteEntity::new("app.model.Parcel", vec![]),
/// ];
/// let entity = SuffixEntityResolver.resolve("parcel", &catalog);
/// assert_eq!(entity.map(|e| e.name.as_str()), Some("app.model.Parcel"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixEntityResolver;

impl EntityResolver for SuffixEntityResolver {
    fn resolve<'a>(
        &self,
        dataset_name: &str,
        catalog: &'a [RemoteEntity],
    ) -> Option<&'a RemoteEntity> {
        let wanted = pascal_case(dataset_name);
        if wanted.is_empty() {
            return None;
        }
        catalog.iter().find(|entity| entity.simple_name() == wanted)
    }
}

/// Raw column names paired with the entity properties they feed.
///
/// Serialises as a JSON array with `null` for unresolved columns, which is
/// the shape the backend's import update expects.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ColumnMapping(Vec<Option<EntityProperty>>);

impl ColumnMapping {
    /// Map each raw attribute to a property of `entity`.
    ///
    /// Attributes containing `geom` (any case) map to the property named
    /// `geometry` (any case); others map to the property named `camelCase(attribute)`.
    /// With no entity every column stays unresolved.
    ///
    /// # Examples
    /// ```
    /// use gispub_core::{ColumnMapping, EntityProperty, RemoteEntity};
    ///
    /// let entity = RemoteEntity::new(
    ///     "app.Parcel",
    ///     vec![EntityProperty::new("geometry", "MultiPolygon"), EntityProperty::new("landUse", "String")],
    /// );
    /// let values = ["THE_GEOM".to_owned(), "LAND_USE".to_owned(), "extra".to_owned()];
    /// let mapping = ColumnMapping::reconcile(&values, Some(&entity));
    /// assert_eq!(mapping.resolved_count(), 2);
    /// assert_eq!(mapping.len(), 3);
    /// ```
    #[must_use]
    pub fn reconcile(values: &[String], entity: Option<&RemoteEntity>) -> Self {
        let columns = values
            .iter()
            .map(|raw| entity.and_then(|target| match_column(raw, target)).cloned())
            .collect();
        Self(columns)
    }

    /// Number of raw columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of columns matched to a property.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.0.iter().filter(|column| column.is_some()).count()
    }

    /// Iterate over the mapped columns in raw order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&EntityProperty>> {
        self.0.iter().map(Option::as_ref)
    }
}

fn match_column<'a>(raw: &str, entity: &'a RemoteEntity) -> Option<&'a EntityProperty> {
    if raw.to_lowercase().contains("geom") {
        entity
            .properties
            .iter()
            .find(|property| property.name.eq_ignore_ascii_case(GEOMETRY_PROPERTY))
    } else {
        entity.property(&camel_case(raw))
    }
}

/// Path segment of the bounding-box restart endpoint for `entity_name`.
///
/// # Examples
/// ```
/// use gispub_core::refresh_segment;
///
/// assert_eq!(refresh_segment("app.model.LandParcel"), "landParcels");
/// ```
#[must_use]
pub fn refresh_segment(entity_name: &str) -> String {
    let simple = entity_name.rsplit('.').next().unwrap_or(entity_name);
    let mut chars = simple.chars();
    let mut segment: String = chars
        .next()
        .map(|first| first.to_lowercase().chain(chars).collect())
        .unwrap_or_default();
    segment.push('s');
    segment
}
