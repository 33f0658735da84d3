//! Compiled product descriptors and the feature flags selected for them.
//!
//! The spec compiler turns specification text into a [`CompiledDescriptor`].
//! [`FeatureSelector::apply`] then replaces its feature set with the
//! configured list (when one is given) and adds the raster flags whenever
//! the batch contains a raster dataset.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::DatasetDescriptor;

/// Feature flag enabling raster map serving.
pub const RASTER_MAP_SERVING_FEATURE: &str = "RasterMapServing";
/// Feature flag enabling raster layer import.
pub const RASTER_IMPORT_FEATURE: &str = "RasterImport";

/// Descriptor metadata emitted by the spec compiler.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasicData {
    /// Product version string.
    #[serde(default)]
    pub version: String,
    /// Remaining compiler metadata, forwarded untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Structured product descriptor produced by compiling specification text.
///
/// Unknown keys are preserved so the descriptor can be handed to the product
/// engine exactly as the compiler produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledDescriptor {
    /// Compiler metadata.
    #[serde(default)]
    pub basic_data: BasicData,
    /// Enabled feature flags, without duplicates.
    #[serde(default)]
    pub features: Vec<String>,
    /// Remaining descriptor content.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompiledDescriptor {
    /// Add `feature` unless it is already enabled.
    pub fn enable(&mut self, feature: &str) {
        if !self.features.iter().any(|existing| existing == feature) {
            self.features.push(feature.to_owned());
        }
    }

    /// Whether `feature` is enabled.
    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|existing| existing == feature)
    }
}

/// Applies configured and derived feature flags to compiled descriptors.
///
/// # Examples
/// ```
/// use gispub_core::{CompiledDescriptor, DatasetDescriptor, FeatureSelector, RASTER_IMPORT_FEATURE};
///
/// let mut descriptor = CompiledDescriptor::default();
/// descriptor.features = vec!["Compiled".to_owned()];
/// let selector = FeatureSelector::new(vec!["A".to_owned(), "B".to_owned()]);
/// let datasets = [DatasetDescriptor::raster("dem", "dem.tif")];
/// selector.apply(&mut descriptor, &datasets);
/// assert!(!descriptor.has_feature("Compiled"));
/// assert!(descriptor.has_feature(RASTER_IMPORT_FEATURE));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureSelector {
    explicit: Vec<String>,
}

impl FeatureSelector {
    /// Select features from an explicit list; an empty list keeps the
    /// compiler's selection.
    #[must_use]
    pub const fn new(explicit: Vec<String>) -> Self {
        Self { explicit }
    }

    /// Apply the selection to `descriptor` for the given datasets.
    pub fn apply<'a, I>(&self, descriptor: &mut CompiledDescriptor, datasets: I)
    where
        I: IntoIterator<Item = &'a DatasetDescriptor>,
    {
        if !self.explicit.is_empty() {
            descriptor.features.clear();
            for feature in &self.explicit {
                descriptor.enable(feature);
            }
        }
        if datasets.into_iter().any(|dataset| dataset.kind.is_raster()) {
            descriptor.enable(RASTER_MAP_SERVING_FEATURE);
            descriptor.enable(RASTER_IMPORT_FEATURE);
        }
    }
}
