//! Turn dataset batches into specification documents.

use serde::{Deserialize, Serialize};

use super::{DeploymentTarget, SpecificationText};
use crate::dataset::{DatasetBatch, DatasetDescriptor};
use crate::error::SynthesisError;

/// How directories are grouped into GIS instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchGranularity {
    /// One instance per run; every directory contributes its blocks and map.
    #[default]
    PerRun,
    /// One instance per directory, named `<instance>_<directory>`.
    PerDirectory,
}

impl std::str::FromStr for BatchGranularity {
    type Err = SynthesisError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "per-run" => Ok(Self::PerRun),
            "per-directory" => Ok(Self::PerDirectory),
            other => Err(SynthesisError::UnknownGranularity {
                value: other.to_owned(),
            }),
        }
    }
}

/// Complete specification text for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDocument {
    /// Instance named by the header and trailer.
    pub instance: String,
    /// Specification text.
    pub text: String,
    /// Datasets that contributed blocks, in emission order.
    pub datasets: Vec<DatasetDescriptor>,
}

impl SpecDocument {
    /// Whether any contributing dataset is raster.
    #[must_use]
    pub fn has_raster(&self) -> bool {
        self.datasets.iter().any(|dataset| dataset.kind.is_raster())
    }
}

/// Pure generator from dataset batches to specification documents.
///
/// # Examples
/// ```
/// use gispub_core::{BatchGranularity, DatasetBatch, DatasetDescriptor, DeploymentTarget, Synthesizer};
///
/// let batches = vec![
///     DatasetBatch::new("/data/a", vec![DatasetDescriptor::vector("roads", "roads.zip")]),
///     DatasetBatch::new("/data/b", vec![DatasetDescriptor::raster("dem", "dem.tif")]),
/// ];
/// let synth = Synthesizer::new("demo", DeploymentTarget::default())
///     .with_granularity(BatchGranularity::PerDirectory);
/// let docs = synth.synthesize(&batches)?;
/// assert_eq!(docs.len(), 2);
/// assert_eq!(docs[1].instance, "demo_b");
/// # Ok::<(), gispub_core::SynthesisError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Synthesizer {
    instance: String,
    deployment: DeploymentTarget,
    granularity: BatchGranularity,
}

impl Synthesizer {
    /// Create a synthesizer emitting one instance per run.
    pub fn new(instance: impl Into<String>, deployment: DeploymentTarget) -> Self {
        Self {
            instance: instance.into(),
            deployment,
            granularity: BatchGranularity::default(),
        }
    }

    /// Choose how directories map to instances.
    #[must_use]
    pub const fn with_granularity(mut self, granularity: BatchGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Configured granularity.
    #[must_use]
    pub const fn granularity(&self) -> BatchGranularity {
        self.granularity
    }

    /// Generate the documents for `batches`, in directory order.
    ///
    /// # Errors
    /// Returns [`SynthesisError`] when the instance name is not an
    /// identifier.
    pub fn synthesize(
        &self,
        batches: &[DatasetBatch],
    ) -> Result<Vec<SpecDocument>, SynthesisError> {
        match self.granularity {
            BatchGranularity::PerRun => Ok(vec![self.document(&self.instance, batches)?]),
            BatchGranularity::PerDirectory => batches
                .iter()
                .map(|batch| {
                    let name = format!("{}_{}", self.instance, batch.identifier());
                    self.document(&name, std::slice::from_ref(batch))
                })
                .collect(),
        }
    }

    fn document(
        &self,
        instance: &str,
        batches: &[DatasetBatch],
    ) -> Result<SpecDocument, SynthesisError> {
        let mut text = SpecificationText::new();
        text.open_instance(instance, &self.deployment)?;
        for batch in batches {
            log::debug!(
                "synthesizing {} dataset(s) from {}",
                batch.datasets.len(),
                batch.directory
            );
            text.append_batch(batch)?;
        }
        let closed = text.close_instance()?;
        Ok(SpecDocument {
            instance: closed,
            text: text.finish()?,
            datasets: batches
                .iter()
                .flat_map(|batch| batch.datasets.iter().cloned())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn batches() -> Vec<DatasetBatch> {
        vec![
            DatasetBatch::new(
                "/data/roads",
                vec![DatasetDescriptor::vector("road", "road.zip")],
            ),
            DatasetBatch::new(
                "/data/terrain",
                vec![
                    DatasetDescriptor::vector("contour", "contour.gpkg"),
                    DatasetDescriptor::raster("dem", "dem.tif"),
                ],
            ),
        ]
    }

    #[rstest]
    fn per_run_emits_one_instance_with_a_map_per_directory(batches: Vec<DatasetBatch>) {
        let docs = Synthesizer::new("demo", DeploymentTarget::default())
            .synthesize(&batches)
            .expect("synthesis succeeds");
        assert_eq!(docs.len(), 1);
        let doc = docs.first().expect("one document");
        assert_eq!(doc.instance, "demo");
        assert_eq!(doc.text.matches("CREATE GIS ").count(), 1);
        assert_eq!(doc.text.matches("GENERATE GIS demo;").count(), 1);
        assert_eq!(doc.text.matches("CREATE MAP ").count(), 2);
        assert_eq!(doc.datasets.len(), 3);
        assert!(doc.has_raster());
    }

    #[rstest]
    fn per_directory_emits_one_instance_each(batches: Vec<DatasetBatch>) {
        let docs = Synthesizer::new("demo", DeploymentTarget::default())
            .with_granularity(BatchGranularity::PerDirectory)
            .synthesize(&batches)
            .expect("synthesis succeeds");
        let names: Vec<&str> = docs.iter().map(|doc| doc.instance.as_str()).collect();
        assert_eq!(names, vec!["demo_roads", "demo_terrain"]);
        for doc in &docs {
            assert_eq!(doc.text.matches("CREATE GIS ").count(), 1);
            assert_eq!(doc.text.matches("GENERATE GIS ").count(), 1);
            assert!(doc.text.ends_with(&format!("GENERATE GIS {};\n", doc.instance)));
        }
        assert!(!docs.first().expect("roads").has_raster());
        assert!(docs.get(1).expect("terrain").has_raster());
    }

    #[rstest]
    #[case("/data/ríos", "demo_rOs", "CREATE MAP rOsMap")]
    #[case("/data/2024", "demo_dir2024", "CREATE MAP dir2024Map")]
    #[case("/data/north-east", "demo_northEast", "CREATE MAP northEastMap")]
    fn per_directory_names_from_awkward_labels_are_valid(
        #[case] directory: &str,
        #[case] instance: &str,
        #[case] map: &str,
    ) {
        let batch = DatasetBatch::new(directory, vec![DatasetDescriptor::raster("dem", "dem.tif")]);
        let docs = Synthesizer::new("demo", DeploymentTarget::default())
            .with_granularity(BatchGranularity::PerDirectory)
            .synthesize(&[batch])
            .expect("derived instance names are identifiers");
        let [doc] = docs.as_slice() else {
            panic!("expected one document, found {docs:?}");
        };
        assert_eq!(doc.instance, instance);
        assert!(doc.text.contains(map), "{}", doc.text);
    }

    #[rstest]
    fn invalid_instance_name_fails() {
        let err = Synthesizer::new("not valid", DeploymentTarget::default())
            .synthesize(&[])
            .expect_err("name with a space is rejected");
        assert!(matches!(err, SynthesisError::InvalidInstanceName { .. }));
    }

    #[rstest]
    #[case("per-run", BatchGranularity::PerRun)]
    #[case("per-directory", BatchGranularity::PerDirectory)]
    fn parses_granularity(#[case] raw: &str, #[case] expected: BatchGranularity) {
        assert_eq!(raw.parse::<BatchGranularity>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_granularity() {
        assert!("hourly".parse::<BatchGranularity>().is_err());
    }
}
