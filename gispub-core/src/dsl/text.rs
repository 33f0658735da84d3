//! Append-only specification buffer guarding the instance header/trailer pairing.

use super::{DeploymentTarget, blocks};
use crate::dataset::{DatasetBatch, DatasetKind};
use crate::error::SynthesisError;

/// Specification text under construction.
///
/// Every logical GIS instance is bracketed by exactly one header and one
/// trailer naming the same instance. Blocks may only be appended while an
/// instance is open.
///
/// # Examples
/// ```
/// use gispub_core::{DatasetBatch, DatasetDescriptor, DeploymentTarget, SpecificationText};
///
/// let mut text = SpecificationText::new();
/// text.open_instance("demo", &DeploymentTarget::default())?;
/// text.append_batch(&DatasetBatch::new("/data/city", vec![DatasetDescriptor::vector("parcel", "parcel.zip")]))?;
/// text.close_instance()?;
/// assert!(text.as_str().starts_with("CREATE GIS demo USING 4326;"));
/// assert!(text.as_str().ends_with("GENERATE GIS demo;\n"));
/// # Ok::<(), gispub_core::SynthesisError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecificationText {
    text: String,
    open: Option<String>,
}

impl SpecificationText {
    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            open: None,
        }
    }

    /// Emit the header and deployment block for `instance`.
    ///
    /// # Errors
    /// Returns [`SynthesisError::InvalidInstanceName`] for names that are not
    /// identifiers and [`SynthesisError::InstanceAlreadyOpen`] when another
    /// instance has not been closed yet.
    pub fn open_instance(
        &mut self,
        instance: &str,
        deployment: &DeploymentTarget,
    ) -> Result<(), SynthesisError> {
        if let Some(open) = &self.open {
            return Err(SynthesisError::InstanceAlreadyOpen {
                open: open.clone(),
                requested: instance.to_owned(),
            });
        }
        if !is_identifier(instance) {
            return Err(SynthesisError::InvalidInstanceName {
                name: instance.to_owned(),
            });
        }
        self.text.push_str(&blocks::header(instance, deployment));
        self.open = Some(instance.to_owned());
        Ok(())
    }

    /// Append entity, style, layer and map blocks for one batch.
    ///
    /// Raster datasets contribute a style and a layer but no entity.
    ///
    /// # Errors
    /// Returns [`SynthesisError::NoOpenInstance`] when called outside an
    /// instance.
    pub fn append_batch(&mut self, batch: &DatasetBatch) -> Result<(), SynthesisError> {
        if self.open.is_none() {
            return Err(SynthesisError::NoOpenInstance);
        }
        for dataset in &batch.datasets {
            if dataset.kind == DatasetKind::Vector {
                self.text.push_str(&blocks::entity(dataset));
            }
            self.text.push_str(&blocks::style(dataset, &batch.directory));
            self.text.push_str(&blocks::layer(dataset));
        }
        self.text.push_str(&blocks::map(batch));
        Ok(())
    }

    /// Emit the trailer for the open instance and return its name.
    ///
    /// # Errors
    /// Returns [`SynthesisError::NoOpenInstance`] when nothing is open.
    pub fn close_instance(&mut self) -> Result<String, SynthesisError> {
        let instance = self.open.take().ok_or(SynthesisError::NoOpenInstance)?;
        self.text.push_str(&blocks::trailer(&instance));
        Ok(instance)
    }

    /// Text accumulated so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the buffer once every instance is closed.
    ///
    /// # Errors
    /// Returns [`SynthesisError::UnclosedInstance`] while an instance is open.
    pub fn finish(self) -> Result<String, SynthesisError> {
        match self.open {
            Some(name) => Err(SynthesisError::UnclosedInstance { name }),
            None => Ok(self.text),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
