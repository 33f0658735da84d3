//! In-memory collaborators used by unit and behaviour tests.

use std::cell::RefCell;
use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;

use crate::{
    Collaborator, CollaboratorError, CompiledDescriptor, DatasetDescriptor, DeployStrategy,
    Deployer, GenerationRequest, ProductEngine, SchemaExtractor, SpecCompiler,
};

/// Compiler returning a fixed descriptor and recording every text it saw.
///
/// # Examples
/// ```
/// use gispub_core::SpecCompiler;
/// use gispub_core::test_support::StubCompiler;
///
/// let compiler = StubCompiler::with_features(&["Base"]);
/// let descriptor = compiler.compile("CREATE GIS demo USING 4326;")?;
/// assert_eq!(descriptor.features, vec!["Base".to_owned()]);
/// assert_eq!(compiler.compiled().len(), 1);
/// # Ok::<(), gispub_core::CollaboratorError>(())
/// ```
#[derive(Debug, Default)]
pub struct StubCompiler {
    descriptor: CompiledDescriptor,
    reject: Option<String>,
    seen: RefCell<Vec<String>>,
}

impl StubCompiler {
    /// Compile every input to a descriptor with `features`.
    #[must_use]
    pub fn with_features(features: &[&str]) -> Self {
        Self {
            descriptor: CompiledDescriptor {
                features: features.iter().map(|f| (*f).to_owned()).collect(),
                ..CompiledDescriptor::default()
            },
            ..Self::default()
        }
    }

    /// Reject every input with `message`.
    #[must_use]
    pub fn rejecting(message: &str) -> Self {
        Self {
            reject: Some(message.to_owned()),
            ..Self::default()
        }
    }

    /// Texts passed to [`SpecCompiler::compile`], in call order.
    #[must_use]
    pub fn compiled(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl SpecCompiler for StubCompiler {
    fn compile(&self, text: &str) -> Result<CompiledDescriptor, CollaboratorError> {
        self.seen.borrow_mut().push(text.to_owned());
        if let Some(message) = &self.reject {
            return Err(CollaboratorError::Rejected {
                collaborator: Collaborator::SpecCompiler,
                message: message.clone(),
            });
        }
        Ok(self.descriptor.clone())
    }
}

/// Extractor serving descriptors from an in-memory directory map.
#[derive(Debug, Default)]
pub struct StubExtractor {
    datasets: HashMap<Utf8PathBuf, Vec<DatasetDescriptor>>,
}

impl StubExtractor {
    /// Register the descriptors for `directory`.
    #[must_use]
    pub fn with_directory(
        mut self,
        directory: impl Into<Utf8PathBuf>,
        datasets: Vec<DatasetDescriptor>,
    ) -> Self {
        self.datasets.insert(directory.into(), datasets);
        self
    }
}

impl SchemaExtractor for StubExtractor {
    fn extract(&self, directory: &Utf8Path) -> Result<Vec<DatasetDescriptor>, CollaboratorError> {
        self.datasets
            .get(directory)
            .cloned()
            .ok_or_else(|| CollaboratorError::MissingInput {
                collaborator: Collaborator::SchemaExtractor,
                path: directory.to_path_buf(),
            })
    }
}

/// Product engine recording the descriptors it was asked to generate.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    generated: RefCell<Vec<(GenerationRequest, CompiledDescriptor)>>,
}

impl RecordingEngine {
    /// Requests received so far.
    #[must_use]
    pub fn generated(&self) -> Vec<(GenerationRequest, CompiledDescriptor)> {
        self.generated.borrow().clone()
    }
}

impl ProductEngine for RecordingEngine {
    fn generate(
        &self,
        request: &GenerationRequest,
        descriptor: &CompiledDescriptor,
    ) -> Result<Utf8PathBuf, CollaboratorError> {
        self.generated
            .borrow_mut()
            .push((request.clone(), descriptor.clone()));
        Ok(Utf8PathBuf::from(request.output_dir.as_str()))
    }
}

/// Deployer recording each deployment.
#[derive(Debug, Default)]
pub struct RecordingDeployer {
    deployed: RefCell<Vec<(DeployStrategy, Value, Utf8PathBuf)>>,
}

impl RecordingDeployer {
    /// Deployments received so far.
    #[must_use]
    pub fn deployed(&self) -> Vec<(DeployStrategy, Value, Utf8PathBuf)> {
        self.deployed.borrow().clone()
    }
}

impl Deployer for RecordingDeployer {
    fn deploy(
        &self,
        strategy: DeployStrategy,
        record: &Value,
        output: &Utf8Path,
    ) -> Result<(), CollaboratorError> {
        self.deployed
            .borrow_mut()
            .push((strategy, record.clone(), output.to_path_buf()));
        Ok(())
    }
}
