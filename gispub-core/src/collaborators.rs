//! Seams to the external programs the publisher drives.
//!
//! Compilation, schema extraction, product generation and deployment are
//! implemented elsewhere. The pipeline only depends on these traits so tests
//! can substitute the doubles in [`crate::test_support`].

use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::DatasetDescriptor;
use crate::error::CollaboratorError;
use crate::features::CompiledDescriptor;

/// Parses specification text into a structured descriptor.
pub trait SpecCompiler {
    /// Compile `text`.
    ///
    /// # Errors
    /// Returns [`CollaboratorError::Rejected`] for malformed text.
    fn compile(&self, text: &str) -> Result<CompiledDescriptor, CollaboratorError>;
}

/// Reads dataset schemas for one collection directory.
pub trait SchemaExtractor {
    /// Describe the datasets staged under `directory`.
    ///
    /// # Errors
    /// Returns [`CollaboratorError`] when the schemas cannot be read.
    fn extract(&self, directory: &Utf8Path) -> Result<Vec<DatasetDescriptor>, CollaboratorError>;
}

/// Inputs handed to the product engine alongside the compiled descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Location of the product line sources.
    pub code_path: Utf8PathBuf,
    /// Feature model document contents.
    pub feature_model: String,
    /// Parsed platform configuration.
    pub platform_config: Value,
    /// Extra client script contents.
    #[serde(rename = "extraJS")]
    pub extra_js: String,
    /// Model transformation contents.
    pub model_transformation: String,
    /// Whether the engine should log verbosely.
    pub verbose: bool,
    /// Name of the directory the product is written to.
    pub output_dir: String,
}

/// Materialises a product tree from a compiled descriptor.
pub trait ProductEngine {
    /// Generate the product and return the directory it was written to.
    ///
    /// # Errors
    /// Returns [`CollaboratorError`] when generation fails.
    fn generate(
        &self,
        request: &GenerationRequest,
        descriptor: &CompiledDescriptor,
    ) -> Result<Utf8PathBuf, CollaboratorError>;
}

/// Delivery mechanism for generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStrategy {
    /// Copy over SSH to a remote host.
    Ssh,
    /// Push to a cloud provider.
    Cloud,
    /// Run on the local machine.
    #[default]
    Local,
}

impl DeployStrategy {
    /// Name passed to the deployer.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Cloud => "cloud",
            Self::Local => "local",
        }
    }
}

impl FromStr for DeployStrategy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "ssh" => Ok(Self::Ssh),
            "cloud" => Ok(Self::Cloud),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown deploy strategy {other:?}")),
        }
    }
}

/// Ships a generated product.
pub trait Deployer {
    /// Deploy `output` using `strategy` and the strategy-specific `record`.
    ///
    /// # Errors
    /// Returns [`CollaboratorError`] when deployment fails.
    fn deploy(
        &self,
        strategy: DeployStrategy,
        record: &Value,
        output: &Utf8Path,
    ) -> Result<(), CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ssh", DeployStrategy::Ssh)]
    #[case("cloud", DeployStrategy::Cloud)]
    #[case("local", DeployStrategy::Local)]
    fn parses_strategies(#[case] raw: &str, #[case] expected: DeployStrategy) {
        assert_eq!(raw.parse::<DeployStrategy>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn rejects_unknown_strategy() {
        assert!("ftp".parse::<DeployStrategy>().is_err());
    }

    #[rstest]
    fn generation_request_uses_engine_keys() {
        let request = GenerationRequest {
            extra_js: "console.log(1)".to_owned(),
            ..GenerationRequest::default()
        };
        let json = serde_json::to_value(&request).expect("request should serialise");
        assert_eq!(json["extraJS"], "console.log(1)");
        assert!(json.get("modelTransformation").is_some());
        assert!(json.get("codePath").is_some());
    }
}
