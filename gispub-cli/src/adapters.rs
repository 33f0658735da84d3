//! Collaborators backed by external programs and extractor manifests.
//!
//! Each program adapter runs a configured argument vector, writes its input
//! to the child's stdin and treats a non-zero exit as a rejection carrying
//! the child's stderr.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use camino::{Utf8Path, Utf8PathBuf};
use gispub_core::{
    Collaborator, CollaboratorError, CompiledDescriptor, DatasetDescriptor, DeployStrategy,
    Deployer, GenerationRequest, ProductEngine, SchemaExtractor, SpecCompiler,
};
use gispub_data::staging_dir;
use serde::Serialize;
use serde_json::Value;

/// Manifest the extraction step leaves in each staging directory.
pub(crate) const DATASET_MANIFEST: &str = "datasets.json";

fn run_program(
    collaborator: Collaborator,
    argv: &[String],
    extra_args: &[&str],
    input: &[u8],
) -> Result<Vec<u8>, CollaboratorError> {
    let (program, args) = argv.split_first().ok_or_else(|| CollaboratorError::Rejected {
        collaborator,
        message: "no command configured".to_owned(),
    })?;
    let io_error = |source| CollaboratorError::Io {
        collaborator,
        source,
    };
    log::debug!("running {collaborator}: {program} {args:?} {extra_args:?}");
    let mut child = Command::new(program)
        .args(args)
        .args(extra_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(io_error)?;
    let stdin = child.stdin.take();
    let (waited, written) = thread::scope(|scope| {
        let writer = scope.spawn(move || stdin.map_or(Ok(()), |mut pipe| pipe.write_all(input)));
        let waited = child.wait_with_output();
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
        (waited, written)
    });
    let output = waited.map_err(io_error)?;
    if !output.status.success() {
        return Err(CollaboratorError::Rejected {
            collaborator,
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    written.map_err(io_error)?;
    Ok(output.stdout)
}

fn encode<T: Serialize>(
    collaborator: Collaborator,
    value: &T,
) -> Result<Vec<u8>, CollaboratorError> {
    serde_json::to_vec(value).map_err(|source| CollaboratorError::Decode {
        collaborator,
        source,
    })
}

/// Compiles specification text with an external program.
///
/// The text is written to stdin; the descriptor is read as JSON from stdout.
#[derive(Debug, Clone)]
pub(crate) struct CommandSpecCompiler {
    argv: Vec<String>,
}

impl CommandSpecCompiler {
    pub(crate) const fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl SpecCompiler for CommandSpecCompiler {
    fn compile(&self, text: &str) -> Result<CompiledDescriptor, CollaboratorError> {
        let collaborator = Collaborator::SpecCompiler;
        let stdout = run_program(collaborator, &self.argv, &[], text.as_bytes())?;
        serde_json::from_slice(&stdout).map_err(|source| CollaboratorError::Decode {
            collaborator,
            source,
        })
    }
}

#[derive(Serialize)]
struct GenerationPayload<'a> {
    request: &'a GenerationRequest,
    descriptor: &'a CompiledDescriptor,
}

/// Runs the product engine as an external program.
///
/// Request and descriptor are written to stdin as one JSON object. The
/// product lands in the request's output directory.
#[derive(Debug, Clone)]
pub(crate) struct CommandProductEngine {
    argv: Vec<String>,
}

impl CommandProductEngine {
    pub(crate) const fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl ProductEngine for CommandProductEngine {
    fn generate(
        &self,
        request: &GenerationRequest,
        descriptor: &CompiledDescriptor,
    ) -> Result<Utf8PathBuf, CollaboratorError> {
        let collaborator = Collaborator::ProductEngine;
        let payload = encode(collaborator, &GenerationPayload { request, descriptor })?;
        run_program(collaborator, &self.argv, &[], &payload)?;
        Ok(Utf8PathBuf::from(request.output_dir.as_str()))
    }
}

/// Deploys generated output with an external program.
///
/// Invoked as `<argv..> <strategy> <output>` with the record on stdin.
#[derive(Debug, Clone)]
pub(crate) struct CommandDeployer {
    argv: Vec<String>,
}

impl CommandDeployer {
    pub(crate) const fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl Deployer for CommandDeployer {
    fn deploy(
        &self,
        strategy: DeployStrategy,
        record: &Value,
        output: &Utf8Path,
    ) -> Result<(), CollaboratorError> {
        let collaborator = Collaborator::Deployer;
        let payload = encode(collaborator, record)?;
        run_program(
            collaborator,
            &self.argv,
            &[strategy.as_str(), output.as_str()],
            &payload,
        )?;
        Ok(())
    }
}

/// Reads dataset descriptors from `<collection>/output/datasets.json`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ManifestSchemaExtractor;

impl SchemaExtractor for ManifestSchemaExtractor {
    fn extract(&self, directory: &Utf8Path) -> Result<Vec<DatasetDescriptor>, CollaboratorError> {
        let collaborator = Collaborator::SchemaExtractor;
        let path = staging_dir(directory).join(DATASET_MANIFEST);
        let present = match gispub_fs::file_is_file(&path) {
            Ok(present) => present,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(source) => {
                return Err(CollaboratorError::Io {
                    collaborator,
                    source,
                });
            }
        };
        if !present {
            return Err(CollaboratorError::MissingInput { collaborator, path });
        }
        let raw = gispub_fs::read_to_string(&path).map_err(|source| CollaboratorError::Io {
            collaborator,
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| CollaboratorError::Decode {
            collaborator,
            source,
        })
    }
}
