//! Facade crate for the GIS publisher.
//!
//! This crate re-exports the specification synthesis and reconciliation types
//! from `gispub-core` together with the scanning, staging and import surface of
//! `gispub-data`.

#![forbid(unsafe_code)]

pub use gispub_core::{
    BatchGranularity, Collaborator, CollaboratorError, ColumnMapping, CompiledDescriptor,
    DatasetBatch, DatasetDescriptor, DatasetKind, DeployStrategy, Deployer, DeploymentTarget,
    EntityResolver, FeatureSelector, FieldDescriptor, GenerationRequest, GeometryType,
    ProductEngine, RemoteEntity, SchemaExtractor, SpecCompiler, SpecDocument, SuffixEntityResolver,
    SynthesisError, Synthesizer,
};

pub use gispub_data::import::{ImportError, ImportOrchestrator, ImportReport, Pacer};
pub use gispub_data::{
    Backend, HttpBackend, HttpBackendConfig, ScanError, StagedFile, StagedKind, TransportError,
    scan_collections,
};
