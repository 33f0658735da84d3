//! Core domain types for the GIS publisher.
//!
//! This crate turns dataset descriptors into specification text and holds
//! the pure reconciliation rules used during import: entity resolution,
//! column mapping and bounding-box endpoint naming. External programs are
//! reached through the traits in [`collaborators`].

pub mod collaborators;
pub mod color;
mod dataset;
pub mod dsl;
mod entity;
mod error;
mod features;
pub mod naming;
pub mod test_support;

pub use collaborators::{
    DeployStrategy, Deployer, GenerationRequest, ProductEngine, SchemaExtractor, SpecCompiler,
};
pub use dataset::{DatasetBatch, DatasetDescriptor, DatasetKind, FieldDescriptor, GeometryType};
pub use dsl::{BatchGranularity, DeploymentTarget, SpecDocument, SpecificationText, Synthesizer};
pub use entity::{
    ColumnMapping, EntityProperty, EntityResolver, GEOMETRY_PROPERTY, RemoteEntity,
    SuffixEntityResolver, refresh_segment,
};
pub use error::{Collaborator, CollaboratorError, SynthesisError};
pub use features::{
    BasicData, CompiledDescriptor, FeatureSelector, RASTER_IMPORT_FEATURE,
    RASTER_MAP_SERVING_FEATURE,
};
