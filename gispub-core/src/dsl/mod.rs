//! Specification text synthesis.
//!
//! [`Synthesizer`] groups dataset batches into instances according to
//! [`BatchGranularity`] and renders each through [`SpecificationText`], which
//! enforces the header/trailer pairing.

mod blocks;
mod deployment;
mod synthesizer;
mod text;

pub use deployment::DeploymentTarget;
pub use synthesizer::{BatchGranularity, SpecDocument, Synthesizer};
pub use text::SpecificationText;
