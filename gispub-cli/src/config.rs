//! Command-line arguments and the project configuration they point at.

use std::io::BufReader;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use gispub_core::{BatchGranularity, DeployStrategy, DeploymentTarget};
use gispub_data::HttpBackendConfig;
use gispub_data::import::DEFAULT_PACING;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CliError;

const USER_AGENT: &str = concat!("gispub-cli/", env!("CARGO_PKG_VERSION"));

pub(crate) const ARG_FOLDER: &str = "folder";
pub(crate) const ENV_FOLDER: &str = "GISPUB_FOLDER";
pub(crate) const ARG_CONFIG: &str = "config";
pub(crate) const ARG_PACING_SECS: &str = "pacing-secs";
pub(crate) const ARG_GRANULARITY: &str = "granularity";
pub(crate) const ARG_BACKEND_HOST: &str = "backend-host";
pub(crate) const DEFAULT_PROJECT_CONFIG: &str = "config.json";

/// CLI arguments for the `publish` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Synthesise a GIS specification for every dataset collection \
                 under a folder, generate and deploy the product, then import \
                 the staged files into the running backend. Options can come \
                 from CLI flags, configuration files, or environment variables.",
    about = "Publish a folder of geographic datasets"
)]
#[ortho_config(prefix = "GISPUB")]
pub(crate) struct PublishArgs {
    /// Folder holding the dataset collections.
    #[arg(value_name = "folder")]
    #[serde(default)]
    pub(crate) folder: Option<Utf8PathBuf>,
    /// Project configuration file, relative to the working directory.
    #[arg(long = ARG_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) project_config: Option<Utf8PathBuf>,
    /// Write run artifacts and log request payloads.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) debug: bool,
    /// Generate the product without deploying it.
    #[arg(short = 'g', long = "generate")]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) generate_only: bool,
    /// Skip generation and only import staged files.
    #[arg(short = 'i', long = "only-import")]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) import_only: bool,
    /// Seconds to wait between uploaded files.
    #[arg(long = ARG_PACING_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) pacing_secs: Option<u64>,
    /// One specification per run or per collection.
    #[arg(long = ARG_GRANULARITY, value_name = "per-run|per-directory")]
    #[serde(default)]
    pub(crate) granularity: Option<BatchGranularity>,
    /// Backend host, overriding the project configuration.
    #[arg(long = ARG_BACKEND_HOST, value_name = "url")]
    #[serde(default)]
    pub(crate) backend_host: Option<String>,
}

impl PublishArgs {
    pub(crate) fn into_config(self) -> Result<PublishConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PublishConfig::try_from(merged)
    }
}

/// Resolved `publish` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PublishConfig {
    /// Folder holding the dataset collections.
    pub(crate) folder: Utf8PathBuf,
    /// Project configuration file.
    pub(crate) project_config: Utf8PathBuf,
    /// Debug artifacts and payload logging.
    pub(crate) debug: bool,
    /// Deploy the generated product.
    pub(crate) deploy: bool,
    /// Skip the generation pipeline.
    pub(crate) import_only: bool,
    /// Pacing override; the project configuration applies when absent.
    pub(crate) pacing: Option<Duration>,
    /// Granularity override; the project configuration applies when absent.
    pub(crate) granularity: Option<BatchGranularity>,
    /// Host override; the project configuration applies when absent.
    pub(crate) backend_host: Option<String>,
}

impl PublishConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match gispub_fs::dir_exists(&self.folder) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(CliError::MissingFolder {
                path: self.folder.clone(),
            }),
        }
    }
}

impl TryFrom<PublishArgs> for PublishConfig {
    type Error = CliError;

    fn try_from(args: PublishArgs) -> Result<Self, Self::Error> {
        let folder = args.folder.ok_or(CliError::MissingArgument {
            field: ARG_FOLDER,
            env: ENV_FOLDER,
        })?;
        let project_config = args
            .project_config
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_PROJECT_CONFIG));
        Ok(Self {
            folder,
            project_config,
            debug: args.debug,
            deploy: !args.generate_only,
            import_only: args.import_only,
            pacing: args.pacing_secs.map(Duration::from_secs),
            granularity: args.granularity,
            backend_host: args.backend_host,
        })
    }
}

/// Files and settings handed to the product engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct GenerationSettings {
    /// Product line sources.
    pub(crate) code_path: Utf8PathBuf,
    /// Feature model document.
    pub(crate) feature_model: Option<Utf8PathBuf>,
    /// Platform configuration document (JSON).
    pub(crate) platform_config: Option<Utf8PathBuf>,
    /// Extra client script.
    #[serde(rename = "extraJS")]
    pub(crate) extra_js: Option<Utf8PathBuf>,
    /// Model transformation document.
    pub(crate) model_transformation: Option<Utf8PathBuf>,
    /// Directory name the product is written to.
    pub(crate) output_dir: Option<String>,
}

/// How the generated product is shipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct DeploySettings {
    /// Strategy name.
    #[serde(default)]
    pub(crate) strategy: DeployStrategy,
    /// Remaining keys, forwarded to the deployer untouched.
    #[serde(flatten)]
    pub(crate) record: Map<String, Value>,
}

/// External programs implementing the collaborator seams.
///
/// Each command is an argument vector; the first element is the program.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CommandSettings {
    /// Specification compiler.
    pub(crate) compiler: Vec<String>,
    /// Product engine.
    pub(crate) generator: Vec<String>,
    /// Deployer.
    pub(crate) deployer: Vec<String>,
}

fn default_instance() -> String {
    "gis".to_owned()
}

fn default_backend_host() -> String {
    "http://localhost:8080".to_owned()
}

/// Project configuration loaded from `--config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectConfig {
    /// Instance name used for synthesised specifications.
    #[serde(default = "default_instance")]
    pub(crate) instance: String,
    /// Backend receiving imports.
    #[serde(default = "default_backend_host")]
    pub(crate) backend_host: String,
    /// Per-request timeout for backend calls; the client default when unset.
    #[serde(default)]
    pub(crate) backend_timeout_seconds: Option<u64>,
    /// Deployment record rendered into the specification header.
    #[serde(default)]
    pub(crate) deployment: DeploymentTarget,
    /// Explicit feature selection; empty keeps the compiled features.
    #[serde(default)]
    pub(crate) features: Vec<String>,
    /// Specification granularity.
    #[serde(default)]
    pub(crate) granularity: BatchGranularity,
    /// Seconds between uploaded files.
    #[serde(default)]
    pub(crate) pacing_seconds: Option<u64>,
    /// Product engine inputs.
    #[serde(default)]
    pub(crate) generation: GenerationSettings,
    /// Deployment strategy and record.
    #[serde(default)]
    pub(crate) deploy: DeploySettings,
    /// External collaborator programs.
    #[serde(default)]
    pub(crate) commands: CommandSettings,
}

impl ProjectConfig {
    /// Pacing between uploads, preferring the CLI override.
    pub(crate) fn pacing(&self, config: &PublishConfig) -> Duration {
        config.pacing.unwrap_or_else(|| {
            self.pacing_seconds
                .map_or(DEFAULT_PACING, Duration::from_secs)
        })
    }

    /// Granularity, preferring the CLI override.
    pub(crate) fn granularity(&self, config: &PublishConfig) -> BatchGranularity {
        config.granularity.unwrap_or(self.granularity)
    }

    /// Backend host, preferring the CLI override.
    pub(crate) fn backend_host<'a>(&'a self, config: &'a PublishConfig) -> &'a str {
        config.backend_host.as_deref().unwrap_or(&self.backend_host)
    }

    /// HTTP client settings for the import backend.
    pub(crate) fn backend_config(&self, config: &PublishConfig) -> HttpBackendConfig {
        let settings =
            HttpBackendConfig::new(self.backend_host(config)).with_user_agent(USER_AGENT);
        let Some(secs) = self.backend_timeout_seconds else {
            return settings;
        };
        settings.with_timeout(Duration::from_secs(secs))
    }
}

/// Loads the JSON project configuration at `path`.
pub(crate) fn load_project_config(path: &Utf8Path) -> Result<ProjectConfig, CliError> {
    let file = gispub_fs::open_utf8_file(path).map_err(|source| CliError::OpenProjectConfig {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseProjectConfig {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PublishConfig, CliError> {
    let merged = PublishArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PublishConfig::try_from(merged)
}
