//! The `publish` command: generation pipeline followed by the import run.

use camino::{Utf8Path, Utf8PathBuf};
use gispub_core::{
    CompiledDescriptor, DatasetBatch, Deployer, FeatureSelector, GenerationRequest, ProductEngine,
    SchemaExtractor, SpecCompiler, SpecDocument, Synthesizer,
};
use gispub_data::import::{FixedDelayPacer, ImportOrchestrator, ImportReport, Pacer};
use gispub_data::{Backend, HttpBackend, scan_collections};
use serde_json::Value;

use crate::CliError;
use crate::adapters::{
    CommandDeployer, CommandProductEngine, CommandSpecCompiler, ManifestSchemaExtractor,
};
use crate::config::{
    GenerationSettings, ProjectConfig, PublishArgs, PublishConfig, load_project_config,
};

/// External programs driven by the generation pipeline.
pub(crate) struct Collaborators<'a> {
    pub(crate) extractor: &'a dyn SchemaExtractor,
    pub(crate) compiler: &'a dyn SpecCompiler,
    pub(crate) engine: &'a dyn ProductEngine,
    pub(crate) deployer: &'a dyn Deployer,
}

/// Import transport and pacing.
pub(crate) struct ImportSide<'a> {
    pub(crate) backend: &'a dyn Backend,
    pub(crate) pacer: &'a dyn Pacer,
}

/// A product generated for one specification instance.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GeneratedProduct {
    pub(crate) instance: String,
    pub(crate) descriptor: CompiledDescriptor,
    pub(crate) output: Utf8PathBuf,
    pub(crate) deployed: bool,
}

/// Everything a `publish` invocation produced.
#[derive(Debug, Default)]
pub(crate) struct PublishOutcome {
    pub(crate) products: Vec<GeneratedProduct>,
    pub(crate) import: Option<ImportReport>,
}

pub(super) async fn run_publish(args: PublishArgs) -> Result<(), CliError> {
    let config = resolve_publish_config(args)?;
    crate::logging::init(config.debug)?;
    let project = load_project_config(&config.project_config)?;
    log::info!("running gispub for folder {}", config.folder);

    let extractor = ManifestSchemaExtractor;
    let compiler = CommandSpecCompiler::new(project.commands.compiler.clone());
    let engine = CommandProductEngine::new(project.commands.generator.clone());
    let deployer = CommandDeployer::new(project.commands.deployer.clone());
    let collaborators = Collaborators {
        extractor: &extractor,
        compiler: &compiler,
        engine: &engine,
        deployer: &deployer,
    };
    let backend = HttpBackend::with_config(project.backend_config(&config))?;
    let pacer = FixedDelayPacer::new(project.pacing(&config));
    let import = ImportSide {
        backend: &backend,
        pacer: &pacer,
    };
    let outcome = publish(
        &config,
        &project,
        &collaborators,
        &import,
        Utf8Path::new("."),
    )
    .await?;
    for product in &outcome.products {
        log::debug!(
            "{}: features {:?} in {} (deployed: {})",
            product.instance,
            product.descriptor.features,
            product.output,
            product.deployed
        );
    }
    if let Some(report) = outcome.import {
        log::debug!(
            "imported {} file(s), {} failed",
            report.files.len(),
            report.failures()
        );
    }
    Ok(())
}

pub(crate) fn resolve_publish_config(args: PublishArgs) -> Result<PublishConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Runs generation (unless import-only) and then the import.
///
/// The import is skipped when the product is generated but not deployed,
/// since no backend has been brought up for it.
pub(crate) async fn publish(
    config: &PublishConfig,
    project: &ProjectConfig,
    collaborators: &Collaborators<'_>,
    import: &ImportSide<'_>,
    artifacts_dir: &Utf8Path,
) -> Result<PublishOutcome, CliError> {
    let batches = extract_batches(&config.folder, collaborators.extractor)?;
    let mut outcome = PublishOutcome::default();
    if !config.import_only {
        outcome.products = generate(config, project, collaborators, &batches, artifacts_dir)?;
    }
    if config.import_only || config.deploy {
        let report = ImportOrchestrator::new(import.backend, import.pacer)
            .with_debug(config.debug)
            .run(&batches)
            .await?;
        outcome.import = Some(report);
    }
    Ok(outcome)
}

fn extract_batches(
    folder: &Utf8Path,
    extractor: &dyn SchemaExtractor,
) -> Result<Vec<DatasetBatch>, CliError> {
    scan_collections(folder)?
        .into_iter()
        .map(|directory| {
            let datasets = extractor.extract(&directory)?;
            log::debug!("{directory}: {} dataset(s)", datasets.len());
            Ok::<_, CliError>(DatasetBatch::new(directory, datasets))
        })
        .collect()
}

pub(crate) fn generate(
    config: &PublishConfig,
    project: &ProjectConfig,
    collaborators: &Collaborators<'_>,
    batches: &[DatasetBatch],
    artifacts_dir: &Utf8Path,
) -> Result<Vec<GeneratedProduct>, CliError> {
    let synthesizer = Synthesizer::new(project.instance.clone(), project.deployment.clone())
        .with_granularity(project.granularity(config));
    let documents = synthesizer.synthesize(batches)?;
    let selector = FeatureSelector::new(project.features.clone());
    let base_request = load_generation_request(&project.generation, config.debug)?;
    let record = Value::Object(project.deploy.record.clone());
    let single = documents.len() == 1;

    let mut products = Vec::with_capacity(documents.len());
    for document in documents {
        let mut descriptor = collaborators.compiler.compile(&document.text)?;
        selector.apply(&mut descriptor, &document.datasets);
        if config.debug {
            write_debug_artifacts(artifacts_dir, &document, &descriptor)?;
        }
        let request = GenerationRequest {
            output_dir: output_dir_for(&project.generation, &document.instance, single),
            ..base_request.clone()
        };
        let output = collaborators.engine.generate(&request, &descriptor)?;
        log::info!("generated {} into {output}", document.instance);
        if config.deploy {
            collaborators
                .deployer
                .deploy(project.deploy.strategy, &record, &output)?;
            log::info!(
                "deployed {} with the {} strategy",
                document.instance,
                project.deploy.strategy.as_str()
            );
        }
        products.push(GeneratedProduct {
            instance: document.instance,
            descriptor,
            output,
            deployed: config.deploy,
        });
    }
    Ok(products)
}

fn output_dir_for(settings: &GenerationSettings, instance: &str, single: bool) -> String {
    match &settings.output_dir {
        Some(base) if single => base.clone(),
        Some(base) => format!("{base}/{instance}"),
        None => instance.to_owned(),
    }
}

fn write_debug_artifacts(
    dir: &Utf8Path,
    document: &SpecDocument,
    descriptor: &CompiledDescriptor,
) -> Result<(), CliError> {
    let write = |path: Utf8PathBuf, contents: &[u8]| {
        gispub_fs::write_artifact(&path, contents)
            .map_err(|source| CliError::WriteArtifact { path, source })
    };
    write(
        dir.join(format!("{}.spec", document.instance)),
        document.text.as_bytes(),
    )?;
    let json = serde_json::to_vec_pretty(descriptor).map_err(|source| {
        CliError::SerialiseDescriptor {
            instance: document.instance.clone(),
            source,
        }
    })?;
    write(dir.join(format!("{}.json", document.instance)), &json)
}

fn read_input(field: &'static str, path: Option<&Utf8PathBuf>) -> Result<String, CliError> {
    path.map_or_else(
        || Ok(String::new()),
        |file| {
            gispub_fs::read_to_string(file).map_err(|source| CliError::ReadGenerationInput {
                field,
                path: file.clone(),
                source,
            })
        },
    )
}

pub(crate) fn load_generation_request(
    settings: &GenerationSettings,
    verbose: bool,
) -> Result<GenerationRequest, CliError> {
    let platform_text = read_input("platformConfig", settings.platform_config.as_ref())?;
    let platform_config = settings
        .platform_config
        .as_ref()
        .map_or(Ok(Value::Null), |path| {
            serde_json::from_str(&platform_text).map_err(|source| CliError::ParsePlatformConfig {
                path: path.clone(),
                source,
            })
        })?;
    Ok(GenerationRequest {
        code_path: settings.code_path.clone(),
        feature_model: read_input("featureModel", settings.feature_model.as_ref())?,
        platform_config,
        extra_js: read_input("extraJS", settings.extra_js.as_ref())?,
        model_transformation: read_input(
            "modelTransformation",
            settings.model_transformation.as_ref(),
        )?,
        verbose,
        output_dir: String::new(),
    })
}
