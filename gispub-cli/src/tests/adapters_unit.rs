//! Unit tests for the process and manifest collaborators.

use super::helpers::{Workspace, elevation, roads, write_utf8};
use crate::adapters::{
    CommandDeployer, CommandProductEngine, CommandSpecCompiler, DATASET_MANIFEST,
    ManifestSchemaExtractor,
};
use camino::Utf8Path;
use gispub_core::{
    Collaborator, CollaboratorError, CompiledDescriptor, DeployStrategy, Deployer,
    GenerationRequest, ProductEngine, SchemaExtractor, SpecCompiler,
};
use rstest::rstest;
use serde_json::json;

fn shell(script: &str) -> Vec<String> {
    vec!["sh".to_owned(), "-c".to_owned(), script.to_owned()]
}

#[rstest]
fn manifest_extractor_reads_staged_manifest() {
    let workspace = Workspace::new();
    let collection = workspace.stage("terrain", &[roads(), elevation()]);
    let datasets = ManifestSchemaExtractor
        .extract(&collection)
        .expect("manifest should decode");
    assert_eq!(datasets, vec![roads(), elevation()]);
}

#[rstest]
fn manifest_extractor_reports_missing_manifest() {
    let workspace = Workspace::new();
    let err = ManifestSchemaExtractor
        .extract(&workspace.folder)
        .expect_err("no manifest staged");
    match err {
        CollaboratorError::MissingInput { collaborator, path } => {
            assert_eq!(collaborator, Collaborator::SchemaExtractor);
            assert!(path.ends_with(DATASET_MANIFEST));
        }
        other => panic!("expected MissingInput, found {other:?}"),
    }
}

#[rstest]
fn manifest_extractor_reports_malformed_manifest() {
    let workspace = Workspace::new();
    write_utf8(
        &workspace.folder.join("output").join(DATASET_MANIFEST),
        b"{\"not\": \"a list\"}",
    );
    let err = ManifestSchemaExtractor
        .extract(&workspace.folder)
        .expect_err("manifest is not a list");
    assert!(matches!(err, CollaboratorError::Decode { .. }));
}

#[rstest]
fn compiler_reads_descriptor_from_stdout() {
    let compiler = CommandSpecCompiler::new(shell(
        r#"cat > /dev/null; echo '{"basicData": {"version": "2"}, "features": ["Base"]}'"#,
    ));
    let descriptor = compiler
        .compile("CREATE GIS demo USING 4326;")
        .expect("compiler succeeds");
    assert_eq!(descriptor.basic_data.version, "2");
    assert_eq!(descriptor.features, vec!["Base".to_owned()]);
}

#[rstest]
fn compiler_failure_carries_stderr() {
    let compiler = CommandSpecCompiler::new(shell(
        "cat > /dev/null; echo 'line 1: bad token' >&2; exit 3",
    ));
    let err = compiler.compile("garbage").expect_err("compiler rejects");
    match err {
        CollaboratorError::Rejected {
            collaborator,
            message,
        } => {
            assert_eq!(collaborator, Collaborator::SpecCompiler);
            assert_eq!(message, "line 1: bad token");
        }
        other => panic!("expected Rejected, found {other:?}"),
    }
}

#[rstest]
fn compiler_echoing_large_input_completes() {
    let descriptor = r#"{"basicData": {"version": "7"}, "features": ["Base"]}"#;
    let padded = format!("{descriptor}{}", " ".repeat(256 * 1024));
    let echoed = CommandSpecCompiler::new(shell("cat"))
        .compile(&padded)
        .expect("stdin and stdout are drained together");
    assert_eq!(echoed.basic_data.version, "7");
    assert_eq!(echoed.features, vec!["Base".to_owned()]);
}

#[rstest]
fn compiler_writing_before_reading_completes() {
    let compiler = CommandSpecCompiler::new(shell(
        r#"head -c 262144 /dev/zero | tr '\0' ' '; cat > /dev/null; echo '{"features": []}'"#,
    ));
    let descriptor = compiler
        .compile(&"x".repeat(256 * 1024))
        .expect("large output before reading stdin does not block");
    assert!(descriptor.features.is_empty());
}

#[rstest]
fn unconfigured_command_is_rejected() {
    let err = CommandSpecCompiler::new(Vec::new())
        .compile("")
        .expect_err("no program configured");
    assert!(matches!(err, CollaboratorError::Rejected { .. }));
}

#[rstest]
fn engine_returns_requested_output_dir() {
    let engine = CommandProductEngine::new(shell("cat > /dev/null"));
    let request = GenerationRequest {
        output_dir: "products/demo".to_owned(),
        ..GenerationRequest::default()
    };
    let output = engine
        .generate(&request, &CompiledDescriptor::default())
        .expect("engine succeeds");
    assert_eq!(output, Utf8Path::new("products/demo"));
}

#[rstest]
fn deployer_receives_strategy_and_output() {
    let workspace = Workspace::new();
    let log = workspace.root.join("deploy.log");
    // `sh -c script name` binds `name` to $0, so the appended arguments land in $1 and $2.
    let mut argv = shell(&format!("echo \"$1 $2 $(cat)\" > {log}"));
    argv.push("deploy".to_owned());
    CommandDeployer::new(argv)
        .deploy(DeployStrategy::Ssh, &json!({"host": "gis"}), Utf8Path::new("out"))
        .expect("deployer succeeds");
    let written = std::fs::read_to_string(&log).expect("deploy log");
    assert_eq!(written.trim(), r#"ssh out {"host":"gis"}"#);
}
