//! Behavioural tests for [`ImportOrchestrator`].
//!
//! Collections are staged in temporary directories and imported against a
//! [`StubBackend`], so no server is required.

use std::cell::RefCell;
use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use gispub_core::{DatasetBatch, DatasetDescriptor, EntityProperty, RemoteEntity};
use gispub_data::import::{FileStatus, ImportError, ImportOrchestrator, ImportReport};
use gispub_data::test_support::{BackendCall, CountingPacer, StubBackend, block_on_for_tests};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

#[derive(Default)]
struct ImportWorld {
    staging: RefCell<Option<(TempDir, DatasetBatch)>>,
    backend: RefCell<Option<StubBackend>>,
    pacer: CountingPacer,
    outcome: RefCell<Option<Result<ImportReport, ImportError>>>,
}

impl ImportWorld {
    fn configure(&self, adjust: impl FnOnce(StubBackend) -> StubBackend) {
        let current = self
            .backend
            .borrow_mut()
            .take()
            .expect("backend should be configured first");
        self.backend.replace(Some(adjust(current)));
    }

    fn calls(&self) -> Vec<BackendCall> {
        self.backend
            .borrow()
            .as_ref()
            .expect("backend should be configured")
            .calls()
    }

    fn with_report<T>(&self, inspect: impl FnOnce(&ImportReport) -> T) -> T {
        let outcome = self.outcome.borrow();
        let result = outcome.as_ref().expect("import should have run");
        inspect(result.as_ref().expect("import should succeed"))
    }
}

#[fixture]
fn world() -> ImportWorld {
    ImportWorld::default()
}

fn stage(batch: &DatasetBatch, name: &str) {
    fs::write(batch.directory.join("output").join(name), b"staged").expect("write staged file");
}

fn land_parcel() -> RemoteEntity {
    RemoteEntity::new(
        "app.model.LandParcel",
        vec![EntityProperty::new("geometry", "MultiPolygon")],
    )
}

// --- Given steps ---

#[given("a collection staging a land parcel shapefile and an elevation raster")]
fn given_collection(world: &ImportWorld) {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join("parcels")).expect("utf-8 path");
    fs::create_dir_all(root.join("output")).expect("staging dir");
    let batch = DatasetBatch::new(
        root,
        vec![
            DatasetDescriptor::vector("land_parcel", "land_parcel.zip"),
            DatasetDescriptor::raster("elevation", "elevation.tif"),
        ],
    );
    stage(&batch, "land_parcel.zip");
    stage(&batch, "elevation.tif");
    world.staging.replace(Some((dir, batch)));
}

#[given("the collection also stages an unlisted archive")]
fn given_stray_file(world: &ImportWorld) {
    let staging = world.staging.borrow();
    let (_, batch) = staging.as_ref().expect("collection should be staged");
    stage(batch, "stray.zip");
}

#[given("the collection also stages a slope raster")]
fn given_slope_raster(world: &ImportWorld) {
    let mut staging = world.staging.borrow_mut();
    let (_, batch) = staging.as_mut().expect("collection should be staged");
    batch
        .datasets
        .push(DatasetDescriptor::raster("slope", "slope.tif"));
    stage(batch, "slope.tif");
}

#[given("a backend whose catalog defines app.model.LandParcel")]
fn given_catalog(world: &ImportWorld) {
    world.backend.replace(Some(StubBackend::new(vec![land_parcel()])));
}

#[given("a backend with an empty catalog")]
fn given_empty_catalog(world: &ImportWorld) {
    world.backend.replace(Some(StubBackend::new(Vec::new())));
}

#[given("a backend whose catalog cannot be fetched")]
fn given_catalog_failure(world: &ImportWorld) {
    world
        .backend
        .replace(Some(StubBackend::new(Vec::new()).with_catalog_failure()));
}

#[given("the backend rejects the land parcel upload")]
fn given_failing_upload(world: &ImportWorld) {
    world.configure(|backend| backend.with_failing_upload("land_parcel.zip"));
}

#[given("the backend rejects the elevation raster")]
fn given_failing_raster(world: &ImportWorld) {
    world.configure(|backend| backend.with_failing_raster("elevation.tif"));
}

#[given("the backend is unavailable for {count} checks")]
fn given_unready(world: &ImportWorld, count: usize) {
    world.configure(|backend| backend.with_unready_checks(count));
}

// --- When steps ---

#[when("the collection is imported")]
fn when_imported(world: &ImportWorld) {
    let staging = world.staging.borrow();
    let (_, batch) = staging.as_ref().expect("collection should be staged");
    let backend = world.backend.borrow();
    let stub = backend.as_ref().expect("backend should be configured");
    let orchestrator =
        ImportOrchestrator::new(stub, &world.pacer).with_poll_delay(Duration::ZERO);
    let outcome = block_on_for_tests(orchestrator.run(std::slice::from_ref(batch)));
    world.outcome.replace(Some(outcome));
}

// --- Then steps ---

#[then("land_parcel.zip is submitted for {entity}")]
fn then_submitted_for(world: &ImportWorld, entity: String) {
    let submitted = world.calls().into_iter().any(|call| {
        matches!(
            call,
            BackendCall::SubmitImport(submission)
                if submission.entity_name == entity && submission.file == "tmp-land_parcel.zip"
        )
    });
    assert!(submitted, "expected a submission for {entity}");
}

#[then("the bounding box of {segment} is refreshed")]
fn then_refreshed(world: &ImportWorld, segment: String) {
    assert!(world
        .calls()
        .contains(&BackendCall::RefreshBbox { segment }));
}

#[then("no bounding box is refreshed")]
fn then_not_refreshed(world: &ImportWorld) {
    assert!(
        !world
            .calls()
            .iter()
            .any(|call| matches!(call, BackendCall::RefreshBbox { .. }))
    );
}

#[then("the raster is uploaded after the vector")]
fn then_raster_last(world: &ImportWorld) {
    let calls = world.calls();
    let vector = calls
        .iter()
        .position(|call| matches!(call, BackendCall::UploadTemporary { .. }))
        .expect("vector uploaded");
    let raster = calls
        .iter()
        .position(|call| matches!(call, BackendCall::UploadRaster { .. }))
        .expect("raster uploaded");
    assert!(vector < raster);
}

#[then("the raster is still uploaded")]
fn then_raster_uploaded(world: &ImportWorld) {
    assert!(world.calls().contains(&BackendCall::UploadRaster {
        file_name: "elevation.tif".to_owned()
    }));
}

#[then("the slope raster is uploaded after the rejected one")]
fn then_next_raster_uploaded(world: &ImportWorld) {
    let rasters: Vec<BackendCall> = world
        .calls()
        .into_iter()
        .filter(|call| matches!(call, BackendCall::UploadRaster { .. }))
        .collect();
    assert_eq!(
        rasters,
        [
            BackendCall::UploadRaster {
                file_name: "elevation.tif".to_owned()
            },
            BackendCall::UploadRaster {
                file_name: "slope.tif".to_owned()
            },
        ]
    );
    let statuses = world.with_report(|report| {
        report
            .files
            .iter()
            .filter(|file| file.file_name.ends_with(".tif"))
            .map(|file| file.status.clone())
            .collect::<Vec<_>>()
    });
    let [elevation, slope] = statuses.as_slice() else {
        panic!("expected two raster reports, found {statuses:?}");
    };
    assert!(matches!(elevation, FileStatus::Failed { .. }), "{elevation:?}");
    assert_eq!(*slope, FileStatus::Raster);
}

#[then("the pacer paused {count} time")]
fn then_paused(world: &ImportWorld, count: usize) {
    assert_eq!(world.pacer.pauses(), count);
}

#[then("the report records {count} failed file")]
fn then_failures(world: &ImportWorld, count: usize) {
    assert_eq!(world.with_report(ImportReport::failures), count);
}

#[then("the backend was checked {count} times before the catalog was fetched")]
fn then_checked(world: &ImportWorld, count: usize) {
    let calls = world.calls();
    let fetch = calls
        .iter()
        .position(|call| *call == BackendCall::FetchEntities)
        .expect("catalog fetched");
    assert_eq!(fetch, count);
    assert!(calls.iter().take(fetch).all(|call| *call == BackendCall::ReadinessCheck));
}

#[then("the run fails with a catalog error")]
fn then_catalog_error(world: &ImportWorld) {
    let outcome = world.outcome.borrow();
    assert!(matches!(
        outcome.as_ref(),
        Some(Err(ImportError::Catalog { .. }))
    ));
}

#[then("nothing is uploaded")]
fn then_nothing_uploaded(world: &ImportWorld) {
    assert_eq!(
        world.calls(),
        [BackendCall::ReadinessCheck, BackendCall::FetchEntities]
    );
}

#[then("{file} is reported as skipped")]
fn then_skipped(world: &ImportWorld, file: String) {
    let skipped = world.with_report(|report| {
        report
            .skipped
            .iter()
            .any(|(_, name)| *name == file)
    });
    assert!(skipped, "expected {file} to be skipped");
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/import_orchestration.feature", name = $title)]
        fn $fn_name(world: ImportWorld) {
            let _ = world;
        }
    };
}

register_scenario!(
    maps_vectors_onto_entities,
    "vector files are mapped onto matching entities"
);
register_scenario!(
    imports_unmatched_vectors,
    "vectors without an entity are imported without a refresh"
);
register_scenario!(
    continues_after_rejected_upload,
    "a rejected upload does not stop the batch"
);
register_scenario!(
    continues_after_rejected_raster,
    "a rejected raster does not stop the next raster"
);
register_scenario!(
    waits_for_backend,
    "the import waits for the backend to come up"
);
register_scenario!(aborts_without_catalog, "a missing catalog aborts the run");
register_scenario!(
    skips_unlisted_files,
    "files without a matching dataset are skipped"
);
