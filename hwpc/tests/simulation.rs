use std::io::{Cursor, Read};

use hwpc::cluster::ClusterHandle;
use hwpc::error::ErrorKind;
use hwpc::simulation::SimulationRun;
use hwpc::storage::{MemoryObjectStore, ObjectStore};
use hwpc::test_utils::ScriptedModel;
use hwpc::types::HarvestSeries;
use hwpc_config::shared::{ClusterConfig, RunConfig};
use hwpc_telemetry::init_test_tracing;

fn run_config(run_name: &str) -> RunConfig {
    RunConfig {
        run_name: run_name.to_owned(),
        output_bucket: "hwpc-output".to_owned(),
    }
}

fn harvest() -> HarvestSeries {
    HarvestSeries::new(vec![2010, 2011], vec![100.0, 150.0]).unwrap()
}

fn member_text(archive_bytes: &[u8], member: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).unwrap();
    let mut file = archive.by_name(member).unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    text
}

#[tokio::test(flavor = "multi_thread")]
async fn run_uploads_one_archive_per_accumulator() {
    init_test_tracing();

    let cluster = ClusterHandle::start(&ClusterConfig { workers: 2 }).unwrap();
    let store = MemoryObjectStore::new();

    let run = SimulationRun::new(
        1,
        run_config("test_run"),
        ScriptedModel::new(),
        store.clone(),
        cluster,
        harvest(),
    );
    let report = run.run().await.unwrap();

    // Two primary tasks plus one recycling child each.
    assert_eq!(report.tasks_completed, 4);

    // Two global accumulators plus a pair per harvest year, uploaded global-first.
    assert_eq!(
        report.archives,
        vec![
            "test_run.zip",
            "rec_test_run.zip",
            "2010_test_run.zip",
            "2010_rec_test_run.zip",
            "2011_test_run.zip",
            "2011_rec_test_run.zip",
        ]
    );
    let mut expected = report.archives.clone();
    expected.sort();
    assert_eq!(store.keys().await, expected);

    for key in &report.archives {
        let bytes = store.download(key).await.unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.len() >= 18, "{key} has only {} members", archive.len());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn harvest_series_appears_only_in_the_global_archive() {
    init_test_tracing();

    let cluster = ClusterHandle::start(&ClusterConfig { workers: 2 }).unwrap();
    let store = MemoryObjectStore::new();

    let run = SimulationRun::new(
        2,
        run_config("ccf_run"),
        ScriptedModel::new(),
        store.clone(),
        cluster,
        harvest(),
    );
    run.run().await.unwrap();

    let global = store.download("ccf_run.zip").await.unwrap();
    let header = member_text(&global, "results.csv");
    assert!(header.lines().next().unwrap().contains("ccf"));

    let recycled = store.download("rec_ccf_run.zip").await.unwrap();
    let header = member_text(&recycled, "rec_results.csv");
    assert!(!header.lines().next().unwrap().contains("ccf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cluster_is_reused_across_successive_runs() {
    init_test_tracing();

    let cluster = ClusterHandle::start(&ClusterConfig { workers: 2 }).unwrap();
    let store = MemoryObjectStore::new();

    let first = SimulationRun::new(
        5,
        run_config("first_run"),
        ScriptedModel::new(),
        store.clone(),
        cluster.clone(),
        harvest(),
    );
    first.run().await.unwrap();

    // A successful run leaves the shared pool open for the next one.
    assert!(!cluster.is_shutting_down());

    let second = SimulationRun::new(
        6,
        run_config("second_run"),
        ScriptedModel::new(),
        store.clone(),
        cluster.clone(),
        harvest(),
    );
    let report = second.run().await.unwrap();

    assert_eq!(report.archives.len(), 6);
    assert!(!cluster.is_shutting_down());
    assert_eq!(store.object_count().await, 12);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_child_aborts_the_run_without_uploads() {
    init_test_tracing();

    let cluster = ClusterHandle::start(&ClusterConfig { workers: 2 }).unwrap();
    let store = MemoryObjectStore::new();

    let run = SimulationRun::new(
        3,
        run_config("doomed_run"),
        ScriptedModel::with_failing_child(2011),
        store.clone(),
        cluster.clone(),
        harvest(),
    );
    let err = run.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TaskFailed);
    assert!(cluster.is_shutting_down());

    // 2010's otherwise-valid results are discarded along with everything else.
    assert_eq!(store.object_count().await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_failure_propagates() {
    init_test_tracing();

    let cluster = ClusterHandle::start(&ClusterConfig { workers: 2 }).unwrap();
    let store = MemoryObjectStore::new();
    store.set_fail_uploads(true).await;

    let run = SimulationRun::new(
        4,
        run_config("unstorable_run"),
        ScriptedModel::new(),
        store.clone(),
        cluster,
        harvest(),
    );
    let err = run.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UploadFailed);
    assert_eq!(store.object_count().await, 0);
}
