//! Request building and dispatch against a fake restore command.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use restore_core::{
    DependencyGraphSpec, Error, FileSettingsResolver, LockFile, LockFileLibrary, ProviderCache,
    RestoreCommand, RestoreOptions, RestoreRequestBuilder, RestoreResult, RestoreSummaryRequest,
    Result, restore, restore_all,
};
use restore_test_utils::TestWorkspace;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resolves every request to the same packages and saves the lock file on
/// commit.
#[derive(Default)]
struct FakeCommand {
    packages: Vec<(&'static str, &'static str)>,
    failing: HashSet<String>,
    cancel_during_execute: bool,
    committed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl RestoreCommand for FakeCommand {
    async fn execute(
        &self,
        request: &RestoreSummaryRequest,
        token: &CancellationToken,
    ) -> Result<RestoreResult> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.cancel_during_execute {
            token.cancel();
        }

        let libraries = self
            .packages
            .iter()
            .map(|(id, version)| LockFileLibrary::package(*id, *version, format!("sha512:{id}")))
            .collect();

        Ok(RestoreResult {
            success: !self.failing.contains(&request.unique_name),
            lock_file: LockFile::new(libraries),
            lock_file_path: request.request.lock_file_path.clone(),
        })
    }

    async fn commit(&self, result: &RestoreResult, _token: &CancellationToken) -> Result<()> {
        result.lock_file.save(&result.lock_file_path)?;
        self.committed
            .lock()
            .unwrap()
            .push(result.lock_file_path.as_str().to_string());
        Ok(())
    }
}

fn workspace() -> TestWorkspace {
    let mut ws = TestWorkspace::new();
    for name in ["app1", "app2", "app3", "app4"] {
        ws.add_project(name, &[("a", "1.0.0")], &["lib"]);
    }
    ws.add_project("lib", &[], &[]);
    ws.write_settings("", "global_packages_folder = \"packages\"\nmax_parallelism = 2\n");
    ws
}

fn requests(ws: &TestWorkspace) -> Vec<RestoreSummaryRequest> {
    let resolver = FileSettingsResolver::new()
        .with_global_config_dir(ws.root().join("user-config"))
        .with_environment_packages(None);
    let builder = RestoreRequestBuilder::new(Arc::new(resolver), Arc::new(ProviderCache::new()));
    let dg = DependencyGraphSpec::load(&ws.write_dg_spec(&["app1", "app2", "app3", "app4"]))
        .unwrap();
    builder.create_requests(&dg).unwrap()
}

#[test]
fn test_requests_use_workspace_settings() {
    let ws = workspace();
    let requests = requests(&ws);

    assert_eq!(requests.len(), 4);
    let first = &requests[0].request;
    assert_eq!(first.providers.global_folder().root(), &ws.path("packages"));
    assert_eq!(first.max_parallelism, 2);
    assert_eq!(first.lock_file_path, ws.lock_file("app1"));
    assert!(
        requests
            .iter()
            .all(|r| Arc::ptr_eq(&r.request.providers, &first.providers))
    );
}

#[tokio::test]
async fn test_restore_all_reports_in_request_order() {
    let ws = workspace();
    ws.write_lock_file("app2", &[("a", "1.0.0", "sha512:a")]);
    let command = Arc::new(FakeCommand {
        packages: vec![("a", "1.0.0"), ("b", "2.0.0")],
        ..Default::default()
    });

    let requests = requests(&ws);
    let options = RestoreOptions::from_settings(&requests[0].settings);
    let results = restore_all(requests, command.clone(), &options, &CancellationToken::new()).await;

    let names: Vec<String> = results
        .iter()
        .map(|r| r.as_ref().unwrap().unique_name.clone())
        .collect();
    assert_eq!(names, vec!["app1", "app2", "app3", "app4"]);

    let added = |index: usize| -> Vec<String> {
        results[index]
            .as_ref()
            .unwrap()
            .added_packages
            .iter()
            .map(ToString::to_string)
            .collect()
    };
    assert_eq!(added(0), vec!["a 1.0.0", "b 2.0.0"]);
    assert_eq!(added(1), vec!["b 2.0.0"]);

    assert_eq!(command.committed.lock().unwrap().len(), 4);
    assert!(command.peak.load(Ordering::SeqCst) <= 2);
    assert!(LockFile::load(&ws.lock_file("app3")).unwrap().is_some());
}

#[tokio::test]
async fn test_failed_restore_is_committed_and_reported() {
    let ws = workspace();
    let command = Arc::new(FakeCommand {
        failing: HashSet::from(["app2".to_string()]),
        ..Default::default()
    });

    let results = restore_all(
        requests(&ws),
        command.clone(),
        &RestoreOptions::default(),
        &CancellationToken::new(),
    )
    .await;

    assert!(results[0].is_ok());
    assert!(matches!(
        &results[1],
        Err(Error::RestoreFailed { project }) if project == "app2"
    ));
    assert_eq!(command.committed.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_canceled_token_restores_nothing() {
    let ws = workspace();
    let command = Arc::new(FakeCommand::default());
    let token = CancellationToken::new();
    token.cancel();

    let results = restore_all(requests(&ws), command.clone(), &RestoreOptions::default(), &token)
        .await;

    assert!(results.iter().all(|r| matches!(r, Err(Error::Canceled))));
    assert_eq!(command.peak.load(Ordering::SeqCst), 0);
    assert!(command.committed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_before_commit_writes_nothing() {
    let ws = workspace();
    let command = FakeCommand {
        cancel_during_execute: true,
        ..Default::default()
    };
    let request = requests(&ws).remove(0);

    let err = restore(&request, &command, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Canceled));
    assert!(command.committed.lock().unwrap().is_empty());
    assert!(LockFile::load(&ws.lock_file("app1")).unwrap().is_none());
}
