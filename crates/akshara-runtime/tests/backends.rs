//! Backend contract tests through the public API.

use akshara_runtime::{
    select_backend, CancelReason, ComposeBackend, Context, MockBackend, RuntimeError,
    ServiceBackend, ServiceSpec, StartOptions,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn spec(dir: &Path, project: &str) -> ServiceSpec {
    ServiceSpec {
        project: project.to_owned(),
        compose_dir: dir.join(project),
        compose_file: "docker-compose.yml".to_owned(),
        remote_repo: "https://github.com/virtualvinodh/aksharamukha.git".to_owned(),
        services: vec!["front".to_owned(), "back".to_owned(), "fonts".to_owned()],
        ready_marker: Some("Listening at: http://0.0.0.0:8085".to_owned()),
        endpoint: "http://localhost:8085/api/public".to_owned(),
    }
}

#[test]
fn mock_backend_through_trait_object() {
    let dir = tempfile::tempdir().unwrap();
    let backend: Arc<dyn ServiceBackend> = select_backend("mock").unwrap();
    let s = spec(dir.path(), "akshara-test");
    let ctx = Context::background();

    backend.prepare(&s, false, &ctx).unwrap();
    backend.start(&s, StartOptions::default(), &ctx).unwrap();
    backend.wait_ready(&s, Duration::from_secs(1), &ctx).unwrap();
    assert!(backend.status(&s, &ctx).unwrap().running);
    assert!(backend.follow_logs(&s).is_none());
    backend.remove(&s, &ctx).unwrap();
    assert!(!backend.status(&s, &ctx).unwrap().running);
}

#[test]
fn cancelled_context_stops_every_mock_operation() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::new();
    let s = spec(dir.path(), "p");
    let (ctx, handle) = Context::background().with_cancel();
    handle.cancel();

    let is_canceled = |r: Result<(), RuntimeError>| {
        matches!(r, Err(RuntimeError::Canceled(CancelReason::Canceled)))
    };
    assert!(is_canceled(backend.prepare(&s, false, &ctx)));
    assert!(is_canceled(backend.start(&s, StartOptions::default(), &ctx)));
    assert!(is_canceled(backend.stop(&s, &ctx)));
    assert!(is_canceled(backend.pull(&s, None, &ctx)));
}

#[test]
fn compose_status_without_checkout_needs_no_docker() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ComposeBackend::new();
    let status = backend
        .status(&spec(dir.path(), "p"), &Context::background())
        .unwrap();
    assert!(!status.running);
}

#[test]
#[ignore = "requires docker, git and network access"]
fn compose_backend_full_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ComposeBackend::new();
    let s = spec(dir.path(), "akshara-it");
    let ctx = Context::background().with_timeout(Duration::from_secs(1200));

    backend.prepare(&s, false, &ctx).unwrap();
    backend.pull(&s, None, &ctx).unwrap();
    backend.start(&s, StartOptions::default(), &ctx).unwrap();
    backend.wait_ready(&s, Duration::from_secs(600), &ctx).unwrap();
    assert!(backend.status(&s, &ctx).unwrap().running);
    backend.remove(&s, &ctx).unwrap();
}
