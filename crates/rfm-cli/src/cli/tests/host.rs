//! Host-level commands against a temporary state database. No request
//! leaves the machine: sources are unroutable or a closed local port.

use crate::cli::commands::{run_destroy, run_refresh, run_status};
use crate::cli::Host;
use rfm_core::retry::RetryPolicy;
use rfm_core::state_db::StateDb;
use rfm_core::{DesiredState, ProvisionedState, Reconciler};
use std::path::Path;
use std::sync::Arc;

const ABC_SHA256: &str = "tdQEXD9Gb6kf4sxqvnkjKhpXzfEE96JucW4KHieJ33g=";
const ABC_MD5: &str = "902fbdd2b1df0c4f70b4a5d23525e932";

async fn host(dir: &Path) -> Host {
    Host {
        db: StateDb::open_at(dir.join("state.db")).await.unwrap(),
        reconciler: Arc::new(Reconciler::default()),
        retry: RetryPolicy::none(),
    }
}

/// Add a record and mark it provisioned with the digests of "ABC".
async fn provision(h: &Host, url: &str, dest: &Path, validator: Option<&str>) -> i64 {
    let desired = DesiredState::new(url, dest);
    let id = h.db.add_resource(&desired).await.unwrap();
    let state = ProvisionedState {
        source_url: desired.source_url.clone(),
        destination: dest.to_path_buf(),
        digest_primary: ABC_SHA256.into(),
        digest_secondary: ABC_MD5.into(),
        validator: validator.map(String::from),
    };
    h.db.record_provisioned(id, &state).await.unwrap();
    id
}

/// URL on a local port that nothing listens on.
fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/payload.bin")
}

#[tokio::test]
async fn destroy_removes_file_and_record() {
    let dir = tempfile::tempdir().unwrap();
    let h = host(dir.path()).await;
    let dest = dir.path().join("a.bin");
    std::fs::write(&dest, b"ABC").unwrap();
    let id = provision(&h, "http://192.0.2.1/a.bin", &dest, Some("v1")).await;

    run_destroy(&h, id, false).await.unwrap();
    assert!(!dest.exists());
    assert!(h.db.get_resource(id).await.unwrap().is_none());
}

#[tokio::test]
async fn destroy_keep_record_clears_state() {
    let dir = tempfile::tempdir().unwrap();
    let h = host(dir.path()).await;
    let dest = dir.path().join("b.bin");
    std::fs::write(dest.with_extension("bin.part"), b"partial").unwrap();

    let id = h
        .db
        .add_resource(&DesiredState::new("http://192.0.2.1/b.bin", &dest))
        .await
        .unwrap();

    run_destroy(&h, id, true).await.unwrap();
    assert!(!dest.with_extension("bin.part").exists());
    let rec = h.db.get_resource(id).await.unwrap().unwrap();
    assert!(!rec.is_present());
}

#[tokio::test]
async fn destroy_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let h = host(dir.path()).await;
    assert!(run_destroy(&h, 42, false).await.is_err());
}

#[tokio::test]
async fn refresh_clears_state_of_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let h = host(dir.path()).await;
    let dest = dir.path().join("gone.bin");
    let id = provision(&h, "http://192.0.2.1/gone.bin", &dest, None).await;

    // File missing: detected locally, no request reaches the unroutable host.
    run_refresh(&h, Some(id)).await.unwrap();
    assert!(!h.db.get_resource(id).await.unwrap().unwrap().is_present());
    run_status(&h.db, false).await.unwrap();
    run_status(&h.db, true).await.unwrap();
}

#[tokio::test]
async fn refresh_keeps_going_after_a_failed_check() {
    let dir = tempfile::tempdir().unwrap();
    let h = host(dir.path()).await;

    // Local file matches, so Read goes to the network and is refused.
    let unreachable = dir.path().join("unreachable.bin");
    std::fs::write(&unreachable, b"ABC").unwrap();
    let first = provision(&h, &refused_url(), &unreachable, Some("v1")).await;

    let missing = dir.path().join("missing.bin");
    let second = provision(&h, "http://192.0.2.1/missing.bin", &missing, None).await;

    let err = run_refresh(&h, None).await.unwrap_err();
    assert!(format!("{err:#}").contains("1 resource"));

    assert!(h.db.get_resource(first).await.unwrap().unwrap().is_present());
    assert!(!h.db.get_resource(second).await.unwrap().unwrap().is_present());
}
