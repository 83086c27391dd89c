// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: engine over a real Graph client against a mock server,
//! plus a few invocations of the built binary.
//!
//! Each test starts its own server and engine; tests are order-insensitive.

use std::process::Command;
use std::sync::Arc;

use nuketune_config::NukeTuneConfig;
use nuketune_core::{DeletionPhase, DeletionStatus, NukeError};
use nuketune_engine::{NukeEngine, find_category};
use nuketune_graph::GraphClient;
use nuketune_test_utils::MockCredential;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_for(server: &MockServer, credential: MockCredential, ids: &[&str]) -> NukeEngine {
    let mut config = NukeTuneConfig::default();
    config.graph.base_url = Some(server.uri());
    config.deletion.chunk_delay_ms = 0;
    let client = GraphClient::from_config_with(&config, Arc::new(credential)).unwrap();
    let catalog = ids.iter().map(|id| find_category(id).unwrap()).collect();
    NukeEngine::with_catalog(Arc::new(client), &config, catalog)
}

// ---- Full workflow over HTTP ----

#[tokio::test]
async fn scope_tags_run_skips_default_and_logs_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/beta/deviceManagement/roleScopeTags"))
        .and(header("authorization", "Bearer e2e-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"id": "0", "displayName": "Default"},
                {"id": "1", "displayName": "Berlin"},
                {"id": "2", "displayName": "Munich"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/beta/deviceManagement/roleScopeTags/0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/beta/deviceManagement/roleScopeTags/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/beta/deviceManagement/roleScopeTags/2"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("request-id", "req-42")
                .set_body_json(serde_json::json!({
                    "error": {"code": "ResourceNotFound", "message": "Scope tag not found"}
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server, MockCredential::new("e2e-token"), &["roleScopeTags"]);
    let session = engine.session();
    session.select_all_categories().unwrap();
    let loaded = engine.load_selected_categories().await;
    assert_eq!(loaded[0].1.as_ref().ok(), Some(&3));

    session.open_preview().unwrap();
    session.begin_confirmation("DELETE").unwrap();
    let summary = engine.start_deletion().await.unwrap();
    assert_eq!((summary.deleted, summary.failed, summary.skipped), (1, 1, 1));

    let snap = session.snapshot();
    assert_eq!(snap.phase, DeletionPhase::Complete);
    let failure = snap
        .log
        .iter()
        .find(|e| e.status == DeletionStatus::Error)
        .unwrap();
    let error = failure.error.as_ref().unwrap();
    assert_eq!(error.code, "ResourceNotFound");
    assert_eq!(error.status_code, 404);
    assert_eq!(error.request_id.as_deref(), Some("req-42"));

    let csv = engine.export_log().unwrap();
    assert!(csv.contains("\"Default\",\"skipped\",\"Protected object (built-in or system managed)\""));
    assert!(csv.contains("\"Munich\",\"error\",\"Scope tag not found\""));
    assert!(csv.contains("\"Berlin\",\"success\",\"\""));
}

#[tokio::test]
async fn signed_out_credential_marks_categories_without_blocking_others() {
    let server = MockServer::start().await;
    let engine = engine_for(
        &server,
        MockCredential::signed_out(),
        &["deviceManagementScripts", "roleScopeTags"],
    );
    engine.session().select_all_categories().unwrap();

    let results = engine.load_selected_categories().await;
    assert_eq!(results.len(), 2);
    assert!(
        results
            .iter()
            .all(|(_, r)| matches!(r, Err(NukeError::InteractionRequired(_))))
    );
    let snap = engine.session().snapshot();
    assert!(snap.categories.iter().all(|c| c.error.is_some() && !c.is_loading));
}

#[tokio::test]
async fn written_log_lands_in_requested_directory() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let engine = engine_for(&server, MockCredential::new("t"), &["roleScopeTags"]);
    let path = engine.write_log(tmp.path()).await.unwrap();
    assert!(path.starts_with(tmp.path()));
    let contents = std::fs::read_to_string(path).unwrap();
    assert_eq!(contents.lines().count(), 1);
}

// ---- Binary invocations ----

fn nuketune() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nuketune"));
    cmd.env_remove("NUKETUNE_ACCESS_TOKEN");
    cmd
}

#[test]
fn categories_lists_the_catalog() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("nuketune.toml");
    std::fs::write(&config, "").unwrap();

    let output = nuketune()
        .args(["categories", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("managedDevices"));
    assert!(stdout.contains("roleScopeTags"));
    assert!(stdout.contains("not selectable"));
}

#[test]
fn config_typo_fails_with_suggestion() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("nuketune.toml");
    std::fs::write(&config, "[deletion]\nbatch_sise = 4\n").unwrap();

    let output = nuketune()
        .args(["config", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("batch_size"), "stderr: {stderr}");
}

#[test]
fn config_prints_redacted_settings() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("nuketune.toml");
    std::fs::write(
        &config,
        "[auth]\naccess_token = \"very-secret\"\n[deletion]\nbatch_size = 4\n",
    )
    .unwrap();

    let output = nuketune()
        .args(["config", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("batch_size = 4"));
    assert!(!stdout.contains("very-secret"));
}

#[test]
fn preview_without_selection_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("nuketune.toml");
    std::fs::write(&config, "[auth]\naccess_token = \"t\"\n").unwrap();

    let output = nuketune()
        .args(["preview", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no categories selected"));
}
