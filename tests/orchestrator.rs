mod common;

use chrono::{TimeZone, Utc};
use common::MemoryAuthority;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use vault_ca::ErrorKind;
use vault_ca::artifacts::ArtifactWriter;
use vault_ca::cache::InventoryCache;
use vault_ca::orchestrator::{CertificateOrchestrator, Flow, IssueRequest, Stage};
use vault_ca::pki::{CertificateStatus, IssueDecision};

fn orchestrator(authority: Arc<MemoryAuthority>) -> CertificateOrchestrator {
    let cache = Arc::new(InventoryCache::new(8, Duration::from_secs(60)));
    CertificateOrchestrator::new(authority, cache)
}

fn request(cn: &str, force: bool) -> IssueRequest {
    IssueRequest {
        ca: "ca_users".to_string(),
        role: "user".to_string(),
        common_name: cn.to_string(),
        ttl: "8760h".to_string(),
        force,
    }
}

#[tokio::test]
async fn duplicate_name_is_denied_without_calling_issue() {
    let authority = Arc::new(MemoryAuthority::new().with_certificate("ca_users", "A1", "alice"));
    let orch = orchestrator(authority.clone());
    let dir = tempfile::tempdir().unwrap();
    let writer = ArtifactWriter::new(dir.path());

    let err = orch.issue(&request("alice", false), &writer).await.unwrap_err();

    assert_eq!(err.flow, Flow::Issue);
    assert_eq!(err.stage, Stage::Denied);
    assert_eq!(err.kind(), ErrorKind::CollisionDenied);
    assert!(err.to_string().contains("A1"));
    assert_eq!(MemoryAuthority::calls(&authority.issue_calls), 0);
    assert!(!dir.path().join("alice_cert.pem").exists());
}

#[tokio::test]
async fn revoked_certificate_still_blocks_its_name() {
    let authority = Arc::new(MemoryAuthority::new().with_revoked(
        "ca_users",
        "A1",
        "alice",
        1_600_000_000,
    ));
    let orch = orchestrator(authority.clone());
    let dir = tempfile::tempdir().unwrap();

    let err = orch
        .issue(&request("alice", false), &ArtifactWriter::new(dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CollisionDenied);
    assert_eq!(MemoryAuthority::calls(&authority.issue_calls), 0);
}

#[tokio::test]
async fn name_match_is_case_sensitive() {
    let authority = Arc::new(MemoryAuthority::new().with_certificate("ca_users", "A1", "alice"));
    let orch = orchestrator(authority.clone());
    let dir = tempfile::tempdir().unwrap();

    let report = orch
        .issue(&request("Alice", false), &ArtifactWriter::new(dir.path()))
        .await
        .unwrap();

    assert_eq!(report.decision, IssueDecision::Allow);
    assert_eq!(MemoryAuthority::calls(&authority.issue_calls), 1);
}

#[tokio::test]
async fn forced_issue_writes_artifacts() {
    let authority = Arc::new(MemoryAuthority::new().with_certificate("ca_users", "A1", "alice"));
    let orch = orchestrator(authority.clone());
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("client.ovpn");
    std::fs::write(&template, "cn={{ common_name }}\n<cert>\n{{ cert }}</cert>\n").unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let writer = ArtifactWriter::new(&out).with_template(Some(template));

    let report = orch.issue(&request("alice", true), &writer).await.unwrap();

    assert_eq!(
        report.decision,
        IssueDecision::AllowWithWarning {
            existing_serial: "A1".to_string()
        }
    );
    assert_eq!(MemoryAuthority::calls(&authority.issue_calls), 1);
    assert_eq!(report.artifacts.certificate, out.join("alice_cert.pem"));
    assert_eq!(report.artifacts.private_key, out.join("alice_key.pem"));
    assert_eq!(report.artifacts.rendered, Some(out.join("alice.ovpn")));

    let cert = std::fs::read_to_string(&report.artifacts.certificate).unwrap();
    assert!(cert.starts_with("-----BEGIN CERTIFICATE-----"));
    let key = std::fs::read_to_string(&report.artifacts.private_key).unwrap();
    assert!(key.contains("PRIVATE KEY"));
    let rendered = std::fs::read_to_string(out.join("alice.ovpn")).unwrap();
    assert!(rendered.starts_with("cn=alice\n<cert>\n-----BEGIN CERTIFICATE-----"));
}

#[tokio::test]
async fn failed_issue_is_not_retried() {
    let authority = Arc::new(MemoryAuthority::new().failing_issue());
    let orch = orchestrator(authority.clone());
    let dir = tempfile::tempdir().unwrap();

    let err = orch
        .issue(&request("bob", false), &ArtifactWriter::new(dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::CollisionChecked);
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert_eq!(MemoryAuthority::calls(&authority.issue_calls), 1);
    assert!(!dir.path().join("bob_key.pem").exists());
}

#[tokio::test]
async fn unreadable_record_aborts_issue_before_the_collision_check() {
    let authority = Arc::new(
        MemoryAuthority::new()
            .with_certificate("ca_users", "A1", "alice")
            .with_certificate("ca_users", "A2", "carol")
            .unreadable("A2"),
    );
    let orch = orchestrator(authority.clone());
    let dir = tempfile::tempdir().unwrap();

    let err = orch
        .issue(&request("carol", false), &ArtifactWriter::new(dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Idle);
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert_eq!(MemoryAuthority::calls(&authority.issue_calls), 0);
}

#[tokio::test]
async fn unparsable_record_is_a_parse_failure() {
    let authority = Arc::new(MemoryAuthority::new().with_raw("ca_users", "A1", "not a pem"));
    let orch = orchestrator(authority);

    let err = orch.list("ca_users", Utc::now()).await.unwrap_err();

    assert_eq!(err.flow, Flow::List);
    assert_eq!(err.kind(), ErrorKind::ParseError);
    assert!(err.to_string().contains("A1"));
}

#[tokio::test]
async fn unsafe_common_name_is_rejected_before_any_authority_call() {
    let authority = Arc::new(MemoryAuthority::new());
    let orch = orchestrator(authority.clone());
    let dir = tempfile::tempdir().unwrap();

    let err = orch
        .issue(&request("../escape", false), &ArtifactWriter::new(dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ArtifactFailure);
    assert_eq!(MemoryAuthority::calls(&authority.list_calls), 0);
    assert_eq!(MemoryAuthority::calls(&authority.issue_calls), 0);
}

#[tokio::test]
async fn listing_classifies_each_record() {
    let authority = Arc::new(
        MemoryAuthority::new()
            .with_certificate("ca_users", "A1", "alice")
            .with_expired("ca_users", "A2", "bob")
            .with_revoked("ca_users", "A3", "carol", 1_600_000_000),
    );
    let orch = orchestrator(authority);
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

    let listing = orch.list("ca_users", now).await.unwrap();

    let statuses: Vec<_> = listing
        .iter()
        .map(|c| (c.record.serial(), c.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("A1", CertificateStatus::Valid),
            ("A2", CertificateStatus::Expired),
            ("A3", CertificateStatus::Revoked),
        ]
    );
    assert_eq!(
        listing[2].revocation_date,
        Some(Utc.timestamp_opt(1_600_000_000, 0).unwrap())
    );
}

#[tokio::test]
async fn empty_authority_lists_nothing() {
    let authority = Arc::new(MemoryAuthority::new().with_empty_authority("ca_users"));
    let orch = orchestrator(authority);

    let listing = orch.list("ca_users", Utc::now()).await.unwrap();

    assert!(listing.is_empty());
}

#[tokio::test]
async fn listing_is_cached_until_revocation() {
    let authority = Arc::new(MemoryAuthority::new().with_certificate("ca_users", "A1", "alice"));
    let orch = orchestrator(authority.clone());

    orch.list("ca_users", Utc::now()).await.unwrap();
    orch.list("ca_users", Utc::now()).await.unwrap();
    assert_eq!(MemoryAuthority::calls(&authority.list_calls), 1);

    let report = orch.revoke("ca_users", "A1").await.unwrap();
    assert_eq!(report.redirect_to, "/ca/ca_users");

    let listing = orch.list("ca_users", Utc::now()).await.unwrap();
    assert_eq!(MemoryAuthority::calls(&authority.list_calls), 2);
    assert_eq!(listing[0].status, CertificateStatus::Revoked);
}

#[tokio::test]
async fn revoking_twice_is_harmless() {
    let authority = Arc::new(MemoryAuthority::new().with_certificate("ca_users", "A1", "alice"));
    let orch = orchestrator(authority.clone());

    assert_ok!(orch.revoke("ca_users", "A1").await);
    assert_ok!(orch.revoke("ca_users", "A1").await);

    assert_eq!(MemoryAuthority::calls(&authority.revoke_calls), 2);
}

#[tokio::test]
async fn revoking_unknown_serial_stops_at_idle() {
    let authority = Arc::new(MemoryAuthority::new().with_empty_authority("ca_users"));
    let orch = orchestrator(authority);

    let err = assert_err!(orch.revoke("ca_users", "nope").await);

    assert_eq!(err.flow, Flow::Revoke);
    assert_eq!(err.stage, Stage::Idle);
}

#[tokio::test]
async fn issue_invalidates_cached_listing() {
    let authority = Arc::new(MemoryAuthority::new().with_empty_authority("ca_users"));
    let orch = orchestrator(authority.clone());
    let dir = tempfile::tempdir().unwrap();

    assert!(orch.list("ca_users", Utc::now()).await.unwrap().is_empty());
    orch.issue(&request("dave", false), &ArtifactWriter::new(dir.path()))
        .await
        .unwrap();

    let listing = orch.list("ca_users", Utc::now()).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].record.common_name(), "dave");
}

#[tokio::test]
async fn download_returns_the_stored_pem() {
    let authority = Arc::new(MemoryAuthority::new().with_certificate("ca_users", "A1", "alice"));
    let orch = orchestrator(authority);

    let pem = orch.certificate_pem("ca_users", "A1").await.unwrap();

    assert!(pem.contains("BEGIN CERTIFICATE"));
}
