// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#![cfg(unix)]

use anyhow::Result;
use gcp_switcher_app::{FailureKind, OpFailure};
use gcp_switcher_gcloud::{Gcloud, GcloudError, Timeouts};
use gcp_switcher_testkit::{CloudFaker, FakeGcloud, Reply, accounts_json, projects_json};
use std::time::{Duration, Instant};

const PRECHECK: &str = "auth list --filter=account:user@example.com --format=value(account)";

fn quick() -> Timeouts {
    Timeouts {
        command: Duration::from_secs(5),
        long: Duration::from_secs(5),
        login: Duration::from_secs(5),
    }
}

fn gcloud_for(fake: &FakeGcloud) -> Result<Gcloud> {
    let path = fake.install()?;
    Ok(Gcloud::new(path.to_string_lossy(), quick()))
}

#[test]
fn active_account_and_project_read_stdout() -> Result<()> {
    let fake = FakeGcloud::new()?
        .on(
            "auth list --filter=status:ACTIVE --format=value(account)",
            Reply::ok("a@example.com\n"),
        )
        .on(
            "config get-value project",
            Reply::ok("").with_stderr("(unset)\n"),
        );
    let gcloud = gcloud_for(&fake)?;

    assert!(gcloud.is_available());
    assert_eq!(gcloud.active_account()?, "a@example.com");
    assert_eq!(gcloud.active_project()?, "");
    assert_eq!(fake.calls()?.len(), 2);
    Ok(())
}

#[test]
fn list_operations_decode_fixture_json() -> Result<()> {
    let mut faker = CloudFaker::new(9);
    let accounts = faker.accounts(3);
    let projects = faker.projects(4);
    let fake = FakeGcloud::new()?
        .on("auth list --format=json", Reply::ok(accounts_json(&accounts)?))
        .on("projects list --format=json", Reply::ok(projects_json(&projects)?));
    let gcloud = gcloud_for(&fake)?;

    assert_eq!(gcloud.list_accounts()?, accounts);
    assert_eq!(gcloud.list_projects()?, projects);
    Ok(())
}

#[test]
fn malformed_list_output_degrades_to_empty() -> Result<()> {
    let fake = FakeGcloud::new()?
        .on("projects list --format=json", Reply::ok("WARNING: not json"))
        .on("auth list --format=json", Reply::ok("{\"account\": 1}"));
    let gcloud = gcloud_for(&fake)?;

    assert!(gcloud.list_projects()?.is_empty());
    assert!(gcloud.list_accounts()?.is_empty());
    Ok(())
}

#[test]
fn non_zero_exit_carries_tool_output() -> Result<()> {
    let fake = FakeGcloud::new()?.on(
        "projects list --format=json",
        Reply::fail(1, "ERROR: (gcloud.projects.list) reauth required"),
    );
    let gcloud = gcloud_for(&fake)?;

    let error = gcloud
        .list_projects()
        .expect_err("non-zero exit should fail");
    assert_eq!(error.kind(), FailureKind::NonZeroExit);
    assert!(error.to_string().contains("reauth required"), "{error}");
    Ok(())
}

#[test]
fn hung_command_times_out_and_is_killed() -> Result<()> {
    let fake = FakeGcloud::new()?.on("config get-value project", Reply::hang(30));
    let path = fake.install()?;
    let gcloud = Gcloud::new(
        path.to_string_lossy(),
        Timeouts {
            command: Duration::from_millis(200),
            ..quick()
        },
    );

    let start = Instant::now();
    let error = gcloud
        .active_project()
        .expect_err("hung command should time out");
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(matches!(error, GcloudError::Timeout { timeout_ms: 200, .. }));
    assert!(OpFailure::from(&error).is_timeout());
    Ok(())
}

#[test]
fn missing_binary_is_reported_as_tool_missing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let gcloud = Gcloud::new(dir.path().join("gcloud").to_string_lossy(), quick());

    assert!(!gcloud.is_available());
    let error = gcloud
        .active_account()
        .expect_err("missing binary should fail");
    assert_eq!(error.kind(), FailureKind::ToolMissing);
    Ok(())
}

#[test]
fn switch_account_refuses_unauthenticated_account() -> Result<()> {
    let fake = FakeGcloud::new()?.on(PRECHECK, Reply::ok(""));
    let gcloud = gcloud_for(&fake)?;

    let error = gcloud
        .switch_account("user@example.com")
        .expect_err("unauthenticated account should be refused");
    assert_eq!(error.kind(), FailureKind::NotAuthenticated);
    assert_eq!(
        error.to_string(),
        "account user@example.com is not authenticated\n\nPlease run 'gcloud auth login user@example.com' to authenticate this account first."
    );
    assert_eq!(fake.calls()?, vec![PRECHECK.to_owned()]);
    Ok(())
}

#[test]
fn switch_account_prechecks_then_sets_account() -> Result<()> {
    let fake = FakeGcloud::new()?
        .on(PRECHECK, Reply::ok("user@example.com\n"))
        .on("config set account user@example.com", Reply::ok(""));
    let gcloud = gcloud_for(&fake)?;

    gcloud.switch_account("user@example.com")?;
    assert_eq!(
        fake.calls()?,
        vec![
            PRECHECK.to_owned(),
            "config set account user@example.com".to_owned()
        ]
    );
    Ok(())
}

#[test]
fn switch_account_failure_includes_login_hint() -> Result<()> {
    let fake = FakeGcloud::new()?
        .on(PRECHECK, Reply::ok("user@example.com\n"))
        .on(
            "config set account user@example.com",
            Reply::fail(1, "ERROR: credentials expired"),
        );
    let gcloud = gcloud_for(&fake)?;

    let message = gcloud
        .switch_account("user@example.com")
        .expect_err("config set should fail")
        .to_string();
    assert!(message.starts_with("failed to switch to account user@example.com:\nERROR: credentials expired"));
    assert!(message.contains("Run 'gcloud auth login user@example.com' if needed."));
    Ok(())
}

#[test]
fn switch_project_failure_includes_access_hint() -> Result<()> {
    let fake = FakeGcloud::new()?
        .on("config set project ghost", Reply::fail(1, "ERROR: project not found"))
        .on("config set project alpha", Reply::ok("").with_stderr("Updated property [core/project].\n"));
    let gcloud = gcloud_for(&fake)?;

    gcloud.switch_project("alpha")?;
    let error = gcloud
        .switch_project("ghost")
        .expect_err("unknown project should fail");
    assert_eq!(
        error.to_string(),
        "failed to switch to project ghost:\nERROR: project not found\n\nPlease ensure you have access to this project and that it exists."
    );
    Ok(())
}

#[test]
fn login_runs_application_default_step_when_enabled() -> Result<()> {
    let fake = FakeGcloud::new()?
        .on("auth login", Reply::ok(""))
        .on("auth application-default login", Reply::ok(""));
    let gcloud = gcloud_for(&fake)?;
    gcloud.login()?;
    assert_eq!(
        fake.calls()?,
        vec!["auth login".to_owned(), "auth application-default login".to_owned()]
    );

    let single = FakeGcloud::new()?.on("auth login", Reply::ok(""));
    gcloud_for(&single)?
        .with_application_default_login(false)
        .login()?;
    assert_eq!(single.calls()?, vec!["auth login".to_owned()]);
    Ok(())
}

#[test]
fn failed_login_stops_before_application_default_step() -> Result<()> {
    let fake = FakeGcloud::new()?.on("auth login", Reply::fail(1, ""));
    let gcloud = gcloud_for(&fake)?;
    let error = gcloud.login().expect_err("login should fail");
    assert_eq!(error.kind(), FailureKind::NonZeroExit);
    assert_eq!(fake.calls()?, vec!["auth login".to_owned()]);
    Ok(())
}
