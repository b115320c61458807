// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gcp_switcher_app::{Account, OpFailure, Project};
use gcp_switcher_gcloud::{Gcloud, GcloudError};

pub struct GcloudRuntime {
    gcloud: Gcloud,
}

impl GcloudRuntime {
    pub fn new(gcloud: Gcloud) -> Self {
        Self { gcloud }
    }
}

fn flatten<T>(operation: &str, result: Result<T, GcloudError>) -> Result<T, OpFailure> {
    result.map_err(|error| {
        tracing::warn!(operation, error = %error, "gcloud operation failed");
        OpFailure::from(error)
    })
}

impl gcp_switcher_tui::AppRuntime for GcloudRuntime {
    fn gcloud_available(&self) -> bool {
        let available = self.gcloud.is_available();
        if !available {
            tracing::warn!(binary = self.gcloud.binary(), "gcloud not found");
        }
        available
    }

    fn active_account(&self) -> Result<String, OpFailure> {
        flatten("active account", self.gcloud.active_account())
    }

    fn active_project(&self) -> Result<String, OpFailure> {
        flatten("active project", self.gcloud.active_project())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, OpFailure> {
        flatten("list accounts", self.gcloud.list_accounts())
    }

    fn list_projects(&self) -> Result<Vec<Project>, OpFailure> {
        flatten("list projects", self.gcloud.list_projects())
    }

    fn switch_account(&self, account: &str) -> Result<(), OpFailure> {
        flatten("switch account", self.gcloud.switch_account(account))
    }

    fn switch_project(&self, project: &str) -> Result<(), OpFailure> {
        flatten("switch project", self.gcloud.switch_project(project))
    }

    fn login(&self) -> Result<(), OpFailure> {
        flatten("login", self.gcloud.login())
    }
}
