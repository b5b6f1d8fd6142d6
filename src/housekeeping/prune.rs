//! Pruning of expired preview tags
//!
//! Each repository of the organization goes through
//! `Discover -> Evaluate -> (Delete)* -> Done`, strictly one after another.
//! Failure handling differs per step:
//! - registry login for a repository: fatal, it points at bad credentials
//! - tag listing: the repository is skipped and the run goes on
//! - tag metadata and deletion: fatal, nothing after the failing tag runs

use crate::config::Credentials;
use crate::error::Result;
use crate::housekeeping::Housekeeper;
use crate::logging::Logger;
use crate::registry::auth::HubToken;
use chrono::{DateTime, Utc};

/// Preview tags older than this are deleted
pub const MAX_PREVIEW_AGE_HOURS: f64 = 24.0;

/// Age of a tag in fractional hours
pub fn age_in_hours(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age = now.signed_duration_since(last_updated);
    match age.num_microseconds() {
        Some(micros) => micros as f64 / 3_600_000_000.0,
        None => age.num_milliseconds() as f64 / 3_600_000.0,
    }
}

/// Strictly older than the threshold; exactly 24 hours is kept
pub fn is_expired(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    age_in_hours(last_updated, now) > MAX_PREVIEW_AGE_HOURS
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRepository {
    pub repository: String,
    pub reason: String,
}

/// What a prune run looked at and what it did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneReport {
    pub organization: String,
    pub dry_run: bool,
    pub repositories: Vec<String>,
    pub skipped: Vec<SkippedRepository>,
    pub evaluated: usize,
    /// `repository:tag` of every tag deleted, in deletion order
    pub deleted: Vec<String>,
    /// Expired tags left in place because of a dry run
    pub would_delete: Vec<String>,
    pub kept: Vec<String>,
}

impl PruneReport {
    fn new(organization: &str, dry_run: bool) -> Self {
        Self {
            organization: organization.to_string(),
            dry_run,
            ..Default::default()
        }
    }

    pub fn log(&self, output: &Logger) {
        output.summary_kv(
            "Prune summary",
            &[
                ("Organization", self.organization.clone()),
                ("Repositories", self.repositories.len().to_string()),
                ("Skipped", self.skipped.len().to_string()),
                ("Tags evaluated", self.evaluated.to_string()),
                ("Tags deleted", self.deleted.len().to_string()),
                ("Tags kept", self.kept.len().to_string()),
            ],
        );

        if self.dry_run {
            output.summary("Tags that would be deleted (dry run)", &self.would_delete);
        } else if !self.deleted.is_empty() {
            output.summary("Deleted tags", &self.deleted);
        }

        if !self.skipped.is_empty() {
            let skipped: Vec<String> = self
                .skipped
                .iter()
                .map(|s| format!("{} ({})", s.repository, s.reason))
                .collect();
            output.summary("Skipped repositories", &skipped);
        }
    }
}

impl Housekeeper {
    /// Prune expired preview tags across the configured organization
    pub async fn prune(&self, credentials: &Credentials) -> Result<PruneReport> {
        self.prune_at(credentials, Utc::now()).await
    }

    /// Same as [`Housekeeper::prune`], measuring tag age against `now`
    pub async fn prune_at(
        &self,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<PruneReport> {
        let organization = self.config.organization.as_str();
        let mut report = PruneReport::new(organization, self.config.dry_run);

        self.output.section("Prune preview tags");
        if self.config.dry_run {
            self.output
                .warning("Dry run - expired tags will be reported but not deleted");
        }

        self.output.step("Logging in to hub");
        let hub_token = self.client.auth().authenticate_hub(credentials).await?;

        self.output
            .step(&format!("Listing images in organization {}", organization));
        let images = self.client.hub().list_organization_images(organization).await?;
        if images.is_empty() {
            self.output.warning(&format!(
                "Organization {} has no repositories to prune",
                organization
            ));
        }

        for image in &images {
            let repository = format!("{}/{}", organization, image);
            self.prune_repository(&repository, credentials, &hub_token, now, &mut report)
                .await?;
        }

        Ok(report)
    }

    async fn prune_repository(
        &self,
        repository: &str,
        credentials: &Credentials,
        hub_token: &HubToken,
        now: DateTime<Utc>,
        report: &mut PruneReport,
    ) -> Result<()> {
        self.output.subsection(repository);
        report.repositories.push(repository.to_string());

        // Discover
        let registry_token = self
            .client
            .auth()
            .authenticate_registry(repository, credentials)
            .await?;

        let tags = match self
            .client
            .repositories()
            .list_preview_tags(&registry_token, repository)
            .await
        {
            Ok(tags) => tags,
            Err(err) if err.is_tag_listing_failure() => {
                self.output
                    .error(&format!("Skipping {}: {}", repository, err));
                report.skipped.push(SkippedRepository {
                    repository: repository.to_string(),
                    reason: err.to_string(),
                });
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        // Evaluate, then delete each expired tag before looking at the next
        for tag in &tags {
            let last_updated = self
                .client
                .hub()
                .get_tag_last_updated(repository, tag)
                .await?;

            let age = age_in_hours(last_updated, now);
            report.evaluated += 1;
            self.output.info(&format!(
                "Tag {} last updated {} ({:.2} hours ago)",
                tag,
                last_updated.to_rfc3339(),
                age
            ));

            let reference = format!("{}:{}", repository, tag);

            if !is_expired(last_updated, now) {
                report.kept.push(reference);
                continue;
            }

            if self.config.dry_run {
                self.output.warning(&format!("Would delete tag {}", reference));
                report.would_delete.push(reference);
                continue;
            }

            self.output.warning(&format!("Deleting tag {}", reference));
            self.client
                .hub()
                .delete_tag(hub_token, repository, tag)
                .await?;
            self.output.success(&format!("Deleted tag {}", reference));
            report.deleted.push(reference);
        }

        Ok(())
    }
}
