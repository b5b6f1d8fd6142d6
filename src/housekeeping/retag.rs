//! Zero-copy retag: pull a manifest under one tag, push it under another

use crate::config::Credentials;
use crate::error::Result;
use crate::housekeeping::Housekeeper;
use std::fmt;

const DIGEST_PREFIX: &str = "sha256:";

/// Separator between repository and reference: `@` for digests, `:` for tags
pub fn reference_separator(reference: &str) -> char {
    if reference.starts_with(DIGEST_PREFIX) {
        '@'
    } else {
        ':'
    }
}

/// `repository:tag` or `repository@sha256:...`
pub fn image_reference(repository: &str, reference: &str) -> String {
    format!("{}{}{}", repository, reference_separator(reference), reference)
}

/// Result of a successful retag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetagOutcome {
    pub repository: String,
    pub old_tag: String,
    pub new_tag: String,
    pub manifest_size: usize,
}

impl RetagOutcome {
    pub fn source(&self) -> String {
        image_reference(&self.repository, &self.old_tag)
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.repository, self.new_tag)
    }
}

impl fmt::Display for RetagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Retagged {} as {}", self.source(), self.target())
    }
}

impl Housekeeper {
    /// Copy `old_tag` of `repository` to `new_tag` without moving any layers.
    ///
    /// One registry token scoped for `pull,push` serves both calls. The error
    /// variant tells which stage failed: `Auth` for the token, `Transfer`
    /// with `PullManifest` or `PushManifest` for the two registry calls.
    pub async fn retag(
        &self,
        credentials: &Credentials,
        repository: &str,
        old_tag: &str,
        new_tag: &str,
    ) -> Result<RetagOutcome> {
        self.output.section("Retag");
        self.output.info(&format!(
            "Copying {} to {}:{}",
            image_reference(repository, old_tag),
            repository,
            new_tag
        ));

        self.output.step("Authenticating with registry");
        let token = self
            .client
            .auth()
            .authenticate_registry(repository, credentials)
            .await?;

        self.output.step("Pulling manifest");
        let manifest = self
            .client
            .manifests()
            .pull_manifest(&token, repository, old_tag)
            .await?;
        self.output.verbose(&format!(
            "Pulled manifest ({})",
            self.output.format_size(manifest.len() as u64)
        ));

        self.output.step("Pushing manifest");
        self.client
            .manifests()
            .push_manifest(&token, repository, new_tag, &manifest)
            .await?;

        Ok(RetagOutcome {
            repository: repository.to_string(),
            old_tag: old_tag.to_string(),
            new_tag: new_tag.to_string(),
            manifest_size: manifest.len(),
        })
    }
}
