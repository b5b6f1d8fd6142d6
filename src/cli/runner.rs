//! Runner dispatching the parsed command to the housekeeping workflows

use crate::cli::args::{Args, Command};
use crate::config::Credentials;
use crate::error::Result;
use crate::housekeeping::Housekeeper;
use crate::logging::Logger;

pub struct Runner {
    args: Args,
    output: Logger,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        let output = if args.quiet {
            Logger::new_quiet()
        } else {
            Logger::new(args.verbose)
        };

        Self { args, output }
    }

    pub fn output(&self) -> &Logger {
        &self.output
    }

    /// Run with credentials from the process environment
    pub async fn run(&self) -> Result<()> {
        self.run_with_env(|key| std::env::var(key).ok()).await
    }

    /// Run with credentials from `lookup`.
    ///
    /// Credentials are resolved before anything else, so a missing variable
    /// fails the run without a single request being sent.
    pub async fn run_with_env<F>(&self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(lookup)?;
        let config = self.args.to_config()?;

        self.output.verbose(&format!(
            "Endpoints: auth={} registry={} hub={}",
            config.endpoints.auth, config.endpoints.registry, config.endpoints.hub
        ));

        let housekeeper = Housekeeper::new(config, self.output.clone())?;

        match &self.args.command {
            Command::Retag {
                repository,
                old_tag,
                new_tag,
            } => {
                let outcome = housekeeper
                    .retag(&credentials, repository, old_tag, new_tag)
                    .await?;
                println!("{}", outcome);
            }
            Command::PrunePreviewTags { .. } => {
                let report = housekeeper.prune(&credentials).await?;
                report.log(&self.output);
            }
        }

        self.output.success(&format!(
            "Operation completed successfully in {}",
            self.output.format_duration(self.output.elapsed())
        ));

        Ok(())
    }
}
