//! `create`, `list`, and `delete` subcommands.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use cluster::KubeConnector;
use pipelines::{
    AccessToken, EnvironmentName, FileManifestLoader, GitProvider, QualifiedServiceName,
    ServiceName, WebhookId, WebhookOrchestrator, WebhookRequest, WebhookTarget,
};
use scm::ScmClientFactory;

/// Options shared by every webhook subcommand.
#[derive(Args, Debug)]
pub struct WebhookArgs {
    /// Git provider access token
    #[arg(long, env = "GITOPS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Path to the pipelines manifest
    #[arg(long, default_value = "pipelines.yaml")]
    pub pipelines_file: PathBuf,

    /// Environment of the target service
    #[arg(long, requires = "service_name", conflicts_with = "cicd")]
    pub env_name: Option<String>,

    /// Name of the target service
    #[arg(long, requires = "env_name", conflicts_with = "cicd")]
    pub service_name: Option<String>,

    /// Target the CICD (GitOps) repository instead of a service
    #[arg(long)]
    pub cicd: bool,

    /// Git provider driver (github, gitlab); detected from the host when omitted
    #[arg(long, value_parser = parse_driver)]
    pub driver: Option<GitProvider>,

    /// Git provider REST API base URL, for self-hosted instances
    #[arg(long)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// How webhook ids are printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One id per line.
    Text,
    /// A JSON string (create) or array of strings (list, delete).
    Json,
}

/// Webhook operation selected by the subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Delete,
}

fn parse_driver(value: &str) -> Result<GitProvider, String> {
    GitProvider::from_driver(value)
        .ok_or_else(|| format!("unknown driver '{value}' (expected github or gitlab)"))
}

impl WebhookArgs {
    /// Converts the parsed flags into an orchestrator request.
    pub fn request(&self) -> Result<WebhookRequest> {
        let access_token = AccessToken::new(self.access_token.clone())
            .context("--access-token must not be empty")?;

        let service = match (&self.env_name, &self.service_name) {
            (Some(env), Some(svc)) => Some(QualifiedServiceName::new(
                EnvironmentName::new(env.clone()).context("--env-name must not be empty")?,
                ServiceName::new(svc.clone()).context("--service-name must not be empty")?,
            )),
            _ => None,
        };
        let target = WebhookTarget::from_flags(self.cicd, service)
            .context("either --cicd or both --env-name and --service-name are required")?;

        Ok(WebhookRequest {
            access_token,
            pipelines_file: self.pipelines_file.clone(),
            target,
        })
    }

    fn orchestrator(&self) -> Result<WebhookOrchestrator> {
        let mut scm = ScmClientFactory::new().context("failed to build HTTP client")?;
        if let Some(driver) = self.driver {
            scm = scm.with_driver(driver);
        }
        if let Some(api_url) = &self.api_url {
            scm = scm.with_api_url(api_url.clone());
        }
        Ok(WebhookOrchestrator::new(
            Arc::new(FileManifestLoader),
            Arc::new(KubeConnector),
            Arc::new(scm),
        ))
    }
}

/// Runs one webhook operation and prints its result to stdout.
pub async fn run(operation: Operation, args: &WebhookArgs) -> Result<()> {
    let request = args.request()?;
    let orchestrator = args.orchestrator()?;
    let mut out = std::io::stdout();

    match operation {
        Operation::Create => {
            let id = orchestrator
                .create(&request)
                .await
                .context("failed to create webhook")?;
            write_created(&mut out, &id, args.output)?;
        }
        Operation::List => {
            let ids = orchestrator
                .list(&request)
                .await
                .context("failed to list webhooks")?;
            write_ids(&mut out, &ids, args.output)?;
        }
        Operation::Delete => match orchestrator.delete(&request).await {
            Ok(ids) => write_ids(&mut out, &ids, args.output)?,
            Err(err) => {
                if let Some(deleted) = err.partially_deleted() {
                    write_ids(&mut out, deleted, args.output)?;
                }
                return Err(err).context("failed to delete webhooks");
            }
        },
    }
    Ok(())
}

fn write_created(out: &mut impl Write, id: &WebhookId, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{id}")?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(id)?)?,
    }
    Ok(())
}

fn write_ids(out: &mut impl Write, ids: &[WebhookId], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for id in ids {
                writeln!(out, "{id}")?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(ids)?)?,
    }
    Ok(())
}
