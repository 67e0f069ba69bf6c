//! `gitops-webhook` CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags and their environment fallbacks.
//! 2. **Wire observability**: configure `tracing-subscriber` with a text or
//!    JSON layer on stderr and an optional OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: create the manifest loader, the
//!    Kubernetes connector, and the Git provider client factory, and inject
//!    them into [`pipelines::WebhookOrchestrator`].
//! 4. **Dispatch**: run `create`, `list`, or `delete` under a root span
//!    carrying a fresh operation id, then print the resulting webhook ids.
//!
//! Any failure is printed to stderr and the process exits with status 1.

mod commands;
mod observability;

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pipelines::OperationId;
use tracing::Instrument;

use crate::commands::{Operation, WebhookArgs};
use crate::observability::LogFormat;

/// Manage the Git provider webhooks that feed the GitOps CI/CD event listener.
#[derive(Parser, Debug)]
#[command(name = "gitops-webhook", version, about)]
struct Cli {
    /// Log filter directive (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// OTLP/gRPC endpoint for exported traces
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a webhook pointing at the event listener
    Create(WebhookArgs),
    /// List webhooks pointing at the event listener
    List(WebhookArgs),
    /// Delete every webhook pointing at the event listener
    Delete(WebhookArgs),
}

impl Commands {
    fn split(&self) -> (Operation, &WebhookArgs) {
        match self {
            Self::Create(args) => (Operation::Create, args),
            Self::List(args) => (Operation::List, args),
            Self::Delete(args) => (Operation::Delete, args),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init(
        &cli.log_level,
        cli.log_format,
        cli.otlp_endpoint.as_deref(),
    ) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let (operation, args) = cli.command.split();
    let span = tracing::info_span!(
        "gitops_webhook",
        operation = ?operation,
        operation_id = %OperationId::new_random(),
    );
    let result = commands::run(operation, args).instrument(span).await;

    if let Err(e) = &result {
        tracing::debug!(error = %format!("{e:#}"), "Command failed");
    }
    telemetry.shutdown();

    finish(result, &mut std::io::stderr())
}

/// Maps the command outcome to an exit code, reporting a failure once.
fn finish(result: anyhow::Result<()>, err_out: &mut impl Write) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Nothing else can report a failed stderr write.
            let _ = writeln!(err_out, "Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_for_a_service() {
        let cli = Cli::try_parse_from([
            "gitops-webhook",
            "create",
            "--access-token",
            "abc",
            "--env-name",
            "dev",
            "--service-name",
            "gateway",
        ])
        .unwrap();

        let (operation, args) = cli.command.split();
        assert_eq!(operation, Operation::Create);
        assert_eq!(args.env_name.as_deref(), Some("dev"));
        assert_eq!(args.pipelines_file.to_str(), Some("pipelines.yaml"));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "gitops-webhook",
            "list",
            "--access-token",
            "abc",
            "--cicd",
            "--log-format",
            "json",
            "--output",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        let (_, args) = cli.command.split();
        assert!(args.cicd);
        assert_eq!(args.output, commands::OutputFormat::Json);
    }

    #[test]
    fn service_name_requires_env_name() {
        let err = Cli::try_parse_from([
            "gitops-webhook",
            "delete",
            "--access-token",
            "abc",
            "--service-name",
            "gateway",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn cicd_conflicts_with_service_flags() {
        let err = Cli::try_parse_from([
            "gitops-webhook",
            "create",
            "--access-token",
            "abc",
            "--cicd",
            "--env-name",
            "dev",
            "--service-name",
            "gateway",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn failure_is_reported_once_with_its_cause_chain() {
        let err = anyhow::anyhow!("route not found").context("failed to list webhooks");
        let mut out = Vec::new();

        let code = finish(Err(err), &mut out);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(text, "Error: failed to list webhooks: route not found\n");
        assert_eq!(text.matches("Error:").count(), 1);
    }

    #[test]
    fn success_writes_nothing_to_stderr() {
        let mut out = Vec::new();
        assert_eq!(finish(Ok(()), &mut out), ExitCode::SUCCESS);
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_driver_is_rejected() {
        let err = Cli::try_parse_from([
            "gitops-webhook",
            "list",
            "--access-token",
            "abc",
            "--cicd",
            "--driver",
            "bitbucket",
        ]);
        assert!(err.is_err());
    }
}
