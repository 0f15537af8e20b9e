use std::{io, num::NonZeroUsize, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use colored::Colorize;

use audit::{AuditConfig, NamespaceSelection};
use exceptions::ExceptionRegistry;
use k8s_util::apis::Cluster;
use report::{OutputFormat, Reporter};

mod audit;
mod cluster;
mod exceptions;
mod inventory;
mod reconcile;
mod references;
mod report;
mod scanner;

/// Find ConfigMaps that no pod in the namespace references.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    verbose: Verbosity,
    /// Kubeconfig context to use instead of the current one
    #[arg(short, long)]
    context: Option<String>,
    /// Namespaces to scan. Defaults to every namespace in the cluster
    #[arg(short, long, num_args = 1.., conflicts_with = "exclude")]
    namespace: Vec<String>,
    /// Namespaces to skip when scanning the whole cluster
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,
    /// Allowlist of intentionally unused ConfigMaps (`name,namespace,justification` per line)
    #[arg(long, value_name = "FILE")]
    exceptions: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Number of namespaces audited at the same time
    #[arg(long, default_value = "1")]
    concurrency: NonZeroUsize,
    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn selection(&self) -> NamespaceSelection {
        if self.namespace.is_empty() {
            NamespaceSelection::All {
                exclude: self.exclude.clone(),
            }
        } else {
            NamespaceSelection::Explicit(self.namespace.clone())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every namespace was audited.
async fn run(args: Args) -> anyhow::Result<bool> {
    let exceptions = match &args.exceptions {
        Some(path) => {
            let registry = ExceptionRegistry::load(path)?;
            if registry.is_empty() {
                log::warn!("exceptions file {} has no entries", path.display());
            }
            registry
        }
        None => ExceptionRegistry::empty(),
    };

    let config = AuditConfig {
        selection: args.selection(),
        exceptions,
        concurrency: args.concurrency,
    };
    let reporter = Reporter::new(args.output, !args.no_color);

    let client = k8s_util::create_client(args.context.as_deref()).await?;
    let cluster = Cluster::new(client);

    let mut stdout = io::stdout().lock();
    let summary = audit::run(&cluster, &config, &reporter, &mut stdout)
        .await
        .context("audit failed")?;

    log::info!(
        "audited {} namespaces, {} unused configmaps, {} failures",
        summary.namespaces,
        summary.orphaned,
        summary.failed
    );
    if summary.failed > 0 {
        eprintln!(
            "{}",
            format!("{} of {} namespaces could not be audited", summary.failed, summary.namespaces)
                .yellow()
        );
    }

    Ok(summary.failed == 0)
}

#[cfg(test)]
mod tests {
    use clap::{error::ErrorKind, CommandFactory};

    use super::*;

    #[test]
    fn test_verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_namespace_conflicts_with_exclude() {
        let err = Args::try_parse_from(["orphaned-configmaps", "-n", "a", "--exclude", "b"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_selection() {
        let args = Args::try_parse_from(["orphaned-configmaps", "-n", "a", "b"]).unwrap();
        assert_eq!(
            args.selection(),
            NamespaceSelection::Explicit(vec!["a".into(), "b".into()])
        );

        let args = Args::try_parse_from(["orphaned-configmaps", "--exclude", "kube-system"]).unwrap();
        assert_eq!(
            args.selection(),
            NamespaceSelection::All {
                exclude: vec!["kube-system".into()]
            }
        );

        let args = Args::try_parse_from(["orphaned-configmaps"]).unwrap();
        assert_eq!(args.selection(), NamespaceSelection::All { exclude: vec![] });
        assert_eq!(args.output, OutputFormat::Table);
        assert_eq!(args.concurrency.get(), 1);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Args::try_parse_from(["orphaned-configmaps", "--concurrency", "0"]).is_err());
    }
}
