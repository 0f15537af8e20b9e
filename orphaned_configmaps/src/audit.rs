//! The per-namespace pipeline: inventory and used-set feed the reconciler,
//! whose result is handed to the reporter.

use std::{collections::HashSet, io::Write, num::NonZeroUsize};

use anyhow::Context;
use futures::{stream, StreamExt};
use log::{debug, info, warn};

use crate::{
    cluster::ClusterAccess,
    exceptions::ExceptionRegistry,
    inventory,
    reconcile::{reconcile, OrphanResult},
    report::Reporter,
    scanner,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceSelection {
    /// Every namespace in the cluster except the excluded ones.
    All { exclude: Vec<String> },
    /// Exactly these namespaces, in the given order.
    Explicit(Vec<String>),
}

impl NamespaceSelection {
    pub async fn resolve<C: ClusterAccess>(&self, cluster: &C) -> anyhow::Result<Vec<String>> {
        match self {
            NamespaceSelection::Explicit(namespaces) => {
                let mut seen = HashSet::new();
                Ok(namespaces
                    .iter()
                    .filter(|ns| seen.insert(ns.as_str()))
                    .cloned()
                    .collect())
            }
            NamespaceSelection::All { exclude } => {
                let namespaces = cluster.list_namespaces().await?;
                Ok(namespaces
                    .into_iter()
                    .filter(|ns| {
                        let excluded = exclude.contains(ns);
                        if excluded {
                            debug!("excluding namespace {}", ns);
                        }
                        !excluded
                    })
                    .collect())
            }
        }
    }
}

pub struct AuditConfig {
    pub selection: NamespaceSelection,
    pub exceptions: ExceptionRegistry,
    pub concurrency: NonZeroUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub namespaces: usize,
    pub orphaned: usize,
    pub failed: usize,
}

pub async fn audit_namespace<C: ClusterAccess>(
    cluster: &C,
    namespace: &str,
    exceptions: &ExceptionRegistry,
) -> anyhow::Result<OrphanResult> {
    let inventory = inventory::list(cluster, namespace).await?;
    let used = scanner::scan(cluster, namespace).await?;
    let excepted = exceptions.for_namespace(namespace);

    for name in inventory.iter().filter(|n| !used.contains(*n)) {
        if let Some(reason) = exceptions.justification(name, namespace) {
            debug!("{}/{} is unused but excepted: {}", namespace, name, reason);
        }
    }

    Ok(reconcile(&inventory, &used, &excepted))
}

/// Audits every selected namespace and writes one block per namespace.
///
/// Blocks are written in namespace order regardless of how many namespaces are
/// in flight. A failing namespace is reported and counted, the rest still run.
/// Only a failure to resolve the namespace list aborts the run.
pub async fn run<C, W>(
    cluster: &C,
    config: &AuditConfig,
    reporter: &Reporter,
    out: &mut W,
) -> anyhow::Result<AuditSummary>
where
    C: ClusterAccess,
    W: Write,
{
    let namespaces = config
        .selection
        .resolve(cluster)
        .await
        .context("when resolving namespaces to audit")?;
    info!("auditing {} namespaces", namespaces.len());

    let mut summary = AuditSummary {
        namespaces: namespaces.len(),
        ..Default::default()
    };

    let mut results = stream::iter(namespaces.iter())
        .map(move |ns| async move {
            let result = audit_namespace(cluster, ns, &config.exceptions).await;
            (ns, result)
        })
        .buffered(config.concurrency.get());

    while let Some((namespace, result)) = results.next().await {
        let block = match result {
            Ok(orphans) => {
                info!("namespace {}: {} unused configmaps", namespace, orphans.len());
                summary.orphaned += orphans.len();
                reporter.render(namespace, &orphans)?
            }
            Err(err) => {
                warn!("namespace {}: {:#}", namespace, err);
                summary.failed += 1;
                reporter.render_failure(namespace, &err)?
            }
        };
        out.write_all(block.as_bytes())
            .context("when writing report")?;
        out.flush().context("when writing report")?;
    }

    Ok(summary)
}
