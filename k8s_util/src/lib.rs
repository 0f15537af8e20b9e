//! Shared Kubernetes plumbing: client construction and namespaced API handles.

use anyhow::Context as _;
use kube::{config::KubeConfigOptions, Client, Config};

pub mod apis;
pub mod pod_spec;

/// Builds a client from the local kubeconfig.
///
/// When `k8s_context` is given, that kubeconfig context is used. Otherwise the
/// configuration is inferred the usual way (`KUBECONFIG`, `~/.kube/config`,
/// then in-cluster service account).
pub async fn create_client(k8s_context: Option<&str>) -> anyhow::Result<Client> {
    let config = match k8s_context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_owned()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("when loading kubeconfig context `{}`", context))?
        }
        None => Config::infer()
            .await
            .context("when inferring kubernetes configuration")?,
    };

    log::debug!(
        "using cluster {} (default namespace {})",
        config.cluster_url,
        config.default_namespace
    );

    let client = Client::try_from(config).context("attempting to get client")?;
    Ok(client)
}
