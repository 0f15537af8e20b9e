use std::collections::BTreeSet;

use anyhow::Context;
use k8s_util::pod_spec::{pod_get_name, pod_get_spec};
use log::debug;

use crate::{cluster::ClusterAccess, references};

/// Names of ConfigMaps referenced by at least one pod in a namespace.
pub type UsedSet = BTreeSet<String>;

/// Collects the used-set for `namespace`.
///
/// Either every pod was listed and walked, or an error is returned. A partial
/// set is never produced.
pub async fn scan<C: ClusterAccess>(cluster: &C, namespace: &str) -> anyhow::Result<UsedSet> {
    let pods = cluster
        .list_pods(namespace)
        .await
        .with_context(|| format!("when scanning pods in namespace {}", namespace))?;

    let mut used = UsedSet::new();
    for pod in &pods {
        let Some(spec) = pod_get_spec(pod) else {
            continue;
        };
        for reference in references::extract(spec) {
            debug!(
                "{}/{} references configmap {} via {}",
                namespace,
                pod_get_name(pod),
                reference.name,
                reference.channel
            );
            used.insert(reference.name);
        }
    }

    debug!(
        "{} pods in namespace {} reference {} distinct configmaps",
        pods.len(),
        namespace,
        used.len()
    );
    Ok(used)
}
