use std::collections::BTreeSet;

use anyhow::Context;

use crate::cluster::ClusterAccess;

/// Names of the ConfigMaps that exist in `namespace`.
pub async fn list<C: ClusterAccess>(cluster: &C, namespace: &str) -> anyhow::Result<BTreeSet<String>> {
    let names = cluster
        .list_config_map_names(namespace)
        .await
        .with_context(|| format!("when listing configmaps in namespace {}", namespace))?;
    Ok(names.into_iter().collect())
}
