use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use k8s_util::apis::Cluster;

/// The cluster operations an audit needs. Implemented by the live
/// [`Cluster`] handle, and by an in-memory fake in tests.
#[allow(async_fn_in_trait)]
pub trait ClusterAccess {
    async fn list_namespaces(&self) -> anyhow::Result<Vec<String>>;

    async fn list_pods(&self, namespace: &str) -> anyhow::Result<Vec<Pod>>;

    async fn list_config_map_names(&self, namespace: &str) -> anyhow::Result<Vec<String>>;
}

impl ClusterAccess for Cluster {
    async fn list_namespaces(&self) -> anyhow::Result<Vec<String>> {
        self.list_namespace_names().await
    }

    async fn list_pods(&self, namespace: &str) -> anyhow::Result<Vec<Pod>> {
        self.get_namespace(namespace).list_pods().await
    }

    async fn list_config_map_names(&self, namespace: &str) -> anyhow::Result<Vec<String>> {
        self.get_namespace(namespace).list_config_map_names().await
    }
}

impl<C: ClusterAccess> ClusterAccess for Arc<C> {
    async fn list_namespaces(&self) -> anyhow::Result<Vec<String>> {
        (**self).list_namespaces().await
    }

    async fn list_pods(&self, namespace: &str) -> anyhow::Result<Vec<Pod>> {
        (**self).list_pods(namespace).await
    }

    async fn list_config_map_names(&self, namespace: &str) -> anyhow::Result<Vec<String>> {
        (**self).list_config_map_names(namespace).await
    }
}

#[cfg(test)]
pub mod fake {
    use std::collections::{BTreeMap, BTreeSet};

    use anyhow::bail;
    use k8s_openapi::{
        api::core::v1::{Pod, PodSpec},
        apimachinery::pkg::apis::meta::v1::ObjectMeta,
    };

    use super::ClusterAccess;

    #[derive(Default)]
    struct FakeNamespace {
        pods: Vec<Pod>,
        config_maps: Vec<String>,
    }

    /// In-memory cluster. Namespaces are listed in insertion order.
    #[derive(Default)]
    pub struct FakeCluster {
        order: Vec<String>,
        namespaces: BTreeMap<String, FakeNamespace>,
        failing_pods: BTreeSet<String>,
        failing_config_maps: BTreeSet<String>,
        fail_namespace_list: bool,
    }

    impl FakeCluster {
        pub fn new() -> Self {
            Self::default()
        }

        fn namespace_mut(&mut self, namespace: &str) -> &mut FakeNamespace {
            if !self.namespaces.contains_key(namespace) {
                self.order.push(namespace.to_owned());
            }
            self.namespaces.entry(namespace.to_owned()).or_default()
        }

        pub fn namespace(mut self, namespace: &str) -> Self {
            self.namespace_mut(namespace);
            self
        }

        pub fn config_maps(mut self, namespace: &str, names: &[&str]) -> Self {
            let ns = self.namespace_mut(namespace);
            ns.config_maps.extend(names.iter().map(|n| n.to_string()));
            self
        }

        pub fn pod(mut self, namespace: &str, name: &str, spec: serde_json::Value) -> Self {
            let spec: PodSpec = serde_json::from_value(spec).unwrap();
            let pod = Pod {
                metadata: ObjectMeta {
                    name: Some(name.to_owned()),
                    namespace: Some(namespace.to_owned()),
                    ..Default::default()
                },
                spec: Some(spec),
                status: None,
            };
            self.namespace_mut(namespace).pods.push(pod);
            self
        }

        pub fn fail_pods(mut self, namespace: &str) -> Self {
            self.failing_pods.insert(namespace.to_owned());
            self
        }

        pub fn fail_config_maps(mut self, namespace: &str) -> Self {
            self.failing_config_maps.insert(namespace.to_owned());
            self
        }

        pub fn fail_namespace_list(mut self) -> Self {
            self.fail_namespace_list = true;
            self
        }
    }

    impl ClusterAccess for FakeCluster {
        async fn list_namespaces(&self) -> anyhow::Result<Vec<String>> {
            if self.fail_namespace_list {
                bail!("namespaces is forbidden");
            }
            Ok(self.order.clone())
        }

        async fn list_pods(&self, namespace: &str) -> anyhow::Result<Vec<Pod>> {
            if self.failing_pods.contains(namespace) {
                bail!("pods is forbidden in namespace {}", namespace);
            }
            Ok(self
                .namespaces
                .get(namespace)
                .map(|ns| ns.pods.clone())
                .unwrap_or_default())
        }

        async fn list_config_map_names(&self, namespace: &str) -> anyhow::Result<Vec<String>> {
            if self.failing_config_maps.contains(namespace) {
                bail!("configmaps is forbidden in namespace {}", namespace);
            }
            Ok(self
                .namespaces
                .get(namespace)
                .map(|ns| ns.config_maps.clone())
                .unwrap_or_default())
        }
    }
}
