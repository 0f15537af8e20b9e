use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod};
use kube::{
    api::{ListParams, ObjectList},
    Api, Client, Resource, ResourceExt,
};
use log::debug;

pub struct Cluster {
    pub client: Client,
    pub namespaces: Mutex<BTreeMap<String, Arc<Apis>>>,
}

impl Cluster {
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(Cluster {
            client,
            namespaces: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn get_namespace(&self, ns: &str) -> Arc<Apis> {
        let mut nss = self
            .namespaces
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(apis) = nss.get(ns).cloned() {
            apis
        } else {
            let apis = Arc::new(Apis::namespaced(&self.client, ns));
            nss.insert(ns.to_string(), apis.clone());
            apis
        }
    }

    /// Names of all namespaces in the cluster, in the order the API server
    /// returns them.
    pub async fn list_namespace_names(&self) -> anyhow::Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api
            .list(&ListParams::default())
            .await
            .context("when listing namespaces")?;
        Ok(object_names(namespaces))
    }
}

pub struct Apis {
    pub namespace: String,
    pub pod: Api<Pod>,
    pub config_map: Api<ConfigMap>,
}

impl Apis {
    pub fn namespaced(client: &Client, namespace: &str) -> Self {
        Apis {
            namespace: namespace.to_string(),
            pod: Api::namespaced(client.clone(), namespace),
            config_map: Api::namespaced(client.clone(), namespace),
        }
    }

    /// All pods in the namespace, with their full specs.
    pub async fn list_pods(&self) -> anyhow::Result<Vec<Pod>> {
        let pods = self
            .pod
            .list(&ListParams::default())
            .await
            .with_context(|| format!("when listing pods in namespace {}", self.namespace))?;
        debug!(
            "listed {} pods in namespace {}",
            pods.items.len(),
            self.namespace
        );
        Ok(pods.items)
    }

    /// Names of all ConfigMaps in the namespace. Contents are not fetched.
    pub async fn list_config_map_names(&self) -> anyhow::Result<Vec<String>> {
        let config_maps = self
            .config_map
            .list_metadata(&ListParams::default())
            .await
            .with_context(|| {
                format!("when listing configmaps in namespace {}", self.namespace)
            })?;
        debug!(
            "listed {} configmaps in namespace {}",
            config_maps.items.len(),
            self.namespace
        );
        Ok(object_names(config_maps))
    }
}

fn object_names<K: Resource + Clone>(list: ObjectList<K>) -> Vec<String> {
    list.items.iter().map(|item| item.name_any()).collect()
}
