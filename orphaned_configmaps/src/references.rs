//! Walks a pod spec and collects every ConfigMap it points at.

use std::fmt;

use k8s_openapi::api::core::v1::{EnvFromSource, EnvVar, PodSpec, Volume};
use k8s_util::pod_spec::{pod_spec_container_envs, pod_spec_volumes};

/// How a pod refers to a ConfigMap. Informational only, the name is what gets
/// matched against the namespace inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// `volumes[].configMap`
    VolumeMount,
    /// `volumes[].projected.sources[].configMap`
    ProjectedVolumeSource,
    /// `containers[].env[].valueFrom.configMapKeyRef`
    EnvValueFrom,
    /// `containers[].envFrom[].configMapRef`
    EnvFromSource,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::VolumeMount => "volume",
            Channel::ProjectedVolumeSource => "projected volume",
            Channel::EnvValueFrom => "env valueFrom",
            Channel::EnvFromSource => "envFrom",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigMapReference {
    pub name: String,
    pub channel: Channel,
}

impl ConfigMapReference {
    fn new(name: &str, channel: Channel) -> Option<Self> {
        // An empty name can never match an existing ConfigMap.
        if name.is_empty() {
            return None;
        }
        Some(ConfigMapReference {
            name: name.to_owned(),
            channel,
        })
    }
}

/// Returns one reference per occurrence, duplicates included.
pub fn extract(pod_spec: &PodSpec) -> Vec<ConfigMapReference> {
    let mut out = Vec::new();

    for volume in pod_spec_volumes(pod_spec) {
        extract_volume(volume, &mut out);
    }

    for container in pod_spec_container_envs(pod_spec) {
        extract_env(container.env, &mut out);
        extract_env_from(container.env_from, &mut out);
    }

    out
}

fn extract_volume(volume: &Volume, out: &mut Vec<ConfigMapReference>) {
    if let Some(cm) = &volume.config_map {
        out.extend(ConfigMapReference::new(&cm.name, Channel::VolumeMount));
    }

    let projected_sources = volume
        .projected
        .iter()
        .flat_map(|p| p.sources.iter().flat_map(|v| v.iter()));
    for source in projected_sources {
        if let Some(cm) = &source.config_map {
            out.extend(ConfigMapReference::new(
                &cm.name,
                Channel::ProjectedVolumeSource,
            ));
        }
    }
}

fn extract_env(env: &[EnvVar], out: &mut Vec<ConfigMapReference>) {
    for var in env {
        let key_ref = var
            .value_from
            .as_ref()
            .and_then(|from| from.config_map_key_ref.as_ref());
        if let Some(key_ref) = key_ref {
            out.extend(ConfigMapReference::new(&key_ref.name, Channel::EnvValueFrom));
        }
    }
}

fn extract_env_from(env_from: &[EnvFromSource], out: &mut Vec<ConfigMapReference>) {
    for source in env_from {
        if let Some(cm_ref) = &source.config_map_ref {
            out.extend(ConfigMapReference::new(&cm_ref.name, Channel::EnvFromSource));
        }
    }
}
