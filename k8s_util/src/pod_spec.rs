use k8s_openapi::api::core::v1::{EnvFromSource, EnvVar, Pod, PodSpec, Volume};

pub fn pod_get_spec(pod: &Pod) -> Option<&PodSpec> {
    pod.spec.as_ref()
}

pub fn pod_get_name(pod: &Pod) -> &str {
    pod.metadata.name.as_deref().unwrap_or("<unnamed>")
}

pub fn pod_spec_volumes(pod_spec: &PodSpec) -> &[Volume] {
    pod_spec.volumes.as_deref().unwrap_or_default()
}

/// The environment of a single container, regardless of which container list
/// in the pod spec it came from.
#[derive(Debug, Clone, Copy)]
pub struct ContainerEnv<'a> {
    pub name: &'a str,
    pub env: &'a [EnvVar],
    pub env_from: &'a [EnvFromSource],
}

/// Iterates the environment of every container in the pod spec: regular
/// containers first, then init containers, then ephemeral containers.
pub fn pod_spec_container_envs(pod_spec: &PodSpec) -> impl Iterator<Item = ContainerEnv<'_>> {
    let containers = pod_spec.containers.iter().map(|c| ContainerEnv {
        name: &c.name,
        env: c.env.as_deref().unwrap_or_default(),
        env_from: c.env_from.as_deref().unwrap_or_default(),
    });

    let init_containers = pod_spec
        .init_containers
        .iter()
        .flat_map(|v| v.iter())
        .map(|c| ContainerEnv {
            name: &c.name,
            env: c.env.as_deref().unwrap_or_default(),
            env_from: c.env_from.as_deref().unwrap_or_default(),
        });

    let ephemeral_containers = pod_spec
        .ephemeral_containers
        .iter()
        .flat_map(|v| v.iter())
        .map(|c| ContainerEnv {
            name: &c.name,
            env: c.env.as_deref().unwrap_or_default(),
            env_from: c.env_from.as_deref().unwrap_or_default(),
        });

    containers.chain(init_containers).chain(ephemeral_containers)
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::{Container, EphemeralContainer};

    use super::*;

    fn container(name: &str) -> Container {
        Container {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_container_envs_cover_all_container_lists() {
        let spec = PodSpec {
            containers: vec![container("app"), container("sidecar")],
            init_containers: Some(vec![container("migrate")]),
            ephemeral_containers: Some(vec![EphemeralContainer {
                name: "debug".to_owned(),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let names: Vec<_> = pod_spec_container_envs(&spec).map(|c| c.name).collect();
        assert_eq!(names, vec!["app", "sidecar", "migrate", "debug"]);
    }

    #[test]
    fn test_absent_lists_are_empty() {
        let spec = PodSpec {
            containers: vec![container("app")],
            ..Default::default()
        };

        assert!(pod_spec_volumes(&spec).is_empty());
        let env = pod_spec_container_envs(&spec).next().unwrap();
        assert!(env.env.is_empty());
        assert!(env.env_from.is_empty());
        assert!(pod_get_spec(&Pod::default()).is_none());
    }
}
