//! Direct Kubernetes access, for running the dashboard without the backend service

use async_trait::async_trait;
use chrono::{Local, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::Api;
use kube::api::{ListParams, LogParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kubedash_types::{
    ClusterOverview, DeploymentInfo, NodeCounts, PodDetail, PodInfo, PodPhaseCounts, PodStatus,
    PortTarget, ResourceCounts, ServiceInfo, ServicePort, format_age,
};

use crate::{ApiError, ClusterBackend, Result};

const FIELD_MANAGER: &str = "kubedash";

/// Kubernetes client wrapper bound to one kubeconfig context
pub struct KubeBackend {
    client: kube::Client,
    context: String,
}

impl KubeBackend {
    /// Connect using the given context, or the kubeconfig's current one
    pub async fn connect(context: Option<&str>) -> Result<Self> {
        let kubeconfig = Kubeconfig::read().map_err(|e| ApiError::Backend(format!(
            "Failed to read kubeconfig. Is kubectl configured? {}",
            e
        )))?;

        let context_name = context
            .map(str::to_string)
            .or_else(|| kubeconfig.current_context.clone())
            .ok_or_else(|| ApiError::Backend("kubeconfig has no current context".to_string()))?;

        let config = kube::Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: Some(context_name.clone()),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| {
            ApiError::Backend(format!(
                "Failed to create config for context {}: {}",
                context_name, e
            ))
        })?;

        let client = kube::Client::try_from(config).map_err(ApiError::kube(format!(
            "Failed to create client for context {}",
            context_name
        )))?;

        tracing::info!(context = %context_name, "connected to cluster");

        Ok(Self {
            client,
            context: context_name,
        })
    }

    fn patch_params() -> PatchParams {
        PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        }
    }

    fn age(created: Option<&Time>) -> String {
        created
            .map(|t| format_age(Utc::now() - t.0))
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Convert a k8s Deployment to DeploymentInfo
    fn deployment_to_info(deploy: Deployment) -> DeploymentInfo {
        let mut info = DeploymentInfo::new(deploy.metadata.name.unwrap_or_default());
        info.uptime = Self::age(deploy.metadata.creation_timestamp.as_ref());
        info.status = "Active".to_string();

        if let Some(spec) = deploy.spec {
            info.desired_replicas = spec.replicas.unwrap_or(1);
        }

        if let Some(status) = deploy.status {
            info.current_replicas = status.ready_replicas.unwrap_or(0);

            for condition in status.conditions.unwrap_or_default() {
                if condition.status == "True" {
                    continue;
                }
                match condition.type_.as_str() {
                    "Available" => info.status = "NotAvailable".to_string(),
                    "Progressing" => info.status = "NotProgressing".to_string(),
                    _ => {}
                }
            }
        }

        if info.current_replicas < info.desired_replicas {
            info.status = "NotReady".to_string();
        }

        info
    }

    fn pod_to_info(pod: Pod) -> PodInfo {
        let mut info = PodInfo::new(pod.metadata.name.unwrap_or_default());
        info.age = Self::age(pod.metadata.creation_timestamp.as_ref());

        if let Some(node) = pod.spec.and_then(|s| s.node_name) {
            info.node = node;
        }

        if let Some(status) = pod.status {
            if let Some(ip) = status.pod_ip {
                info.ip = ip;
            }
            info.status = status
                .phase
                .as_deref()
                .map(PodStatus::from)
                .unwrap_or(PodStatus::Unknown);
            info.restarts = status
                .container_statuses
                .unwrap_or_default()
                .iter()
                .map(|cs| cs.restart_count)
                .sum();
        }

        info
    }

    fn service_to_info(svc: Service) -> ServiceInfo {
        let mut info = ServiceInfo::new(svc.metadata.name.unwrap_or_default());
        info.age = Self::age(svc.metadata.creation_timestamp.as_ref());

        if let Some(spec) = svc.spec {
            info.service_type = spec.type_.clone();
            info.cluster_ip = spec.cluster_ip;
            info.selectors = spec.selector.unwrap_or_default().into_iter().collect();
            info.ports = spec
                .ports
                .unwrap_or_default()
                .into_iter()
                .map(|p| ServicePort {
                    name: p.name,
                    port: p.port,
                    target_port: p.target_port.map(|t| match t {
                        IntOrString::Int(n) => PortTarget::Number(n),
                        IntOrString::String(s) => PortTarget::Name(s),
                    }),
                    protocol: p.protocol,
                    node_port: p.node_port,
                })
                .collect();

            if spec.type_.as_deref() == Some("LoadBalancer") {
                info.external_ip = svc
                    .status
                    .and_then(|s| s.load_balancer)
                    .and_then(|lb| lb.ingress)
                    .and_then(|ingress| ingress.into_iter().next())
                    .and_then(|i| i.ip.or(i.hostname));
            }
        }

        info
    }
}

#[async_trait]
impl ClusterBackend for KubeBackend {
    fn describe(&self) -> String {
        format!("context {}", self.context)
    }

    async fn cluster_overview(&self) -> Result<ClusterOverview> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let pods: Api<Pod> = Api::all(self.client.clone());
        let deployments: Api<Deployment> = Api::all(self.client.clone());
        let services: Api<Service> = Api::all(self.client.clone());
        let lp = ListParams::default();

        let (nodes, namespaces, pods, deployments, services) = tokio::try_join!(
            nodes.list(&lp),
            namespaces.list(&lp),
            pods.list(&lp),
            deployments.list(&lp),
            services.list(&lp),
        )
        .map_err(ApiError::kube("Failed to get cluster overview"))?;

        let ready = nodes
            .items
            .iter()
            .filter(|node| {
                node.status
                    .as_ref()
                    .and_then(|s| s.conditions.as_ref())
                    .is_some_and(|conds| {
                        conds.iter().any(|c| c.type_ == "Ready" && c.status == "True")
                    })
            })
            .count();

        let mut pod_status = PodPhaseCounts::default();
        for pod in &pods.items {
            let phase = pod
                .status
                .as_ref()
                .and_then(|s| s.phase.as_deref())
                .map(PodStatus::from)
                .unwrap_or(PodStatus::Unknown);
            pod_status.record(&phase);
        }

        Ok(ClusterOverview {
            nodes: NodeCounts {
                total: nodes.items.len() as u32,
                ready: ready as u32,
            },
            namespaces: namespaces.items.len() as u32,
            resources: ResourceCounts {
                pods: pods.items.len() as u32,
                deployments: deployments.items.len() as u32,
                services: services.items.len() as u32,
            },
            pod_status,
        })
    }

    async fn namespaces(&self) -> Result<Vec<String>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .map_err(ApiError::kube("Failed to list namespaces"))?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    async fn deployments(&self, namespace: &str) -> Result<Vec<DeploymentInfo>> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let list = deployments
            .list(&ListParams::default())
            .await
            .map_err(ApiError::kube(format!(
                "Failed to list deployments in {}",
                namespace
            )))?;

        Ok(list
            .items
            .into_iter()
            .map(Self::deployment_to_info)
            .collect())
    }

    async fn pods(&self, namespace: &str) -> Result<Vec<PodInfo>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods
            .list(&ListParams::default())
            .await
            .map_err(ApiError::kube(format!("Failed to list pods in {}", namespace)))?;

        Ok(list.items.into_iter().map(Self::pod_to_info).collect())
    }

    async fn pod_detail(&self, namespace: &str, pod: &str) -> Result<PodDetail> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let found = pods.get(pod).await.map_err(ApiError::kube(format!(
            "Failed to get pod '{}' in namespace '{}'",
            pod, namespace
        )))?;

        let status = found.status.unwrap_or_default();
        Ok(PodDetail {
            pod_name: pod.to_string(),
            namespace: namespace.to_string(),
            creation_time: found
                .metadata
                .creation_timestamp
                .map(|t| t.0.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            node_name: found.spec.and_then(|s| s.node_name),
            node_ip: status.host_ip,
            pod_ip: status.pod_ip,
            status: status.phase,
        })
    }

    async fn services(&self, namespace: &str) -> Result<Vec<ServiceInfo>> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let list = services
            .list(&ListParams::default())
            .await
            .map_err(ApiError::kube(format!(
                "Failed to list services in {}",
                namespace
            )))?;

        Ok(list.items.into_iter().map(Self::service_to_info).collect())
    }

    async fn pod_containers(&self, namespace: &str, pod: &str) -> Result<Vec<String>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let found = pods.get(pod).await.map_err(ApiError::kube(format!(
            "Failed to get container list of {}",
            pod
        )))?;

        Ok(found
            .spec
            .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
            .unwrap_or_default())
    }

    async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: Option<&str>,
        lines: u32,
    ) -> Result<String> {
        // Multi-container pods need an explicit container
        let container = match container {
            Some(name) => Some(name.to_string()),
            None => self.pod_containers(namespace, pod).await?.into_iter().next(),
        };

        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container,
            tail_lines: Some(i64::from(lines)),
            ..Default::default()
        };
        pods.logs(pod, &params)
            .await
            .map_err(ApiError::kube(format!("Failed to get logs of {}", pod)))
    }

    async fn scale_deployment(
        &self,
        namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Result<String> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let patch = serde_json::json!({ "spec": { "replicas": replicas } });
        deployments
            .patch_scale(name, &Self::patch_params(), &Patch::Merge(&patch))
            .await
            .map_err(ApiError::kube(format!("Failed to set replica count of {}", name)))?;

        Ok(format!("Deployment {} replica count set to {}", name, replicas))
    }

    async fn restart_deployment(&self, namespace: &str, name: &str) -> Result<String> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let patch = serde_json::json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": {
                            "kubectl.kubernetes.io/restartedAt": Utc::now().to_rfc3339()
                        }
                    }
                }
            }
        });
        deployments
            .patch(name, &Self::patch_params(), &Patch::Merge(&patch))
            .await
            .map_err(ApiError::kube(format!("Failed to restart deployment {}", name)))?;

        Ok(format!("Deployment {} restarted successfully", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::{DeploymentCondition, DeploymentSpec, DeploymentStatus};
    use k8s_openapi::api::core::v1::{ContainerStatus, PodStatus as K8sPodStatus};

    fn deployment(desired: i32, ready: i32) -> Deployment {
        let mut deploy = Deployment::default();
        deploy.metadata.name = Some("carts".to_string());
        deploy.spec = Some(DeploymentSpec {
            replicas: Some(desired),
            ..Default::default()
        });
        deploy.status = Some(DeploymentStatus {
            ready_replicas: Some(ready),
            ..Default::default()
        });
        deploy
    }

    #[test]
    fn test_deployment_ready() {
        let info = KubeBackend::deployment_to_info(deployment(2, 2));
        assert_eq!(info.status, "Active");
        assert_eq!(info.replica_status(), "2/2");
        assert_eq!(info.uptime, "Unknown");
    }

    #[test]
    fn test_deployment_missing_replicas_is_not_ready() {
        let mut deploy = deployment(3, 1);
        if let Some(status) = deploy.status.as_mut() {
            status.conditions = Some(vec![DeploymentCondition {
                type_: "Available".to_string(),
                status: "False".to_string(),
                ..Default::default()
            }]);
        }
        let info = KubeBackend::deployment_to_info(deploy);
        assert_eq!(info.status, "NotReady");
    }

    #[test]
    fn test_pod_restarts_are_summed() {
        let mut pod = Pod::default();
        pod.metadata.name = Some("carts-5d8f-abcde".to_string());
        pod.status = Some(K8sPodStatus {
            phase: Some("Running".to_string()),
            pod_ip: Some("10.0.0.9".to_string()),
            container_statuses: Some(vec![
                ContainerStatus {
                    name: "app".to_string(),
                    restart_count: 2,
                    ..Default::default()
                },
                ContainerStatus {
                    name: "istio-proxy".to_string(),
                    restart_count: 1,
                    ..Default::default()
                },
            ]),
            ..Default::default()
        });

        let info = KubeBackend::pod_to_info(pod);
        assert_eq!(info.restarts, 3);
        assert_eq!(info.status, PodStatus::Running);
        assert_eq!(info.node, "N/A");
    }
}
