use async_trait::async_trait;
use kubedash_types::{ClusterOverview, DeploymentInfo, PodDetail, PodInfo, ServiceInfo};

use crate::Result;

/// Log lines fetched per request
pub const DEFAULT_LOG_LINES: u32 = 100;

/// Cluster reads and scaling operations used by the dashboard views
#[async_trait]
pub trait ClusterBackend: Send + Sync {
    /// Short description for the header (base url or kube context)
    fn describe(&self) -> String;

    async fn cluster_overview(&self) -> Result<ClusterOverview>;

    async fn namespaces(&self) -> Result<Vec<String>>;

    async fn deployments(&self, namespace: &str) -> Result<Vec<DeploymentInfo>>;

    async fn pods(&self, namespace: &str) -> Result<Vec<PodInfo>>;

    async fn pod_detail(&self, namespace: &str, pod: &str) -> Result<PodDetail>;

    async fn services(&self, namespace: &str) -> Result<Vec<ServiceInfo>>;

    async fn pod_containers(&self, namespace: &str, pod: &str) -> Result<Vec<String>>;

    /// Last `lines` log lines of a container, the pod's first one when `None`
    async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: Option<&str>,
        lines: u32,
    ) -> Result<String>;

    /// Set the replica count of a deployment, returning a confirmation message
    async fn scale_deployment(&self, namespace: &str, name: &str, replicas: i32)
    -> Result<String>;

    /// Trigger a rolling restart of a deployment
    async fn restart_deployment(&self, namespace: &str, name: &str) -> Result<String>;
}
