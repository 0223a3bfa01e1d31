//! Shared types for kubedash
//!
//! This crate contains the UI records (tab descriptors) and the payloads
//! exchanged with the dashboard backend.

use chrono::Duration;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// UI Records
// ============================================================================

/// An open navigational entry in the tab bar
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabDescriptor {
    pub path: String,
    pub name: String,
    pub label: String,
}

impl TabDescriptor {
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            label: label.into(),
        }
    }
}

// ============================================================================
// Cluster Types
// ============================================================================

/// Cluster-wide counters shown on the dashboard
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ClusterOverview {
    pub nodes: NodeCounts,
    pub namespaces: u32,
    pub resources: ResourceCounts,
    #[serde(default)]
    pub pod_status: PodPhaseCounts,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NodeCounts {
    pub total: u32,
    pub ready: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ResourceCounts {
    pub pods: u32,
    pub deployments: u32,
    pub services: u32,
}

/// Pod counts keyed by phase
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PodPhaseCounts {
    pub running: u32,
    pub pending: u32,
    pub failed: u32,
    pub succeeded: u32,
    pub unknown: u32,
}

impl PodPhaseCounts {
    /// Record one pod in the given phase
    pub fn record(&mut self, status: &PodStatus) {
        match status {
            PodStatus::Running => self.running += 1,
            PodStatus::Pending => self.pending += 1,
            PodStatus::Failed => self.failed += 1,
            PodStatus::Succeeded => self.succeeded += 1,
            PodStatus::Unknown => self.unknown += 1,
        }
    }

    /// (label, count, color) triples in display order
    pub fn entries(&self) -> [(&'static str, u32, Color); 5] {
        [
            ("Running", self.running, PodStatus::Running.color()),
            ("Pending", self.pending, PodStatus::Pending.color()),
            ("Failed", self.failed, PodStatus::Failed.color()),
            ("Succeeded", self.succeeded, PodStatus::Succeeded.color()),
            ("Unknown", self.unknown, PodStatus::Unknown.color()),
        ]
    }
}

/// Response of the namespace listing
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NamespaceList {
    pub namespaces: Vec<String>,
}

/// Deployment summary as reported by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub current_replicas: i32,
    #[serde(default)]
    pub desired_replicas: i32,
    #[serde(default)]
    pub uptime: String,
}

impl DeploymentInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "Unknown".to_string(),
            current_replicas: 0,
            desired_replicas: 0,
            uptime: "Unknown".to_string(),
        }
    }

    /// Format replica status as "current/desired"
    pub fn replica_status(&self) -> String {
        format!("{}/{}", self.current_replicas, self.desired_replicas)
    }

    /// All desired replicas are ready
    pub fn is_healthy(&self) -> bool {
        self.desired_replicas > 0 && self.current_replicas >= self.desired_replicas
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentList {
    #[serde(default)]
    pub deployments: Vec<String>,
    #[serde(default)]
    pub deployment_details: Vec<DeploymentInfo>,
}

/// Pod summary as reported by the backend
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PodInfo {
    pub name: String,
    pub status: PodStatus,
    #[serde(default = "not_available")]
    pub ip: String,
    #[serde(default = "not_available")]
    pub node: String,
    #[serde(default)]
    pub restarts: i32,
    #[serde(default)]
    pub age: String,
}

fn not_available() -> String {
    "N/A".to_string()
}

impl PodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: PodStatus::Unknown,
            ip: not_available(),
            node: not_available(),
            restarts: 0,
            age: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodList {
    #[serde(default)]
    pub pods: Vec<String>,
    #[serde(default)]
    pub pod_details: Vec<PodInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PodStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodStatus {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for PodStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl PodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Running => Color::Green,
            Self::Succeeded => Color::Cyan,
            Self::Pending => Color::Yellow,
            Self::Failed => Color::Red,
            Self::Unknown => Color::DarkGray,
        }
    }
}

impl fmt::Display for PodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detailed view of a single pod
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PodDetail {
    pub pod_name: String,
    pub namespace: String,
    #[serde(default)]
    pub creation_time: String,
    pub node_name: Option<String>,
    pub node_ip: Option<String>,
    pub pod_ip: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContainerList {
    #[serde(default)]
    pub containers: Vec<String>,
}

/// Log tail of one pod container, newline separated
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PodLogs {
    #[serde(default)]
    pub logs: String,
}

/// CPU limit in millicores and memory limit in MiB
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct ResourceLimit {
    pub cpu_limit: Option<f64>,
    pub mem_limit: Option<f64>,
}

/// Recent time series of one pod, keyed by metric name
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PodMetrics {
    #[serde(default)]
    pub pod: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub metrics: HashMap<String, Vec<f64>>,
    /// Keyed by deployment name
    #[serde(default)]
    pub resource_limits: HashMap<String, ResourceLimit>,
}

/// Series shown for a pod: backend key, label, unit.
/// `net_trainsmit` is the key the backend sends.
pub const POD_METRICS: [(&str, &str, &str); 8] = [
    ("cpu_usage", "CPU", "m"),
    ("mem_usage", "Memory", "MiB"),
    ("net_receive", "Net in", "KB/s"),
    ("net_trainsmit", "Net out", "KB/s"),
    ("destP50", "Latency p50", "ms"),
    ("destP90", "Latency p90", "ms"),
    ("dest_qps", "QPS in", "req/s"),
    ("src_qps", "QPS out", "req/s"),
];

impl PodMetrics {
    /// Most recent sample of a series
    pub fn latest(&self, key: &str) -> Option<f64> {
        self.metrics.get(key)?.last().copied()
    }

    /// Limits of the workload that owns the pod
    pub fn limit(&self) -> Option<&ResourceLimit> {
        self.resource_limits.get(workload_of_pod(&self.pod))
    }
}

/// A Kubernetes service and its ports
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub cluster_ip: Option<String>,
    pub external_ip: Option<String>,
    #[serde(default)]
    pub ports: Vec<ServicePort>,
    #[serde(default)]
    pub selectors: HashMap<String, String>,
    #[serde(default)]
    pub age: String,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service_type: None,
            cluster_ip: None,
            external_ip: None,
            ports: Vec::new(),
            selectors: HashMap::new(),
            age: String::new(),
        }
    }

    /// Compact port listing, e.g. "80/TCP->8080, 443/TCP->https"
    pub fn ports_summary(&self) -> String {
        if self.ports.is_empty() {
            return "-".to_string();
        }
        self.ports
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServicePort {
    pub name: Option<String>,
    pub port: i32,
    pub target_port: Option<PortTarget>,
    pub protocol: Option<String>,
    pub node_port: Option<i32>,
}

impl fmt::Display for ServicePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol.as_deref().unwrap_or("TCP"))?;
        if let Some(target) = &self.target_port {
            write!(f, "->{}", target)?;
        }
        if let Some(node_port) = self.node_port {
            write!(f, " (node {})", node_port)?;
        }
        Ok(())
    }
}

/// A container port referenced by number or by name
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortTarget {
    Number(i32),
    Name(String),
}

impl fmt::Display for PortTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServiceList {
    #[serde(default)]
    pub services: Vec<ServiceInfo>,
}

/// Acknowledgement returned by mutating endpoints
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Elastic Scaling Types
// ============================================================================

/// A microservice benchmark that can be deployed for an evaluation
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Benchmark {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub namespace: String,
    pub entry: Option<String>,
    #[serde(default)]
    pub sla: f64,
    pub deploy_path: Option<String>,
    pub istio_yaml: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BenchmarkList {
    #[serde(default)]
    pub benchmarks: Vec<Benchmark>,
}

/// An autoscaler under evaluation
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ScalerInfo {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScalerList {
    #[serde(default)]
    pub scalers: Vec<ScalerInfo>,
}

/// A load generator profile
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WorkloadInfo {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_options: Vec<u32>,
    #[serde(default = "default_true")]
    pub supports_load_dist: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoadDistribution {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorkloadCatalog {
    #[serde(default)]
    pub workloads: Vec<WorkloadInfo>,
    #[serde(default)]
    pub load_distributions: Vec<LoadDistribution>,
}

/// Body of the environment preparation request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrepareRequest {
    pub benchmark: String,
    pub scaler: String,
}

/// Body of the evaluation start request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EvaluationRequest {
    pub workload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_dist: Option<String>,
}

/// Lifecycle of an environment preparation or an evaluation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Preparing,
    Ready,
    Running,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Idle | Self::Unknown => Color::DarkGray,
            Self::Preparing | Self::Running => Color::Yellow,
            Self::Ready | Self::Completed => Color::Green,
            Self::Error => Color::Red,
        }
    }
}

/// Which phase the backend is reporting on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStage {
    #[default]
    Idle,
    Environment,
    Evaluation,
    #[serde(other)]
    Unknown,
}

impl EvaluationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Environment => "environment",
            Self::Evaluation => "evaluation",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationLogLevel {
    Debug,
    #[default]
    Info,
    Success,
    #[serde(alias = "warn")]
    Warning,
    Error,
    #[serde(other)]
    Unknown,
}

impl EvaluationLogLevel {
    pub fn color(&self) -> Color {
        match self {
            Self::Debug | Self::Unknown => Color::DarkGray,
            Self::Info => Color::White,
            Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct EvaluationLog {
    #[serde(default)]
    pub timestamp: String,
    pub message: String,
    #[serde(default)]
    pub level: EvaluationLogLevel,
}

/// Final metrics of a completed evaluation
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EvaluationResults {
    pub slo_violation_rate: f64,
    pub success_rate: f64,
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

/// Combined environment/evaluation status
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EvaluationStatus {
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub current_step: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub logs: Vec<EvaluationLog>,
    pub results: Option<EvaluationResults>,
    #[serde(default)]
    pub stage: EvaluationStage,
}

impl EvaluationStatus {
    /// Progress clamped to a 0.0..=1.0 ratio
    pub fn ratio(&self) -> f64 {
        (self.progress / 100.0).clamp(0.0, 1.0)
    }

    /// A task is in flight on the backend
    pub fn is_busy(&self) -> bool {
        matches!(self.status, RunStatus::Preparing | RunStatus::Running)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Name of the Deployment or StatefulSet that owns a pod.
///
/// ReplicaSet pods carry two generated suffixes (`carts-7d9c5f-abcde`),
/// StatefulSet pods a short ordinal (`carts-db-0`).
pub fn workload_of_pod(pod: &str) -> &str {
    let generated = |segment: &str| {
        !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric())
    };

    match pod.rsplit_once('-') {
        Some((head, ordinal))
            if !head.is_empty()
                && !ordinal.is_empty()
                && ordinal.len() < 5
                && ordinal.chars().all(|c| c.is_ascii_digit()) =>
        {
            head
        }
        Some((head, id)) if generated(id) => match head.rsplit_once('-') {
            Some((name, hash)) if !name.is_empty() && generated(hash) => name,
            _ => pod,
        },
        _ => pod,
    }
}

/// Format an elapsed duration the way kubectl does for ages: "3d", "5h", "12m"
pub fn format_age(elapsed: Duration) -> String {
    if elapsed.num_days() > 0 {
        format!("{}d", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}m", elapsed.num_minutes().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::days(3) + Duration::hours(4)), "3d");
        assert_eq!(format_age(Duration::hours(5)), "5h");
        assert_eq!(format_age(Duration::minutes(12)), "12m");
        assert_eq!(format_age(Duration::seconds(-30)), "0m");
    }

    #[test]
    fn test_deployment_list_from_backend() {
        let body = r#"{
            "deployments": ["frontend"],
            "deploymentDetails": [
                {"name": "frontend", "status": "Active", "currentReplicas": 2,
                 "desiredReplicas": 3, "uptime": "4d"}
            ]
        }"#;
        let list: DeploymentList = serde_json::from_str(body).unwrap();
        let deploy = &list.deployment_details[0];
        assert_eq!(deploy.replica_status(), "2/3");
        assert!(!deploy.is_healthy());
    }

    #[test]
    fn test_pod_status_from_unknown_phase() {
        let body = r#"{"name": "p", "status": "Terminating", "ip": "10.0.0.1",
                       "node": "n1", "restarts": 1, "age": "2m"}"#;
        let pod: PodInfo = serde_json::from_str(body).unwrap();
        assert_eq!(pod.status, PodStatus::Unknown);
        assert_eq!(pod.node, "n1");
    }

    #[test]
    fn test_service_ports_summary() {
        let body = r#"{"name": "web", "type": "NodePort", "cluster_ip": "10.1.1.1",
            "external_ip": null, "selectors": {"app": "web"}, "age": "1d",
            "ports": [
                {"name": "http", "port": 80, "target_port": 8080, "protocol": "TCP", "node_port": 30080},
                {"name": "grpc", "port": 9000, "target_port": "grpc", "protocol": "TCP"}
            ]}"#;
        let svc: ServiceInfo = serde_json::from_str(body).unwrap();
        assert_eq!(
            svc.ports_summary(),
            "80/TCP->8080 (node 30080), 9000/TCP->grpc"
        );
    }

    #[test]
    fn test_overview_pod_status_keys() {
        let body = r#"{"nodes": {"total": 3, "ready": 2}, "namespaces": 7,
            "resources": {"pods": 40, "deployments": 12, "services": 15},
            "pod_status": {"Running": 38, "Pending": 1, "Failed": 1, "Succeeded": 0, "Unknown": 0}}"#;
        let overview: ClusterOverview = serde_json::from_str(body).unwrap();
        assert_eq!(overview.pod_status.running, 38);
        assert_eq!(overview.nodes.ready, 2);
    }

    #[test]
    fn test_evaluation_status_tolerates_unknown_values() {
        let body = r#"{"status": "paused", "current_step": "", "progress": 40,
            "config": {}, "logs": [{"timestamp": "t", "message": "m", "level": "warn"}],
            "results": null, "stage": "evaluation"}"#;
        let status: EvaluationStatus = serde_json::from_str(body).unwrap();
        assert_eq!(status.status, RunStatus::Unknown);
        assert_eq!(status.logs[0].level, EvaluationLogLevel::Warning);
        assert!((status.ratio() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_workload_of_pod() {
        assert_eq!(workload_of_pod("carts-7d9c5f-abcde"), "carts");
        assert_eq!(workload_of_pod("carts-db-6b8f4c-xyz12"), "carts-db");
        assert_eq!(workload_of_pod("carts-db-0"), "carts-db");
        assert_eq!(workload_of_pod("queue-master-59cb8c-24567"), "queue-master");
        assert_eq!(workload_of_pod("carts"), "carts");
    }

    #[test]
    fn test_pod_metrics_latest_and_limit() {
        let body = r#"{"pod": "carts-7d9c5f-abcde", "namespace": "sockshop",
            "timestamps": ["2024-05-01 10:00:00", "2024-05-01 10:00:10"],
            "metrics": {"cpu_usage": [12.5, 20.0], "net_trainsmit": []},
            "resource_limits": {"carts": {"cpu_limit": 500.0, "mem_limit": null}}}"#;
        let metrics: PodMetrics = serde_json::from_str(body).unwrap();
        assert_eq!(metrics.latest("cpu_usage"), Some(20.0));
        assert_eq!(metrics.latest("net_trainsmit"), None);
        assert_eq!(metrics.latest("destP50"), None);
        assert_eq!(metrics.limit().unwrap().cpu_limit, Some(500.0));
    }

    #[test]
    fn test_evaluation_request_omits_missing_load_dist() {
        let req = EvaluationRequest {
            workload: "wiki".to_string(),
            load_dist: None,
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"workload":"wiki"}"#);
    }
}
