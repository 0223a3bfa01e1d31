//! Backend clients for kubedash
//!
//! The dashboard talks to a small HTTP service that fronts the cluster and
//! the autoscaler evaluation harness. Cluster reads and scaling are also
//! available straight from the Kubernetes API for setups without that
//! service.

mod backend;
mod direct;
mod error;
mod http;

pub use backend::{ClusterBackend, DEFAULT_LOG_LINES};
pub use direct::KubeBackend;
pub use error::{ApiError, Result};
pub use http::{ApiClient, ApiClientConfig, DEFAULT_BASE_URL};

// Re-export types that are used in our public API
pub use kubedash_types::{
    BenchmarkList, ClusterOverview, DeploymentInfo, DeploymentList, EvaluationRequest,
    EvaluationStatus, Message, PodDetail, PodInfo, PodList, PodMetrics, PrepareRequest,
    ScalerList, ServiceInfo, ServiceList, WorkloadCatalog,
};
