//! HTTP client for the dashboard backend

use std::time::Duration;

use async_trait::async_trait;
use kubedash_types::{
    Benchmark, BenchmarkList, ClusterOverview, ContainerList, DeploymentInfo, DeploymentList,
    EvaluationRequest, EvaluationStatus, Message, NamespaceList, PodDetail, PodInfo, PodList,
    PodLogs, PodMetrics, PrepareRequest, ScalerInfo, ScalerList, ServiceInfo, ServiceList,
    WorkloadCatalog,
};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{ApiError, ClusterBackend, Result};

/// Address the backend listens on when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:10001";

/// Settings for building an [`ApiClient`]
#[derive(Clone, Debug)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("kubedash/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Pod lookups answer 200 with an `error` field instead of a failure status
#[derive(Deserialize)]
#[serde(untagged)]
enum PodDetailResponse {
    Found(PodDetail),
    Failed { error: String },
}

/// Shared client bound to the backend base url
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let parsed = reqwest::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: base_url,
                reason: "scheme must be http or https".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|source| ApiError::Request {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self { http, base_url })
    }

    /// Client for the default loopback backend
    pub fn with_defaults() -> Result<Self> {
        Self::new(ApiClientConfig::default())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join path segments onto the base url, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "GET");
        self.send(url.clone(), self.http.get(&url)).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(segments);
        tracing::debug!(%url, ?query, "GET");
        self.send(url.clone(), self.http.get(&url).query(query)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "POST");
        self.send(url.clone(), self.http.post(&url)).await
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "POST");
        self.send(url.clone(), self.http.post(&url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, url: String, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|source| ApiError::Request {
            url: url.clone(),
            source,
        })?;
        Self::decode(url, response).await
    }

    async fn decode<T: DeserializeOwned>(url: String, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "backend request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Request { url, source })
    }

    /// CPU, memory, network, latency and QPS series of the last five minutes
    pub async fn pod_metrics(&self, namespace: &str, pod: &str) -> Result<PodMetrics> {
        self.get(&["api", "all_metrics", namespace, pod]).await
    }

    // ------------------------------------------------------------------
    // Elastic scaling evaluation
    // ------------------------------------------------------------------

    pub async fn benchmarks(&self) -> Result<Vec<Benchmark>> {
        let list: BenchmarkList = self.get(&["api", "scaler-eval", "benchmarks"]).await?;
        Ok(list.benchmarks)
    }

    pub async fn scalers(&self) -> Result<Vec<ScalerInfo>> {
        let list: ScalerList = self.get(&["api", "scaler-eval", "scalers"]).await?;
        Ok(list.scalers)
    }

    pub async fn workloads(&self) -> Result<WorkloadCatalog> {
        self.get(&["api", "scaler-eval", "workloads"]).await
    }

    pub async fn evaluation_status(&self) -> Result<EvaluationStatus> {
        self.get(&["api", "scaler-eval", "status"]).await
    }

    pub async fn prepare_environment(&self, request: &PrepareRequest) -> Result<String> {
        let msg: Message = self
            .post_json(&["api", "scaler-eval", "prepare-environment"], request)
            .await?;
        Ok(msg.message)
    }

    pub async fn start_evaluation(&self, request: &EvaluationRequest) -> Result<String> {
        let msg: Message = self
            .post_json(&["api", "scaler-eval", "start-evaluation"], request)
            .await?;
        Ok(msg.message)
    }

    pub async fn stop_evaluation(&self) -> Result<String> {
        let msg: Message = self.post_empty(&["api", "scaler-eval", "stop"]).await?;
        Ok(msg.message)
    }

    pub async fn reset_environment(&self) -> Result<String> {
        let msg: Message = self
            .post_empty(&["api", "scaler-eval", "reset-environment"])
            .await?;
        Ok(msg.message)
    }
}

#[async_trait]
impl ClusterBackend for ApiClient {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn cluster_overview(&self) -> Result<ClusterOverview> {
        self.get(&["api", "cluster", "overview"]).await
    }

    async fn namespaces(&self) -> Result<Vec<String>> {
        let list: NamespaceList = self.get(&["api", "namespaces"]).await?;
        Ok(list.namespaces)
    }

    async fn deployments(&self, namespace: &str) -> Result<Vec<DeploymentInfo>> {
        let list: DeploymentList = self.get(&["api", "deployments", namespace]).await?;
        Ok(list.deployment_details)
    }

    async fn pods(&self, namespace: &str) -> Result<Vec<PodInfo>> {
        let list: PodList = self.get(&["api", "pods", namespace]).await?;
        Ok(list.pod_details)
    }

    async fn pod_detail(&self, namespace: &str, pod: &str) -> Result<PodDetail> {
        match self.get(&["api", "pod", namespace, pod]).await? {
            PodDetailResponse::Found(detail) => Ok(detail),
            PodDetailResponse::Failed { error } => Err(ApiError::Backend(error)),
        }
    }

    async fn services(&self, namespace: &str) -> Result<Vec<ServiceInfo>> {
        let list: ServiceList = self.get(&["api", "services", namespace]).await?;
        Ok(list.services)
    }

    async fn pod_containers(&self, namespace: &str, pod: &str) -> Result<Vec<String>> {
        let list: ContainerList = self.get(&["api", "pod", "containers", namespace, pod]).await?;
        Ok(list.containers)
    }

    async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: Option<&str>,
        lines: u32,
    ) -> Result<String> {
        let mut query = vec![("lines", lines.to_string())];
        if let Some(container) = container {
            query.push(("container", container.to_string()));
        }
        let logs: PodLogs = self
            .get_with_query(&["api", "pod", "logs", namespace, pod], &query)
            .await?;
        Ok(logs.logs)
    }

    async fn scale_deployment(
        &self,
        namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Result<String> {
        let body = serde_json::json!({ "replicas": replicas });
        let msg: Message = self
            .post_json(&["api", "deployment", "scale", namespace, name], &body)
            .await?;
        Ok(msg.message)
    }

    async fn restart_deployment(&self, namespace: &str, name: &str) -> Result<String> {
        let msg: Message = self
            .post_empty(&["api", "deployment", "restart", namespace, name])
            .await?;
        Ok(msg.message)
    }
}

/// Pull the human readable reason out of an error body (`{"detail": ...}`)
fn error_detail(body: &str) -> String {
    let trimmed = body.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => trimmed.to_string(),
        },
        _ if trimmed.is_empty() => "empty response body".to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        routing::{get, post},
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(app: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        ApiClient::new(ApiClientConfig {
            base_url: format!("http://{}/", addr),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_base_url() {
        let client = ApiClient::with_defaults().unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:10001");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = ApiClient::new(ApiClientConfig {
            base_url: "127.0.0.1:10001".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::new(ApiClientConfig {
            base_url: "http://backend:10001/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint(&["api", "pod", "team a", "web/0"]),
            "http://backend:10001/api/pod/team%20a/web%2F0"
        );
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(r#"{"detail": "Environment is not ready"}"#), "Environment is not ready");
        assert_eq!(error_detail("Internal Server Error"), "Internal Server Error");
        assert_eq!(error_detail(""), "empty response body");
    }

    #[tokio::test]
    async fn test_namespaces() {
        let app = Router::new().route(
            "/api/namespaces",
            get(|| async { Json(json!({ "namespaces": ["default", "sockshop"] })) }),
        );
        let client = serve(app).await;

        let namespaces = client.namespaces().await.unwrap();
        assert_eq!(namespaces, vec!["default", "sockshop"]);
    }

    #[tokio::test]
    async fn test_scale_sends_replicas() {
        let app = Router::new().route(
            "/api/deployment/scale/:namespace/:name",
            post(
                |Path((namespace, name)): Path<(String, String)>, Json(body): Json<Value>| async move {
                    Json(json!({
                        "message": format!("{}/{} -> {}", namespace, name, body["replicas"])
                    }))
                },
            ),
        );
        let client = serve(app).await;

        let msg = client.scale_deployment("sockshop", "carts", 4).await.unwrap();
        assert_eq!(msg, "sockshop/carts -> 4");
    }

    #[tokio::test]
    async fn test_error_status_carries_detail() {
        let app = Router::new().route(
            "/api/deployments/:namespace",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Failed to get deployment list: boom" })),
                )
            }),
        );
        let client = serve(app).await;

        let err = client.deployments("default").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "backend returned 500: Failed to get deployment list: boom"
        );
    }

    #[tokio::test]
    async fn test_pod_detail_error_body() {
        let app = Router::new().route(
            "/api/pod/:namespace/:pod",
            get(|| async { Json(json!({ "error": "pod not found" })) }),
        );
        let client = serve(app).await;

        let err = client.pod_detail("default", "missing").await.unwrap_err();
        assert!(matches!(err, ApiError::Backend(ref msg) if msg == "pod not found"));
    }

    #[tokio::test]
    async fn test_namespace_with_space_round_trips() {
        let app = Router::new().route(
            "/api/pods/:namespace",
            get(|Path(namespace): Path<String>| async move {
                Json(json!({
                    "pods": [namespace.clone()],
                    "podDetails": [{
                        "name": namespace, "status": "Running", "ip": "10.0.0.5",
                        "node": "worker-1", "restarts": 0, "age": "5m"
                    }]
                }))
            }),
        );
        let client = serve(app).await;

        let pods = client.pods("team a").await.unwrap();
        assert_eq!(pods[0].name, "team a");
    }

    #[tokio::test]
    async fn test_pod_logs_sends_container_and_lines() {
        let app = Router::new().route(
            "/api/pod/logs/:namespace/:name",
            get(
                |Path((namespace, name)): Path<(String, String)>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    let container = query.get("container").cloned().unwrap_or_else(|| "first".into());
                    Json(json!({
                        "logs": format!("{}/{} {} {}", namespace, name, container, query["lines"])
                    }))
                },
            ),
        );
        let client = serve(app).await;

        let logs = client
            .pod_logs("sockshop", "carts-7d9c5f-abcde", Some("carts"), 50)
            .await
            .unwrap();
        assert_eq!(logs, "sockshop/carts-7d9c5f-abcde carts 50");

        let logs = client
            .pod_logs("sockshop", "carts-7d9c5f-abcde", None, 100)
            .await
            .unwrap();
        assert_eq!(logs, "sockshop/carts-7d9c5f-abcde first 100");
    }

    #[tokio::test]
    async fn test_pod_containers() {
        let app = Router::new().route(
            "/api/pod/containers/:namespace/:name",
            get(|| async { Json(json!({ "containers": ["carts", "istio-proxy"] })) }),
        );
        let client = serve(app).await;

        let containers = client.pod_containers("sockshop", "carts-1").await.unwrap();
        assert_eq!(containers, vec!["carts", "istio-proxy"]);
    }

    #[tokio::test]
    async fn test_pod_metrics() {
        let app = Router::new().route(
            "/api/all_metrics/:namespace/:pod",
            get(|Path((namespace, pod)): Path<(String, String)>| async move {
                Json(json!({
                    "pod": pod,
                    "namespace": namespace,
                    "timestamps": ["2024-05-01 10:00:00", "2024-05-01 10:00:10"],
                    "metrics": {
                        "cpu_usage": [10.0, 42.5],
                        "mem_usage": [128.0, 130.0],
                        "dest_qps": [3.5, 4.0]
                    },
                    "resource_limits": {"carts": {"cpu_limit": 500.0, "mem_limit": 512.0}}
                }))
            }),
        );
        let client = serve(app).await;

        let metrics = client.pod_metrics("sockshop", "carts-7d9c5f-abcde").await.unwrap();
        assert_eq!(metrics.pod, "carts-7d9c5f-abcde");
        assert_eq!(metrics.latest("cpu_usage"), Some(42.5));
        assert_eq!(metrics.latest("dest_qps"), Some(4.0));
        assert_eq!(metrics.limit().unwrap().mem_limit, Some(512.0));
    }

    #[tokio::test]
    async fn test_start_evaluation_rejected() {
        let app = Router::new().route(
            "/api/scaler-eval/start-evaluation",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["workload"], "wiki");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "detail": "Environment is not ready. Please prepare environment first."
                    })),
                )
            }),
        );
        let client = serve(app).await;

        let err = client
            .start_evaluation(&EvaluationRequest {
                workload: "wiki".to_string(),
                load_dist: Some("1".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }
}
