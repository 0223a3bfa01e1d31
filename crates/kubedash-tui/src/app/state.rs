use std::time::{Duration, Instant};

use kubedash_types::{
    Benchmark, ClusterOverview, DeploymentInfo, EvaluationRequest, EvaluationStatus,
    LoadDistribution, PodDetail, PodInfo, PodMetrics, PrepareRequest, ScalerInfo, ServiceInfo,
    WorkloadCatalog, WorkloadInfo, workload_of_pod,
};
use ratatui::widgets::{ListState, TableState};
use tokio::sync::mpsc;

use super::{Action, Mutation, Route, RouteError, Router, ServiceProps, Store};

/// Sidebar menu entries, in display order
pub fn menu() -> [Route; 2] {
    [Route::KubernetesDashboard, Route::ElasticScaling]
}

/// Focused pane on the dashboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DashboardPane {
    #[default]
    Namespaces,
    Deployments,
}

/// Focused picker on the elastic scaling view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingPicker {
    #[default]
    Benchmark,
    Scaler,
    Workload,
}

impl ScalingPicker {
    fn next(self) -> Self {
        match self {
            Self::Benchmark => Self::Scaler,
            Self::Scaler => Self::Workload,
            Self::Workload => Self::Benchmark,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Benchmark => Self::Workload,
            Self::Scaler => Self::Benchmark,
            Self::Workload => Self::Scaler,
        }
    }
}

/// Replica count being typed for a deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalePrompt {
    pub namespace: String,
    pub deployment: String,
    pub input: String,
}

impl ScalePrompt {
    const MAX_DIGITS: usize = 4;

    pub fn push(&mut self, c: char) {
        if c.is_ascii_digit() && self.input.len() < Self::MAX_DIGITS {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn replicas(&self) -> Option<i32> {
        self.input.parse().ok()
    }
}

/// A scale request ready to be sent to the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaleRequest {
    pub namespace: String,
    pub deployment: String,
    pub replicas: i32,
}

/// Data shown on the cluster dashboard
#[derive(Debug, Default)]
pub struct DashboardData {
    pub overview: Option<ClusterOverview>,
    pub namespaces: Vec<String>,
    pub selected_namespace: Option<String>,
    pub deployments: Vec<DeploymentInfo>,
}

/// Data shown on the service detail view
#[derive(Debug, Default)]
pub struct ServiceDetailData {
    /// Props the data below was loaded for
    pub props: Option<ServiceProps>,
    pub deployment: Option<DeploymentInfo>,
    pub pods: Vec<PodInfo>,
    pub service: Option<ServiceInfo>,
    /// Pod opened with Enter; responses for any other pod are dropped
    pub inspected_pod: Option<String>,
    pub pod_detail: Option<PodDetail>,
    pub containers: Vec<String>,
    /// Container whose logs are shown
    pub container: Option<String>,
    pub pod_logs: Option<String>,
    pub pod_metrics: Option<PodMetrics>,
}

/// A pod (and optionally one of its containers) to fetch data for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodTarget {
    pub namespace: String,
    pub pod: String,
    pub container: Option<String>,
}

/// Data shown on the elastic scaling view
#[derive(Debug, Default)]
pub struct ScalingData {
    pub benchmarks: Vec<Benchmark>,
    pub scalers: Vec<ScalerInfo>,
    pub catalog: WorkloadCatalog,
    pub load_dist_index: usize,
    pub status: Option<EvaluationStatus>,
    pub catalog_loaded: bool,
    last_poll: Option<Instant>,
}

/// UI-specific transient state
#[derive(Default)]
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Error message to display (if any)
    pub error_message: Option<String>,

    /// Confirmation of the last successful operation
    pub notice: Option<String>,

    pub namespace_list: ListState,
    pub deployment_table: TableState,
    pub pod_table: TableState,
    pub benchmark_list: ListState,
    pub scaler_list: ListState,
    pub workload_list: ListState,

    pub dashboard_focus: DashboardPane,
    pub scaling_focus: ScalingPicker,

    /// Open replica prompt, captures keyboard input
    pub scale_prompt: Option<ScalePrompt>,
}

/// Back navigation keeps at most this many routes
pub const HISTORY_LIMIT: usize = 50;

/// Global application state
pub struct AppState {
    /// View currently displayed
    pub route: Route,

    /// Navigation stack for back navigation
    pub history: Vec<Route>,

    /// Sidebar and tabs
    pub store: Store,

    pub router: Router,

    /// Where data comes from, shown in the header
    pub backend_label: String,

    /// The HTTP backend is in use; the evaluation harness and pod metrics need it
    pub http_backend: bool,

    pub dashboard: DashboardData,
    pub detail: ServiceDetailData,
    pub scaling: ScalingData,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Channel sender for async actions
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl AppState {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            route: Route::default(),
            history: Vec::new(),
            store: Store::new(),
            router: Router::new(),
            backend_label: String::new(),
            http_backend: true,
            dashboard: DashboardData::default(),
            detail: ServiceDetailData::default(),
            scaling: ScalingData::default(),
            ui_state: UiState::default(),
            should_quit: false,
            action_tx,
        }
    }

    /// Navigate to a route, pushing the current one to the history.
    /// Returns false when already there.
    pub fn navigate(&mut self, route: Route) -> bool {
        if route == self.route {
            self.store.commit(Mutation::MenuChange(route.tab()));
            return false;
        }
        let previous = std::mem::replace(&mut self.route, route);
        self.history.push(previous);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.enter_route();
        true
    }

    /// Resolve a path and navigate to it
    pub fn navigate_path(&mut self, path: &str) -> Result<bool, RouteError> {
        let resolved = self.router.resolve(path)?;
        Ok(self.navigate(resolved.route))
    }

    /// Go back to the previous route
    pub fn go_back(&mut self) -> bool {
        if let Some(previous) = self.history.pop() {
            self.route = previous;
            self.enter_route();
            true
        } else {
            false
        }
    }

    fn replace_route(&mut self, route: Route) {
        if route != self.route {
            self.route = route;
            self.enter_route();
        } else {
            self.store.commit(Mutation::MenuChange(route.tab()));
        }
    }

    fn enter_route(&mut self) {
        tracing::debug!(route = %self.route, "navigate");
        self.store.commit(Mutation::MenuChange(self.route.tab()));
        self.ui_state.notice = None;

        if let Route::ServiceDetail(props) = &self.route {
            if self.detail.props.as_ref() != Some(props) {
                self.detail = ServiceDetailData::default();
                self.ui_state.pod_table.select(None);
            }
        }
    }

    /// Index of the highlighted tab
    pub fn active_tab_index(&self) -> Option<usize> {
        self.store.tab_index(self.route.name())
    }

    /// Switch to the tab at `index`
    pub fn activate_tab(&mut self, index: usize) {
        let Some(tab) = self.store.tabs().get(index) else {
            return;
        };
        let path = tab.path.clone();
        match self.router.resolve(&path) {
            Ok(resolved) => {
                self.navigate(resolved.route);
            }
            Err(e) => self.show_error(e.to_string()),
        }
    }

    pub fn next_tab(&mut self) {
        let len = self.store.tabs().len();
        if len == 0 {
            return;
        }
        let next = match self.active_tab_index() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.activate_tab(next);
    }

    pub fn prev_tab(&mut self) {
        let len = self.store.tabs().len();
        if len == 0 {
            return;
        }
        let prev = match self.active_tab_index() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.activate_tab(prev);
    }

    /// Close the active tab and show the last remaining one
    pub fn close_active_tab(&mut self) {
        self.store.commit(Mutation::CloseTag(self.route.tab()));

        let last_path = self.store.tabs().last().map(|tab| tab.path.clone());
        let next = match last_path {
            Some(path) => match self.router.resolve(&path) {
                Ok(resolved) => resolved.route,
                Err(e) => {
                    self.show_error(e.to_string());
                    Route::default()
                }
            },
            None => Route::default(),
        };
        self.replace_route(next);
    }

    /// Open the n-th sidebar entry
    pub fn select_menu(&mut self, index: usize) -> bool {
        match menu().into_iter().nth(index) {
            Some(route) => self.navigate(route),
            None => false,
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.store.commit(Mutation::CollapseChange);
    }

    pub fn focus_next(&mut self) {
        match self.route {
            Route::KubernetesDashboard => {
                self.ui_state.dashboard_focus = match self.ui_state.dashboard_focus {
                    DashboardPane::Namespaces => DashboardPane::Deployments,
                    DashboardPane::Deployments => DashboardPane::Namespaces,
                };
            }
            Route::ElasticScaling => {
                self.ui_state.scaling_focus = self.ui_state.scaling_focus.next();
            }
            Route::ServiceDetail(_) => {}
        }
    }

    pub fn focus_prev(&mut self) {
        match self.route {
            Route::ElasticScaling => {
                self.ui_state.scaling_focus = self.ui_state.scaling_focus.prev();
            }
            _ => self.focus_next(),
        }
    }

    /// Get the length of the focused list
    pub fn current_list_len(&self) -> usize {
        match &self.route {
            Route::KubernetesDashboard => match self.ui_state.dashboard_focus {
                DashboardPane::Namespaces => self.dashboard.namespaces.len(),
                DashboardPane::Deployments => self.dashboard.deployments.len(),
            },
            Route::ServiceDetail(_) => self.detail.pods.len(),
            Route::ElasticScaling => match self.ui_state.scaling_focus {
                ScalingPicker::Benchmark => self.scaling.benchmarks.len(),
                ScalingPicker::Scaler => self.scaling.scalers.len(),
                ScalingPicker::Workload => self.scaling.catalog.workloads.len(),
            },
        }
    }

    /// Get currently selected index of the focused list
    pub fn selected_index(&self) -> Option<usize> {
        match &self.route {
            Route::KubernetesDashboard => match self.ui_state.dashboard_focus {
                DashboardPane::Namespaces => self.ui_state.namespace_list.selected(),
                DashboardPane::Deployments => self.ui_state.deployment_table.selected(),
            },
            Route::ServiceDetail(_) => self.ui_state.pod_table.selected(),
            Route::ElasticScaling => match self.ui_state.scaling_focus {
                ScalingPicker::Benchmark => self.ui_state.benchmark_list.selected(),
                ScalingPicker::Scaler => self.ui_state.scaler_list.selected(),
                ScalingPicker::Workload => self.ui_state.workload_list.selected(),
            },
        }
    }

    fn select_index(&mut self, index: Option<usize>) {
        match &self.route {
            Route::KubernetesDashboard => match self.ui_state.dashboard_focus {
                DashboardPane::Namespaces => self.ui_state.namespace_list.select(index),
                DashboardPane::Deployments => self.ui_state.deployment_table.select(index),
            },
            Route::ServiceDetail(_) => {
                self.ui_state.pod_table.select(index);
                self.detail.pod_detail = None;
            }
            Route::ElasticScaling => match self.ui_state.scaling_focus {
                ScalingPicker::Benchmark => self.ui_state.benchmark_list.select(index),
                ScalingPicker::Scaler => self.ui_state.scaler_list.select(index),
                ScalingPicker::Workload => {
                    self.ui_state.workload_list.select(index);
                    self.scaling.load_dist_index = 0;
                }
            },
        }
    }

    /// Move selection up
    pub fn list_up(&mut self) {
        let len = self.current_list_len();
        if len == 0 {
            return;
        }

        let i = match self.selected_index() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.select_index(Some(i));
    }

    /// Move selection down
    pub fn list_down(&mut self) {
        let len = self.current_list_len();
        if len == 0 {
            return;
        }

        let i = match self.selected_index() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.select_index(Some(i));
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        tracing::warn!(error = %msg, "showing error");
        self.ui_state.notice = None;
        self.ui_state.error_message = Some(msg);
    }

    /// Dismiss the error message
    pub fn dismiss_error(&mut self) {
        self.ui_state.error_message = None;
    }

    /// Show a confirmation message
    pub fn show_notice(&mut self, msg: String) {
        self.ui_state.notice = Some(msg);
    }

    // Dashboard

    /// Store the namespace list and pick the namespace whose deployments to load
    pub fn set_namespaces(&mut self, namespaces: Vec<String>) -> Option<String> {
        let keep = self
            .dashboard
            .selected_namespace
            .as_ref()
            .and_then(|current| namespaces.iter().position(|ns| ns == current));
        let index = keep
            .or_else(|| namespaces.iter().position(|ns| ns == "default"))
            .or(if namespaces.is_empty() { None } else { Some(0) });

        self.dashboard.namespaces = namespaces;
        self.ui_state.namespace_list.select(index);
        let selected = index.and_then(|i| self.dashboard.namespaces.get(i).cloned());
        if selected != self.dashboard.selected_namespace {
            self.dashboard.deployments.clear();
            self.ui_state.deployment_table.select(None);
        }
        self.dashboard.selected_namespace = selected.clone();
        selected
    }

    /// Make the highlighted namespace the current one
    pub fn choose_highlighted_namespace(&mut self) -> Option<String> {
        let index = self.ui_state.namespace_list.selected()?;
        let namespace = self.dashboard.namespaces.get(index)?.clone();
        if self.dashboard.selected_namespace.as_ref() != Some(&namespace) {
            self.dashboard.deployments.clear();
            self.ui_state.deployment_table.select(None);
        }
        self.dashboard.selected_namespace = Some(namespace.clone());
        Some(namespace)
    }

    /// Store deployments unless the user has since moved to another namespace
    pub fn set_deployments(&mut self, namespace: &str, deployments: Vec<DeploymentInfo>) {
        if self.dashboard.selected_namespace.as_deref() != Some(namespace) {
            tracing::debug!(namespace, "dropping stale deployment list");
            return;
        }
        let selected = clamp_selection(self.ui_state.deployment_table.selected(), deployments.len());
        self.ui_state.deployment_table.select(selected);
        self.dashboard.deployments = deployments;
    }

    // Service detail

    /// Store the pieces of the detail view that belong to `props`
    pub fn set_service_detail(
        &mut self,
        props: ServiceProps,
        deployments: Vec<DeploymentInfo>,
        pods: Vec<PodInfo>,
        services: Vec<ServiceInfo>,
    ) {
        if self.route.props() != Some(&props) {
            tracing::debug!(?props, "dropping stale service detail");
            return;
        }

        let pods: Vec<PodInfo> = pods
            .into_iter()
            .filter(|pod| workload_of_pod(&pod.name) == props.service_name)
            .collect();

        let selected = clamp_selection(self.ui_state.pod_table.selected(), pods.len());
        self.ui_state.pod_table.select(selected);

        self.detail.deployment = deployments
            .into_iter()
            .find(|d| d.name == props.service_name);
        self.detail.service = services
            .into_iter()
            .find(|s| s.name == props.service_name);
        self.detail.pods = pods;
        self.detail.props = Some(props);
    }

    pub fn selected_pod(&self) -> Option<&PodInfo> {
        self.detail.pods.get(self.ui_state.pod_table.selected()?)
    }

    /// Open the highlighted pod, forgetting whatever was loaded for the previous one
    pub fn inspect_selected_pod(&mut self) -> Option<PodTarget> {
        let namespace = self.route.props()?.namespace.clone();
        let pod = self.selected_pod()?.name.clone();

        self.detail.inspected_pod = Some(pod.clone());
        self.detail.pod_detail = None;
        self.detail.containers.clear();
        self.detail.container = None;
        self.detail.pod_logs = None;
        self.detail.pod_metrics = None;

        Some(PodTarget {
            namespace,
            pod,
            container: None,
        })
    }

    /// The open pod with its chosen container, for refreshing
    pub fn inspected_pod(&self) -> Option<PodTarget> {
        Some(PodTarget {
            namespace: self.route.props()?.namespace.clone(),
            pod: self.detail.inspected_pod.clone()?,
            container: self.detail.container.clone(),
        })
    }

    fn is_inspected(&self, pod: &str) -> bool {
        self.detail.inspected_pod.as_deref() == Some(pod)
    }

    pub fn set_pod_detail(&mut self, detail: PodDetail) {
        if self.is_inspected(&detail.pod_name) {
            self.detail.pod_detail = Some(detail);
        }
    }

    pub fn set_pod_containers(&mut self, pod: &str, containers: Vec<String>) {
        if !self.is_inspected(pod) {
            return;
        }
        if self.detail.container.is_none() {
            self.detail.container = containers.first().cloned();
        }
        self.detail.containers = containers;
    }

    /// Store logs fetched for `target`, unless another pod or container is shown by now
    pub fn set_pod_logs(&mut self, target: &PodTarget, logs: String) {
        if !self.is_inspected(&target.pod) {
            return;
        }
        // No container means the pod's first one
        let fetched = target.container.as_ref().or(self.detail.containers.first());
        let shown = self.detail.container.as_ref();
        if fetched.is_some() && shown.is_some() && fetched != shown {
            return;
        }
        self.detail.pod_logs = Some(logs);
    }

    pub fn set_pod_metrics(&mut self, metrics: PodMetrics) {
        if self.is_inspected(&metrics.pod) {
            self.detail.pod_metrics = Some(metrics);
        }
    }

    /// Show the logs of the open pod's next container
    pub fn next_container(&mut self) -> Option<PodTarget> {
        if self.detail.containers.len() < 2 {
            return None;
        }
        let current = self
            .detail
            .container
            .as_ref()
            .and_then(|name| self.detail.containers.iter().position(|c| c == name));
        let next = current.map_or(0, |i| (i + 1) % self.detail.containers.len());

        self.detail.container = Some(self.detail.containers[next].clone());
        self.detail.pod_logs = None;
        self.inspected_pod()
    }

    /// Namespace and deployment targeted by scale and restart
    pub fn target_deployment(&self) -> Option<(&str, &DeploymentInfo)> {
        match &self.route {
            Route::KubernetesDashboard => {
                let namespace = self.dashboard.selected_namespace.as_deref()?;
                let index = self.ui_state.deployment_table.selected()?;
                Some((namespace, self.dashboard.deployments.get(index)?))
            }
            Route::ServiceDetail(props) => {
                Some((props.namespace.as_str(), self.detail.deployment.as_ref()?))
            }
            Route::ElasticScaling => None,
        }
    }

    /// Scale request moving the target deployment by `delta` replicas
    pub fn scale_by(&self, delta: i32) -> Option<ScaleRequest> {
        let (namespace, deployment) = self.target_deployment()?;
        let replicas = deployment.desired_replicas.saturating_add(delta).max(0);
        if replicas == deployment.desired_replicas {
            return None;
        }
        Some(ScaleRequest {
            namespace: namespace.to_string(),
            deployment: deployment.name.clone(),
            replicas,
        })
    }

    pub fn open_scale_prompt(&mut self) -> bool {
        let Some((namespace, deployment)) = self.target_deployment() else {
            return false;
        };
        self.ui_state.scale_prompt = Some(ScalePrompt {
            namespace: namespace.to_string(),
            deployment: deployment.name.clone(),
            input: deployment.desired_replicas.to_string(),
        });
        true
    }

    /// Close the prompt and turn its input into a request
    pub fn confirm_scale_prompt(&mut self) -> Option<ScaleRequest> {
        let prompt = self.ui_state.scale_prompt.take()?;
        match prompt.replicas() {
            Some(replicas) => Some(ScaleRequest {
                namespace: prompt.namespace,
                deployment: prompt.deployment,
                replicas,
            }),
            None => {
                self.show_error("Replica count must be a whole number".to_string());
                None
            }
        }
    }

    // Elastic scaling

    pub fn set_catalog(
        &mut self,
        benchmarks: Vec<Benchmark>,
        scalers: Vec<ScalerInfo>,
        catalog: WorkloadCatalog,
    ) {
        self.ui_state
            .benchmark_list
            .select(clamp_selection(self.ui_state.benchmark_list.selected(), benchmarks.len()));
        self.ui_state
            .scaler_list
            .select(clamp_selection(self.ui_state.scaler_list.selected(), scalers.len()));
        self.ui_state.workload_list.select(clamp_selection(
            self.ui_state.workload_list.selected(),
            catalog.workloads.len(),
        ));
        if self.scaling.load_dist_index >= catalog.load_distributions.len() {
            self.scaling.load_dist_index = 0;
        }

        self.scaling.benchmarks = benchmarks;
        self.scaling.scalers = scalers;
        self.scaling.catalog = catalog;
        self.scaling.catalog_loaded = true;
    }

    pub fn selected_benchmark(&self) -> Option<&Benchmark> {
        self.scaling
            .benchmarks
            .get(self.ui_state.benchmark_list.selected()?)
    }

    pub fn selected_scaler(&self) -> Option<&ScalerInfo> {
        self.scaling.scalers.get(self.ui_state.scaler_list.selected()?)
    }

    pub fn selected_workload(&self) -> Option<&WorkloadInfo> {
        self.scaling
            .catalog
            .workloads
            .get(self.ui_state.workload_list.selected()?)
    }

    /// Load distribution applied to the selected workload, if it takes one
    pub fn selected_load_distribution(&self) -> Option<&LoadDistribution> {
        if !self.selected_workload()?.supports_load_dist {
            return None;
        }
        self.scaling
            .catalog
            .load_distributions
            .get(self.scaling.load_dist_index)
    }

    pub fn cycle_load_distribution(&mut self) {
        let len = self.scaling.catalog.load_distributions.len();
        if len > 0 {
            self.scaling.load_dist_index = (self.scaling.load_dist_index + 1) % len;
        }
    }

    pub fn prepare_request(&self) -> Option<PrepareRequest> {
        Some(PrepareRequest {
            benchmark: self.selected_benchmark()?.name.clone(),
            scaler: self.selected_scaler()?.name.clone(),
        })
    }

    pub fn evaluation_request(&self) -> Option<EvaluationRequest> {
        Some(EvaluationRequest {
            workload: self.selected_workload()?.name.clone(),
            load_dist: self.selected_load_distribution().map(|d| d.value.clone()),
        })
    }

    /// The last status reported a task in flight
    pub fn evaluation_busy(&self) -> bool {
        self.scaling
            .status
            .as_ref()
            .is_some_and(EvaluationStatus::is_busy)
    }

    /// Whether the evaluation status should be fetched now
    pub fn poll_due(&mut self, now: Instant, interval: Duration) -> bool {
        if self.route != Route::ElasticScaling || !self.http_backend {
            return false;
        }
        let due = self
            .scaling
            .last_poll
            .is_none_or(|last| now.saturating_duration_since(last) >= interval);
        if due {
            self.scaling.last_poll = Some(now);
        }
        due
    }
}

fn clamp_selection(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(selected.unwrap_or(0).min(len - 1))
    }
}
