mod config;

use std::fs::OpenOptions;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use kubedash_api::{
    ApiClient, ApiClientConfig, ApiError, ClusterBackend, DEFAULT_LOG_LINES, KubeBackend,
};
use kubedash_tui::app::{DashboardPane, Mutation};
use kubedash_tui::{
    Action, AppState, Event, EventHandler, KeyBindings, KeyContext, PodTarget, Route,
    ScaleRequest, ServiceProps, Tui,
};
use kubedash_types::{
    Benchmark, ClusterOverview, DeploymentInfo, EvaluationRequest, EvaluationStatus, PodDetail,
    PodInfo, PodMetrics, PrepareRequest, ScalerInfo, ServiceInfo, WorkloadCatalog,
};

use crate::config::{BackendMode, Overrides, Settings};

/// Kubedash - a terminal dashboard for viewing and scaling Kubernetes workloads
#[derive(Parser, Debug)]
#[command(name = "kubedash")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Initial route, e.g. /ElasticScaling or /ServiceDetail/default/frontend
    #[arg(value_name = "PATH")]
    path: Option<String>,

    /// Base URL of the kubedash backend
    #[arg(long, env = "KUBEDASH_BACKEND_URL")]
    backend_url: Option<String>,

    /// Talk to the Kubernetes API directly instead of the backend
    #[arg(long)]
    direct: bool,

    /// kubeconfig context for --direct
    #[arg(long, requires = "direct")]
    context: Option<String>,

    /// Config file (defaults to ./kubedash.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Evaluation status polling interval in milliseconds
    #[arg(long)]
    refresh_ms: Option<u64>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend_url: self.backend_url.clone(),
            direct: self.direct,
            context: self.context.clone(),
            refresh_ms: self.refresh_ms,
            start_path: self.path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let result = start(args).await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn start(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?.with_overrides(args.overrides());
    init_tracing(settings.log_file.as_deref())?;
    tracing::debug!(?settings, "settings loaded");

    let backends = Backends::connect(&settings).await?;
    run_app(settings, backends).await
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// The cluster backend, plus the HTTP-only endpoints when talking HTTP
struct Backends {
    cluster: Arc<dyn ClusterBackend>,
    http: Option<ApiClient>,
}

impl Backends {
    async fn connect(settings: &Settings) -> Result<Self> {
        match settings.backend.mode {
            BackendMode::Http => {
                let client = ApiClient::new(ApiClientConfig {
                    base_url: settings.backend.url.clone(),
                    timeout: Duration::from_secs(settings.backend.timeout_secs),
                    ..Default::default()
                })
                .context("invalid backend configuration")?;
                tracing::info!(url = client.base_url(), "using HTTP backend");
                Ok(Self {
                    cluster: Arc::new(client.clone()),
                    http: Some(client),
                })
            }
            BackendMode::Direct => {
                let backend = KubeBackend::connect(settings.backend.context.as_deref())
                    .await
                    .context("failed to connect to the cluster")?;
                tracing::info!(backend = %backend.describe(), "using direct backend");
                Ok(Self {
                    cluster: Arc::new(backend),
                    http: None,
                })
            }
        }
    }
}

/// Evaluation harness commands
enum EvaluationCommand {
    Prepare(PrepareRequest),
    Start(EvaluationRequest),
    Stop,
    Reset,
}

struct ServiceDetailPayload {
    props: ServiceProps,
    deployments: Vec<DeploymentInfo>,
    pods: Vec<PodInfo>,
    services: Vec<ServiceInfo>,
}

/// Internal actions for async operations
enum InternalAction {
    LoadDashboard,
    LoadDeployments(String),
    LoadServiceDetail(ServiceProps),
    /// Detail, containers, logs and metrics of a newly opened pod
    LoadPod(PodTarget),
    LoadPodLogs(PodTarget),
    LoadPodMetrics(PodTarget),
    LoadScalingCatalog,
    PollEvaluation,
    Scale(ScaleRequest),
    Restart(String, String),
    Evaluate(EvaluationCommand),
    OverviewLoaded(ClusterOverview),
    NamespacesLoaded(Vec<String>),
    DeploymentsLoaded(String, Vec<DeploymentInfo>),
    ServiceDetailLoaded(Box<ServiceDetailPayload>),
    PodDetailLoaded(PodDetail),
    PodContainersLoaded(String, Vec<String>),
    PodLogsLoaded(PodTarget, String),
    PodMetricsLoaded(PodMetrics),
    CatalogLoaded(Vec<Benchmark>, Vec<ScalerInfo>, WorkloadCatalog),
    EvaluationStatusLoaded(EvaluationStatus),
    /// A write succeeded; show the message and reload the view
    OperationDone(String),
    Error(String),
}

async fn run_app(settings: Settings, backends: Backends) -> Result<()> {
    // Create action channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();

    // Initialize state
    let mut state = AppState::new(action_tx.clone());
    state.backend_label = backends.cluster.describe();
    state.http_backend = backends.http.is_some();
    if settings.ui.sidebar_collapsed {
        state.store.commit(Mutation::CollapseChange);
    }

    // Resolve the initial route before touching the terminal
    let start_path = settings.ui.start_path.as_str();
    state
        .navigate_path(start_path)
        .with_context(|| format!("invalid start path '{}'", start_path))?;
    load_route(&state, &internal_tx, true);

    let refresh_interval = Duration::from_millis(settings.ui.refresh_ms.max(250));

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(250));
    let keybindings = KeyBindings::new();

    // Initial render
    render(&mut tui, &mut state)?;

    // Main event loop
    loop {
        let route_before = state.route.clone();

        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.scale_prompt.is_some() {
                            keybindings.get_scale_prompt_action(&key)
                        } else {
                            keybindings.get_action(KeyContext::for_route(&state.route), &key)
                        };
                        if let Some(action) = action {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Tick => {
                        if state.poll_due(Instant::now(), refresh_interval) {
                            let _ = internal_tx.send(InternalAction::PollEvaluation);
                        }
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        state.show_error(e);
                    }
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &internal_tx, action);
            }

            // Handle internal async actions
            Some(internal) = internal_rx.recv() => {
                handle_internal(&mut state, &backends, &internal_tx, internal);
            }
        }

        if state.should_quit {
            break;
        }

        if state.route != route_before {
            load_route(&state, &internal_tx, false);
        }

        render(&mut tui, &mut state)?;
    }

    // Cleanup
    events.shutdown().await;
    tui.restore()?;

    Ok(())
}

/// Request the data the current route shows
fn load_route(state: &AppState, internal_tx: &mpsc::UnboundedSender<InternalAction>, refresh: bool) {
    let request = match &state.route {
        Route::KubernetesDashboard => InternalAction::LoadDashboard,
        Route::ServiceDetail(props) => {
            if let Some(target) = state.inspected_pod() {
                let _ = internal_tx.send(InternalAction::LoadPodLogs(target.clone()));
                let _ = internal_tx.send(InternalAction::LoadPodMetrics(target));
            }
            InternalAction::LoadServiceDetail(props.clone())
        }
        Route::ElasticScaling => {
            if !state.http_backend {
                return;
            }
            if refresh || !state.scaling.catalog_loaded {
                let _ = internal_tx.send(InternalAction::LoadScalingCatalog);
            }
            InternalAction::PollEvaluation
        }
    };
    let _ = internal_tx.send(request);
}

fn handle_action(
    state: &mut AppState,
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
    action: Action,
) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::GoBack => {
            if state.ui_state.help_visible {
                state.ui_state.help_visible = false;
            } else if state.ui_state.error_message.is_some() {
                state.dismiss_error();
            } else if !state.go_back() {
                state.should_quit = true;
            }
        }
        Action::Navigate(route) => {
            state.navigate(route);
        }
        Action::MenuSelect(index) => {
            state.select_menu(index);
        }
        Action::NextTab => state.next_tab(),
        Action::PrevTab => state.prev_tab(),
        Action::CloseTab => state.close_active_tab(),
        Action::ToggleSidebar => state.toggle_sidebar(),
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::ListUp => state.list_up(),
        Action::ListDown => state.list_down(),
        Action::FocusNext => state.focus_next(),
        Action::FocusPrev => state.focus_prev(),
        Action::ListSelect => {
            handle_list_select(state, internal_tx);
        }
        Action::Refresh => {
            load_route(state, internal_tx, true);
        }

        // Deployment operations
        Action::ScaleUp | Action::ScaleDown => {
            let delta = if action == Action::ScaleUp { 1 } else { -1 };
            if let Some(request) = state.scale_by(delta) {
                let _ = internal_tx.send(InternalAction::Scale(request));
            }
        }
        Action::OpenScalePrompt => {
            if !state.open_scale_prompt() {
                state.show_error("Select a deployment first".to_string());
            }
        }
        Action::ScaleInput(c) => {
            if let Some(prompt) = state.ui_state.scale_prompt.as_mut() {
                prompt.push(c);
            }
        }
        Action::ScaleBackspace => {
            if let Some(prompt) = state.ui_state.scale_prompt.as_mut() {
                prompt.backspace();
            }
        }
        Action::ScaleCancel => {
            state.ui_state.scale_prompt = None;
        }
        Action::ScaleConfirm => {
            if let Some(request) = state.confirm_scale_prompt() {
                let _ = internal_tx.send(InternalAction::Scale(request));
            }
        }
        Action::RestartDeployment => match state.target_deployment() {
            Some((namespace, deployment)) => {
                let _ = internal_tx.send(InternalAction::Restart(
                    namespace.to_string(),
                    deployment.name.clone(),
                ));
            }
            None => state.show_error("Select a deployment first".to_string()),
        },

        // Elastic scaling
        Action::PrepareEnvironment if state.evaluation_busy() => {
            state.show_error("An evaluation task is already in progress".to_string());
        }
        Action::PrepareEnvironment => match state.prepare_request() {
            Some(request) => {
                let _ = internal_tx.send(InternalAction::Evaluate(EvaluationCommand::Prepare(request)));
            }
            None => state.show_error("Select a benchmark and a scaler first".to_string()),
        },
        Action::StartEvaluation => match state.evaluation_request() {
            Some(request) => {
                let _ = internal_tx.send(InternalAction::Evaluate(EvaluationCommand::Start(request)));
            }
            None => state.show_error("Select a workload first".to_string()),
        },
        Action::StopEvaluation => {
            let _ = internal_tx.send(InternalAction::Evaluate(EvaluationCommand::Stop));
        }
        Action::ResetEnvironment => {
            let _ = internal_tx.send(InternalAction::Evaluate(EvaluationCommand::Reset));
        }
        Action::CycleLoadDistribution => state.cycle_load_distribution(),
        Action::NextContainer => {
            if let Some(target) = state.next_container() {
                let _ = internal_tx.send(InternalAction::LoadPodLogs(target));
            }
        }

        Action::Render => {
            // Redrawn after every action
        }
    }
}

fn handle_list_select(state: &mut AppState, internal_tx: &mpsc::UnboundedSender<InternalAction>) {
    match state.route.clone() {
        Route::KubernetesDashboard => match state.ui_state.dashboard_focus {
            DashboardPane::Namespaces => {
                if let Some(namespace) = state.choose_highlighted_namespace() {
                    state.ui_state.dashboard_focus = DashboardPane::Deployments;
                    let _ = internal_tx.send(InternalAction::LoadDeployments(namespace));
                }
            }
            DashboardPane::Deployments => {
                if let Some((namespace, deployment)) = state.target_deployment() {
                    let route = Route::service_detail(namespace, deployment.name.as_str());
                    let _ = state.action_tx.send(Action::Navigate(route));
                }
            }
        },
        Route::ServiceDetail(_) => {
            if let Some(target) = state.inspect_selected_pod() {
                let _ = internal_tx.send(InternalAction::LoadPod(target));
            }
        }
        Route::ElasticScaling => {
            // Pickers select by moving
        }
    }
}

fn handle_internal(
    state: &mut AppState,
    backends: &Backends,
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
    internal: InternalAction,
) {
    let cluster = &backends.cluster;

    match internal {
        InternalAction::LoadDashboard => {
            let backend = Arc::clone(cluster);
            spawn_request(
                internal_tx,
                "load cluster overview",
                async move { backend.cluster_overview().await },
                InternalAction::OverviewLoaded,
            );
            let backend = Arc::clone(cluster);
            spawn_request(
                internal_tx,
                "load namespaces",
                async move { backend.namespaces().await },
                InternalAction::NamespacesLoaded,
            );
        }

        InternalAction::LoadDeployments(namespace) => {
            let backend = Arc::clone(cluster);
            spawn_request(
                internal_tx,
                "load deployments",
                async move {
                    let deployments = backend.deployments(&namespace).await?;
                    Ok::<_, ApiError>((namespace, deployments))
                },
                |(namespace, deployments)| InternalAction::DeploymentsLoaded(namespace, deployments),
            );
        }

        InternalAction::LoadServiceDetail(props) => {
            let backend = Arc::clone(cluster);
            spawn_request(
                internal_tx,
                "load service detail",
                async move {
                    let namespace = props.namespace.as_str();
                    let (deployments, pods, services) = tokio::try_join!(
                        backend.deployments(namespace),
                        backend.pods(namespace),
                        backend.services(namespace),
                    )?;
                    Ok::<_, ApiError>(Box::new(ServiceDetailPayload {
                        props,
                        deployments,
                        pods,
                        services,
                    }))
                },
                InternalAction::ServiceDetailLoaded,
            );
        }

        InternalAction::LoadPod(target) => {
            let backend = Arc::clone(cluster);
            let (namespace, pod) = (target.namespace.clone(), target.pod.clone());
            spawn_request(
                internal_tx,
                "load pod details",
                async move { backend.pod_detail(&namespace, &pod).await },
                InternalAction::PodDetailLoaded,
            );
            let backend = Arc::clone(cluster);
            let (namespace, pod) = (target.namespace.clone(), target.pod.clone());
            spawn_request(
                internal_tx,
                "load pod containers",
                async move {
                    let containers = backend.pod_containers(&namespace, &pod).await?;
                    Ok::<_, ApiError>((pod, containers))
                },
                |(pod, containers)| InternalAction::PodContainersLoaded(pod, containers),
            );
            let _ = internal_tx.send(InternalAction::LoadPodLogs(target.clone()));
            let _ = internal_tx.send(InternalAction::LoadPodMetrics(target));
        }

        InternalAction::LoadPodLogs(target) => {
            let backend = Arc::clone(cluster);
            spawn_request(
                internal_tx,
                "load pod logs",
                async move {
                    let logs = backend
                        .pod_logs(
                            &target.namespace,
                            &target.pod,
                            target.container.as_deref(),
                            DEFAULT_LOG_LINES,
                        )
                        .await?;
                    Ok::<_, ApiError>((target, logs))
                },
                |(target, logs)| InternalAction::PodLogsLoaded(target, logs),
            );
        }

        InternalAction::LoadPodMetrics(target) => {
            if let Some(client) = backends.http.clone() {
                spawn_request(
                    internal_tx,
                    "load pod metrics",
                    async move { client.pod_metrics(&target.namespace, &target.pod).await },
                    InternalAction::PodMetricsLoaded,
                );
            }
        }

        InternalAction::LoadScalingCatalog => {
            if let Some(client) = backends.http.clone() {
                spawn_request(
                    internal_tx,
                    "load evaluation options",
                    async move {
                        tokio::try_join!(client.benchmarks(), client.scalers(), client.workloads())
                    },
                    |(benchmarks, scalers, workloads)| {
                        InternalAction::CatalogLoaded(benchmarks, scalers, workloads)
                    },
                );
            }
        }

        InternalAction::PollEvaluation => {
            if let Some(client) = backends.http.clone() {
                spawn_request(
                    internal_tx,
                    "fetch evaluation status",
                    async move { client.evaluation_status().await },
                    InternalAction::EvaluationStatusLoaded,
                );
            }
        }

        InternalAction::Scale(request) => {
            tracing::info!(
                namespace = %request.namespace,
                deployment = %request.deployment,
                replicas = request.replicas,
                "scaling deployment"
            );
            let backend = Arc::clone(cluster);
            spawn_request(
                internal_tx,
                "scale deployment",
                async move {
                    backend
                        .scale_deployment(&request.namespace, &request.deployment, request.replicas)
                        .await
                },
                InternalAction::OperationDone,
            );
        }

        InternalAction::Restart(namespace, deployment) => {
            tracing::info!(%namespace, %deployment, "restarting deployment");
            let backend = Arc::clone(cluster);
            spawn_request(
                internal_tx,
                "restart deployment",
                async move { backend.restart_deployment(&namespace, &deployment).await },
                InternalAction::OperationDone,
            );
        }

        InternalAction::Evaluate(command) => {
            let Some(client) = backends.http.clone() else {
                state.show_error("ElasticScaling needs the HTTP backend".to_string());
                return;
            };
            let what = match &command {
                EvaluationCommand::Prepare(_) => "prepare environment",
                EvaluationCommand::Start(_) => "start evaluation",
                EvaluationCommand::Stop => "stop evaluation",
                EvaluationCommand::Reset => "reset environment",
            };
            tracing::info!(command = what, "evaluation command");
            spawn_request(
                internal_tx,
                what,
                async move {
                    match command {
                        EvaluationCommand::Prepare(request) => client.prepare_environment(&request).await,
                        EvaluationCommand::Start(request) => client.start_evaluation(&request).await,
                        EvaluationCommand::Stop => client.stop_evaluation().await,
                        EvaluationCommand::Reset => client.reset_environment().await,
                    }
                },
                InternalAction::OperationDone,
            );
        }

        InternalAction::OverviewLoaded(overview) => {
            state.dashboard.overview = Some(overview);
        }

        InternalAction::NamespacesLoaded(namespaces) => {
            if let Some(namespace) = state.set_namespaces(namespaces) {
                let _ = internal_tx.send(InternalAction::LoadDeployments(namespace));
            }
        }

        InternalAction::DeploymentsLoaded(namespace, deployments) => {
            state.set_deployments(&namespace, deployments);
        }

        InternalAction::ServiceDetailLoaded(payload) => {
            let ServiceDetailPayload {
                props,
                deployments,
                pods,
                services,
            } = *payload;
            state.set_service_detail(props, deployments, pods, services);
        }

        InternalAction::PodDetailLoaded(detail) => {
            state.set_pod_detail(detail);
        }

        InternalAction::PodContainersLoaded(pod, containers) => {
            state.set_pod_containers(&pod, containers);
        }

        InternalAction::PodLogsLoaded(target, logs) => {
            state.set_pod_logs(&target, logs);
        }

        InternalAction::PodMetricsLoaded(metrics) => {
            state.set_pod_metrics(metrics);
        }

        InternalAction::CatalogLoaded(benchmarks, scalers, workloads) => {
            state.set_catalog(benchmarks, scalers, workloads);
        }

        InternalAction::EvaluationStatusLoaded(status) => {
            state.scaling.status = Some(status);
        }

        InternalAction::OperationDone(message) => {
            state.show_notice(message);
            load_route(state, internal_tx, false);
        }

        InternalAction::Error(msg) => {
            state.show_error(msg);
        }
    }
}

/// Run a backend request off the UI loop and report back as an internal action
fn spawn_request<T, F, M>(
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
    what: &'static str,
    request: F,
    on_success: M,
) where
    T: Send + 'static,
    F: Future<Output = std::result::Result<T, ApiError>> + Send + 'static,
    M: FnOnce(T) -> InternalAction + Send + 'static,
{
    let tx = internal_tx.clone();
    tokio::spawn(async move {
        let message = match request.await {
            Ok(value) => on_success(value),
            Err(e) => {
                tracing::warn!(error = %e, "failed to {}", what);
                InternalAction::Error(format!("Failed to {}: {}", what, e))
            }
        };
        let _ = tx.send(message);
    });
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.terminal()
        .draw(|frame| kubedash_tui::render(frame, state))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_settings() -> Settings {
        Settings::from_toml("[backend]\nurl = \"http://from-file:10001\"").unwrap()
    }

    #[test]
    fn test_backend_url_precedence() {
        // The only test that touches this variable
        unsafe { std::env::set_var("KUBEDASH_BACKEND_URL", "http://from-env:10001") };
        let env = Args::try_parse_from(["kubedash"]);
        let cli = Args::try_parse_from(["kubedash", "--backend-url", "http://from-cli:10001"]);
        unsafe { std::env::remove_var("KUBEDASH_BACKEND_URL") };
        let neither = Args::try_parse_from(["kubedash"]).unwrap();

        let url = |args: Args| file_settings().with_overrides(args.overrides()).backend.url;
        assert_eq!(url(cli.unwrap()), "http://from-cli:10001");
        assert_eq!(url(env.unwrap()), "http://from-env:10001");
        assert_eq!(url(neither), "http://from-file:10001");
    }

    #[test]
    fn test_path_and_direct_flags() {
        let args =
            Args::try_parse_from(["kubedash", "/ElasticScaling", "--direct", "--context", "kind"])
                .unwrap();
        let settings = file_settings().with_overrides(args.overrides());
        assert_eq!(settings.ui.start_path, "/ElasticScaling");
        assert_eq!(settings.backend.mode, BackendMode::Direct);
        assert_eq!(settings.backend.context.as_deref(), Some("kind"));

        assert!(Args::try_parse_from(["kubedash", "--context", "kind"]).is_err());
    }
}
