pub mod components;
mod layout;
pub mod screens;
mod theme;

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub use layout::{Layout, SIDEBAR_COLLAPSED_WIDTH, SIDEBAR_WIDTH, Shell};
pub use theme::Theme;

use crate::app::{AppState, Route};
use components::{HelpOverlay, ScalePromptPopup, Sidebar, StatusBar, TabBar, route_hints};
use screens::{ElasticScalingScreen, KubernetesDashboardScreen, ServiceDetailScreen};

/// Draw the whole application frame
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let shell = Layout::shell(frame.area(), state.store.is_collapse());

    frame.render_widget(Sidebar::new(&state.route, state.store.is_collapse()), shell.sidebar);
    render_header(frame, shell.header, state);
    frame.render_widget(
        TabBar::new(state.store.tabs(), state.active_tab_index()),
        shell.tabs,
    );

    match state.route.clone() {
        Route::KubernetesDashboard => KubernetesDashboardScreen::render(frame, shell.content, state),
        Route::ElasticScaling => ElasticScalingScreen::render(frame, shell.content, state),
        Route::ServiceDetail(props) => {
            ServiceDetailScreen::render(frame, shell.content, &props, state)
        }
    }

    let status = StatusBar::new()
        .hints(route_hints(&state.route, &state.ui_state))
        .messages(&state.ui_state)
        .right(state.route.path());
    frame.render_widget(status, shell.status);

    if let Some(prompt) = &state.ui_state.scale_prompt {
        ScalePromptPopup::render(frame, prompt);
    }

    if state.ui_state.help_visible {
        HelpOverlay::render(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::styled("kubedash", Theme::title()),
        Span::styled(" │ ", Theme::text_dim()),
        Span::styled(state.backend_label.as_str(), Theme::text()),
        Span::styled(" │ ", Theme::text_dim()),
        Span::styled(state.route.title(), Theme::text_highlight()),
    ];
    if let Some(props) = state.route.props() {
        spans.push(Span::styled(" │ ", Theme::text_dim()));
        spans.push(Span::styled(
            format!("{}/{}", props.namespace, props.service_name),
            Theme::text(),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );
    frame.render_widget(header, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubedash_types::{
        ClusterOverview, DeploymentInfo, EvaluationStatus, NodeCounts, PodInfo, PodMetrics,
        RunStatus,
    };
    use std::collections::HashMap;
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    fn draw(state: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn state() -> AppState {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(tx);
        state.backend_label = "http://127.0.0.1:10001".to_string();
        state
    }

    #[test]
    fn test_dashboard_renders_overview_and_deployments() {
        let mut state = state();
        state.dashboard.overview = Some(ClusterOverview {
            nodes: NodeCounts { total: 3, ready: 3 },
            ..Default::default()
        });
        state.set_namespaces(vec!["default".to_string()]);
        state.set_deployments("default", vec![DeploymentInfo::new("frontend")]);

        let screen = draw(&mut state);
        assert!(screen.contains("3/3 ready"));
        assert!(screen.contains("frontend"));
        assert!(screen.contains("Kubernetes Dashboard"));
        assert!(screen.contains("127.0.0.1:10001"));
    }

    #[test]
    fn test_service_detail_renders_pods() {
        let mut state = state();
        let route = Route::service_detail("shop", "carts");
        state.navigate(route.clone());
        let props = route.props().cloned().unwrap();
        state.set_service_detail(props, Vec::new(), vec![PodInfo::new("carts-1")], Vec::new());

        let screen = draw(&mut state);
        assert!(screen.contains("Pods Details"));
        assert!(screen.contains("carts-1"));
        assert!(screen.contains("No deployment with this name"));
    }

    #[test]
    fn test_service_detail_renders_pod_logs_and_metrics() {
        let mut state = state();
        let route = Route::service_detail("sockshop", "carts");
        state.navigate(route.clone());
        let props = route.props().cloned().unwrap();
        state.set_service_detail(
            props,
            Vec::new(),
            vec![PodInfo::new("carts-7d9c5f-abcde")],
            Vec::new(),
        );
        let target = state.inspect_selected_pod().unwrap();
        state.set_pod_logs(&target, "GET /carts 200\nGET /carts/1 404".to_string());
        state.set_pod_metrics(PodMetrics {
            pod: "carts-7d9c5f-abcde".to_string(),
            metrics: HashMap::from([("cpu_usage".to_string(), vec![10.0, 42.5])]),
            ..Default::default()
        });

        let screen = draw(&mut state);
        assert!(screen.contains("GET /carts/1 404"));
        assert!(screen.contains("42.50 m"));
        assert!(screen.contains("Latency p90"));

        state.http_backend = false;
        let screen = draw(&mut state);
        assert!(screen.contains("Needs the HTTP backend"));
    }

    #[test]
    fn test_elastic_scaling_states() {
        let mut state = state();
        state.navigate(Route::ElasticScaling);
        state.scaling.status = Some(EvaluationStatus {
            status: RunStatus::Running,
            current_step: "Generating load".to_string(),
            progress: 40.0,
            ..Default::default()
        });
        let screen = draw(&mut state);
        assert!(screen.contains("running"));
        assert!(screen.contains("Generating load"));
        assert!(screen.contains("40%"));

        state.http_backend = false;
        let screen = draw(&mut state);
        assert!(screen.contains("needs the kubedash HTTP backend"));
    }

    #[test]
    fn test_overlays() {
        let mut state = state();
        state.ui_state.help_visible = true;
        state.ui_state.error_message = Some("connection refused".to_string());
        let screen = draw(&mut state);
        assert!(screen.contains("Keybindings"));
        assert!(screen.contains("connection refused"));
    }
}
