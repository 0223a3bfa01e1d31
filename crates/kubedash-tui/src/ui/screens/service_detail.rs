use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use kubedash_types::{POD_METRICS, PodMetrics};

use crate::{
    app::{AppState, ServiceProps},
    ui::{Layout, Theme},
};

/// Pods, deployment and service behind one service name
pub struct ServiceDetailScreen;

impl ServiceDetailScreen {
    pub fn render(frame: &mut Frame, area: Rect, props: &ServiceProps, state: &mut AppState) {
        let [summary_area, body_area] = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(3)])
            .areas(area);

        Self::render_summary(frame, summary_area, props, state);

        let [pods_area, pod_area] = Layout::columns(body_area, [62, 38]);
        Self::render_pods(frame, pods_area, state);

        let [detail_area, metrics_area, logs_area] = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),
                Constraint::Length(POD_METRICS.len() as u16 + 2),
                Constraint::Min(3),
            ])
            .areas(pod_area);
        Self::render_pod_detail(frame, detail_area, state);
        Self::render_pod_metrics(frame, metrics_area, state);
        Self::render_pod_logs(frame, logs_area, state);
    }

    fn render_summary(frame: &mut Frame, area: Rect, props: &ServiceProps, state: &AppState) {
        let loaded = state.detail.props.as_ref() == Some(props);

        let deployment_line = match (&state.detail.deployment, loaded) {
            (Some(deploy), _) => Line::from(vec![
                Span::styled("Deployment ", Theme::label()),
                Span::styled(deploy.status.clone(), Theme::text_highlight()),
                Span::styled(
                    format!("  replicas {}  uptime {}", deploy.replica_status(), deploy.uptime),
                    Theme::text(),
                ),
            ]),
            (None, true) => Line::from(Span::styled("No deployment with this name", Theme::text_dim())),
            (None, false) => Line::from(Span::styled("Loading...", Theme::text_dim())),
        };

        let service_line = match &state.detail.service {
            Some(service) => Line::from(vec![
                Span::styled("Service ", Theme::label()),
                Span::styled(
                    service.service_type.clone().unwrap_or_else(|| "-".to_string()),
                    Theme::text_highlight(),
                ),
                Span::styled(
                    format!(
                        "  cluster ip {}  ports {}",
                        service.cluster_ip.as_deref().unwrap_or("-"),
                        service.ports_summary()
                    ),
                    Theme::text(),
                ),
            ]),
            None if loaded => Line::from(Span::styled("No service with this name", Theme::text_dim())),
            None => Line::from(""),
        };

        let external_line = match state.detail.service.as_ref().and_then(|s| s.external_ip.as_deref()) {
            Some(ip) => Line::from(vec![
                Span::styled("External ", Theme::label()),
                Span::styled(ip.to_string(), Theme::text()),
            ]),
            None => Line::from(""),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(
                format!(" {} / {} ", props.namespace, props.service_name),
                Theme::title(),
            ));

        frame.render_widget(
            Paragraph::new(vec![deployment_line, service_line, external_line]).block(block),
            area,
        );
    }

    fn render_pods(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let header = Row::new(["Name", "Status", "IP", "Node", "Restarts", "Age"])
            .style(Theme::table_header());

        let rows = state.detail.pods.iter().map(|pod| {
            Row::new([
                Cell::from(pod.name.clone()),
                Cell::from(Span::styled(
                    pod.status.to_string(),
                    Style::default().fg(pod.status.color()),
                )),
                Cell::from(pod.ip.clone()),
                Cell::from(pod.node.clone()),
                Cell::from(pod.restarts.to_string()),
                Cell::from(pod.age.clone()),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(34),
                Constraint::Percentage(14),
                Constraint::Percentage(16),
                Constraint::Percentage(18),
                Constraint::Percentage(9),
                Constraint::Percentage(9),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(
                    format!(" Pods ({}) ", state.detail.pods.len()),
                    Theme::title(),
                )),
        )
        .row_highlight_style(Theme::list_item_selected())
        .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut state.ui_state.pod_table);
    }

    fn render_pod_detail(frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Pod ", Theme::title()));

        let lines = match &state.detail.pod_detail {
            Some(detail) => {
                let field = |name: &'static str, value: Option<&str>| {
                    Line::from(vec![
                        Span::styled(format!("{:<10}", name), Theme::label()),
                        Span::styled(value.unwrap_or("-").to_string(), Theme::text()),
                    ])
                };
                vec![
                    field("Name", Some(detail.pod_name.as_str())),
                    field("Namespace", Some(detail.namespace.as_str())),
                    field("Created", Some(detail.creation_time.as_str())),
                    field("Status", detail.status.as_deref()),
                    field("Node", detail.node_name.as_deref()),
                    field("Node IP", detail.node_ip.as_deref()),
                    field("Pod IP", detail.pod_ip.as_deref()),
                ]
            }
            None if state.detail.inspected_pod.is_some() => {
                vec![Line::from(Span::styled("Loading...", Theme::text_dim()))]
            }
            None => vec![Line::from(Span::styled(
                "Press Enter on a pod to load its details",
                Theme::text_dim(),
            ))],
        };

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_pod_metrics(frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Metrics (last 5m) ", Theme::title()));

        let lines = if !state.http_backend {
            vec![Line::from(Span::styled(
                "Needs the HTTP backend",
                Theme::text_dim(),
            ))]
        } else if state.detail.inspected_pod.is_none() {
            Vec::new()
        } else {
            match &state.detail.pod_metrics {
                Some(metrics) => metric_lines(metrics),
                None => vec![Line::from(Span::styled("Loading...", Theme::text_dim()))],
            }
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_pod_logs(frame: &mut Frame, area: Rect, state: &AppState) {
        let title = match &state.detail.container {
            Some(container) if state.detail.containers.len() > 1 => format!(
                " Logs: {} ({} containers, n to switch) ",
                container,
                state.detail.containers.len()
            ),
            Some(container) => format!(" Logs: {} ", container),
            None => " Logs ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(title, Theme::title()));

        // Newest lines at the bottom, as many as fit
        let visible = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = match &state.detail.pod_logs {
            Some(logs) if logs.trim().is_empty() => {
                vec![Line::from(Span::styled("No log output", Theme::text_dim()))]
            }
            Some(logs) => {
                let all: Vec<&str> = logs.lines().collect();
                all[all.len().saturating_sub(visible)..]
                    .iter()
                    .map(|line| Line::from(Span::styled(line.to_string(), Theme::text())))
                    .collect()
            }
            None if state.detail.inspected_pod.is_some() => {
                vec![Line::from(Span::styled("Loading...", Theme::text_dim()))]
            }
            None => Vec::new(),
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Latest sample of each series, with the limit next to CPU and memory
fn metric_lines(metrics: &PodMetrics) -> Vec<Line<'static>> {
    let limit = metrics.limit();
    POD_METRICS
        .iter()
        .map(|&(key, label, unit)| {
            let value = match metrics.latest(key) {
                Some(value) => format!("{:.2} {}", value, unit),
                None => "-".to_string(),
            };
            let cap = match key {
                "cpu_usage" => limit.and_then(|l| l.cpu_limit),
                "mem_usage" => limit.and_then(|l| l.mem_limit),
                _ => None,
            };
            let mut spans = vec![
                Span::styled(format!("{:<12}", label), Theme::label()),
                Span::styled(value, Theme::text()),
            ];
            if let Some(cap) = cap {
                spans.push(Span::styled(format!(" / {:.0}", cap), Theme::text_dim()));
            }
            Line::from(spans)
        })
        .collect()
}
