use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use kubedash_types::ClusterOverview;

use crate::{
    app::{AppState, DashboardPane},
    ui::{
        Layout, Theme,
        components::{ListSelector, ListSelectorExt},
    },
};

/// Cluster overview, namespaces and their deployments
pub struct KubernetesDashboardScreen;

impl KubernetesDashboardScreen {
    pub fn render(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let [overview_area, body_area] = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(3)])
            .areas(area);

        Self::render_overview(frame, overview_area, state.dashboard.overview.as_ref());

        let [namespace_area, deployment_area] = Layout::columns(body_area, [25, 75]);
        Self::render_namespaces(frame, namespace_area, state);
        Self::render_deployments(frame, deployment_area, state);
    }

    fn render_overview(frame: &mut Frame, area: Rect, overview: Option<&ClusterOverview>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Cluster ", Theme::title()));

        let Some(overview) = overview else {
            let loading = Paragraph::new(Span::styled("Loading cluster overview...", Theme::text_dim()))
                .block(block);
            frame.render_widget(loading, area);
            return;
        };

        let nodes_style = if overview.nodes.ready == overview.nodes.total {
            Theme::success()
        } else {
            Style::default().fg(Theme::WARNING)
        };

        let counts = Line::from(vec![
            Span::styled("Nodes ", Theme::label()),
            Span::styled(
                format!("{}/{} ready", overview.nodes.ready, overview.nodes.total),
                nodes_style,
            ),
            Span::styled("   Namespaces ", Theme::label()),
            Span::styled(overview.namespaces.to_string(), Theme::text_highlight()),
            Span::styled("   Pods ", Theme::label()),
            Span::styled(overview.resources.pods.to_string(), Theme::text_highlight()),
            Span::styled("   Deployments ", Theme::label()),
            Span::styled(overview.resources.deployments.to_string(), Theme::text_highlight()),
            Span::styled("   Services ", Theme::label()),
            Span::styled(overview.resources.services.to_string(), Theme::text_highlight()),
        ]);

        let mut phases = vec![Span::styled("Pod phases ", Theme::label())];
        for (name, count, color) in overview.pod_status.entries() {
            phases.push(Span::styled(format!("{} ", name), Theme::text_dim()));
            phases.push(Span::styled(format!("{}   ", count), Style::default().fg(color)));
        }

        frame.render_widget(
            Paragraph::new(vec![counts, Line::from(""), Line::from(phases)]).block(block),
            area,
        );
    }

    fn render_namespaces(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let current = state.dashboard.selected_namespace.as_deref();
        let items: Vec<(String, bool)> = state
            .dashboard
            .namespaces
            .iter()
            .map(|ns| (ns.clone(), Some(ns.as_str()) == current))
            .collect();

        let selector = ListSelector::new(format!("Namespaces ({})", items.len()))
            .items(items)
            .focused(state.ui_state.dashboard_focus == DashboardPane::Namespaces);

        frame.render_list_selector(area, selector, &mut state.ui_state.namespace_list);
    }

    fn render_deployments(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let focused = state.ui_state.dashboard_focus == DashboardPane::Deployments;
        let namespace = state
            .dashboard
            .selected_namespace
            .as_deref()
            .unwrap_or("-");

        let header = Row::new(["Name", "Status", "Replicas", "Uptime"]).style(Theme::table_header());

        let rows = state.dashboard.deployments.iter().map(|deploy| {
            let status_style = if deploy.is_healthy() {
                Theme::success()
            } else {
                Style::default().fg(Theme::WARNING)
            };
            Row::new([
                Cell::from(deploy.name.clone()),
                Cell::from(Span::styled(deploy.status.clone(), status_style)),
                Cell::from(deploy.replica_status()),
                Cell::from(deploy.uptime.clone()),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(40),
                Constraint::Percentage(25),
                Constraint::Percentage(15),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::pane_border(focused))
                .title(Span::styled(
                    format!(" Deployments in {} ({}) ", namespace, state.dashboard.deployments.len()),
                    Theme::title(),
                )),
        )
        .row_highlight_style(if focused {
            Theme::list_item_selected()
        } else {
            Theme::text_highlight()
        })
        .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut state.ui_state.deployment_table);
    }
}
