use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use kubedash_types::{EvaluationResults, EvaluationStatus};

use crate::{
    app::{AppState, ScalingPicker},
    ui::{
        Layout, Theme,
        components::{ListSelector, ListSelectorExt},
    },
};

/// Autoscaler evaluation: pick a benchmark, a scaler and a workload, then run
pub struct ElasticScalingScreen;

impl ElasticScalingScreen {
    pub fn render(frame: &mut Frame, area: Rect, state: &mut AppState) {
        if !state.http_backend {
            Self::render_unavailable(frame, area);
            return;
        }

        let [pickers_area, selection_area, progress_area, output_area] = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),
                Constraint::Length(4),
                Constraint::Length(5),
                Constraint::Min(3),
            ])
            .areas(area);

        Self::render_pickers(frame, pickers_area, state);
        Self::render_selection(frame, selection_area, state);

        let status = state.scaling.status.as_ref();
        Self::render_progress(frame, progress_area, status);

        let [logs_area, results_area] = Layout::columns(output_area, [65, 35]);
        Self::render_logs(frame, logs_area, status);
        Self::render_results(frame, results_area, status.and_then(|s| s.results.as_ref()));
    }

    fn render_unavailable(frame: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(Span::styled(
                "ElasticScaling needs the kubedash HTTP backend.",
                Theme::text_highlight(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Restart without --direct (or set backend.mode = \"http\") to evaluate autoscalers.",
                Theme::text_dim(),
            )),
        ];
        let widget = Paragraph::new(text).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" ElasticScaling ", Theme::title())),
        );
        frame.render_widget(widget, area);
    }

    fn render_pickers(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let [benchmark_area, scaler_area, workload_area] = Layout::columns(area, [34, 33, 33]);
        let focus = state.ui_state.scaling_focus;
        let empty = if state.scaling.catalog_loaded {
            "None available"
        } else {
            "Loading..."
        };

        let benchmarks = state
            .scaling
            .benchmarks
            .iter()
            .map(|b| (b.display_name.clone(), false));
        let selector = ListSelector::new("Benchmark")
            .items(benchmarks)
            .focused(focus == ScalingPicker::Benchmark)
            .empty_text(empty);
        frame.render_list_selector(benchmark_area, selector, &mut state.ui_state.benchmark_list);

        let scalers = state
            .scaling
            .scalers
            .iter()
            .map(|s| (format!("{} ({})", s.display_name, s.kind), false));
        let selector = ListSelector::new("Scaler")
            .items(scalers)
            .focused(focus == ScalingPicker::Scaler)
            .empty_text(empty);
        frame.render_list_selector(scaler_area, selector, &mut state.ui_state.scaler_list);

        let workloads = state
            .scaling
            .catalog
            .workloads
            .iter()
            .map(|w| (w.display_name.clone(), false));
        let selector = ListSelector::new("Workload")
            .items(workloads)
            .focused(focus == ScalingPicker::Workload)
            .empty_text(empty);
        frame.render_list_selector(workload_area, selector, &mut state.ui_state.workload_list);
    }

    fn render_selection(frame: &mut Frame, area: Rect, state: &AppState) {
        let description = match state.ui_state.scaling_focus {
            ScalingPicker::Benchmark => state.selected_benchmark().map(|b| {
                format!("{} (namespace {}, SLA {} ms)", b.description, b.namespace, b.sla)
            }),
            ScalingPicker::Scaler => state.selected_scaler().map(|s| s.description.clone()),
            ScalingPicker::Workload => state.selected_workload().map(|w| w.description.clone()),
        };

        let load_dist = match state.selected_load_distribution() {
            Some(dist) => Span::styled(dist.label.clone(), Theme::text_highlight()),
            None => Span::styled("n/a", Theme::text_dim()),
        };

        let lines = vec![
            Line::from(Span::styled(description.unwrap_or_default(), Theme::text())),
            Line::from(vec![
                Span::styled("Load distribution ", Theme::label()),
                load_dist,
                Span::styled("  [d] change", Theme::text_dim()),
            ]),
        ];

        let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Theme::border()),
        );
        frame.render_widget(widget, area);
    }

    fn render_progress(frame: &mut Frame, area: Rect, status: Option<&EvaluationStatus>) {
        let [info_area, gauge_area] = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(3)])
            .areas(area);

        let info = match status {
            Some(status) => Line::from(vec![
                Span::styled("Status ", Theme::label()),
                Span::styled(status.status.as_str(), Style::default().fg(status.status.color())),
                Span::styled("   Stage ", Theme::label()),
                Span::styled(status.stage.as_str(), Theme::text()),
                Span::styled("   ", Theme::text()),
                Span::styled(status.current_step.clone(), Theme::text_highlight()),
            ]),
            None => Line::from(Span::styled("Waiting for status...", Theme::text_dim())),
        };
        frame.render_widget(Paragraph::new(info), info_area);

        let ratio = status.map(EvaluationStatus::ratio).unwrap_or(0.0);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_style(Theme::border()))
            .gauge_style(Theme::gauge())
            .ratio(ratio)
            .label(format!("{:.0}%", ratio * 100.0));
        frame.render_widget(gauge, gauge_area);
    }

    fn render_logs(frame: &mut Frame, area: Rect, status: Option<&EvaluationStatus>) {
        let visible = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = status
            .map(|s| {
                let skip = s.logs.len().saturating_sub(visible);
                s.logs
                    .iter()
                    .skip(skip)
                    .map(|log| {
                        Line::from(vec![
                            Span::styled(format!("{} ", log.timestamp), Theme::text_dim()),
                            Span::styled(log.message.clone(), Style::default().fg(log.level.color())),
                        ])
                    })
                    .collect()
            })
            .unwrap_or_default();

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Log ", Theme::title())),
        );
        frame.render_widget(widget, area);
    }

    fn render_results(frame: &mut Frame, area: Rect, results: Option<&EvaluationResults>) {
        let lines = match results {
            Some(results) => {
                let metric = |name: &'static str, value: String| {
                    Line::from(vec![
                        Span::styled(format!("{:<16}", name), Theme::label()),
                        Span::styled(value, Theme::text_highlight()),
                    ])
                };
                // rates arrive as fractions
                vec![
                    metric("SLO violations", format!("{:.1}%", results.slo_violation_rate * 100.0)),
                    metric("Success rate", format!("{:.1}%", results.success_rate * 100.0)),
                    metric("CPU usage", format!("{:.3}", results.cpu_usage)),
                    metric("Memory usage", format!("{:.3} MB", results.memory_usage)),
                ]
            }
            None => vec![Line::from(Span::styled(
                "Results appear when an evaluation completes",
                Theme::text_dim(),
            ))],
        };

        let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Results ", Theme::title())),
        );
        frame.render_widget(widget, area);
    }
}
