use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::{DashboardPane, Route, UiState};
use crate::ui::Theme;

/// Status bar showing keyboard shortcuts, or the last error or notice
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    message: Option<(String, Style)>,
    right_text: Option<String>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            message: None,
            right_text: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Show the error, or else the notice, in place of the hints
    pub fn messages(mut self, ui_state: &UiState) -> Self {
        self.message = match (&ui_state.error_message, &ui_state.notice) {
            (Some(error), _) => Some((format!("✗ {}  [Esc] dismiss", error), Theme::error())),
            (None, Some(notice)) => Some((format!("✓ {}", notice), Theme::success())),
            (None, None) => None,
        };
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let line = match self.message {
            Some((text, style)) => Line::from(Span::styled(text, style.bg(Color::DarkGray))),
            None => {
                let mut spans = Vec::new();
                for (i, (key, desc)) in self.hints.iter().enumerate() {
                    if i > 0 {
                        spans.push(Span::styled("  ", Theme::status_bar()));
                    }
                    spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
                    spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
                }
                Line::from(spans)
            }
        };
        let line_width = line.width() as u16;

        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        if let Some(right) = self.right_text {
            let width = Line::from(right.as_str()).width() as u16;
            let right_x = area.x + area.width.saturating_sub(width + 2);
            if right_x > area.x + line_width + 2 {
                buf.set_span(right_x, area.y, &Span::styled(&right, Theme::status_bar()), width);
            }
        }
    }
}

/// Hints for the view currently displayed
pub fn route_hints(route: &Route, ui_state: &UiState) -> Vec<(&'static str, &'static str)> {
    let mut hints = match route {
        Route::KubernetesDashboard => match ui_state.dashboard_focus {
            DashboardPane::Namespaces => {
                vec![("↑↓", "Move"), ("Enter", "Namespace"), ("l", "Deployments")]
            }
            DashboardPane::Deployments => vec![
                ("Enter", "Pods"),
                ("+/-", "Scale"),
                ("S", "Set replicas"),
                ("r", "Restart"),
                ("h", "Namespaces"),
            ],
        },
        Route::ServiceDetail(_) => vec![
            ("Enter", "Pod info"),
            ("n", "Container"),
            ("+/-", "Scale"),
            ("S", "Set replicas"),
            ("r", "Restart"),
        ],
        Route::ElasticScaling => vec![
            ("h/l", "Picker"),
            ("p", "Prepare"),
            ("e", "Evaluate"),
            ("s", "Stop"),
            ("c", "Reset"),
        ],
    };
    hints.extend([("x", "Close tab"), ("?", "Help"), ("q", "Quit")]);
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(bar: StatusBar, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_error_replaces_hints() {
        let mut ui_state = UiState::default();
        ui_state.error_message = Some("backend down".to_string());
        ui_state.notice = Some("scaled".to_string());

        let text = rendered(StatusBar::new().hints([("q", "Quit")]).messages(&ui_state), 60);
        assert!(text.contains("backend down"));
        assert!(!text.contains("Quit"));
        assert!(!text.contains("scaled"));
    }

    #[test]
    fn test_hints_and_right_text() {
        let text = rendered(
            StatusBar::new()
                .hints([("q", "Quit")])
                .messages(&UiState::default())
                .right("3 pods"),
            40,
        );
        assert!(text.contains("[q] Quit"));
        assert!(text.contains("3 pods"));
    }

    #[test]
    fn test_route_hints_end_with_globals() {
        let hints = route_hints(&Route::ElasticScaling, &UiState::default());
        assert_eq!(hints.first(), Some(&("h/l", "Picker")));
        assert_eq!(hints.last(), Some(&("q", "Quit")));
    }
}
