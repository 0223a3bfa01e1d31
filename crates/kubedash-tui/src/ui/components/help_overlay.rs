use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::popup(frame.area(), 56, 35);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Layout"),
            Self::key_line("1 / 2", "Kubernetes Dashboard / ElasticScaling"),
            Self::key_line("] / Tab", "Next tab"),
            Self::key_line("[", "Previous tab"),
            Self::key_line("x", "Close tab"),
            Self::key_line("b", "Collapse sidebar"),
            Self::key_line("F5", "Refresh"),
            Line::from(""),
            Self::section("Lists"),
            Self::key_line("j/↓ k/↑", "Move selection"),
            Self::key_line("h/l", "Switch pane or picker"),
            Self::key_line("Enter", "Open"),
            Line::from(""),
            Self::section("Deployments"),
            Self::key_line("+ / -", "Scale by one replica"),
            Self::key_line("S", "Set replica count"),
            Self::key_line("r", "Rolling restart"),
            Self::key_line("n", "Next container's logs (pod view)"),
            Line::from(""),
            Self::section("ElasticScaling"),
            Self::key_line("p", "Prepare environment"),
            Self::key_line("e", "Start evaluation"),
            Self::key_line("d", "Cycle load distribution"),
            Self::key_line("s", "Stop evaluation"),
            Self::key_line("c", "Reset environment"),
            Line::from(""),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("Esc", "Dismiss error / go back"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(title: &str) -> Line<'_> {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
