use ratatui::{
    Frame,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::ScalePrompt;
use crate::ui::{Layout, Theme};

/// Popup asking for a replica count
pub struct ScalePromptPopup;

impl ScalePromptPopup {
    pub fn render(frame: &mut Frame, prompt: &ScalePrompt) {
        let area = Layout::popup(frame.area(), 48, 7);
        frame.render_widget(Clear, area);

        let lines = vec![
            Line::from(vec![
                Span::styled("Deployment ", Theme::text_dim()),
                Span::styled(
                    format!("{}/{}", prompt.namespace, prompt.deployment),
                    Theme::text_highlight(),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Replicas: ", Theme::label()),
                Span::styled(format!("{}▏", prompt.input), Theme::text()),
            ]),
            Line::from(""),
            Line::from(Span::styled("[Enter] apply  [Esc] cancel", Theme::text_dim())),
        ];

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(" Scale ", Theme::title())),
        );
        frame.render_widget(widget, area);
    }
}
