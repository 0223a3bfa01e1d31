use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::{Route, menu};
use crate::ui::Theme;

/// Left-hand menu; shows icons only when collapsed
pub struct Sidebar<'a> {
    active: &'a Route,
    collapsed: bool,
}

impl<'a> Sidebar<'a> {
    pub fn new(active: &'a Route, collapsed: bool) -> Self {
        Self { active, collapsed }
    }

    fn icon(route: &Route) -> &'static str {
        match route {
            Route::ElasticScaling => "⇅",
            _ => "☸",
        }
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let active_root = self.active.menu_root();

        let mut lines = Vec::new();
        for (i, route) in menu().iter().enumerate() {
            let style = if *route == active_root {
                Theme::menu_item_active()
            } else {
                Theme::text()
            };
            let text = if self.collapsed {
                format!(" {}", Self::icon(route))
            } else {
                format!(" {} {} [{}]", Self::icon(route), route.title(), i + 1)
            };
            lines.push(Line::from(Span::styled(text, style)));
            lines.push(Line::from(""));
        }

        let title = if self.collapsed { "" } else { " kubedash " };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(title, Theme::title()));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(route: &Route, collapsed: bool, width: u16) -> String {
        let area = Rect::new(0, 0, width, 8);
        let mut buf = Buffer::empty(area);
        Sidebar::new(route, collapsed).render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_expanded_shows_titles() {
        let text = rendered(&Route::service_detail("a", "b"), false, 30);
        assert!(text.contains("Kubernetes Dashboard"));
        assert!(text.contains("ElasticScaling"));
    }

    #[test]
    fn test_collapsed_hides_titles() {
        let text = rendered(&Route::ElasticScaling, true, 5);
        assert!(!text.contains("Elastic"));
        assert!(text.contains('⇅'));
    }
}
