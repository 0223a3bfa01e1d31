use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Tabs, Widget},
};

use kubedash_types::TabDescriptor;

use crate::ui::Theme;

/// Open tabs with the active one highlighted
pub struct TabBar<'a> {
    tabs: &'a [TabDescriptor],
    active: Option<usize>,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [TabDescriptor], active: Option<usize>) -> Self {
        Self { tabs, active }
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let titles = self
            .tabs
            .iter()
            .map(|tab| Span::styled(format!(" {} ", tab.label), Theme::tab()));

        // An out-of-range index leaves every tab unhighlighted
        Tabs::new(titles)
            .select(self.active.unwrap_or(usize::MAX))
            .highlight_style(Theme::tab_active())
            .divider(Span::styled("│", Theme::text_dim()))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn tabs() -> Vec<TabDescriptor> {
        vec![
            TabDescriptor::new("/KubernetesDashboard", "KubernetesDashboard", "Kubernetes Dashboard"),
            TabDescriptor::new("/ElasticScaling", "ElasticScaling", "ElasticScaling"),
        ]
    }

    fn draw(tabs: &[TabDescriptor], active: Option<usize>) -> Buffer {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        TabBar::new(tabs, active).render(area, &mut buf);
        buf
    }

    /// Cell position where `label` starts
    fn cell_of(buf: &Buffer, label: &str) -> usize {
        let symbols: Vec<&str> = buf.content().iter().map(|cell| cell.symbol()).collect();
        (0..symbols.len())
            .find(|&i| symbols[i..].iter().take(label.len()).copied().collect::<String>() == label)
            .unwrap()
    }

    fn is_active(buf: &Buffer, label: &str) -> bool {
        let cell = &buf.content()[cell_of(buf, label)];
        cell.style().fg == Theme::tab_active().fg && cell.modifier.contains(Modifier::BOLD)
    }

    #[test]
    fn test_renders_labels_in_order() {
        let buf = draw(&tabs(), Some(1));
        assert!(cell_of(&buf, "Kubernetes Dashboard") < cell_of(&buf, "ElasticScaling"));
    }

    #[test]
    fn test_only_active_tab_is_highlighted() {
        let buf = draw(&tabs(), Some(1));
        assert!(is_active(&buf, "ElasticScaling"));
        assert!(!is_active(&buf, "Kubernetes Dashboard"));
        let inactive = &buf.content()[cell_of(&buf, "Kubernetes Dashboard")];
        assert_eq!(inactive.style().fg, Theme::tab().fg);
    }

    #[test]
    fn test_no_active_tab() {
        let buf = draw(&tabs(), None);
        assert!(!is_active(&buf, "ElasticScaling"));
        assert!(!is_active(&buf, "Kubernetes Dashboard"));
    }
}
