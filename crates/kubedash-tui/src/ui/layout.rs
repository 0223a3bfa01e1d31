use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Sidebar width when expanded
pub const SIDEBAR_WIDTH: u16 = 30;
/// Sidebar width when collapsed to icons
pub const SIDEBAR_COLLAPSED_WIDTH: u16 = 5;

/// Regions of the application frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shell {
    pub sidebar: Rect,
    pub header: Rect,
    pub tabs: Rect,
    pub content: Rect,
    pub status: Rect,
}

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Sidebar on the left; header, tabs, content and status bar on the right
    pub fn shell(area: Rect, collapsed: bool) -> Shell {
        let sidebar_width = if collapsed {
            SIDEBAR_COLLAPSED_WIDTH
        } else {
            SIDEBAR_WIDTH
        };

        let columns = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(1)])
            .split(area);

        let rows = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(1), // Tabs
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(columns[1]);

        Shell {
            sidebar: columns[0],
            header: rows[0],
            tabs: rows[1],
            content: rows[2],
            status: rows[3],
        }
    }

    /// Split horizontally by percentages
    pub fn columns<const N: usize>(area: Rect, percents: [u16; N]) -> [Rect; N] {
        RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints(percents.map(Constraint::Percentage))
            .areas(area)
    }

    /// Fixed-size popup centered in `area`, clamped to fit
    pub fn popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidebar_width_follows_collapse() {
        let area = Rect::new(0, 0, 120, 40);
        let expanded = Layout::shell(area, false);
        let collapsed = Layout::shell(area, true);

        assert_eq!(expanded.sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(collapsed.sidebar.width, SIDEBAR_COLLAPSED_WIDTH);
        assert_eq!(collapsed.content.width, 120 - SIDEBAR_COLLAPSED_WIDTH);
        assert_eq!(expanded.status.height, 1);
        assert_eq!(expanded.content.height, 40 - 5);
    }

    #[test]
    fn test_popup_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(Layout::popup(area, 40, 10), Rect::new(30, 10, 40, 10));

        let small = Rect::new(0, 0, 20, 8);
        let popup = Layout::popup(small, 40, 10);
        assert_eq!(popup.width, 16);
        assert_eq!(popup.height, 4);
    }
}
