mod help_overlay;
mod list_selector;
mod scale_prompt;
mod sidebar;
mod status_bar;
mod tab_bar;

pub use help_overlay::HelpOverlay;
pub use list_selector::{ListSelector, ListSelectorExt};
pub use scale_prompt::ScalePromptPopup;
pub use sidebar::Sidebar;
pub use status_bar::{StatusBar, route_hints};
pub use tab_bar::TabBar;
