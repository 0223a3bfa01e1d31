//! Global UI state container and its mutations

use kubedash_types::TabDescriptor;

use super::Route;

/// Sidebar and tab bar state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabState {
    /// Sidebar collapsed to icons
    pub is_collapse: bool,
    /// Open tabs in insertion order, unique by name
    pub tabs_list: Vec<TabDescriptor>,
}

impl Default for TabState {
    fn default() -> Self {
        Self {
            is_collapse: false,
            tabs_list: vec![Route::KubernetesDashboard.tab()],
        }
    }
}

/// Named mutations accepted by [`Store::commit`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    CollapseChange,
    MenuChange(TabDescriptor),
    CloseTag(TabDescriptor),
}

/// The single UI store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Store {
    tab: TabState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation
    pub fn commit(&mut self, mutation: Mutation) {
        tracing::trace!(?mutation, "store commit");
        match mutation {
            Mutation::CollapseChange => self.collapse_change(),
            Mutation::MenuChange(item) => self.menu_change(item),
            Mutation::CloseTag(item) => self.close_tag(&item),
        }
    }

    /// Toggle the sidebar collapse flag
    pub fn collapse_change(&mut self) {
        self.tab.is_collapse = !self.tab.is_collapse;
    }

    /// Open a tab unless one with the same name is already open
    pub fn menu_change(&mut self, item: TabDescriptor) {
        if !self.tab.tabs_list.iter().any(|tab| tab.name == item.name) {
            self.tab.tabs_list.push(item);
        }
    }

    /// Close the first tab sharing the item's name, if any
    pub fn close_tag(&mut self, item: &TabDescriptor) {
        if let Some(index) = self.tab.tabs_list.iter().position(|tab| tab.name == item.name) {
            self.tab.tabs_list.remove(index);
        }
    }

    pub fn is_collapse(&self) -> bool {
        self.tab.is_collapse
    }

    pub fn tabs(&self) -> &[TabDescriptor] {
        &self.tab.tabs_list
    }

    /// Position of the tab with this name
    pub fn tab_index(&self, name: &str) -> Option<usize> {
        self.tab.tabs_list.iter().position(|tab| tab.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(name: &str) -> TabDescriptor {
        TabDescriptor::new(format!("/{}", name), name, name)
    }

    #[test]
    fn test_initial_state() {
        let store = Store::new();
        assert!(!store.is_collapse());
        assert_eq!(
            store.tabs(),
            &[TabDescriptor::new(
                "/KubernetesDashboard",
                "KubernetesDashboard",
                "Kubernetes Dashboard"
            )]
        );
    }

    #[test]
    fn test_collapse_change_twice_restores() {
        let mut store = Store::new();
        store.collapse_change();
        assert!(store.is_collapse());
        store.collapse_change();
        assert!(!store.is_collapse());
    }

    #[test]
    fn test_menu_change_is_idempotent_by_name() {
        let mut store = Store::new();
        store.menu_change(tab("ElasticScaling"));
        store.menu_change(tab("ElasticScaling"));

        let mut other_path = tab("ElasticScaling");
        other_path.path = "/elsewhere".to_string();
        store.menu_change(other_path);

        let matching: Vec<_> = store
            .tabs()
            .iter()
            .filter(|t| t.name == "ElasticScaling")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].path, "/ElasticScaling");
        assert_eq!(store.tabs().len(), 2);
    }

    #[test]
    fn test_close_tag_removes_first_match_only() {
        let mut store = Store::new();
        store.menu_change(tab("ElasticScaling"));
        store.menu_change(tab("ServiceDetail"));

        store.close_tag(&tab("ElasticScaling"));
        let names: Vec<_> = store.tabs().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["KubernetesDashboard", "ServiceDetail"]);
    }

    #[test]
    fn test_close_tag_absent_is_noop() {
        let mut store = Store::new();
        let before = store.clone();
        store.close_tag(&tab("Missing"));
        assert_eq!(store, before);
    }

    #[test]
    fn test_commit_dispatches() {
        let mut store = Store::new();
        store.commit(Mutation::CollapseChange);
        store.commit(Mutation::MenuChange(Route::ElasticScaling.tab()));
        store.commit(Mutation::CloseTag(Route::KubernetesDashboard.tab()));

        assert!(store.is_collapse());
        assert_eq!(store.tab_index("ElasticScaling"), Some(0));
        assert_eq!(store.tabs().len(), 1);
    }
}
