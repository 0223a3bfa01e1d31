use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::{Action, Route};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Dashboard,
    ServiceDetail,
    ElasticScaling,
    ScalePrompt,
}

impl KeyContext {
    /// Bindings that apply while `route` is displayed
    pub fn for_route(route: &Route) -> Self {
        match route {
            Route::KubernetesDashboard => Self::Dashboard,
            Route::ElasticScaling => Self::ElasticScaling,
            Route::ServiceDetail(_) => Self::ServiceDetail,
        }
    }
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::GoBack);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('b')), Action::ToggleSidebar);
        global.insert(KeyBinding::new(KeyCode::Char('1')), Action::MenuSelect(0));
        global.insert(KeyBinding::new(KeyCode::Char('2')), Action::MenuSelect(1));
        global.insert(KeyBinding::new(KeyCode::Char(']')), Action::NextTab);
        global.insert(KeyBinding::new(KeyCode::Char('[')), Action::PrevTab);
        global.insert(KeyBinding::new(KeyCode::Tab), Action::NextTab);
        global.insert(KeyBinding::shift(KeyCode::BackTab), Action::PrevTab);
        global.insert(KeyBinding::new(KeyCode::Char('x')), Action::CloseTab);
        global.insert(KeyBinding::new(KeyCode::F(5)), Action::Refresh);
        global.insert(KeyBinding::ctrl(KeyCode::Char('r')), Action::Refresh);
        global.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        global.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        global.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        global.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        bindings.insert(KeyContext::Global, global);

        // Deployment operations, shared by the dashboard and the detail view
        let mut deployment_ops = HashMap::new();
        deployment_ops.insert(KeyBinding::new(KeyCode::Enter), Action::ListSelect);
        deployment_ops.insert(KeyBinding::new(KeyCode::Char('+')), Action::ScaleUp);
        deployment_ops.insert(KeyBinding::shift(KeyCode::Char('+')), Action::ScaleUp);
        deployment_ops.insert(KeyBinding::new(KeyCode::Char('=')), Action::ScaleUp);
        deployment_ops.insert(KeyBinding::new(KeyCode::Char('-')), Action::ScaleDown);
        deployment_ops.insert(KeyBinding::shift(KeyCode::Char('S')), Action::OpenScalePrompt);
        deployment_ops.insert(KeyBinding::new(KeyCode::Char('r')), Action::RestartDeployment);

        let mut dashboard = deployment_ops.clone();
        dashboard.insert(KeyBinding::new(KeyCode::Char('h')), Action::FocusPrev);
        dashboard.insert(KeyBinding::new(KeyCode::Left), Action::FocusPrev);
        dashboard.insert(KeyBinding::new(KeyCode::Char('l')), Action::FocusNext);
        dashboard.insert(KeyBinding::new(KeyCode::Right), Action::FocusNext);
        bindings.insert(KeyContext::Dashboard, dashboard);

        let mut detail = deployment_ops;
        detail.insert(KeyBinding::new(KeyCode::Char('n')), Action::NextContainer);
        bindings.insert(KeyContext::ServiceDetail, detail);

        // Elastic scaling bindings
        let mut scaling = HashMap::new();
        scaling.insert(KeyBinding::new(KeyCode::Char('h')), Action::FocusPrev);
        scaling.insert(KeyBinding::new(KeyCode::Left), Action::FocusPrev);
        scaling.insert(KeyBinding::new(KeyCode::Char('l')), Action::FocusNext);
        scaling.insert(KeyBinding::new(KeyCode::Right), Action::FocusNext);
        scaling.insert(KeyBinding::new(KeyCode::Char('p')), Action::PrepareEnvironment);
        scaling.insert(KeyBinding::new(KeyCode::Char('e')), Action::StartEvaluation);
        scaling.insert(KeyBinding::new(KeyCode::Char('s')), Action::StopEvaluation);
        scaling.insert(KeyBinding::new(KeyCode::Char('c')), Action::ResetEnvironment);
        scaling.insert(KeyBinding::new(KeyCode::Char('d')), Action::CycleLoadDistribution);
        bindings.insert(KeyContext::ElasticScaling, scaling);

        // Replica prompt bindings
        let mut prompt = HashMap::new();
        prompt.insert(KeyBinding::new(KeyCode::Enter), Action::ScaleConfirm);
        prompt.insert(KeyBinding::new(KeyCode::Esc), Action::ScaleCancel);
        prompt.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::ScaleCancel);
        prompt.insert(KeyBinding::new(KeyCode::Backspace), Action::ScaleBackspace);
        bindings.insert(KeyContext::ScalePrompt, prompt);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(context_bindings) = self.bindings.get(&context) {
            if let Some(action) = context_bindings.get(&binding) {
                return Some(action.clone());
            }
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event while the replica prompt is open
    /// Returns Some(Action) for special keys and digits, None otherwise
    pub fn get_scale_prompt_action(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(prompt_bindings) = self.bindings.get(&KeyContext::ScalePrompt) {
            if let Some(action) = prompt_bindings.get(&binding) {
                return Some(action.clone());
            }
        }

        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() && key.modifiers.is_empty() => {
                Some(Action::ScaleInput(c))
            }
            _ => None,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_context_bindings_shadow_global() {
        let keys = KeyBindings::new();
        assert_eq!(
            keys.get_action(KeyContext::Dashboard, &key(KeyCode::Enter)),
            Some(Action::ListSelect)
        );
        assert_eq!(
            keys.get_action(KeyContext::ElasticScaling, &key(KeyCode::Char('s'))),
            Some(Action::StopEvaluation)
        );
        assert_eq!(
            keys.get_action(KeyContext::ElasticScaling, &key(KeyCode::Enter)),
            None
        );
        assert_eq!(
            keys.get_action(KeyContext::ServiceDetail, &key(KeyCode::Char('n'))),
            Some(Action::NextContainer)
        );
        assert_eq!(
            keys.get_action(KeyContext::Dashboard, &key(KeyCode::Char('n'))),
            None
        );
    }

    #[test]
    fn test_global_fallback() {
        let keys = KeyBindings::new();
        for context in [
            KeyContext::Dashboard,
            KeyContext::ServiceDetail,
            KeyContext::ElasticScaling,
        ] {
            assert_eq!(
                keys.get_action(context.clone(), &key(KeyCode::Char('b'))),
                Some(Action::ToggleSidebar)
            );
            assert_eq!(
                keys.get_action(context, &key(KeyCode::Char('j'))),
                Some(Action::ListDown)
            );
        }
        assert_eq!(
            keys.get_action(
                KeyContext::Dashboard,
                &KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_scale_shortcuts() {
        let keys = KeyBindings::new();
        let prompt = KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT);
        assert_eq!(
            keys.get_action(KeyContext::ServiceDetail, &prompt),
            Some(Action::OpenScalePrompt)
        );
        assert_eq!(
            keys.get_action(KeyContext::Dashboard, &key(KeyCode::Char('-'))),
            Some(Action::ScaleDown)
        );
    }

    #[test]
    fn test_scale_prompt_input() {
        let keys = KeyBindings::new();
        assert_eq!(
            keys.get_scale_prompt_action(&key(KeyCode::Char('7'))),
            Some(Action::ScaleInput('7'))
        );
        assert_eq!(keys.get_scale_prompt_action(&key(KeyCode::Char('q'))), None);
        assert_eq!(
            keys.get_scale_prompt_action(&key(KeyCode::Esc)),
            Some(Action::ScaleCancel)
        );
    }

    #[test]
    fn test_context_for_route() {
        assert_eq!(
            KeyContext::for_route(&Route::service_detail("a", "b")),
            KeyContext::ServiceDetail
        );
        assert_eq!(KeyContext::for_route(&Route::default()), KeyContext::Dashboard);
    }
}
