use crate::app::Route;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Navigate(Route),
    /// Open the n-th sidebar menu entry
    MenuSelect(usize),
    GoBack,
    Quit,

    // Tabs
    NextTab,
    PrevTab,
    CloseTab,

    // UI toggles
    ToggleSidebar,
    ToggleHelp,

    // List navigation
    ListUp,
    ListDown,
    ListSelect,
    FocusNext,
    FocusPrev,

    // Data
    Refresh,

    // Deployment operations
    ScaleUp,
    ScaleDown,
    OpenScalePrompt,
    ScaleInput(char),
    ScaleBackspace,
    ScaleConfirm,
    ScaleCancel,
    RestartDeployment,
    /// Show logs of the open pod's next container
    NextContainer,

    // Elastic scaling
    PrepareEnvironment,
    StartEvaluation,
    StopEvaluation,
    ResetEnvironment,
    CycleLoadDistribution,

    // Render request (terminal resized)
    Render,
}
