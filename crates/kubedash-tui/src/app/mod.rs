//! Application state, routing and actions

mod action;
mod router;
mod state;
mod store;

pub use action::Action;
pub use router::{
    DEFAULT_PATH, ROUTES, ResolvedRoute, Route, RouteError, RouteRecord, Router, ServiceProps,
};
pub use state::{
    AppState, DashboardData, DashboardPane, HISTORY_LIMIT, PodTarget, ScalePrompt, ScaleRequest,
    ScalingData, ScalingPicker, ServiceDetailData, UiState, menu,
};
pub use store::{Mutation, Store, TabState};
