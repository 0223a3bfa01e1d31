//! TUI components for kubedash
//!
//! This crate provides the terminal user interface for kubedash: the route
//! table, the tab/sidebar store, application state, keybindings, event
//! handling and the screens.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{
    Action, AppState, Mutation, PodTarget, Route, RouteError, Router, ScaleRequest, ServiceProps,
    Store, UiState,
};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::{Layout, Theme, render};
