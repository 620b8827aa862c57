pub mod api;
pub mod app;
pub mod config;
pub mod context;
pub mod event;
pub mod kata;
pub mod logging;
pub mod nav;
pub mod reactive;
pub mod resource;
pub mod store;
pub mod theme_store;
pub mod ui;
pub mod workspace;
