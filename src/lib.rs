pub mod app;
pub mod cache;
pub mod config;
pub mod console;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod mutation;
pub mod queries;
pub mod session;
pub mod ui;
