pub mod app;
pub mod types;
pub mod ui;
pub mod ws;
