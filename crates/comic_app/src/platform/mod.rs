mod app;
mod cli;
mod config;
mod effects;
mod picker;
mod renderer;

pub use app::run_app;
