mod app;
mod console;
mod logging;
mod persistence;

pub use app::run_app;
