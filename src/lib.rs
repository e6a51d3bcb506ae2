// Library surface for headless/integration tests and reuse.
// main.rs only owns terminal setup and the CLI.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod logging;
pub mod render;
pub mod runtime;
pub mod session;
pub mod source;
pub mod stats;
pub mod ui;
