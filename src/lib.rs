pub mod commands;
pub mod config;
pub mod llm;
pub mod logging;
pub mod palette;
pub mod quiz;
pub mod server;
pub mod tui;
pub mod utils;
