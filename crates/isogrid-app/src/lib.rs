//! Isogrid Application
//!
//! Headless shell around the canvas engine: file-backed storage per user,
//! document import/export, input replay and help output.

mod app;
mod cli;
mod shortcuts;

pub use app::{App, AppConfig, AppError, Summary};
pub use cli::{Cli, Command, run};
pub use shortcuts::{Shortcut, ShortcutRegistry};
