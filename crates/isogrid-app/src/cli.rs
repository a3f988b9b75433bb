//! Command-line surface.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use isogrid_core::{EngineConfig, InputEvent};

use crate::app::{App, AppConfig, AppError};
use crate::shortcuts::ShortcutRegistry;

#[derive(Parser, Debug)]
#[command(name = "isogrid", version, about = "Inspect, export, import and replay Isogrid canvases")]
pub struct Cli {
    /// Directory holding stored canvases.
    #[arg(long, env = "ISOGRID_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Read and write payloads as plain JSON instead of base64.
    #[arg(long, global = true)]
    pub plain: bool,

    /// Engine configuration overrides (JSON).
    #[arg(long, env = "ISOGRID_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List users with a stored canvas.
    Users,
    /// Summarize a user's canvas.
    Inspect { user: String },
    /// Print a user's canvas as an exported document.
    Export {
        user: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace a user's canvas with an exported document.
    Import { user: String, file: PathBuf },
    /// Feed a JSON array of input events to a user's canvas.
    Replay {
        user: String,
        events: PathBuf,
        /// Write the result back to storage.
        #[arg(long)]
        save: bool,
    },
    /// Remove a user's stored canvas.
    Delete { user: String },
    /// Print keyboard shortcuts.
    Shortcuts,
}

impl Cli {
    pub fn app_config(&self) -> Result<AppConfig, AppError> {
        let engine = match &self.config {
            Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
            None => EngineConfig::default(),
        };
        Ok(AppConfig {
            data_dir: self.data_dir.clone(),
            plain: self.plain,
            engine,
        })
    }
}

/// Run `cli`, returning what should be printed on stdout.
pub fn run(cli: Cli) -> Result<String, AppError> {
    if let Command::Shortcuts = cli.command {
        return Ok(ShortcutRegistry::describe());
    }

    let app = App::open(cli.app_config()?)?;
    match cli.command {
        Command::Users => Ok(app.users()?.join("\n")),
        Command::Inspect { user } => Ok(app.inspect(&user)?.to_string()),
        Command::Export { user, output } => {
            let document = app.export(&user)?;
            match output {
                Some(path) => {
                    fs::write(&path, &document)?;
                    Ok(format!("exported {user} to {}", path.display()))
                }
                None => Ok(document),
            }
        }
        Command::Import { user, file } => {
            let document = fs::read_to_string(file)?;
            Ok(app.import(&user, &document)?.to_string())
        }
        Command::Replay { user, events, save } => {
            let events: Vec<InputEvent> = serde_json::from_str(&fs::read_to_string(events)?)?;
            Ok(app.replay(&user, &events, save)?.to_string())
        }
        Command::Delete { user } => {
            app.delete(&user)?;
            Ok(format!("deleted canvas of {user}"))
        }
        Command::Shortcuts => Ok(ShortcutRegistry::describe()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(dir: &tempfile::TempDir, args: &[&str]) -> Cli {
        let mut argv = vec!["isogrid", "--data-dir", dir.path().to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = cli(&dir, &["export", "ann", "--plain", "-o", "out.json"]);
        assert!(parsed.plain);
        assert!(matches!(parsed.command, Command::Export { ref user, output: Some(_) } if user == "ann"));
    }

    #[test]
    fn test_replay_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("events.json");
        fs::write(
            &events,
            r#"[
                {"type":"pointerDown","position":{"x":100,"y":100},"button":"right"},
                {"type":"pointerUp","position":{"x":100,"y":100},"button":"right"}
            ]"#,
        )
        .unwrap();

        let events_arg = events.to_str().unwrap().to_string();
        let out = run(cli(&dir, &["replay", "ann", &events_arg, "--save"])).unwrap();
        assert!(out.contains("canvas of ann"));
        assert!(matches!(
            run(cli(&dir, &["export", "ann"])),
            Err(AppError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_import_reports_summary() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.json");
        fs::write(
            &doc,
            r#"{"items":[{"id":"t","type":"text","position":{"x":0,"y":0},"width":250,"height":100,"content":"hi","parentId":null}],"arrows":[]}"#,
        )
        .unwrap();
        let doc_arg = doc.to_str().unwrap().to_string();
        let out = run(cli(&dir, &["import", "ann", &doc_arg])).unwrap();
        assert!(out.contains("items:  1"));
        assert_eq!(run(cli(&dir, &["users"])).unwrap(), "ann");
        assert!(run(cli(&dir, &["export", "ann"])).unwrap().contains("\"hi\""));
    }

    #[test]
    fn test_bad_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        fs::write(&config, "{ nope").unwrap();
        let config_arg = config.to_str().unwrap().to_string();
        assert!(matches!(
            run(cli(&dir, &["--config", &config_arg, "users"])),
            Err(AppError::Json(_))
        ));
    }
}
