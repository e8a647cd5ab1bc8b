#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dragsort_runtime::ReorderConfig;

use crate::error::{DemoError, Result};
use crate::logging::{LogFormat, init_tracing};
use crate::report::Report;
use crate::scenario::{FramesArgs, ListArgs, ValuesArgs, run_frames, run_list, run_values};

#[derive(Debug, Parser)]
#[command(
    name = "dragsort-demo",
    about = "Headless drag-to-reorder scenarios against an in-memory backend",
    version
)]
pub struct Cli {
    /// Reorder config file (.toml or .json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Format of the log stream on stderr.
    #[arg(long = "log-format", value_enum, global = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reorder the seeded company values by drag and keyboard.
    Values(ValuesArgs),

    /// Drag one item in a numbered list and persist the result.
    List(ListArgs),

    /// Sample per-item render frames while a drop settles.
    Frames(FramesArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let report = execute(&cli)?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

/// Run the selected scenario without printing.
pub fn execute(cli: &Cli) -> Result<Report> {
    let config = load_config(cli.config.as_deref())?;
    tracing::info!(
        target: "dragsort.demo",
        item_height = config.item_height,
        stiffness = config.motion.stiffness,
        "config loaded"
    );
    match &cli.command {
        Commands::Values(args) => run_values(&config, args).map(Report::Scenario),
        Commands::List(args) => run_list(&config, args).map(Report::Scenario),
        Commands::Frames(args) => run_frames(&config, args).map(Report::Frames),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ReorderConfig> {
    let Some(path) = path else {
        return Ok(ReorderConfig::default());
    };
    if !path.exists() {
        return Err(DemoError::MissingConfig {
            path: path.to_path_buf(),
        });
    }
    Ok(ReorderConfig::load(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::DragSpec;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dragsort-demo",
            "list",
            "--items",
            "4",
            "--drag",
            "1:-40",
            "--json",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.items, 4);
        assert_eq!(
            args.drag,
            DragSpec {
                from: 1,
                delta_px: -40.0
            }
        );
        assert!(!args.fail_persist);
    }

    #[test]
    fn drag_is_required_for_list() {
        assert!(Cli::try_parse_from(["dragsort-demo", "list"]).is_err());
        assert!(Cli::try_parse_from(["dragsort-demo", "list", "--drag", "oops"]).is_err());
    }

    #[test]
    fn frames_defaults() {
        let cli = Cli::try_parse_from(["dragsort-demo", "frames", "--drag", "0:90"]).unwrap();
        let Commands::Frames(args) = cli.command else {
            panic!("expected frames");
        };
        assert_eq!(args.items, 5);
        assert_eq!(args.frames, 12);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(cli.config.is_none());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_config(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, DemoError::MissingConfig { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn values_command_dispatches_successfully() {
        let result = run(Cli {
            config: None,
            json: false,
            log_format: LogFormat::Text,
            command: Commands::Values(ValuesArgs::default()),
        });
        assert!(result.is_ok());
    }
}
