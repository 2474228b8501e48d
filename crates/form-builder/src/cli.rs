use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use crate::cmd::{self, check::CheckArgs, visibility::VisibilityArgs};
use crate::config::AppConfig;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "form-builder",
    about = "Check entered values against dynamic form schemas",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// TOML config file (defaults to $FORM_BUILDER_CONFIG)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit values against a schema and report the verdict
    Check(CheckArgs),
    /// Show which fields are visible for the given values
    Visibility(VisibilityArgs),
    /// Print the built-in fallback schema
    FallbackSchema,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init(config.log_level(cli.log_level.as_deref())?);

    match cli.command {
        Commands::Check(args) => {
            let report = cmd::check::run(&args, &config)?;
            if !report.submitted {
                bail!(
                    "form rejected with {} error(s)",
                    report.verdict.errors.len()
                );
            }
            Ok(())
        }
        Commands::Visibility(args) => cmd::visibility::run(&args).map(|_| ()),
        Commands::FallbackSchema => cmd::fallback::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::PolicyArg;

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::try_parse_from([
            "form-builder",
            "--log-level",
            "debug",
            "check",
            "--schema",
            "schema.json",
            "--data",
            "values.json",
            "--policy",
            "visible-only",
            "--json",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.schema, PathBuf::from("schema.json"));
                assert_eq!(args.data, Some(PathBuf::from("values.json")));
                assert_eq!(args.policy, Some(PolicyArg::VisibleOnly));
                assert!(args.json);
                assert!(!args.fallback);
            }
            _ => panic!("expected check args"),
        }
    }

    #[test]
    fn global_config_flag_follows_subcommand() {
        let cli = Cli::try_parse_from([
            "form-builder",
            "visibility",
            "--schema",
            "schema.json",
            "--config",
            "form-builder.toml",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.config, Some(PathBuf::from("form-builder.toml")));
        assert!(matches!(cli.command, Commands::Visibility(_)));
    }

    #[test]
    fn policy_accepts_snake_case_alias() {
        let cli = Cli::try_parse_from([
            "form-builder",
            "check",
            "--schema",
            "s.json",
            "--policy",
            "visible_only",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Check(args) => assert_eq!(args.policy, Some(PolicyArg::VisibleOnly)),
            _ => panic!("expected check args"),
        }
    }

    #[test]
    fn check_requires_schema() {
        assert!(Cli::try_parse_from(["form-builder", "check"]).is_err());
    }
}
