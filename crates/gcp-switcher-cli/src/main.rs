// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use gcp_switcher_app::{Model, StateMachine};
use gcp_switcher_gcloud::Gcloud;
use gcp_switcher_tui::{RunOptions, Theme};
use runtime::GcloudRuntime;
use std::env;
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.show_version {
        print!("{}", version_text());
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    if options.print_state_graph {
        print!("{}", StateMachine::to_dot());
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `gcp-switcher --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let log_path = config.log_path();
    let _log_guard = logging::init(options.debug, &log_path)
        .with_context(|| format!("open debug log {}", log_path.display()))?;

    let timeouts = config.timeouts()?;
    let gcloud = Gcloud::new(config.gcloud_binary(), timeouts)
        .with_application_default_login(config.application_default_login());
    tracing::debug!(
        binary = gcloud.binary(),
        config = %options.config_path.display(),
        "starting"
    );

    let run_options = RunOptions {
        fallback_timeout: config.fallback_timeout()?,
        theme: Theme::default(),
    };
    let mut model = Model::new();
    gcp_switcher_tui::run_app(&mut model, GcloudRuntime::new(gcloud), run_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    debug: bool,
    print_config_path: bool,
    print_example: bool,
    print_state_graph: bool,
    show_version: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        debug: false,
        print_config_path: false,
        print_example: false,
        print_state_graph: false,
        show_version: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--debug" => {
                options.debug = true;
            }
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--print-state-graph" => {
                options.print_state_graph = true;
            }
            "--version" => {
                options.show_version = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn version_text() -> String {
    let commit = option_env!("GCP_SWITCHER_COMMIT").unwrap_or("unknown");
    let built = option_env!("GCP_SWITCHER_BUILD_DATE").unwrap_or("unknown");
    format!("GCP Switcher {VERSION}\ncommit: {commit}\nbuilt at: {built}\n")
}

fn print_help() {
    println!("gcp-switcher: switch the active gcloud account and project");
    println!("  --debug                  Write a debug log (see [log].path)");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --print-state-graph      Print the screen state machine as Graphviz DOT");
    println!("  --version                Show version and build information");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args, version_text};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/gcp-switcher-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                debug: false,
                print_config_path: false,
                print_example: false,
                print_state_graph: false,
                show_version: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_debug_and_print_flags() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--debug",
                "--print-config-path",
                "--print-example-config",
                "--print-state-graph",
            ],
            default_options_path(),
        )?;
        assert!(options.debug);
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.print_state_graph);
        assert!(!options.show_version);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn version_text_lists_version_commit_and_build_date() -> Result<()> {
        let options = parse_cli_args(vec!["--version"], default_options_path())?;
        assert!(options.show_version);

        let text = version_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("GCP Switcher "));
        assert!(lines[1].starts_with("commit: "));
        assert!(lines[2].starts_with("built at: "));
        Ok(())
    }
}
