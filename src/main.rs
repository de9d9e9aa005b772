//! selgrab CLI entry point

use std::process::ExitCode;

use clap::Parser;

use selgrab::cli::{
    config_cmd::handle_config_command, load_merged_config, run_capture, run_get, run_paste,
    run_set, run_watch, Cli, Commands, Presenter, RunOptions, EXIT_ERROR, EXIT_USAGE_ERROR,
};
use selgrab::domain::config::AppConfig;
use selgrab::infrastructure::{init_tracing, XdgConfigStore};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Config management doesn't need the merged config
    if let Some(Commands::Config { action }) = cli.command {
        init_tracing(AppConfig::defaults().log_level_or_default(), cli.verbose);
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        timeout: cli.timeout.clone(),
        keystroke_tool: cli.keystroke_tool.clone(),
        ..AppConfig::empty()
    };

    // Merge config
    let config = load_merged_config(cli_config).await;
    init_tracing(config.log_level_or_default(), cli.verbose);

    let options = match RunOptions::from_config(&config) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    // Route to appropriate handler
    match cli.command {
        None => run_capture(options, cli.json).await,
        Some(Commands::Get) => run_get(options).await,
        Some(Commands::Set { text }) => run_set(options, &text).await,
        Some(Commands::Paste { text }) => run_paste(options, &text).await,
        Some(Commands::Watch) => run_watch(options).await,
        Some(Commands::Config { .. }) => ExitCode::SUCCESS,
    }
}
