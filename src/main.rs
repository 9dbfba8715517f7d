use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ripped::cli::{parse_args, Cli, Command};
use ripped::logging::{ConsoleSink, LogSink};
use ripped::{exit, menu, Config, Converter, Downloader};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let default_directive = if cli.verbose { "ripped=debug" } else { "ripped=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load();
    let sink = ConsoleSink;

    // No arguments or an explicit "menu" token enters interactive mode.
    if cli.args.is_empty() || (cli.args.len() == 1 && cli.args[0].eq_ignore_ascii_case("menu")) {
        return ExitCode::from(menu::run_menu(&config).await);
    }

    let command = match parse_args(&cli.args) {
        Ok(command) => command,
        Err(err) => {
            sink.error(&err.to_string());
            return ExitCode::from(exit::USER_ERROR);
        }
    };

    let code = match command {
        Command::Convert { path } => {
            Converter::new(&config)
                .run_bulk_conversion(&path, &sink)
                .await
        }
        Command::Download { mode, quality, url } => {
            Downloader::new(&config)
                .perform_download(mode, quality, &url, &sink)
                .await
        }
    };

    ExitCode::from(code)
}
