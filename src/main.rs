use cashbook::args::{Args, Command};
use cashbook::{commands, Config, Result};
use chrono::Utc;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().cashbook_home().path();
    let now = Utc::now();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::Add(add_args) => commands::add(Config::load(home).await?, add_args, now)
            .await?
            .print(),

        Command::Edit(edit_args) => commands::edit(Config::load(home).await?, edit_args, now)
            .await?
            .print(),

        Command::Delete(delete_args) => {
            commands::delete(Config::load(home).await?, delete_args, now)
                .await?
                .print()
        }

        Command::Summary(range_args) => {
            commands::summary(Config::load(home).await?, range_args, now)
                .await?
                .print()
        }

        Command::Export(export_args) => {
            commands::export(Config::load(home).await?, export_args, now)
                .await?
                .print()
        }

        Command::History(history_args) => {
            commands::history(Config::load(home).await?, history_args, now)
                .await?
                .print()
        }

        Command::Categories(categories_args) => {
            commands::categories(Config::load(home).await?, categories_args)
                .await?
                .print()
        }

        Command::Config(config_args) => {
            commands::settings(Config::load(home).await?, config_args)
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // Without RUST_LOG, only this crate logs, at the requested level.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
