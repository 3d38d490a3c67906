use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use tracing::{debug, error};

use bakactl::cli::{self, Cli, CommandError, Context};
use bakactl::config::Config;
use bakactl::theme::ThemeStore;
use bakactl::views;
use client::{BooruClient, LocalStorage, STORAGE_KEY_TOKEN};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return ExitCode::SUCCESS;
    }

    let Some(command) = cli.command.as_ref() else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    match run(&cli, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error executing command: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, command: &cli::Commands) -> Result<(), CommandError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        config.server.url.clone_from(server);
    }
    let _guards = config.init_logger(cli.log_level.as_deref())?;

    let storage = LocalStorage::open(config.storage_path())?;
    let token = storage.get(STORAGE_KEY_TOKEN).map(str::to_string);
    let client = BooruClient::builder()
        .timeout(config.server.timeout)
        .token(token)
        .build(&config.server.url)?;
    debug!("Using backend {}", client.info());

    let theme = ThemeStore::load(&storage);
    let color = !cli.no_color && env::var_os("NO_COLOR").is_none();
    let mut ctx = Context {
        client: Arc::new(client),
        storage,
        theme,
        config,
        color,
    };

    let route = command.route()?;
    let result = cli::execute(&mut ctx, command);
    if let Err(e) = &result {
        if e.is_unauthorized() {
            error!("Request rejected by the backend: login required");
        }
        if let Some(screen) = cli::redirect_on(route, e) {
            views::render(screen, &ctx.client, ctx.palette())?;
        }
    }
    result
}
