use std::io::{self, Write};

use allprs::{GitHub, parse_args, resolve_token, run};
use anyhow::Context;
use tracing::info;

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn list_all() -> anyhow::Result<()> {
    let mut config = match parse_args(std::env::args()) {
        Ok(config) => config,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    // colored checks for a terminal and honours NO_COLOR / CLICOLOR.
    config.display.styled = colored::control::SHOULD_COLORIZE.should_colorize();

    dotenvy::dotenv().ok();
    let token = resolve_token(config.token.take());
    let forge = GitHub::new(token.as_ref())?;

    let mut out = io::stdout().lock();
    let summary = run(&forge, &config, &mut out)
        .await
        .with_context(|| format!("Failed to list pull requests for '{}'", config.account))?;
    out.flush()?;

    info!(
        repositories = summary.repositories,
        shown = summary.repositories_shown,
        displayed = summary.displayed,
        stop = ?summary.stop,
        "done"
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = list_all().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
