//! CLI entry point - the composition root.
//!
//! Logging and configuration are set up here, the engine is composed via
//! bootstrap and commands are dispatched to handlers.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use dlpro_cli::handlers::{convert, download, paths, provision};
use dlpro_cli::{Cli, CliConfig, CliError, Commands, bootstrap};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig {
        bin_dir: cli.bin_dir,
        no_self_check: cli.no_self_check,
    };
    let mut ctx = bootstrap(&config)?;

    match command {
        Commands::Provision { json } => provision::execute(&ctx, json).await?,
        Commands::Download {
            url,
            kind,
            format,
            out_dir,
            cookies_from_browser,
            cookies,
        } => {
            // Start provisioning while the request is being prepared.
            let _ = ctx.provisioning().warm_up();
            let args = download::DownloadArgs {
                url,
                kind,
                format,
                out_dir,
                cookies_from_browser,
                cookies,
            };
            download::execute(&mut ctx, args, cli.verbose).await?;
        }
        Commands::Convert {
            input,
            output,
            profile,
            extra_args,
        } => {
            let _ = ctx.provisioning().warm_up();
            let args = convert::ConvertArgs {
                input,
                output,
                profile,
                extra_args,
            };
            convert::execute(&mut ctx, args, cli.verbose).await?;
        }
        Commands::Paths => paths::execute(&ctx),
    }

    ctx.orchestrator.cancel_all();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            match err.downcast_ref::<CliError>() {
                Some(CliError::Cancelled) => eprintln!("Cancelled"),
                _ => eprintln!("Error: {err:#}"),
            }
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
