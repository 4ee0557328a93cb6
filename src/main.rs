use anyhow::Result;
use clap::Parser;
use home_library::cli::{ConnectionArgs, LibraryCommand, LibraryContext};
use home_library::cli_style::{get_styles, print_error};
use std::process::ExitCode;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(styles = get_styles(), version = env!("APP_VERSION"), about)]
struct CliArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: LibraryCommand,
}

async fn run(cli_args: CliArgs) -> Result<()> {
    let config = cli_args.connection.resolve()?;
    debug!(?config, "Resolved configuration");

    let context = LibraryContext::from_config(&config)?;
    context.execute(cli_args.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    // Warnings only by default, the command output is what the user wants.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();

    match run(cli_args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
