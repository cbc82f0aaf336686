use clap::Parser;
use form_replay::cli::commands::{
    cmd_capture, cmd_delete, cmd_export, cmd_fill, cmd_import, cmd_list, cmd_mode, cmd_reset,
};
use form_replay::cli::config::{Cli, Commands, load_config, resolve_log_filter, resolve_store_path};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // RUST_LOG wins over -v and the config file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(resolve_log_filter(cli.verbose, &config)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = resolve_store_path(&cli, &config);

    match cli.command {
        Commands::Capture { page } => {
            cmd_capture(&store, &page)?;
        }
        Commands::List => cmd_list(&store)?,
        Commands::Fill {
            id,
            page,
            mode,
            output,
        } => {
            cmd_fill(
                &store,
                &id,
                &page,
                mode,
                output.as_deref(),
                config.replay.clone(),
                cli.trace.as_deref(),
            )
            .await?;
        }
        Commands::Delete { id } => {
            cmd_delete(&store, &id)?;
        }
        Commands::Export { output } => {
            cmd_export(&store, output.as_deref())?;
        }
        Commands::Import { file } => {
            cmd_import(&store, &file)?;
        }
        Commands::Mode { mode } => {
            cmd_mode(&store, mode)?;
        }
        Commands::Reset => cmd_reset(&store)?,
    }

    Ok(())
}
