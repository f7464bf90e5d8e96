pub mod types;
pub mod config;
pub mod store;
pub mod color;
pub mod scale;
pub mod classify;
pub mod legend;
pub mod view;
pub mod server;
pub mod export;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the atlas offline and write one JSON file per mode
    Export {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Single mode to export; all modes when omitted
        #[arg(short, long, value_name = "MODE")]
        mode: Option<String>,
        #[arg(short, long, value_name = "DIR", default_value = "export")]
        out: PathBuf,
    },
    /// Serve the atlas document and classification API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Export { config, mode, out } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let (countries, languages) = store::load_atlas(&app_config)?;

            let modes = match mode {
                Some(name) => vec![name.parse::<classify::Mode>()?],
                None => classify::Mode::all(),
            };

            export::export_classifications(&countries, &languages, &modes, out)?;
            println!("Export complete!");
        }
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;

            // A store failure here is fatal: we never serve partial data
            let (countries, languages) = store::load_atlas(&app_config)?;

            server::start_server(app_config, countries, languages).await?;
        }
    }

    Ok(())
}
