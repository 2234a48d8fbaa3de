use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::Settings;

/// Books Store API command line
#[derive(Parser, Debug)]
#[command(name = "shelf-cli", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply the database schema and exit
    Migrate,
    /// Print the merged OpenAPI document
    Openapi {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;

    match cli.command {
        Command::Serve => shelf_app::bootstrap::serve(settings).await,
        Command::Migrate => {
            shelf_telemetry::init(&settings.telemetry)?;
            shelf_app::bootstrap::migrate(&settings).await?;
            tracing::info!("migrations complete");
            Ok(())
        }
        Command::Openapi { pretty } => {
            let document = shelf_app::bootstrap::openapi(&settings)?;
            let rendered = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{rendered}");
            Ok(())
        }
    }
}
