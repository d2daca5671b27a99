//! Point d'entrée CLI pour farm-monitor

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use farm_monitor::Config;

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Suivi d'indices de végétation pour une ferme
#[derive(Parser)]
#[command(name = "farm-monitor")]
#[command(author, version)]
#[command(about = "Suivi NDVI/EVI d'une ferme à partir de son contour KML")]
#[command(long_about = "Résout le contour de la ferme depuis un fichier KML, génère des séries d'indices de végétation, les stocke en SQLite et les sert en HTTP.\n\nPar défaut, démarre le service HTTP.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: serve)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let config = Config::from_env();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            database,
        }) => {
            cli::cmd_serve(config, host, port, database).await?;
        }
        Some(Commands::Geometry {
            boundary,
            format,
            output,
        }) => {
            info!(boundary = ?boundary, format = ?format, "Resolving boundary");
            cli::cmd_geometry(config, boundary, format, output.as_deref())?;
        }
        Some(Commands::Process {
            start,
            end,
            variables,
            boundary,
            database,
        }) => {
            info!(start = %start, end = %end, variables = ?variables, "Processing farm");
            cli::cmd_process(config, &start, &end, &variables, boundary, database)?;
        }
        None => {
            cli::cmd_serve(config, None, None, None).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
