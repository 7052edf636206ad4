mod nearby;
mod stats;
mod sync;

use clap::{Parser, Subcommand};
use sosmap_core::FacilityCategory;

#[derive(Debug, Parser)]
#[command(name = "sosmap-cli")]
#[command(about = "Emergency-services map data tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sync facility data from the public feeds into the database.
    Sync {
        /// Limit the sync to one category (emergency, pharmacy,
        /// animal-hospital, aed). Default: all.
        #[arg(long)]
        category: Option<FacilityCategory>,
    },
    /// List stored facilities near a coordinate, closest first.
    Nearby {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        /// Search radius in kilometres (inclusive boundary).
        #[arg(long, default_value_t = 3.0)]
        radius_km: f64,
        #[arg(long)]
        category: Option<FacilityCategory>,
        /// Keep only facilities open (or closing soon) right now.
        #[arg(long)]
        open_now: bool,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show per-category row counts.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = sosmap_core::load_app_config()?;

    match cli.command {
        Commands::Sync { category } => sync::run(&config, category).await,
        Commands::Nearby {
            lat,
            lng,
            radius_km,
            category,
            open_now,
            limit,
        } => {
            nearby::run(
                &config,
                nearby::NearbyArgs {
                    lat,
                    lng,
                    radius_km,
                    category,
                    open_now,
                    limit,
                },
            )
            .await
        }
        Commands::Stats => stats::run(&config).await,
    }
}
