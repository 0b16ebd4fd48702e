//! Atelier CLI: run migrations and inspect projects and lineages.
//!
//! Reads the same environment as the library (`DATABASE_URL`, storage
//! settings). `--user` may be omitted when auth bypass is configured.

use anyhow::Context;
use atelier_cli::{format_size, init_tracing, to_pretty_json};
use atelier_core::{AuthGate, Config};
use atelier_services::{lineage_archive, Services};
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "atelier", about = "Atelier data layer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// List a user's projects with preview images
    Projects {
        /// Acting user UUID
        #[arg(long, value_name = "UUID")]
        user: Option<Uuid>,
    },
    /// Print the derivation graph of a lineage
    Timeline {
        /// Lineage UUID
        #[arg(long, value_name = "UUID")]
        lineage: Uuid,
        /// Acting user UUID
        #[arg(long, value_name = "UUID")]
        user: Option<Uuid>,
    },
    /// Download every stored file of a lineage as a ZIP
    Download {
        /// Lineage UUID
        #[arg(long, value_name = "UUID")]
        lineage: Uuid,
        /// Acting user UUID
        #[arg(long, value_name = "UUID")]
        user: Option<Uuid>,
        /// Output file
        #[arg(long, default_value = "lineage.zip")]
        out: std::path::PathBuf,
    },
}

async fn build_services(config: &Config) -> anyhow::Result<Services> {
    let pool = atelier_db::connect(config).await?;
    let buckets = atelier_storage::create_buckets(config)
        .await
        .context("Failed to initialize storage buckets")?;
    Ok(Services::from_config(pool, buckets, config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    let auth = AuthGate::from_config(&config);

    match cli.command {
        Commands::Migrate => {
            let pool = atelier_db::connect(&config).await?;
            atelier_db::run_migrations(&pool).await?;
            println!("Migrations applied");
        }
        Commands::Projects { user } => {
            let user = auth.resolve_user(user)?;
            let services = build_services(&config).await?;
            let projects = services.projects.list(user).await?;
            println!("{}", to_pretty_json(&projects)?);
        }
        Commands::Timeline { lineage, user } => {
            let user = auth.resolve_user(user)?;
            let services = build_services(&config).await?;
            let timeline = services.timeline.get_timeline_data(lineage, user).await?;
            println!("{}", to_pretty_json(&timeline)?);
        }
        Commands::Download { lineage, user, out } => {
            let user = auth.resolve_user(user)?;
            let services = build_services(&config).await?;
            let bytes = lineage_archive(&services, lineage, user).await?;
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), size = %format_size(bytes.len()), "Archive written");
        }
    }

    Ok(())
}
