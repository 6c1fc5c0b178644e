use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pbp_sankey::config::{self, AppConfig};
use pbp_sankey::store;

#[derive(Parser)]
#[command(name = "pbp_ingest")]
#[command(about = "Load a play-by-play CSV into the SQLite play store", long_about = None)]
struct Cli {
    /// Play-by-play CSV file (defaults to PBP_CSV_PATH)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// SQLite store path (defaults to PBP_DB_PATH or the user cache dir)
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env();

    let csv_path = cli
        .csv
        .or(cfg.csv_path)
        .context("no csv given: pass --csv or set PBP_CSV_PATH")?;
    let db_path = cli
        .db
        .or(cfg.db_path)
        .context("unable to resolve sqlite path")?;

    let mut conn = store::open_db(&db_path)?;
    let summary = store::ingest_csv(&mut conn, db_path, &csv_path)?;

    if summary.unchanged {
        println!("Play ingest skipped (file unchanged)");
    } else {
        println!("Play ingest complete");
    }
    println!("DB: {}", summary.db_path.display());
    println!("Source: {}", summary.source.display());
    println!("SHA-256: {}", summary.fingerprint);
    println!(
        "Rows: {} read, {} skipped, {} plays stored",
        summary.rows_read, summary.rows_skipped, summary.plays_upserted
    );

    let table = store::load_plays(&conn, None)?;
    for season in table.seasons() {
        let weeks = table.weeks(season);
        println!(
            "season {}: weeks {}-{}",
            season,
            weeks.first().copied().unwrap_or_default(),
            weeks.last().copied().unwrap_or_default()
        );
    }

    Ok(())
}
