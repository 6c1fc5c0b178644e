use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};

use pbp_sankey::config::{self, AppConfig};
use pbp_sankey::dataset::PlayTable;
use pbp_sankey::fake_plays;
use pbp_sankey::query::{TeamRole, WeekSelection, run_team_batch};
use pbp_sankey::store;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Role {
    Offense,
    Defense,
}

#[derive(Parser)]
#[command(name = "team_report")]
#[command(about = "Per-team transition summary for a season", long_about = None)]
struct Cli {
    /// Play-by-play CSV file
    #[arg(long, conflicts_with = "demo")]
    csv: Option<PathBuf>,

    /// Use a generated season instead of real data
    #[arg(long)]
    demo: bool,

    #[arg(long)]
    season: Option<i32>,

    /// Weeks: `all`, `3-6` or `1,4,9`
    #[arg(long, default_value = "all")]
    weeks: WeekSelection,

    #[arg(long, value_enum, default_value = "offense")]
    role: Role,

    /// Worker threads (defaults to REPORT_PARALLELISM)
    #[arg(long)]
    threads: Option<usize>,

    /// Write the reports as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env();

    let table = if cli.demo {
        fake_plays::synthetic_season(42, fake_plays::DEMO_SEASON, fake_plays::DEMO_TEAMS, 4)
    } else if let Some(path) = cli.csv.as_deref().or(cfg.csv_path.as_deref()) {
        PlayTable::from_csv_path(path)?.0
    } else {
        let db_path = cfg
            .db_path
            .clone()
            .context("no data source: pass --csv or --demo")?;
        let conn = store::open_db(&db_path)?;
        store::load_plays(&conn, cli.season)?
    };

    let season = match cli.season {
        Some(season) => season,
        None => table
            .seasons()
            .last()
            .copied()
            .context("no season found in play data")?,
    };
    let role = match cli.role {
        Role::Offense => TeamRole::Offense,
        Role::Defense => TeamRole::Defense,
    };
    let threads = cli.threads.unwrap_or(cfg.parallelism).clamp(1, 32);

    let reports = run_team_batch(&table, season, &cli.weeks, role, threads)?;
    if reports.is_empty() {
        return Err(anyhow!(
            "no teams found for season {season} weeks {}",
            cli.weeks.describe()
        ));
    }

    println!("Season {} weeks {} ({:?})", season, cli.weeks.describe(), role);
    println!(
        "{:<5} {:>6} {:>6} {:>6} {:>5} {:>5} {:>7}",
        "Team", "Trans", "1st/TD", "Punts", "FGA", "TO", "1D%"
    );
    for r in &reports {
        println!(
            "{:<5} {:>6} {:>6} {:>6} {:>5} {:>5} {:>6.1}%",
            r.team,
            r.transitions,
            r.first_downs,
            r.punts,
            r.field_goals,
            r.turnovers,
            r.first_down_rate * 100.0
        );
    }

    if let Some(path) = cli.json.as_deref() {
        let json = serde_json::to_string_pretty(&reports).context("serialize team reports")?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        println!("JSON: {}", path.display());
    }

    Ok(())
}
