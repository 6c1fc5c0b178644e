use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use pbp_sankey::aggregate::TeamFilter;
use pbp_sankey::config::{self, AppConfig};
use pbp_sankey::dataset::{self, PlayTable};
use pbp_sankey::diagram::SankeyDiagram;
use pbp_sankey::export;
use pbp_sankey::fake_plays;
use pbp_sankey::query::{FlowQuery, WeekSelection, run_query};
use pbp_sankey::store;

#[derive(Parser)]
#[command(name = "pbp_sankey")]
#[command(about = "Down-and-distance flow graphs from play-by-play data", long_about = None)]
struct Cli {
    /// Play-by-play CSV file
    #[arg(long, conflicts_with_all = ["db", "demo"])]
    csv: Option<PathBuf>,

    /// SQLite store written by pbp_ingest
    #[arg(long, conflicts_with = "demo")]
    db: Option<PathBuf>,

    /// Use a generated season instead of real data
    #[arg(long)]
    demo: bool,

    /// Season to select (defaults to the latest in the data)
    #[arg(long)]
    season: Option<i32>,

    /// Weeks: `all`, `3-6` or `1,4,9` (defaults to the first week of the season)
    #[arg(long)]
    weeks: Option<WeekSelection>,

    /// Count only plays where this team has the ball
    #[arg(long, conflicts_with = "defense")]
    offense: Option<String>,

    /// Count only plays where this team is on defense
    #[arg(long)]
    defense: Option<String>,

    /// Cap on the number of transitions passed to the renderer
    #[arg(long)]
    max_links: Option<usize>,

    /// Write the diagram payload as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write nodes, flows and edges to an XLSX workbook
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// JSON file overriding state labels and goodness scores
    #[arg(long)]
    states: Option<PathBuf>,

    /// Label wrap width in columns
    #[arg(long)]
    wrap: Option<usize>,
}

fn main() -> Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut cfg = AppConfig::from_env();
    if let Some(path) = cli.states.clone() {
        cfg.states_path = Some(path);
    }
    if let Some(wrap) = cli.wrap {
        cfg.wrap_width = wrap.max(1);
    }
    let states = cfg.state_table()?;

    let table = dataset::init_global(load_table(&cli, &cfg)?)?;
    if table.is_empty() {
        return Err(anyhow!("no plays loaded"));
    }

    let season = match cli.season {
        Some(season) => season,
        None => table
            .seasons()
            .last()
            .copied()
            .context("no season found in play data")?,
    };
    let weeks = match cli.weeks.clone() {
        Some(weeks) => weeks,
        None => match table.weeks(season).first() {
            Some(first) => WeekSelection::Set([*first].into_iter().collect()),
            None => WeekSelection::All,
        },
    };
    let team = match (cli.offense.as_deref(), cli.defense.as_deref()) {
        (Some(team), _) => TeamFilter::Offense(team.trim().to_uppercase()),
        (None, Some(team)) => TeamFilter::Defense(team.trim().to_uppercase()),
        (None, None) => TeamFilter::All,
    };

    let query = FlowQuery {
        season,
        weeks,
        team,
        max_links: cli.max_links,
    };
    let diagram = run_query(table, &query, &states, cfg.wrap_width);
    print_diagram(&query, &diagram);

    if let Some(path) = cli.json.as_deref() {
        let report = export::export_json(path, &diagram)?;
        println!("JSON: {} ({} edges)", path.display(), report.edges);
    }
    if let Some(path) = cli.xlsx.as_deref() {
        let report = export::export_xlsx(path, &diagram, &query)?;
        println!(
            "XLSX: {} ({} nodes, {} flows, {} edges)",
            path.display(),
            report.nodes,
            report.flows,
            report.edges
        );
    }

    Ok(())
}

fn load_table(cli: &Cli, cfg: &AppConfig) -> Result<PlayTable> {
    if cli.demo {
        return Ok(fake_plays::synthetic_season(
            42,
            fake_plays::DEMO_SEASON,
            fake_plays::DEMO_TEAMS,
            4,
        ));
    }
    if let Some(path) = cli.csv.as_deref().or(cfg.csv_path.as_deref()) {
        let (table, report) = PlayTable::from_csv_path(path)?;
        if report.skipped > 0 {
            eprintln!("[WARN] {} malformed rows skipped", report.skipped);
        }
        return Ok(table);
    }
    let db_path = cli
        .db
        .clone()
        .or_else(|| cfg.db_path.clone())
        .context("no data source: pass --csv, --db or --demo")?;
    if !db_path.exists() {
        return Err(anyhow!(
            "play store {} does not exist; run pbp_ingest first",
            db_path.display()
        ));
    }
    let conn = store::open_db(&db_path)?;
    store::load_plays(&conn, None)
}

fn print_diagram(query: &FlowQuery, diagram: &SankeyDiagram) {
    let scope = match &query.team {
        TeamFilter::All => "all teams".to_string(),
        TeamFilter::Offense(team) => format!("{team} on offense"),
        TeamFilter::Defense(team) => format!("{team} on defense"),
    };
    println!(
        "Season {} weeks {} - {}",
        query.season,
        query.weeks.describe(),
        scope
    );
    if diagram.is_empty() {
        println!("No plays matched.");
        return;
    }

    println!();
    println!("{:<4} {:<16} {:>7} {:>7}", "ID", "State", "Plays", "Links");
    for node in &diagram.nodes {
        println!(
            "{:<4} {:<16} {:>7} {:>7}",
            node.id, node.label, node.weight, node.link_freq
        );
    }

    let mut flows = diagram.flows.iter().filter(|f| f.value > 0).collect::<Vec<_>>();
    flows.sort_by(|a, b| b.value.cmp(&a.value).then(a.source.cmp(&b.source)));
    println!();
    println!("{:<16} {:<16} {:>7}", "From", "To", "Count");
    for flow in flows {
        println!(
            "{:<16} {:<16} {:>7}",
            node_label(diagram, flow.source),
            node_label(diagram, flow.target),
            flow.value
        );
    }
    println!();
    println!("Edges passed to renderer: {}", diagram.edges.len());
}

fn node_label(diagram: &SankeyDiagram, id: u8) -> &str {
    diagram
        .nodes
        .iter()
        .find(|n| n.id == id)
        .map(|n| n.label.as_str())
        .unwrap_or("?")
}
