use std::fs;
use std::path::PathBuf;

use pbp_sankey::aggregate::TeamFilter;
use pbp_sankey::dataset::PlayTable;
use pbp_sankey::export::{export_json, export_xlsx};
use pbp_sankey::fake_plays::{DEMO_SEASON, DEMO_TEAMS, synthetic_season};
use pbp_sankey::query::{FlowQuery, TeamRole, WeekSelection, run_query, run_team_batch};
use pbp_sankey::situation::{SituationState, StateTable};

fn load_fixture() -> PlayTable {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("sample_game.csv");
    PlayTable::from_csv_path(&path).expect("fixture should load").0
}

fn query(weeks: &str, team: TeamFilter) -> FlowQuery {
    FlowQuery {
        season: 2023,
        weeks: weeks.parse().expect("week selection"),
        team,
        max_links: None,
    }
}

#[test]
fn query_over_one_week() {
    let table = load_fixture();
    let diagram = run_query(&table, &query("1", TeamFilter::All), StateTable::standard(), 70);

    assert_eq!(diagram.title, "Game, visualized");
    assert_eq!(diagram.nodes.len(), 17);
    assert_eq!(diagram.edges.len(), 13);
    let first_and_ten = &diagram.nodes[SituationState::FirstAndTen.id() as usize];
    assert_eq!(first_and_ten.weight, 6);
    assert_eq!(first_and_ten.link_freq, 6);
}

#[test]
fn weeks_are_sequenced_together() {
    let table = load_fixture();
    let diagram = run_query(&table, &query("all", TeamFilter::All), StateTable::standard(), 70);
    // The last play of week 1 is a boundary, so week 2 contributes its own two.
    assert_eq!(diagram.edges.len(), 15);
}

#[test]
fn team_query_restricts_games_and_counts() {
    let table = load_fixture();
    let diagram = run_query(
        &table,
        &query("1-2", TeamFilter::Offense("BUF".to_string())),
        StateTable::standard(),
        70,
    );
    assert_eq!(diagram.edges.len(), 2);
    let weight: usize = diagram.nodes.iter().map(|n| n.weight).sum();
    assert_eq!(weight, 3);
}

#[test]
fn empty_selection_gives_an_empty_diagram() {
    let table = load_fixture();
    let diagram = run_query(&table, &query("none", TeamFilter::All), StateTable::standard(), 70);
    assert!(diagram.is_empty());
    assert_eq!(diagram.nodes.len(), 17);
}

#[test]
fn link_cap_truncates_edges() {
    let table = load_fixture();
    let mut q = query("1", TeamFilter::All);
    q.max_links = Some(4);
    let diagram = run_query(&table, &q, StateTable::standard(), 70);
    assert_eq!(diagram.edges.len(), 4);
    assert_eq!(
        diagram.nodes[SituationState::FirstAndTen.id() as usize].weight,
        6
    );
}

#[test]
fn batch_reports_every_team() {
    let table = synthetic_season(11, DEMO_SEASON, DEMO_TEAMS, 2);
    let reports = run_team_batch(&table, DEMO_SEASON, &WeekSelection::All, TeamRole::Offense, 3)
        .expect("batch");

    let teams: Vec<&str> = reports.iter().map(|r| r.team.as_str()).collect();
    assert_eq!(teams, DEMO_TEAMS.to_vec());
    for report in &reports {
        assert!(report.transitions > 0, "{} had no transitions", report.team);
        assert!(report.first_downs <= report.transitions);
        assert!((0.0..=1.0).contains(&report.first_down_rate));
    }

    let again = run_team_batch(&table, DEMO_SEASON, &WeekSelection::All, TeamRole::Offense, 1)
        .expect("batch");
    assert_eq!(reports, again);
}

#[test]
fn exports_write_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = load_fixture();
    let q = query("1", TeamFilter::Defense("KC".to_string()));
    let diagram = run_query(&table, &q, StateTable::standard(), 70);

    let json_path = dir.path().join("out").join("diagram.json");
    let report = export_json(&json_path, &diagram).expect("json export");
    assert_eq!(report.nodes, 17);
    assert_eq!(report.edges, diagram.edges.len());
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).expect("read json")).expect("parse");
    assert_eq!(value["title"], "Game, visualized");
    assert_eq!(value["nodes"].as_array().map(Vec::len), Some(17));

    let xlsx_path = dir.path().join("diagram.xlsx");
    export_xlsx(&xlsx_path, &diagram, &q).expect("xlsx export");
    assert!(fs::metadata(&xlsx_path).expect("xlsx exists").len() > 0);
}

#[test]
fn json_export_reports_unusable_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("taken");
    fs::write(&blocker, "x").expect("write blocker");

    let table = load_fixture();
    let diagram = run_query(&table, &query("1", TeamFilter::All), StateTable::standard(), 70);
    let err = export_json(&blocker.join("diagram.json"), &diagram).expect_err("parent is a file");
    assert!(format!("{err:#}").contains("create export dir"));
}
