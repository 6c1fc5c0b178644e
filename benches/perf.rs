use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use pbp_sankey::aggregate::{TeamFilter, aggregate};
use pbp_sankey::fake_plays::{DEMO_SEASON, DEMO_TEAMS, synthetic_season};
use pbp_sankey::query::{FlowQuery, TeamRole, WeekSelection, run_query, run_team_batch};
use pbp_sankey::sequencer::sequence;
use pbp_sankey::situation::StateTable;
use pbp_sankey::summary::DEFAULT_WRAP_WIDTH;

const WEEKS: u32 = 17;

fn bench_sequence(c: &mut Criterion) {
    let table = synthetic_season(42, DEMO_SEASON, DEMO_TEAMS, WEEKS);
    c.bench_function("sequence_season", |b| {
        b.iter(|| {
            let transitions = sequence(black_box(table.plays()), DEFAULT_WRAP_WIDTH);
            black_box(transitions.len());
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let table = synthetic_season(42, DEMO_SEASON, DEMO_TEAMS, WEEKS);
    let transitions = sequence(table.plays(), DEFAULT_WRAP_WIDTH);
    let filter = TeamFilter::Offense("KC".to_string());
    c.bench_function("aggregate_season_offense", |b| {
        b.iter(|| {
            let graph = aggregate(
                black_box(table.plays()),
                black_box(&transitions),
                &filter,
                StateTable::standard(),
            );
            black_box(graph.links.len());
        })
    });
}

fn bench_query(c: &mut Criterion) {
    let table = synthetic_season(42, DEMO_SEASON, DEMO_TEAMS, WEEKS);
    let query = FlowQuery {
        season: DEMO_SEASON,
        weeks: WeekSelection::Range(1, 4),
        team: TeamFilter::Defense("NE".to_string()),
        max_links: None,
    };
    c.bench_function("run_query_four_weeks", |b| {
        b.iter(|| {
            let diagram = run_query(
                black_box(&table),
                &query,
                StateTable::standard(),
                DEFAULT_WRAP_WIDTH,
            );
            black_box(diagram.edges.len());
        })
    });
}

fn bench_team_batch(c: &mut Criterion) {
    let table = synthetic_season(42, DEMO_SEASON, DEMO_TEAMS, WEEKS);
    c.bench_function("team_batch_season", |b| {
        b.iter(|| {
            let reports = run_team_batch(
                black_box(&table),
                DEMO_SEASON,
                &WeekSelection::All,
                TeamRole::Offense,
                4,
            )
            .unwrap();
            black_box(reports.len());
        })
    });
}

criterion_group!(
    perf,
    bench_sequence,
    bench_aggregate,
    bench_query,
    bench_team_batch
);
criterion_main!(perf);
