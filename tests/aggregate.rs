use std::fs;
use std::path::PathBuf;

use pbp_sankey::aggregate::{TeamFilter, aggregate};
use pbp_sankey::dataset::PlayTable;
use pbp_sankey::play::Play;
use pbp_sankey::sequencer::sequence;
use pbp_sankey::situation::{SituationState, StateTable};

use SituationState::*;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn week_one() -> PlayTable {
    let (table, _) = PlayTable::from_reader(read_fixture("sample_game.csv").as_bytes())
        .expect("fixture should parse");
    table.time_filter(2023, |w| w == 1)
}

#[test]
fn unfiltered_counts_cover_every_transition() {
    let games = week_one();
    let transitions = sequence(games.plays(), 70);
    let graph = aggregate(games.plays(), &transitions, &TeamFilter::All, StateTable::standard());

    assert_eq!(graph.nodes.len(), 17);
    assert_eq!(graph.node_count(FirstAndTen), 6);
    assert_eq!(graph.node_count(SecondAndMedium), 2);
    assert_eq!(graph.node_count(FourthDown), 2);
    assert_eq!(graph.node_count(FirstDownOrTouchdown), 3);
    assert_eq!(graph.node_count(EndOfHalf), 2);
    assert_eq!(graph.node_count(Turnover), 1);
    // Non-terminal targets are never counted as members.
    assert_eq!(graph.node_count(Unknown), 0);
    assert_eq!(graph.node_count(Shenanigans), 0);

    assert_eq!(graph.flow_count(FirstAndTen, FirstDownOrTouchdown), 1);
    assert_eq!(graph.flow_count(FirstAndTen, Turnover), 1);
    assert_eq!(graph.links.len(), 13);
}

#[test]
fn offense_filter_counts_only_that_team() {
    let games = week_one();
    let transitions = sequence(games.plays(), 70);
    let ne = TeamFilter::Offense("NE".to_string());
    let graph = aggregate(games.plays(), &transitions, &ne, StateTable::standard());

    assert_eq!(graph.node_count(FirstAndTen), 4);
    assert_eq!(graph.node_count(FirstDownOrTouchdown), 2);
    assert_eq!(graph.node_count(SecondAndShort), 0);
    assert_eq!(graph.flow_count(FirstAndTen, FirstDownOrTouchdown), 1);
    assert_eq!(graph.flow_count(FirstAndTen, SecondAndShort), 0);
    assert_eq!(graph.flow_count(SecondAndShort, FirstDownOrTouchdown), 0);
    assert_eq!(graph.links.len(), 10);
    assert!(graph.links.iter().all(|l| l.value == 1));
}

#[test]
fn offense_and_opposing_defense_agree() {
    let games = week_one();
    let transitions = sequence(games.plays(), 70);
    let states = StateTable::standard();
    let offense = aggregate(
        games.plays(),
        &transitions,
        &TeamFilter::Offense("NE".to_string()),
        states,
    );
    let defense = aggregate(
        games.plays(),
        &transitions,
        &TeamFilter::Defense("KC".to_string()),
        states,
    );
    assert_eq!(offense, defense);
}

#[test]
fn team_without_plays_sees_zero_counts() {
    let games = week_one();
    let transitions = sequence(games.plays(), 70);
    let graph = aggregate(
        games.plays(),
        &transitions,
        &TeamFilter::Offense("BUF".to_string()),
        StateTable::standard(),
    );
    assert_eq!(graph.nodes.len(), 17);
    assert!(graph.nodes.iter().all(|n| n.count == 0));
    assert!(graph.flows.iter().all(|f| f.value == 0));
    assert!(graph.links.is_empty());
}

#[test]
fn aggregation_is_repeatable() {
    let games = week_one();
    let transitions = sequence(games.plays(), 70);
    let filter = TeamFilter::Offense("KC".to_string());
    let a = aggregate(games.plays(), &transitions, &filter, StateTable::standard());
    let b = aggregate(games.plays(), &transitions, &filter, StateTable::standard());
    assert_eq!(a, b);
}

#[test]
fn flows_between_states_with_the_same_initial_are_dropped() {
    let src = Play {
        id: 0,
        poss: "NE".to_string(),
        down: Some(1),
        dist: Some(10),
        off_fieldpos: Some(-20),
        is_penalty: true,
        ..Play::default()
    };
    let tgt = Play {
        id: 1,
        poss: "NE".to_string(),
        down: Some(1),
        dist: Some(15),
        off_fieldpos: Some(-25),
        yds_gained: Some(0),
        ..Play::default()
    };
    let plays = vec![src, tgt];
    let transitions = sequence(&plays, 70);
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].target_state, FirstAndLong);

    let graph = aggregate(&plays, &transitions, &TeamFilter::All, StateTable::standard());
    assert_eq!(graph.node_count(FirstAndTen), 1);
    assert_eq!(graph.flow_count(FirstAndTen, FirstAndLong), 0);
    assert!(graph.flows.is_empty());
    assert!(graph.links.is_empty());
}

#[test]
fn link_colors_follow_the_target_state() {
    let games = week_one();
    let transitions = sequence(games.plays(), 70);
    let states = StateTable::standard();
    let graph = aggregate(games.plays(), &transitions, &TeamFilter::All, states);
    for link in &graph.links {
        let target = SituationState::from_id(link.target).expect("known state id");
        assert_eq!(link.color, states.flow_color(target));
    }
}
