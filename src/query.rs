use std::collections::BTreeSet;
use std::str::FromStr;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{TeamFilter, aggregate};
use crate::dataset::PlayTable;
use crate::diagram::{SankeyDiagram, build_diagram};
use crate::sequencer::{Resolution, sequence};
use crate::situation::{SituationState, StateTable};
use crate::summary::DEFAULT_WRAP_WIDTH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "weeks", rename_all = "snake_case")]
pub enum WeekSelection {
    All,
    Range(u32, u32),
    Set(BTreeSet<u32>),
}

impl WeekSelection {
    pub fn contains(&self, week: u32) -> bool {
        match self {
            WeekSelection::All => true,
            WeekSelection::Range(lo, hi) => (*lo..=*hi).contains(&week),
            WeekSelection::Set(set) => set.contains(&week),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            WeekSelection::All => "all".to_string(),
            WeekSelection::Range(lo, hi) => format!("{lo}-{hi}"),
            WeekSelection::Set(set) => set
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeekSpecError {
    #[error("week `{0}` is not a number")]
    NotANumber(String),
    #[error("week range `{0}` runs backwards")]
    BackwardsRange(String),
}

impl FromStr for WeekSelection {
    type Err = WeekSpecError;

    /// `all`, `none`, a single range `3-6`, or a comma list mixing weeks and ranges.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("all") {
            return Ok(WeekSelection::All);
        }
        if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
            return Ok(WeekSelection::Set(BTreeSet::new()));
        }

        let parts: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
        let mut set = BTreeSet::new();
        for part in &parts {
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let lo = parse_week(lo)?;
                    let hi = parse_week(hi)?;
                    if lo > hi {
                        return Err(WeekSpecError::BackwardsRange(part.to_string()));
                    }
                    if parts.len() == 1 {
                        return Ok(WeekSelection::Range(lo, hi));
                    }
                    set.extend(lo..=hi);
                }
                None => {
                    set.insert(parse_week(part)?);
                }
            }
        }
        Ok(WeekSelection::Set(set))
    }
}

fn parse_week(raw: &str) -> Result<u32, WeekSpecError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| WeekSpecError::NotANumber(raw.trim().to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowQuery {
    pub season: i32,
    pub weeks: WeekSelection,
    pub team: TeamFilter,
    pub max_links: Option<usize>,
}

/// Filter, sequence, aggregate and lay out one query. Pure and repeatable.
pub fn run_query(
    table: &PlayTable,
    query: &FlowQuery,
    states: &StateTable,
    wrap_width: usize,
) -> SankeyDiagram {
    let timed = table.time_filter(query.season, |w| query.weeks.contains(w));
    let games = match query.team.team() {
        Some(team) => timed.team_filter(team),
        None => timed,
    };
    log::info!(
        "season {} weeks {}: {} plays selected",
        query.season,
        query.weeks.describe(),
        games.len()
    );

    let transitions = sequence(games.plays(), wrap_width);
    let graph = aggregate(games.plays(), &transitions, &query.team, states);
    build_diagram(graph, query.max_links)
}

/// Which side of the ball a batch report counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Offense,
    Defense,
}

impl TeamRole {
    pub fn filter_for(self, team: &str) -> TeamFilter {
        match self {
            TeamRole::Offense => TeamFilter::Offense(team.to_string()),
            TeamRole::Defense => TeamFilter::Defense(team.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamReport {
    pub team: String,
    pub role: TeamRole,
    pub transitions: usize,
    pub first_downs: usize,
    pub punts: usize,
    pub field_goals: usize,
    pub turnovers: usize,
    /// Share of transitions that ended in a first down or touchdown.
    pub first_down_rate: f64,
}

/// One report per possessing team in the selected weeks, computed in parallel.
pub fn run_team_batch(
    table: &PlayTable,
    season: i32,
    weeks: &WeekSelection,
    role: TeamRole,
    threads: usize,
) -> Result<Vec<TeamReport>> {
    let timed = table.time_filter(season, |w| weeks.contains(w));
    let teams = timed.teams();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .context("build batch thread pool")?;

    let mut reports: Vec<TeamReport> = pool.install(|| {
        teams
            .par_iter()
            .map(|team| team_report(&timed, team, role))
            .collect()
    });
    reports.sort_by(|a, b| a.team.cmp(&b.team));
    Ok(reports)
}

fn team_report(timed: &PlayTable, team: &str, role: TeamRole) -> TeamReport {
    let games = timed.team_filter(team);
    let filter = role.filter_for(team);
    let plays = games.plays();
    let transitions = sequence(plays, DEFAULT_WRAP_WIDTH);

    let mut report = TeamReport {
        team: team.to_string(),
        role,
        transitions: 0,
        first_downs: 0,
        punts: 0,
        field_goals: 0,
        turnovers: 0,
        first_down_rate: 0.0,
    };
    for t in transitions.iter().filter(|t| filter.matches(&plays[t.source])) {
        report.transitions += 1;
        match t.target_state {
            SituationState::FirstDownOrTouchdown => report.first_downs += 1,
            SituationState::Punt => report.punts += 1,
            SituationState::FieldGoalAttempt => report.field_goals += 1,
            SituationState::Turnover => report.turnovers += 1,
            _ => {}
        }
        if t.resolution == Resolution::Unresolved {
            log::debug!("{team}: unresolved transition from play {}", t.source_id);
        }
    }
    if report.transitions > 0 {
        report.first_down_rate = report.first_downs as f64 / report.transitions as f64;
    }
    report
}
