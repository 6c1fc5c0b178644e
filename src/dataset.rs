use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;

use crate::play::{Play, PlayId, RawPlayRow};

static GLOBAL: OnceCell<PlayTable> = OnceCell::new();

/// Chronologically ordered plays, read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayTable {
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub skipped: usize,
}

impl PlayTable {
    pub fn new(plays: Vec<Play>) -> Self {
        Self { plays }
    }

    pub fn from_csv_path(path: &Path) -> Result<(Self, LoadReport)> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open play-by-play csv {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("read play-by-play csv {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<(Self, LoadReport)> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers().context("read csv header")?.clone();
        if !headers.iter().any(|h| h.trim() == "down") {
            return Err(anyhow!("csv header has no `down` column"));
        }

        let mut plays = Vec::new();
        let mut report = LoadReport::default();
        for (row_idx, record) in reader.deserialize::<RawPlayRow>().enumerate() {
            report.rows += 1;
            match record {
                Ok(raw) => plays.push(raw.into_play(row_idx as PlayId)),
                Err(err) => {
                    report.skipped += 1;
                    log::warn!("skipping play row {row_idx}: {err}");
                }
            }
        }

        log::info!(
            "loaded {} plays ({} rows, {} skipped)",
            plays.len(),
            report.rows,
            report.skipped
        );
        Ok((Self { plays }, report))
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    /// Plays of `season` whose week satisfies `keep_week`, order preserved.
    pub fn time_filter(&self, season: i32, keep_week: impl Fn(u32) -> bool) -> PlayTable {
        let plays = self
            .plays
            .iter()
            .filter(|p| p.season == Some(season))
            .filter(|p| p.week.is_some_and(&keep_week))
            .cloned()
            .collect();
        PlayTable { plays }
    }

    /// Plays of games the team took part in, home or away. Empty team keeps all.
    pub fn team_filter(&self, team: &str) -> PlayTable {
        let team = team.trim();
        if team.is_empty() {
            return self.clone();
        }
        let plays = self
            .plays
            .iter()
            .filter(|p| p.home == team || p.away == team)
            .cloned()
            .collect();
        PlayTable { plays }
    }

    pub fn seasons(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.plays.iter().filter_map(|p| p.season).collect();
        set.into_iter().collect()
    }

    pub fn weeks(&self, season: i32) -> Vec<u32> {
        let set: BTreeSet<u32> = self
            .plays
            .iter()
            .filter(|p| p.season == Some(season))
            .filter_map(|p| p.week)
            .collect();
        set.into_iter().collect()
    }

    /// Distinct possessing teams.
    pub fn teams(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .plays
            .iter()
            .map(|p| p.poss.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        set.into_iter().map(str::to_string).collect()
    }
}

/// Install the process-wide dataset. Fails if one is already installed.
pub fn init_global(table: PlayTable) -> Result<&'static PlayTable> {
    GLOBAL
        .set(table)
        .map_err(|_| anyhow!("play dataset already initialised"))?;
    global().context("play dataset missing after init")
}

pub fn global() -> Option<&'static PlayTable> {
    GLOBAL.get()
}
