use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete down/distance/outcome bucket used as a diagram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SituationState {
    FirstAndTen,
    FirstAndLong,
    FirstAndShort,
    SecondAndShort,
    SecondAndMedium,
    SecondAndLong,
    ThirdAndShort,
    ThirdAndMedium,
    ThirdAndLong,
    FourthDown,
    Punt,
    FieldGoalAttempt,
    Turnover,
    EndOfHalf,
    Unknown,
    Shenanigans,
    FirstDownOrTouchdown,
}

pub const STATE_COUNT: usize = 17;

impl SituationState {
    pub const ALL: [SituationState; STATE_COUNT] = [
        SituationState::FirstAndTen,
        SituationState::FirstAndLong,
        SituationState::FirstAndShort,
        SituationState::SecondAndShort,
        SituationState::SecondAndMedium,
        SituationState::SecondAndLong,
        SituationState::ThirdAndShort,
        SituationState::ThirdAndMedium,
        SituationState::ThirdAndLong,
        SituationState::FourthDown,
        SituationState::Punt,
        SituationState::FieldGoalAttempt,
        SituationState::Turnover,
        SituationState::EndOfHalf,
        SituationState::Unknown,
        SituationState::Shenanigans,
        SituationState::FirstDownOrTouchdown,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Outcome states whose target plays are also counted as node members.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SituationState::Punt
                | SituationState::FieldGoalAttempt
                | SituationState::Turnover
                | SituationState::EndOfHalf
                | SituationState::FirstDownOrTouchdown
        )
    }

    pub fn default_label(self) -> &'static str {
        match self {
            SituationState::FirstAndTen => "1st & 10",
            SituationState::FirstAndLong => "1st & >10",
            SituationState::FirstAndShort => "1st & <10",
            SituationState::SecondAndShort => "2nd & 1-5",
            SituationState::SecondAndMedium => "2nd & 6-10",
            SituationState::SecondAndLong => "2nd & 11+",
            SituationState::ThirdAndShort => "3rd & 1-3",
            SituationState::ThirdAndMedium => "3rd & 4-7",
            SituationState::ThirdAndLong => "3rd & 8+",
            SituationState::FourthDown => "4th Down",
            SituationState::Punt => "Punt",
            SituationState::FieldGoalAttempt => "FG Attempt",
            SituationState::Turnover => "Turnover",
            SituationState::EndOfHalf => "End of Half",
            SituationState::Unknown => "Unknown",
            SituationState::Shenanigans => "Shenanigans",
            SituationState::FirstDownOrTouchdown => "First Down/TD",
        }
    }

    pub fn default_goodness(self) -> u8 {
        match self {
            SituationState::FirstAndTen => 50,
            SituationState::FirstAndLong => 33,
            SituationState::FirstAndShort => 66,
            SituationState::SecondAndShort => 80,
            SituationState::SecondAndMedium => 50,
            SituationState::SecondAndLong => 33,
            SituationState::ThirdAndShort => 75,
            SituationState::ThirdAndMedium => 50,
            SituationState::ThirdAndLong => 25,
            SituationState::FourthDown => 33,
            SituationState::Punt => 10,
            SituationState::FieldGoalAttempt => 75,
            SituationState::Turnover => 0,
            SituationState::EndOfHalf => 50,
            SituationState::Unknown => 50,
            SituationState::Shenanigans => 50,
            SituationState::FirstDownOrTouchdown => 99,
        }
    }
}

// ColorBrewer RdYlGn, 9 classes.
const RDYLGN_9: [(u8, u8, u8); 9] = [
    (215, 48, 39),
    (244, 109, 67),
    (253, 174, 97),
    (254, 224, 139),
    (255, 255, 191),
    (217, 239, 139),
    (166, 217, 106),
    (102, 189, 99),
    (26, 152, 80),
];

pub const SCALE_STEPS: usize = 100;
pub const MAX_GOODNESS: u8 = 100;
const FLOW_ALPHA: f64 = 0.5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateTableError {
    #[error("state id {0} is outside 0..=16")]
    UnknownState(u8),
    #[error("goodness {goodness} for state {id} is outside 0..=100")]
    GoodnessOutOfRange { id: u8, goodness: u8 },
    #[error("label for state {0} is empty")]
    EmptyLabel(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateInfo {
    pub id: u8,
    pub label: String,
    pub goodness: u8,
    pub node_color: String,
    pub flow_color: String,
}

/// Optional overrides read from a JSON file, keyed by state id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateOverrides {
    #[serde(default)]
    pub labels: HashMap<u8, String>,
    #[serde(default)]
    pub goodness: HashMap<u8, u8>,
}

/// Read-only lookup of labels, goodness scores and colors for every state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTable {
    entries: Vec<StateInfo>,
}

static STANDARD: Lazy<StateTable> = Lazy::new(StateTable::default);

impl Default for StateTable {
    fn default() -> Self {
        let scale = interpolate_scale(&RDYLGN_9, SCALE_STEPS);
        let entries = SituationState::ALL
            .iter()
            .map(|state| {
                build_info(
                    &scale,
                    state.id(),
                    state.default_label().to_string(),
                    state.default_goodness(),
                )
            })
            .collect();
        Self { entries }
    }
}

impl StateTable {
    pub fn standard() -> &'static StateTable {
        &STANDARD
    }

    pub fn with_overrides(overrides: &StateOverrides) -> Result<Self, StateTableError> {
        for id in overrides.labels.keys().chain(overrides.goodness.keys()) {
            if SituationState::from_id(*id).is_none() {
                return Err(StateTableError::UnknownState(*id));
            }
        }

        let scale = interpolate_scale(&RDYLGN_9, SCALE_STEPS);
        let mut entries = Vec::with_capacity(STATE_COUNT);
        for state in SituationState::ALL {
            let id = state.id();
            let label = overrides
                .labels
                .get(&id)
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| state.default_label().to_string());
            if label.is_empty() {
                return Err(StateTableError::EmptyLabel(id));
            }
            let goodness = overrides
                .goodness
                .get(&id)
                .copied()
                .unwrap_or_else(|| state.default_goodness());
            if goodness > MAX_GOODNESS {
                return Err(StateTableError::GoodnessOutOfRange { id, goodness });
            }
            entries.push(build_info(&scale, id, label, goodness));
        }
        Ok(Self { entries })
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read state table {}", path.display()))?;
        let overrides: StateOverrides = serde_json::from_str(&raw)
            .with_context(|| format!("parse state table {}", path.display()))?;
        let table = Self::with_overrides(&overrides)
            .with_context(|| format!("validate state table {}", path.display()))?;
        Ok(table)
    }

    pub fn info(&self, state: SituationState) -> &StateInfo {
        &self.entries[state as usize]
    }

    pub fn label(&self, state: SituationState) -> &str {
        &self.info(state).label
    }

    pub fn node_color(&self, state: SituationState) -> &str {
        &self.info(state).node_color
    }

    pub fn flow_color(&self, state: SituationState) -> &str {
        &self.info(state).flow_color
    }

    pub fn iter(&self) -> impl Iterator<Item = (SituationState, &StateInfo)> {
        SituationState::ALL.iter().copied().zip(self.entries.iter())
    }

    /// Transitions whose labels start with the same character never become flows.
    pub fn shares_leading_char(&self, a: SituationState, b: SituationState) -> bool {
        self.label(a).chars().next() == self.label(b).chars().next()
    }
}

/// Goodness 100 shares the last scale step with 99.
fn build_info(scale: &[(u8, u8, u8)], id: u8, label: String, goodness: u8) -> StateInfo {
    let idx = (goodness as usize).min(scale.len().saturating_sub(1));
    let (r, g, b) = scale[idx];
    StateInfo {
        id,
        label,
        goodness,
        node_color: format!("rgb({r}, {g}, {b})"),
        flow_color: format!("rgba({r}, {g}, {b}, {FLOW_ALPHA})"),
    }
}

/// Linear RGB interpolation of `stops` into `steps` evenly spaced colors.
fn interpolate_scale(stops: &[(u8, u8, u8)], steps: usize) -> Vec<(u8, u8, u8)> {
    if stops.is_empty() || steps == 0 {
        return Vec::new();
    }
    if stops.len() == 1 || steps == 1 {
        return vec![stops[0]; steps];
    }

    let segments = (stops.len() - 1) as f64;
    (0..steps)
        .map(|k| {
            let pos = k as f64 / (steps - 1) as f64 * segments;
            let lo = (pos.floor() as usize).min(stops.len() - 2);
            let t = pos - lo as f64;
            let (r0, g0, b0) = stops[lo];
            let (r1, g1, b1) = stops[lo + 1];
            (lerp(r0, r1, t), lerp(g0, g1, t), lerp(b0, b1, t))
        })
        .collect()
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    let v = a as f64 + (b as f64 - a as f64) * t;
    v.round().clamp(0.0, 255.0) as u8
}
