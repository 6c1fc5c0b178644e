use serde::{Deserialize, Serialize};

/// Stable identity of a play: its zero-based row in the source table.
pub type PlayId = u64;

/// One snapshot of a single down.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Play {
    pub id: PlayId,
    pub season: Option<i32>,
    pub week: Option<u32>,
    pub home: String,
    pub away: String,
    pub poss: String,
    pub def: String,
    /// Raw down as parsed; only 1..=4 are regular downs.
    pub down: Option<i32>,
    pub dist: Option<i32>,
    /// Yards from midfield: own goal line at -50, opponent goal line at +50.
    pub off_fieldpos: Option<i32>,
    /// `None` when yardage does not apply to the play.
    pub yds_gained: Option<i32>,
    pub is_punt: bool,
    pub is_fieldgoal: bool,
    pub is_turnover: bool,
    pub is_penalty: bool,
    pub onecell: Option<String>,
    pub detail: Option<String>,
    pub detail_text: Option<String>,
    pub detail_a: Option<String>,
    pub quarter: Option<String>,
    pub qtr_time_remain: Option<String>,
}

impl Play {
    pub fn regular_down(&self) -> Option<u8> {
        match self.down {
            Some(d @ 1..=4) => Some(d as u8),
            _ => None,
        }
    }

    /// True when the text cell marks a half or game boundary.
    pub fn marks_boundary(&self) -> bool {
        self.onecell.as_deref().is_some_and(text_marks_boundary)
    }
}

pub fn text_marks_boundary(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("3rd quarter") || lower.contains("end of ")
}

/// A record as it comes out of the tabular source: every cell optional text.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPlayRow {
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub week: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub away: Option<String>,
    #[serde(default)]
    pub poss: Option<String>,
    #[serde(default)]
    pub def: Option<String>,
    #[serde(default)]
    pub down: Option<String>,
    #[serde(default)]
    pub dist: Option<String>,
    #[serde(default)]
    pub off_fieldpos: Option<String>,
    #[serde(default)]
    pub yds_gained: Option<String>,
    #[serde(default)]
    pub is_punt: Option<String>,
    #[serde(default)]
    pub is_fieldgoal: Option<String>,
    #[serde(default)]
    pub is_turnover: Option<String>,
    #[serde(default)]
    pub is_penalty: Option<String>,
    #[serde(default)]
    pub onecell: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub detail_text: Option<String>,
    #[serde(default)]
    pub detail_a: Option<String>,
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default)]
    pub qtr_time_remain: Option<String>,
    #[serde(default)]
    pub qtr_time_remain_a: Option<String>,
}

impl RawPlayRow {
    pub fn into_play(self, id: PlayId) -> Play {
        Play {
            id,
            season: parse_int(self.season.as_deref()),
            week: parse_int(self.week.as_deref()).and_then(|w| u32::try_from(w).ok()),
            home: parse_code(self.home.as_deref()),
            away: parse_code(self.away.as_deref()),
            poss: parse_code(self.poss.as_deref()),
            def: parse_code(self.def.as_deref()),
            down: parse_int(self.down.as_deref()),
            dist: parse_int(self.dist.as_deref()),
            off_fieldpos: parse_int(self.off_fieldpos.as_deref()),
            yds_gained: parse_int(self.yds_gained.as_deref()),
            is_punt: parse_flag(self.is_punt.as_deref()),
            is_fieldgoal: parse_flag(self.is_fieldgoal.as_deref()),
            is_turnover: parse_flag(self.is_turnover.as_deref()),
            is_penalty: parse_flag(self.is_penalty.as_deref()),
            onecell: parse_text(self.onecell),
            detail: parse_text(self.detail),
            detail_text: parse_text(self.detail_text),
            detail_a: parse_text(self.detail_a),
            quarter: parse_text(self.quarter),
            qtr_time_remain: parse_text(self.qtr_time_remain)
                .or_else(|| parse_text(self.qtr_time_remain_a)),
        }
    }
}

/// Integer or integral float text; `x`, `nan`, blanks and garbage are absent.
pub fn parse_int(raw: Option<&str>) -> Option<i32> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i32>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    if f < i32::MIN as f64 || f > i32::MAX as f64 {
        return None;
    }
    Some(f as i32)
}

pub fn parse_flag(raw: Option<&str>) -> bool {
    let Some(s) = raw else {
        return false;
    };
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "1" | "1.0" | "yes" | "y"
    )
}

fn parse_text(raw: Option<String>) -> Option<String> {
    let s = raw?;
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(s)
}

fn parse_code(raw: Option<&str>) -> String {
    raw.map(|s| s.trim())
        .filter(|s| !s.eq_ignore_ascii_case("nan"))
        .unwrap_or_default()
        .to_string()
}
