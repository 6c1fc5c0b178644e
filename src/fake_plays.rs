use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dataset::PlayTable;
use crate::play::{Play, PlayId};

pub const DEMO_SEASON: i32 = 2024;
pub const DEMO_TEAMS: &[&str] = &["BUF", "KC", "MIA", "NE", "NYJ", "PHI"];

const PLAYS_PER_QUARTER: usize = 32;
const QUARTER_SECS: u32 = 15 * 60;

struct Drive {
    poss: usize,
    down: i32,
    dist: i32,
    /// Offensive field position: own goal at -50, opponent goal at +50.
    fp: i32,
}

impl Drive {
    fn fresh(poss: usize, fp: i32) -> Self {
        let fp = fp.clamp(-49, 49);
        Self {
            poss,
            down: 1,
            dist: 10.min(50 - fp),
            fp,
        }
    }

    fn to_goal(&self) -> i32 {
        50 - self.fp
    }
}

struct GameWriter<'a> {
    plays: Vec<Play>,
    next_id: PlayId,
    season: i32,
    week: u32,
    teams: [&'a str; 2],
    quarter: u32,
    clock: u32,
}

impl GameWriter<'_> {
    fn push(&mut self, mut play: Play) {
        play.id = self.next_id;
        play.season = Some(self.season);
        play.week = Some(self.week);
        play.home = self.teams[0].to_string();
        play.away = self.teams[1].to_string();
        play.quarter = Some(self.quarter.to_string());
        play.qtr_time_remain = Some(format!("{}:{:02}", self.clock / 60, self.clock % 60));
        self.next_id += 1;
        self.plays.push(play);
    }

    fn marker(&mut self, text: &str) {
        self.push(Play {
            onecell: Some(text.to_string()),
            ..Play::default()
        });
    }

    fn kickoff(&mut self, kicking: usize) {
        let text = format!("{} kicks off", self.teams[kicking]);
        self.push(Play {
            poss: self.teams[kicking].to_string(),
            def: self.teams[1 - kicking].to_string(),
            onecell: Some(text.clone()),
            detail: Some(text),
            ..Play::default()
        });
    }

    fn snap(&self, drive: &Drive) -> Play {
        Play {
            poss: self.teams[drive.poss].to_string(),
            def: self.teams[1 - drive.poss].to_string(),
            down: Some(drive.down),
            dist: Some(drive.dist),
            off_fieldpos: Some(drive.fp),
            ..Play::default()
        }
    }
}

/// One deterministic game between `home` and `away`, ids starting at `first_id`.
pub fn synthetic_game(
    seed: u64,
    season: i32,
    week: u32,
    home: &str,
    away: &str,
    first_id: PlayId,
) -> Vec<Play> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut w = GameWriter {
        plays: Vec::new(),
        next_id: first_id,
        season,
        week,
        teams: [home, away],
        quarter: 1,
        clock: QUARTER_SECS,
    };

    w.kickoff(1);
    let mut drive = Drive::fresh(0, -25);

    for quarter in 1..=4u32 {
        w.quarter = quarter;
        w.clock = QUARTER_SECS;
        if quarter == 3 {
            w.marker("3rd Quarter");
            w.kickoff(0);
            drive = Drive::fresh(1, -25);
        }

        for _ in 0..PLAYS_PER_QUARTER {
            w.clock = w.clock.saturating_sub(rng.gen_range(15..40));
            drive = run_play(&mut w, &mut rng, drive);
        }

        match quarter {
            2 => w.marker("End of 2nd Quarter"),
            4 => w.marker("End of Regulation"),
            _ => {}
        }
    }

    w.plays
}

fn run_play(w: &mut GameWriter<'_>, rng: &mut StdRng, drive: Drive) -> Drive {
    let mut play = w.snap(&drive);
    let offense = w.teams[drive.poss];

    if drive.down == 4 {
        if drive.to_goal() <= 35 {
            play.is_fieldgoal = true;
            play.yds_gained = Some(0);
            let text = format!("{} field goal attempt from {} yards", offense, drive.to_goal() + 17);
            play.detail = Some(text.clone());
            play.onecell = Some(text);
            w.push(play);
            w.kickoff(drive.poss);
            return Drive::fresh(1 - drive.poss, -25);
        }
        let distance = rng.gen_range(35..55);
        play.is_punt = true;
        play.yds_gained = Some(0);
        play.detail_text = Some(format!(" punts {distance} yards, fair catch by brk, "));
        play.detail_a = Some(format!("{offense}P, {}R", w.teams[1 - drive.poss]));
        play.onecell = Some(format!("{offense} punts {distance} yards"));
        w.push(play);
        return Drive::fresh(1 - drive.poss, -(drive.fp + distance));
    }

    let roll: f64 = rng.r#gen();
    if roll < 0.03 {
        play.is_turnover = true;
        play.yds_gained = Some(0);
        play.detail_text = Some(" pass intercepted by brk, ".to_string());
        play.detail_a = Some(format!("{offense}QB, {}CB", w.teams[1 - drive.poss]));
        play.onecell = Some(format!("{offense} pass intercepted"));
        w.push(play);
        return Drive::fresh(1 - drive.poss, -drive.fp);
    }

    if roll < 0.10 {
        play.is_penalty = true;
        let defensive = rng.gen_bool(0.5);
        let yards: i32 = if defensive { 5 } else { -5 };
        play.detail = Some(format!(
            "Penalty on {}: {} yards",
            if defensive { w.teams[1 - drive.poss] } else { offense },
            yards.abs()
        ));
        play.onecell = play.detail.clone();
        w.push(play);

        let fp = (drive.fp + yards).clamp(-49, 49);
        let dist = drive.dist - yards;
        if dist <= 0 {
            return Drive::fresh(drive.poss, fp);
        }
        return Drive {
            fp,
            dist: dist.min(50 - fp),
            ..drive
        };
    }

    let gain = rng.gen_range(-3..16);
    play.yds_gained = Some(gain);
    play.detail_text = Some(format!(" pass complete to brk,  for {gain} yards"));
    play.detail_a = Some(format!("{offense}QB, {offense}WR"));
    play.onecell = Some(format!("{offense} pass for {gain} yards"));
    w.push(play);

    let fp = drive.fp + gain;
    if fp >= 50 {
        w.kickoff(drive.poss);
        return Drive::fresh(1 - drive.poss, -25);
    }
    let fp = fp.max(-49);
    if gain >= drive.dist {
        return Drive::fresh(drive.poss, fp);
    }
    Drive {
        down: drive.down + 1,
        dist: (drive.dist - gain).min(50 - fp),
        fp,
        ..drive
    }
}

/// A round-robin season over `teams`, one game per pair per week.
pub fn synthetic_season(seed: u64, season: i32, teams: &[&str], weeks: u32) -> PlayTable {
    let mut plays = Vec::new();
    let n = teams.len();
    if n < 2 {
        return PlayTable::new(plays);
    }

    for week in 1..=weeks {
        let shift = (week as usize - 1) % (n - 1) + 1;
        let mut used = vec![false; n];
        for home in 0..n {
            let away = (home + shift) % n;
            if used[home] || used[away] {
                continue;
            }
            used[home] = true;
            used[away] = true;
            let game_seed = seed ^ ((week as u64) << 32) ^ (home as u64);
            let first_id = plays.len() as PlayId;
            plays.extend(synthetic_game(
                game_seed,
                season,
                week,
                teams[home],
                teams[away],
                first_id,
            ));
        }
    }
    PlayTable::new(plays)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn games_are_deterministic() {
        let a = synthetic_game(7, DEMO_SEASON, 1, "NE", "KC", 0);
        let b = synthetic_game(7, DEMO_SEASON, 1, "NE", "KC", 0);
        assert_eq!(a, b);
        assert!(a.len() > 4 * PLAYS_PER_QUARTER);
    }

    #[test]
    fn ids_are_sequential_and_downs_regular() {
        let plays = synthetic_game(3, DEMO_SEASON, 2, "BUF", "MIA", 100);
        for (idx, play) in plays.iter().enumerate() {
            assert_eq!(play.id, 100 + idx as PlayId);
            if let Some(down) = play.down {
                assert!((1..=4).contains(&down));
                assert!(play.dist.is_some_and(|d| d > 0));
            }
        }
        assert!(plays.iter().any(|p| p.marks_boundary()));
    }

    #[test]
    fn season_schedules_every_week() {
        let table = synthetic_season(1, DEMO_SEASON, DEMO_TEAMS, 3);
        assert_eq!(table.weeks(DEMO_SEASON), vec![1, 2, 3]);
        assert_eq!(table.teams().len(), DEMO_TEAMS.len());
    }
}
