use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use sha2::{Digest, Sha256};

use crate::dataset::PlayTable;
use crate::play::Play;

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub db_path: PathBuf,
    pub source: PathBuf,
    pub fingerprint: String,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub plays_upserted: usize,
    /// True when the same file was already ingested and nothing was written.
    pub unchanged: bool,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create db dir {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS plays (
            play_id INTEGER PRIMARY KEY,
            season INTEGER NULL,
            week INTEGER NULL,
            home TEXT NOT NULL,
            away TEXT NOT NULL,
            poss TEXT NOT NULL,
            def TEXT NOT NULL,
            down INTEGER NULL,
            dist INTEGER NULL,
            off_fieldpos INTEGER NULL,
            yds_gained INTEGER NULL,
            is_punt INTEGER NOT NULL,
            is_fieldgoal INTEGER NOT NULL,
            is_turnover INTEGER NOT NULL,
            is_penalty INTEGER NOT NULL,
            onecell TEXT NULL,
            detail TEXT NULL,
            detail_text TEXT NULL,
            detail_a TEXT NULL,
            quarter TEXT NULL,
            qtr_time_remain TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_plays_season_week ON plays(season, week);
        CREATE INDEX IF NOT EXISTS idx_plays_home ON plays(home);
        CREATE INDEX IF NOT EXISTS idx_plays_away ON plays(away);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            source_path TEXT NOT NULL,
            fingerprint TEXT NOT NULL,
            rows_read INTEGER NOT NULL,
            rows_skipped INTEGER NOT NULL,
            plays_upserted INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_ingest_fingerprint ON ingest_runs(fingerprint);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// SHA-256 of the file contents, lowercase hex.
pub fn file_fingerprint(path: &Path) -> Result<String> {
    let mut file =
        fs::File::open(path).with_context(|| format!("open {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("read {} for hashing", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn ingest_csv(conn: &mut Connection, db_path: PathBuf, csv_path: &Path) -> Result<IngestSummary> {
    let fingerprint = file_fingerprint(csv_path)?;

    // Only the latest finished run describes what `plays` holds now.
    let previous = conn
        .query_row(
            "SELECT fingerprint, rows_read, rows_skipped, plays_upserted FROM ingest_runs
             WHERE finished_at IS NOT NULL
             ORDER BY run_id DESC LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )
        .optional()
        .context("query previous ingest run")?;
    if let Some((_, rows_read, rows_skipped, plays)) =
        previous.filter(|(last, ..)| *last == fingerprint)
    {
        log::info!("{} already ingested, skipping", csv_path.display());
        return Ok(IngestSummary {
            db_path,
            source: csv_path.to_path_buf(),
            fingerprint,
            rows_read: rows_read as usize,
            rows_skipped: rows_skipped as usize,
            plays_upserted: plays as usize,
            unchanged: true,
        });
    }

    let (table, report) = PlayTable::from_csv_path(csv_path)?;

    let started_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO ingest_runs(started_at, finished_at, source_path, fingerprint, rows_read, rows_skipped, plays_upserted)
         VALUES (?1, NULL, ?2, ?3, 0, 0, 0)",
        params![started_at, csv_path.display().to_string(), fingerprint],
    )
    .context("insert ingest run")?;
    let run_id = conn.last_insert_rowid();

    // Play ids are row positions in one file, so the previous file's rows go.
    let tx = conn.transaction().context("begin ingest transaction")?;
    let replaced = tx
        .execute("DELETE FROM plays", [])
        .context("clear previous plays")?;
    if replaced > 0 {
        log::info!("replacing {replaced} previously stored plays");
    }
    for play in table.plays() {
        upsert_play(&tx, play)?;
    }
    tx.commit().context("commit ingest transaction")?;

    let finished_at = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE ingest_runs
         SET finished_at = ?1, rows_read = ?2, rows_skipped = ?3, plays_upserted = ?4
         WHERE run_id = ?5",
        params![
            finished_at,
            report.rows as i64,
            report.skipped as i64,
            table.len() as i64,
            run_id
        ],
    )
    .context("update ingest run")?;

    Ok(IngestSummary {
        db_path,
        source: csv_path.to_path_buf(),
        fingerprint,
        rows_read: report.rows,
        rows_skipped: report.skipped,
        plays_upserted: table.len(),
        unchanged: false,
    })
}

fn upsert_play(conn: &Connection, play: &Play) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO plays(
            play_id, season, week, home, away, poss, def,
            down, dist, off_fieldpos, yds_gained,
            is_punt, is_fieldgoal, is_turnover, is_penalty,
            onecell, detail, detail_text, detail_a, quarter, qtr_time_remain
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
        ON CONFLICT(play_id) DO UPDATE SET
            season = excluded.season,
            week = excluded.week,
            home = excluded.home,
            away = excluded.away,
            poss = excluded.poss,
            def = excluded.def,
            down = excluded.down,
            dist = excluded.dist,
            off_fieldpos = excluded.off_fieldpos,
            yds_gained = excluded.yds_gained,
            is_punt = excluded.is_punt,
            is_fieldgoal = excluded.is_fieldgoal,
            is_turnover = excluded.is_turnover,
            is_penalty = excluded.is_penalty,
            onecell = excluded.onecell,
            detail = excluded.detail,
            detail_text = excluded.detail_text,
            detail_a = excluded.detail_a,
            quarter = excluded.quarter,
            qtr_time_remain = excluded.qtr_time_remain
        "#,
        params![
            play.id as i64,
            play.season,
            play.week,
            play.home,
            play.away,
            play.poss,
            play.def,
            play.down,
            play.dist,
            play.off_fieldpos,
            play.yds_gained,
            bool_to_i64(play.is_punt),
            bool_to_i64(play.is_fieldgoal),
            bool_to_i64(play.is_turnover),
            bool_to_i64(play.is_penalty),
            play.onecell,
            play.detail,
            play.detail_text,
            play.detail_a,
            play.quarter,
            play.qtr_time_remain,
        ],
    )
    .with_context(|| format!("upsert play {}", play.id))?;
    Ok(())
}

/// Plays of one season (all seasons for `None`) in source order.
pub fn load_plays(conn: &Connection, season: Option<i32>) -> Result<PlayTable> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                play_id, season, week, home, away, poss, def,
                down, dist, off_fieldpos, yds_gained,
                is_punt, is_fieldgoal, is_turnover, is_penalty,
                onecell, detail, detail_text, detail_a, quarter, qtr_time_remain
            FROM plays
            WHERE ?1 IS NULL OR season = ?1
            ORDER BY play_id ASC
            "#,
        )
        .context("prepare load plays query")?;

    let rows = stmt
        .query_map(params![season], decode_play)
        .context("query load plays")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode play row")?);
    }
    Ok(PlayTable::new(out))
}

fn decode_play(row: &Row<'_>) -> rusqlite::Result<Play> {
    Ok(Play {
        id: row.get::<_, i64>(0)? as u64,
        season: row.get(1)?,
        week: row.get(2)?,
        home: row.get(3)?,
        away: row.get(4)?,
        poss: row.get(5)?,
        def: row.get(6)?,
        down: row.get(7)?,
        dist: row.get(8)?,
        off_fieldpos: row.get(9)?,
        yds_gained: row.get(10)?,
        is_punt: row.get::<_, i64>(11)? != 0,
        is_fieldgoal: row.get::<_, i64>(12)? != 0,
        is_turnover: row.get::<_, i64>(13)? != 0,
        is_penalty: row.get::<_, i64>(14)? != 0,
        onecell: row.get(15)?,
        detail: row.get(16)?,
        detail_text: row.get(17)?,
        detail_a: row.get(18)?,
        quarter: row.get(19)?,
        qtr_time_remain: row.get(20)?,
    })
}

fn bool_to_i64(v: bool) -> i64 {
    if v { 1 } else { 0 }
}
