use std::fs;
use std::path::PathBuf;

use pbp_sankey::dataset::PlayTable;
use pbp_sankey::store::{file_fingerprint, ingest_csv, load_plays, open_db};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn ingest_then_reload_matches_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("plays.sqlite");
    let csv_path = fixture_path("sample_game.csv");

    let mut conn = open_db(&db_path).expect("open db");
    let summary = ingest_csv(&mut conn, db_path.clone(), &csv_path).expect("ingest");
    assert!(!summary.unchanged);
    assert_eq!(summary.rows_read, 19);
    assert_eq!(summary.rows_skipped, 0);
    assert_eq!(summary.plays_upserted, 19);
    assert_eq!(summary.fingerprint.len(), 64);

    let (from_csv, _) = PlayTable::from_csv_path(&csv_path).expect("csv");
    let from_db = load_plays(&conn, None).expect("load");
    assert_eq!(from_db, from_csv);

    assert_eq!(load_plays(&conn, Some(2023)).expect("load").len(), 19);
    assert!(load_plays(&conn, Some(2019)).expect("load").is_empty());
}

#[test]
fn same_file_is_not_ingested_twice() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("plays.sqlite");
    let csv_path = fixture_path("sample_game.csv");

    let mut conn = open_db(&db_path).expect("open db");
    let first = ingest_csv(&mut conn, db_path.clone(), &csv_path).expect("first ingest");
    let second = ingest_csv(&mut conn, db_path.clone(), &csv_path).expect("second ingest");
    assert!(!first.unchanged);
    assert!(second.unchanged);
    assert_eq!(second.fingerprint, first.fingerprint);
    assert_eq!(second.plays_upserted, 19);

    let runs: i64 = conn
        .query_row("SELECT COUNT(*) FROM ingest_runs", [], |row| row.get(0))
        .expect("count runs");
    assert_eq!(runs, 1);
}

#[test]
fn changed_file_is_reingested() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("plays.sqlite");
    let csv_path = dir.path().join("games.csv");

    let full_csv = fs::read_to_string(fixture_path("sample_game.csv")).expect("fixture");
    let mut lines: Vec<&str> = full_csv.lines().collect();
    lines.truncate(4);
    fs::write(&csv_path, lines.join("\n")).expect("write short csv");

    let mut conn = open_db(&db_path).expect("open db");
    let short = ingest_csv(&mut conn, db_path.clone(), &csv_path).expect("short ingest");
    assert_eq!(short.plays_upserted, 3);

    fs::write(&csv_path, &full_csv).expect("write full csv");
    assert_ne!(
        file_fingerprint(&csv_path).expect("fingerprint"),
        short.fingerprint
    );
    let full = ingest_csv(&mut conn, db_path.clone(), &csv_path).expect("full ingest");
    assert!(!full.unchanged);
    assert_eq!(load_plays(&conn, None).expect("load").len(), 19);
}

#[test]
fn shorter_file_replaces_the_stored_plays() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("plays.sqlite");
    let csv_path = dir.path().join("games.csv");

    let full_csv = fs::read_to_string(fixture_path("sample_game.csv")).expect("fixture");
    let short_csv = full_csv.lines().take(4).collect::<Vec<_>>().join("\n");

    let mut conn = open_db(&db_path).expect("open db");
    fs::write(&csv_path, &full_csv).expect("write full csv");
    let full = ingest_csv(&mut conn, db_path.clone(), &csv_path).expect("full ingest");
    assert_eq!(full.plays_upserted, 19);

    fs::write(&csv_path, &short_csv).expect("write short csv");
    let short = ingest_csv(&mut conn, db_path.clone(), &csv_path).expect("short ingest");
    assert!(!short.unchanged);
    assert_eq!(short.plays_upserted, 3);

    let stored = load_plays(&conn, None).expect("load");
    assert_eq!(stored.len(), 3);
    let (expected, _) = PlayTable::from_csv_path(&csv_path).expect("csv");
    assert_eq!(stored, expected);

    // Going back to a file seen earlier must rewrite the store too.
    fs::write(&csv_path, &full_csv).expect("write full csv again");
    let again = ingest_csv(&mut conn, db_path.clone(), &csv_path).expect("full ingest again");
    assert!(!again.unchanged);
    assert_eq!(load_plays(&conn, None).expect("load").len(), 19);
}

#[test]
fn unreadable_csv_records_no_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("plays.sqlite");
    let csv_path = dir.path().join("broken.csv");
    fs::write(&csv_path, "season,week,poss\n2023,1,NE\n").expect("write csv");

    let mut conn = open_db(&db_path).expect("open db");
    assert!(ingest_csv(&mut conn, db_path.clone(), &csv_path).is_err());

    let runs: i64 = conn
        .query_row("SELECT COUNT(*) FROM ingest_runs", [], |row| row.get(0))
        .expect("count runs");
    assert_eq!(runs, 0);
    assert!(load_plays(&conn, None).expect("load").is_empty());
}

#[test]
fn db_under_a_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "x").expect("write blocker");
    let err = open_db(&blocker.join("plays.sqlite")).expect_err("parent is a file");
    assert!(format!("{err:#}").contains("create db dir"));
}
