use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::situation::StateTable;
use crate::summary::DEFAULT_WRAP_WIDTH;

const CACHE_DIR: &str = "pbp_sankey";
const DB_FILE: &str = "plays.sqlite";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub csv_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub states_path: Option<PathBuf>,
    pub wrap_width: usize,
    pub parallelism: usize,
}

impl AppConfig {
    /// Call after `.env` files are loaded.
    pub fn from_env() -> Self {
        Self {
            csv_path: opt_path_env("PBP_CSV_PATH"),
            db_path: opt_path_env("PBP_DB_PATH").or_else(default_db_path),
            states_path: opt_path_env("PBP_STATES_PATH"),
            wrap_width: env::var("LABEL_WRAP_WIDTH")
                .ok()
                .and_then(|val| val.parse::<usize>().ok())
                .unwrap_or(DEFAULT_WRAP_WIDTH)
                .clamp(20, 200),
            parallelism: env::var("REPORT_PARALLELISM")
                .ok()
                .and_then(|val| val.parse::<usize>().ok())
                .unwrap_or(4)
                .clamp(1, 32),
        }
    }

    /// The configured state table, or the built-in one.
    pub fn state_table(&self) -> Result<StateTable> {
        match self.states_path.as_deref() {
            Some(path) => StateTable::load_from_file(path),
            None => Ok(StateTable::standard().clone()),
        }
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

fn opt_path_env(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
        .map(PathBuf::from)
}
